//! Error types for the DCD map engine.
//!
//! Structural problems (unattached providers, missing attributes, unknown
//! keys, schema mismatches) surface as [`DcdError`]. Sparse data never does:
//! point queries without a matching record resolve to typed defaults at the
//! call site instead.

use crate::config::ConfigLoadError;

/// Result type alias
pub type Result<T> = std::result::Result<T, DcdError>;

/// DCD map error types
#[derive(Debug, thiserror::Error)]
pub enum DcdError {
    /// Provider, lazy field or store used before it was set up
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scalar attribute missing from a store group
    #[error("Attribute '{name}' not found in group '{group}'")]
    AttributeNotFound {
        /// Store group that was queried
        group: String,
        /// Attribute name
        name: String,
    },

    /// Attribute present but not of the expected shape
    #[error("Attribute '{name}' in group '{group}' is invalid: {reason}")]
    InvalidAttribute {
        /// Store group that was queried
        group: String,
        /// Attribute name
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// Predicate references a name outside the declared key ordering and column set
    #[error("Unknown key '{key}' for group '{group}' (declared: {declared})")]
    UnknownKey {
        /// Store group the predicate was built for
        group: String,
        /// Offending key name
        key: String,
        /// Declared key ordering and columns, comma separated
        declared: String,
    },

    /// Column or key referenced by a consumer is not part of the table
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Composite key inserted twice into the same group
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Grid metadata violates its invariants
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// Coordinate reference system not supported by the reprojection layer
    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be loaded
    #[error("{0}")]
    ConfigLoad(#[from] ConfigLoadError),
}

impl DcdError {
    /// Whether the error stems from a wiring/configuration defect.
    pub fn is_configuration(&self) -> bool {
        matches!(self, DcdError::Config(_))
    }
}
