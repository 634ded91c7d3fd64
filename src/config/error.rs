//! Configuration loading errors.

use thiserror::Error;

/// Failure reading or parsing a configuration file.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigLoadError {
    /// File could not be read
    #[error("cannot read config: {0}")]
    Io(String),
    /// YAML did not match the expected layout
    #[error("invalid config: {0}")]
    Parse(String),
}
