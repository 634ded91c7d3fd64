//! Grid geometry and dense grid output.
//!
//! ## Key Components
//!
//! - [`GridMetadata`]: Cell size, offset and extent; coordinate ↔ cell
//!   conversion and dense fill of sparse per-cell tables
//! - [`DenseGrid`]: Full `(y_dim, x_dim)` value matrix consumed by area views
//!
//! ## Conventions
//!
//! ```text
//! cell_of(p)   = floor((p - offset) / cell_size)
//! center_of(c) = offset + (c + 0.5) * cell_size
//! corner_of(c) = offset + c * cell_size          # what the tables store
//! ```

mod dense;
mod metadata;

pub use dense::DenseGrid;
pub use metadata::GridMetadata;
