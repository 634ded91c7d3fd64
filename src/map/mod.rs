//! Analysis views over one simulation run.
//!
//! ## Key Components
//!
//! - [`DcdMap2D`]: Density, count and ground-truth views with lazy loading
//! - [`DcdMap2DMulti`]: Adds the per-source readings to point lookups
//! - [`PositionTable`]: Node positions keyed by `(simtime, node_id)`
//! - [`InfoDict`]: Flat result of a point lookup
//! - [`Aggregation`], [`Histogram`], [`DistanceProfile`]: Reductions used by
//!   the error analyses
//!
//! ## Loading
//!
//! The density map and the count map are materialized on first access and
//! cached. Accessing a view that was never configured fails with
//! [`DcdError::Config`](crate::error::DcdError::Config).

mod dcd_map;
mod info;
mod lazy;
mod multi;
mod position;
mod stats;

pub use dcd_map::{CountDiff, DcdMap2D, LOCATION_UNKNOWN};
pub use info::{InfoDict, InfoValue, NOT_AVAILABLE};
pub use lazy::Lazy;
pub use multi::DcdMap2DMulti;
pub use position::PositionTable;
pub use stats::{
    Aggregation, ColumnSummary, DistancePoint, DistanceProfile, Histogram, mean, median,
    sample_std,
};
