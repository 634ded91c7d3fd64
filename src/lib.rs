//! # DCD Map
//!
//! Indexed query and error-analysis engine for decentralized crowd density
//! (DCD) maps produced by pedestrian simulations.
//!
//! ## Overview
//!
//! Every node of a simulation keeps a local density estimate of the observed
//! area. A run produces five tables:
//!
//! - **count_map** - per node, time and cell: count and error against ground truth
//! - **dcd_map** - per node, time and cell: estimate plus staleness metrics
//! - **dcd_map_all** - the same with one row per contributing source
//! - **global_map** - ground-truth count per time and cell
//! - **position** - node positions over time
//!
//! ## Features
//!
//! - **Indexed Selection**: Exact and half-open range predicates over a
//!   declared composite key, narrowed by binary search along leading levels
//! - **Typed Providers**: One provider per table with `select_<key>_exact` /
//!   `select_<key>_range` helpers and geo-reprojection of cells
//! - **Map Analysis**: Lazy node-centric and global views, dense area grids,
//!   error over distance, time and cells
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dcd_map::{CellCoord, DcdConfig, DcdMap2D, load_store};
//!
//! let config = DcdConfig::load_default()?;
//! let store = load_store(&config.store.path())?;
//! let mut dcd = DcdMap2D::from_store(config.grid.to_grid_metadata()?, &store, &config.store.groups)?;
//!
//! let area = dcd.update_area(12.0, 3, "err")?;
//! let info = dcd.info_dict(CellCoord::new(2, 2), 12.0, 3);
//! ```
//!
//! ## Coordinate System
//!
//! Tables store the lower-left corner of each cell in the raster frame:
//! - X: `offset.x + cx * cell_size`
//! - Y: `offset.y + cy * cell_size`
//! - The geographic frame is the raster frame minus the `offset` attribute

#![warn(missing_docs)]

// Output directory scanning
pub mod catalog;

// Unified configuration
pub mod config;

// Core types
pub mod core;

// Error types
pub mod error;

// Grid geometry
pub mod grid;

// Map analysis layer
pub mod map;

// Typed providers and geo-reprojection
pub mod provider;

// Generic indexed selection
pub mod query;

// Backing store and snapshots
pub mod store;

// Re-export commonly used types
pub use core::{CellCoord, GROUND_TRUTH_ID, NodeId, SimTime, TimeRange, WorldPoint};

pub use catalog::{OutputCatalog, StoreHandle};
pub use config::{ConfigLoadError, DcdConfig};
pub use error::{DcdError, Result};
pub use grid::{DenseGrid, GridMetadata};
pub use map::{Aggregation, DcdMap2D, DcdMap2DMulti, InfoDict, InfoValue, PositionTable};
pub use provider::{
    Crs, DcdMapCount, DcdMapProvider, DcdMapRawProvider, GeoFrame, GeoTable, GlobalMapProvider,
    PositionProvider,
};
pub use query::{CompositeKey, Condition, IndexedTable, Operation, Row, Table, TableSchema};
pub use store::{AttributeValue, DataStore, TableGroup, load_store, save_store};
