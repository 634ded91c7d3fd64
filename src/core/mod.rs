//! Core types for the DCD map engine.
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`CellCoord`]: Integer cell indices into the density grid
//! - [`WorldPoint`]: Continuous coordinates in the simulation frame (meters)
//!
//! ### Time and identity
//! - [`SimTime`]: Totally ordered simulation time, usable as a map key
//! - [`TimeRange`]: Half-open `[start, end)` time window
//! - [`NodeId`]: Node identifier, [`GROUND_TRUTH_ID`] (`0`) is the ground truth

mod point;
mod time;

pub use point::{CellCoord, WorldPoint};
pub use time::{GROUND_TRUTH_ID, NodeId, SimTime, TimeRange, key_cmp};
