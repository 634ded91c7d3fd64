//! Grid configuration section.

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;
use crate::error::Result;
use crate::grid::GridMetadata;

use super::defaults;

/// Grid configuration section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Cell side length (meters)
    #[serde(default = "defaults::cell_size")]
    pub cell_size: f64,

    /// Raster offset X
    #[serde(default)]
    pub offset_x: f64,

    /// Raster offset Y
    #[serde(default)]
    pub offset_y: f64,

    /// Cells along X
    #[serde(default = "defaults::x_dim")]
    pub x_dim: usize,

    /// Cells along Y
    #[serde(default = "defaults::y_dim")]
    pub y_dim: usize,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            cell_size: defaults::cell_size(),
            offset_x: 0.0,
            offset_y: 0.0,
            x_dim: defaults::x_dim(),
            y_dim: defaults::y_dim(),
        }
    }
}

impl GridSection {
    /// Convert to GridMetadata
    pub fn to_grid_metadata(&self) -> Result<GridMetadata> {
        GridMetadata::new(
            self.cell_size,
            WorldPoint::new(self.offset_x, self.offset_y),
            self.x_dim,
            self.y_dim,
        )
    }
}
