//! Grid geometry: cell size, offset and extent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{CellCoord, WorldPoint};
use crate::error::{DcdError, Result};

/// Immutable description of the density grid.
///
/// The grid uses a coordinate system where:
/// - Cell (0, 0) has its lower-left corner at `offset`
/// - Cell (x, y) covers `offset + [x, x+1) * cell_size` × `offset + [y, y+1) * cell_size`
/// - Valid cells satisfy `0 <= x < x_dim` and `0 <= y < y_dim`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    cell_size: f64,
    offset: WorldPoint,
    x_dim: usize,
    y_dim: usize,
}

impl GridMetadata {
    /// Create grid metadata, validating cell size and dimensions.
    pub fn new(cell_size: f64, offset: WorldPoint, x_dim: usize, y_dim: usize) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(DcdError::InvalidGrid(format!(
                "cell size must be positive and finite, got {cell_size}"
            )));
        }
        if !offset.is_finite() {
            return Err(DcdError::InvalidGrid(format!(
                "offset must be finite, got ({}, {})",
                offset.x, offset.y
            )));
        }
        if x_dim == 0 || y_dim == 0 {
            return Err(DcdError::InvalidGrid(format!(
                "dimensions must be non-zero, got {x_dim}x{y_dim}"
            )));
        }
        Ok(Self {
            cell_size,
            offset,
            x_dim,
            y_dim,
        })
    }

    /// Create grid metadata covering an area of `width` × `height` meters.
    pub fn from_bound(cell_size: f64, offset: WorldPoint, width: f64, height: f64) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(DcdError::InvalidGrid(format!(
                "cell size must be positive and finite, got {cell_size}"
            )));
        }
        let x_dim = (width / cell_size).ceil().max(0.0) as usize;
        let y_dim = (height / cell_size).ceil().max(0.0) as usize;
        Self::new(cell_size, offset, x_dim, y_dim)
    }

    // === Basic Properties ===

    /// Side length of one cell (meters).
    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Translation of cell (0, 0)'s lower-left corner.
    #[inline]
    pub fn offset(&self) -> WorldPoint {
        self.offset
    }

    /// Number of cells along X.
    #[inline]
    pub fn x_dim(&self) -> usize {
        self.x_dim
    }

    /// Number of cells along Y.
    #[inline]
    pub fn y_dim(&self) -> usize {
        self.y_dim
    }

    /// Grid dimensions `(x_dim, y_dim)` in cells.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x_dim, self.y_dim)
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.x_dim * self.y_dim
    }

    /// World bounds: (min_point, max_point).
    pub fn bounds(&self) -> (WorldPoint, WorldPoint) {
        let max = WorldPoint::new(
            self.offset.x + self.x_dim as f64 * self.cell_size,
            self.offset.y + self.y_dim as f64 * self.cell_size,
        );
        (self.offset, max)
    }

    // === Coordinate Conversion ===

    /// Cell containing a continuous coordinate (floor division).
    #[inline]
    pub fn cell_of(&self, point: WorldPoint) -> CellCoord {
        let x = ((point.x - self.offset.x) / self.cell_size).floor() as i32;
        let y = ((point.y - self.offset.y) / self.cell_size).floor() as i32;
        CellCoord::new(x, y)
    }

    /// Center of a cell.
    #[inline]
    pub fn center_of(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            self.offset.x + (cell.x as f64 + 0.5) * self.cell_size,
            self.offset.y + (cell.y as f64 + 0.5) * self.cell_size,
        )
    }

    /// Lower-left corner of a cell.
    #[inline]
    pub fn corner_of(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            self.offset.x + cell.x as f64 * self.cell_size,
            self.offset.y + cell.y as f64 * self.cell_size,
        )
    }

    /// Cell for a stored coordinate.
    ///
    /// Tables store the lower-left corner of each cell. Shifting to the
    /// center before flooring keeps `k * cell_size` from landing in cell
    /// `k - 1` through rounding.
    #[inline]
    pub fn cell_of_corner(&self, corner: WorldPoint) -> CellCoord {
        let half = 0.5 * self.cell_size;
        self.cell_of(WorldPoint::new(corner.x + half, corner.y + half))
    }

    /// Check if cell coordinates are within bounds.
    #[inline]
    pub fn is_valid_cell(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.x_dim && (cell.y as usize) < self.y_dim
    }

    /// Convert cell coordinates to a row-major flat index.
    #[inline]
    pub fn flat_index(&self, cell: CellCoord) -> Option<usize> {
        self.is_valid_cell(cell)
            .then(|| cell.y as usize * self.x_dim + cell.x as usize)
    }

    /// All cells in row-major order (y outer, x inner).
    pub fn iter_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.y_dim as i32)
            .flat_map(move |y| (0..self.x_dim as i32).map(move |x| CellCoord::new(x, y)))
    }

    /// Flat X and Y arrays of every cell center, row-major.
    pub fn cell_centers(&self) -> (Vec<f64>, Vec<f64>) {
        self.iter_cells()
            .map(|cell| {
                let c = self.center_of(cell);
                (c.x, c.y)
            })
            .unzip()
    }

    /// Cell edges along X (`x_dim + 1` values), for mesh renderers.
    pub fn x_edges(&self) -> Vec<f64> {
        (0..=self.x_dim)
            .map(|i| self.offset.x + i as f64 * self.cell_size)
            .collect()
    }

    /// Cell edges along Y (`y_dim + 1` values), for mesh renderers.
    pub fn y_edges(&self) -> Vec<f64> {
        (0..=self.y_dim)
            .map(|i| self.offset.y + i as f64 * self.cell_size)
            .collect()
    }

    // === Dense Fill ===

    /// Expand a sparse per-cell table to cover every cell of the grid.
    ///
    /// Returns exactly `x_dim * y_dim` entries in row-major order. Cells
    /// missing from `sparse` get `default`; entries outside the grid are
    /// dropped. The input is not modified.
    pub fn fill_missing<T: Clone>(
        &self,
        sparse: &BTreeMap<CellCoord, T>,
        default: T,
    ) -> Vec<(CellCoord, T)> {
        let outside = sparse.keys().filter(|c| !self.is_valid_cell(**c)).count();
        if outside > 0 {
            log::warn!(
                "fill_missing: dropping {} cell(s) outside {}x{} grid",
                outside,
                self.x_dim,
                self.y_dim
            );
        }

        self.iter_cells()
            .map(|cell| {
                let value = sparse.get(&cell).cloned().unwrap_or_else(|| default.clone());
                (cell, value)
            })
            .collect()
    }
}
