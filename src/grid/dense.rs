//! Dense 2D value grid (rows = y cells, columns = x cells).

use serde::{Deserialize, Serialize};

use crate::core::CellCoord;
use crate::error::{DcdError, Result};

/// Dense grid of values in canonical row/column order.
///
/// Row `y` holds the cells `(0..x_dim, y)`. This is the layout mesh
/// renderers expect for an area plot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseGrid {
    x_dim: usize,
    y_dim: usize,
    values: Vec<f64>,
}

impl DenseGrid {
    /// Grid with every cell set to `value`.
    pub fn filled(x_dim: usize, y_dim: usize, value: f64) -> Self {
        Self {
            x_dim,
            y_dim,
            values: vec![value; x_dim * y_dim],
        }
    }

    /// Build from row-major `(cell, value)` pairs covering the full grid,
    /// as produced by [`GridMetadata::fill_missing`](super::GridMetadata::fill_missing).
    pub fn from_cells(x_dim: usize, y_dim: usize, cells: Vec<(CellCoord, f64)>) -> Result<Self> {
        if cells.len() != x_dim * y_dim {
            return Err(DcdError::SchemaMismatch(format!(
                "dense grid {}x{} needs {} cells, got {}",
                x_dim,
                y_dim,
                x_dim * y_dim,
                cells.len()
            )));
        }

        let mut grid = Self::filled(x_dim, y_dim, 0.0);
        for (cell, value) in cells {
            if !grid.set(cell, value) {
                return Err(DcdError::SchemaMismatch(format!(
                    "cell {cell} outside dense grid {x_dim}x{y_dim}"
                )));
            }
        }
        Ok(grid)
    }

    /// Shape as `(rows, columns)` = `(y_dim, x_dim)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.y_dim, self.x_dim)
    }

    /// Value at row `y`, column `x`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        (x < self.x_dim && y < self.y_dim).then(|| self.values[y * self.x_dim + x])
    }

    /// Value for a cell coordinate.
    #[inline]
    pub fn get_cell(&self, cell: CellCoord) -> Option<f64> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        self.get(cell.x as usize, cell.y as usize)
    }

    /// Set a cell value, returns false when out of bounds.
    pub fn set(&mut self, cell: CellCoord, value: f64) -> bool {
        if cell.x < 0 || cell.y < 0 {
            return false;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.x_dim || y >= self.y_dim {
            return false;
        }
        self.values[y * self.x_dim + x] = value;
        true
    }

    /// One row (fixed y).
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        (y < self.y_dim).then(|| &self.values[y * self.x_dim..(y + 1) * self.x_dim])
    }

    /// Row-major values (what a color mesh consumes via `ravel`).
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sum over all cells.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Maximum cell value (NaN-free grids only).
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of cells different from `value`.
    pub fn count_not_equal(&self, value: f64) -> usize {
        self.values.iter().filter(|v| **v != value).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_rows_by_columns() {
        let grid = DenseGrid::filled(4, 3, 0.0);
        assert_eq!(grid.shape(), (3, 4));
        assert_eq!(grid.row(2).map(|r| r.len()), Some(4));
        assert!(grid.row(3).is_none());
    }

    #[test]
    fn test_from_cells_requires_full_coverage() {
        let cells = vec![(CellCoord::new(0, 0), 1.0)];
        assert!(DenseGrid::from_cells(2, 2, cells).is_err());

        let cells = vec![
            (CellCoord::new(0, 0), 1.0),
            (CellCoord::new(1, 0), 2.0),
            (CellCoord::new(0, 1), 3.0),
            (CellCoord::new(1, 1), 4.0),
        ];
        let grid = DenseGrid::from_cells(2, 2, cells).unwrap();
        assert_eq!(grid.get(1, 0), Some(2.0));
        assert_eq!(grid.get(0, 1), Some(3.0));
        assert_eq!(grid.sum(), 10.0);
        assert_eq!(grid.max(), 4.0);
        assert_eq!(grid.count_not_equal(0.0), 4);
    }
}
