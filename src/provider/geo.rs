//! Geo-reprojection of cell tables.
//!
//! Cells are stored in an internal raster frame. The group attributes
//! `offset`, `epsg` and `cell_size` describe how that frame maps onto a
//! geographic CRS: subtract `offset` from the stored cell corner, then the
//! coordinates are in `epsg`.

use serde::Serialize;

use super::crs::Crs;
use crate::core::WorldPoint;
use crate::error::{DcdError, Result};
use crate::query::{CompositeKey, IndexedTable, Table, TableSchema};
use crate::store::groups::{ATTR_CELL_SIZE, ATTR_EPSG, ATTR_OFFSET};

/// Raster-to-geographic frame read from group attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoFrame {
    offset: WorldPoint,
    epsg: String,
    cell_size: f64,
}

impl GeoFrame {
    /// Frame from explicit values.
    pub fn new(offset: WorldPoint, epsg: impl Into<String>, cell_size: f64) -> Self {
        Self {
            offset,
            epsg: epsg.into(),
            cell_size,
        }
    }

    /// Read `offset`, `epsg` and `cell_size` from a provider's group.
    ///
    /// Fails with `AttributeNotFound` when any of them is missing.
    pub fn from_table<S: TableSchema>(table: &IndexedTable<S>) -> Result<Self> {
        let invalid = |name: &str, reason: &str| DcdError::InvalidAttribute {
            group: S::GROUP.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let offset = table
            .get_attribute(ATTR_OFFSET)?
            .as_pair()
            .ok_or_else(|| invalid(ATTR_OFFSET, "expected a 2-vector"))?;
        let epsg = table
            .get_attribute(ATTR_EPSG)?
            .as_epsg()
            .ok_or_else(|| invalid(ATTR_EPSG, "expected an EPSG code"))?;
        let cell_size = table
            .get_attribute(ATTR_CELL_SIZE)?
            .as_f64()
            .filter(|cs| cs.is_finite() && *cs > 0.0)
            .ok_or_else(|| invalid(ATTR_CELL_SIZE, "expected a positive scalar"))?;

        Ok(Self::new(WorldPoint::new(offset.0, offset.1), epsg, cell_size))
    }

    /// Raster offset.
    pub fn offset(&self) -> WorldPoint {
        self.offset
    }

    /// CRS code as `"EPSG:<code>"`.
    pub fn epsg(&self) -> &str {
        &self.epsg
    }

    /// Cell side length.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Raster point into the geographic frame.
    #[inline]
    pub fn to_geo_point(&self, raster: WorldPoint) -> WorldPoint {
        raster - self.offset
    }

    /// Geographic point back into the raster frame.
    #[inline]
    pub fn to_raster_point(&self, geo: WorldPoint) -> WorldPoint {
        geo + self.offset
    }

    /// Translate every cell of `frame` and build its polygon.
    ///
    /// `frame` must have `x` and `y` key levels. With `to_crs` set, every
    /// polygon vertex is reprojected into that CRS.
    pub fn to_geo(&self, frame: &Table, to_crs: Option<&str>) -> Result<GeoTable> {
        let x_pos = frame.key_position("x")?;
        let y_pos = frame.key_position("y")?;

        let projection = match to_crs {
            Some(target) => Some((Crs::parse(&self.epsg)?, Crs::parse(target)?)),
            None => None,
        };

        let cells = frame
            .iter()
            .map(|row| {
                let corner = self.to_geo_point(WorldPoint::new(row.key[x_pos], row.key[y_pos]));
                let mut key = row.key.components().to_vec();
                key[x_pos] = corner.x;
                key[y_pos] = corner.y;

                let mut polygon = cell_box(corner, self.cell_size);
                if let Some((from, to)) = &projection {
                    for vertex in polygon.iter_mut() {
                        *vertex = from.transform(*vertex, to);
                    }
                }

                GeoCell {
                    key: CompositeKey::new(key),
                    values: row.values.clone(),
                    polygon,
                }
            })
            .collect();

        let crs = projection.map_or_else(|| self.epsg.clone(), |(_, to)| to.to_string());
        log::debug!("to_geo: {} cells in {}", frame.len(), crs);

        Ok(GeoTable {
            crs,
            key_names: frame.key_names().to_vec(),
            columns: frame.columns().to_vec(),
            cells,
        })
    }
}

/// Closed counter-clockwise ring of one cell, starting at its lower-left corner.
fn cell_box(corner: WorldPoint, size: f64) -> [WorldPoint; 5] {
    [
        corner,
        WorldPoint::new(corner.x + size, corner.y),
        WorldPoint::new(corner.x + size, corner.y + size),
        WorldPoint::new(corner.x, corner.y + size),
        corner,
    ]
}

/// One cell with geographic key and footprint polygon.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeoCell {
    /// Key with `x`/`y` translated into the geographic frame
    pub key: CompositeKey,
    /// Column values, unchanged
    pub values: Vec<f64>,
    /// Closed ring (first vertex repeated last)
    pub polygon: [WorldPoint; 5],
}

/// Cells of a table placed in a geographic CRS.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeoTable {
    /// CRS of keys and polygons
    pub crs: String,
    /// Index level names
    pub key_names: Vec<String>,
    /// Column names
    pub columns: Vec<String>,
    /// One entry per source row
    pub cells: Vec<GeoCell>,
}

impl GeoTable {
    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether there are no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
