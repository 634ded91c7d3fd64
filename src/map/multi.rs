//! Density map with per-source detail.

use std::ops::{Deref, DerefMut};

use super::dcd_map::DcdMap2D;
use super::info::{InfoDict, InfoValue};
use crate::core::{CellCoord, NodeId};
use crate::error::Result;
use crate::grid::GridMetadata;
use crate::provider::{DcdMapKey, DcdMapRawProvider};
use crate::store::DataStore;
use crate::store::groups::GroupNames;

/// [`DcdMap2D`] plus the raw table holding one row per contributing source.
///
/// Everything but [`info_dict`](Self::info_dict) is served by the base map.
#[derive(Debug)]
pub struct DcdMap2DMulti {
    base: DcdMap2D,
    raw: DcdMapRawProvider,
}

impl DcdMap2DMulti {
    /// Wrap a base map and a raw provider.
    pub fn new(base: DcdMap2D, raw: DcdMapRawProvider) -> Self {
        Self { base, raw }
    }

    /// Bind every group found in a store; the raw group is required.
    pub fn from_store(metadata: GridMetadata, store: &DataStore, names: &GroupNames) -> Result<Self> {
        let base = DcdMap2D::from_store(metadata, store, names)?;
        let raw = DcdMapRawProvider::from_store_named(store, &names.dcd_map_all)?;
        Ok(Self::new(base, raw))
    }

    /// Raw per-source provider.
    pub fn raw(&self) -> &DcdMapRawProvider {
        &self.raw
    }

    /// Base info plus every source's reading of the cell.
    ///
    /// Adds `other_values_count`, `other_mean_count` and `other_values`
    /// (one entry per source with `count`, `measured_t`, `received_t` and
    /// `_node_id` set to the source id).
    pub fn info_dict(&mut self, cell: CellCoord, time: f64, node_id: NodeId) -> InfoDict {
        let mut info = self.base.info_dict(cell, time, node_id);
        let corner = self.base.metadata().corner_of(cell);

        let sources = match self.raw.select_cell_sources(time, node_id, (corner.x, corner.y)) {
            Ok(sources) => sources,
            Err(e) => {
                log::warn!("info_dict: raw sources unavailable: {e}");
                return info;
            }
        };

        let mut counts = Vec::with_capacity(sources.len());
        let mut others = Vec::with_capacity(sources.len());
        for row in sources.iter() {
            let mut entry = InfoDict::new();
            for (column, value) in sources.columns().iter().zip(row.values.iter().copied()) {
                let v = match column.as_str() {
                    _ if value.is_nan() => InfoValue::not_available(),
                    DcdMapKey::COUNT => InfoValue::Int(value as i64),
                    _ => InfoValue::Float(value),
                };
                entry.insert(column, v);
            }
            if let Ok(source) = sources.key_position(DcdMapKey::SOURCE) {
                entry.insert("_node_id", InfoValue::Int(row.key[source] as NodeId));
            }
            if let Ok(count) = sources.value(row, DcdMapKey::COUNT) {
                counts.push(count);
            }
            others.push(entry);
        }

        info.insert("other_values_count", InfoValue::Int(others.len() as i64));
        let mean_count = super::stats::mean(&counts);
        info.insert(
            "other_mean_count",
            if mean_count.is_nan() {
                InfoValue::not_available()
            } else {
                InfoValue::Float(mean_count)
            },
        );
        info.insert("other_values", InfoValue::List(others));
        info
    }
}

impl Deref for DcdMap2DMulti {
    type Target = DcdMap2D;

    fn deref(&self) -> &DcdMap2D {
        &self.base
    }
}

impl DerefMut for DcdMap2DMulti {
    fn deref_mut(&mut self) -> &mut DcdMap2D {
        &mut self.base
    }
}
