//! In-memory position trace keyed by `(simtime, node_id)`.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::{NodeId, SimTime, WorldPoint};
use crate::error::{DcdError, Result};
use crate::provider::PositionProvider;
use crate::query::Table;

/// Node positions, populated once and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct PositionTable {
    positions: BTreeMap<(SimTime, NodeId), WorldPoint>,
}

impl PositionTable {
    /// Empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(simtime, node_id, position)` records.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, NodeId, WorldPoint)>,
    {
        let mut table = Self::new();
        for (t, id, p) in records {
            table.insert(t, id, p)?;
        }
        Ok(table)
    }

    /// Build from a table keyed `[simtime, node_id]` with `x`/`y` columns.
    pub fn from_table(table: &Table) -> Result<Self> {
        let t_pos = table.key_position("simtime")?;
        let id_pos = table.key_position("node_id")?;
        let x_idx = table.column_index("x")?;
        let y_idx = table.column_index("y")?;

        Self::from_records(table.iter().map(|row| {
            (
                row.key[t_pos],
                row.key[id_pos] as NodeId,
                WorldPoint::new(row.values[x_idx], row.values[y_idx]),
            )
        }))
    }

    /// Materialize the whole position group of a store.
    pub fn from_provider(provider: &PositionProvider) -> Result<Self> {
        let table = Self::from_table(&provider.select_all()?)?;
        log::info!("Loaded {} positions", table.len());
        Ok(table)
    }

    /// Add one record.
    pub fn insert(&mut self, simtime: f64, node_id: NodeId, position: WorldPoint) -> Result<()> {
        if simtime.is_nan() {
            return Err(DcdError::SchemaMismatch(format!(
                "NaN simtime for node {node_id}"
            )));
        }
        if self
            .positions
            .insert((SimTime(simtime), node_id), position)
            .is_some()
        {
            return Err(DcdError::DuplicateKey(format!(
                "position ({simtime}, {node_id})"
            )));
        }
        Ok(())
    }

    /// Position of a node at an exact time.
    pub fn get(&self, simtime: f64, node_id: NodeId) -> Option<WorldPoint> {
        if simtime.is_nan() {
            return None;
        }
        self.positions.get(&(SimTime(simtime), node_id)).copied()
    }

    /// Sorted distinct node ids.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let ids: BTreeSet<NodeId> = self.positions.keys().map(|(_, id)| *id).collect();
        ids.into_iter().collect()
    }

    /// Sorted distinct times.
    pub fn times(&self) -> Vec<f64> {
        let mut times: Vec<f64> = self.positions.keys().map(|(t, _)| t.seconds()).collect();
        times.dedup();
        times
    }

    /// Records of one node in time order.
    pub fn track(&self, node_id: NodeId) -> Vec<(f64, WorldPoint)> {
        self.positions
            .iter()
            .filter(|((_, id), _)| *id == node_id)
            .map(|((t, _), p)| (t.seconds(), *p))
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether there are no records.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_ids() {
        let table = PositionTable::from_records([
            (0.0, 3, WorldPoint::new(1.0, 2.0)),
            (0.0, 1, WorldPoint::new(5.0, 5.0)),
            (1.0, 3, WorldPoint::new(2.0, 2.0)),
        ])
        .unwrap();
        assert_eq!(table.get(1.0, 3), Some(WorldPoint::new(2.0, 2.0)));
        assert_eq!(table.get(2.0, 3), None);
        assert_eq!(table.get(f64::NAN, 3), None);
        assert_eq!(table.node_ids(), vec![1, 3]);
        assert_eq!(table.times(), vec![0.0, 1.0]);
        assert_eq!(table.track(3).len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut table = PositionTable::new();
        table.insert(0.0, 1, WorldPoint::ZERO).unwrap();
        assert!(table.insert(0.0, 1, WorldPoint::ZERO).is_err());
    }
}
