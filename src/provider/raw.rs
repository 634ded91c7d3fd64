//! Raw multi-source density map: one row per contributing source.

use super::indexed_provider;
use super::DcdMapKey;
use crate::core::NodeId;
use crate::error::Result;
use crate::query::{Operation, Table, TableSchema};
use crate::store::groups;

/// `dcd_map_all`: `[ID, simtime, x, y, source] -> [count, measured_t, received_t]`
pub struct DcdMapRawSchema;

impl TableSchema for DcdMapRawSchema {
    const GROUP: &'static str = groups::DCD_MAP_ALL;
    const KEY_ORDER: &'static [&'static str] = &[
        DcdMapKey::ID,
        DcdMapKey::SIMTIME,
        DcdMapKey::X,
        DcdMapKey::Y,
        DcdMapKey::SOURCE,
    ];
    const COLUMNS: &'static [&'static str] = &[
        DcdMapKey::COUNT,
        DcdMapKey::MEASURED_T,
        DcdMapKey::RECEIVED_T,
    ];
    const DEFAULT_KEY: &'static str = DcdMapKey::SIMTIME;
}

indexed_provider! {
    /// Raw multi-source density map provider.
    DcdMapRawProvider => DcdMapRawSchema {
        select_id_exact, select_id_range => "ID";
        select_simtime_exact, select_simtime_range => "simtime";
        select_x_exact, select_x_range => "x";
        select_y_exact, select_y_range => "y";
        select_source_exact, select_source_range => "source";
        select_count_exact, select_count_range => "count";
        select_measured_t_exact, select_measured_t_range => "measured_t";
        select_received_t_exact, select_received_t_range => "received_t";
    }
}

impl DcdMapRawProvider {
    /// Rows for one time and one owning node.
    pub fn select_simtime_and_node_id_exact(
        &self,
        simtime: f64,
        node_id: NodeId,
        op: Operation,
    ) -> Result<Table> {
        self.select_where(&[
            Self::build_exact(DcdMapKey::ID, node_id as f64, op)?,
            Self::build_exact(DcdMapKey::SIMTIME, simtime, op)?,
        ])
    }

    /// Every source's reading for one stored cell corner at one time and node.
    ///
    /// The key is fully pinned except for `source`, so this is a single
    /// binary-searched window.
    pub fn select_cell_sources(
        &self,
        simtime: f64,
        node_id: NodeId,
        corner: (f64, f64),
    ) -> Result<Table> {
        self.select_where(&[
            Self::build_exact(DcdMapKey::ID, node_id as f64, Operation::Eq)?,
            Self::build_exact(DcdMapKey::SIMTIME, simtime, Operation::Eq)?,
            Self::build_exact(DcdMapKey::X, corner.0, Operation::Eq)?,
            Self::build_exact(DcdMapKey::Y, corner.1, Operation::Eq)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataStore, TableGroup};

    #[test]
    fn test_cell_sources() {
        let mut g = TableGroup::new(
            groups::DCD_MAP_ALL,
            DcdMapRawSchema::KEY_ORDER,
            DcdMapRawSchema::COLUMNS,
        );
        for source in [1.0, 4.0, 7.0] {
            g.insert(vec![3.0, 2.0, 10.0, 5.0, source], vec![source, 1.5, 1.9])
                .unwrap();
        }
        g.insert(vec![3.0, 2.0, 15.0, 5.0, 1.0], vec![9.0, 1.5, 1.9])
            .unwrap();
        let p = DcdMapRawProvider::from_store(&DataStore::new().with_group(g)).unwrap();

        let corner = (10.0, 5.0);
        let t = p.select_cell_sources(2.0, 3, corner).unwrap();
        assert_eq!(t.key_level("source").unwrap(), vec![1.0, 4.0, 7.0]);
        assert!(p.select_cell_sources(2.0, 4, corner).unwrap().is_empty());
    }
}
