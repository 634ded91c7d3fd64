//! Count map: per-node cell counts compared against ground truth.

use super::geo::{GeoFrame, GeoTable};
use super::indexed_provider;
use crate::core::NodeId;
use crate::error::Result;
use crate::query::{Operation, Table, TableSchema};
use crate::store::groups;

/// Key and column names of the count map.
pub struct CountMapKey;

impl CountMapKey {
    /// Owning node
    pub const ID: &'static str = "ID";
    /// Simulation time
    pub const SIMTIME: &'static str = "simtime";
    /// Cell corner x
    pub const X: &'static str = "x";
    /// Cell corner y
    pub const Y: &'static str = "y";
    /// Estimated count
    pub const COUNT: &'static str = "count";
    /// Signed error against ground truth
    pub const ERR: &'static str = "err";
    /// Distance from cell to owner
    pub const OWNER_DIST: &'static str = "owner_dist";
    /// Squared error
    pub const SQERR: &'static str = "sqerr";
}

/// `count_map`: `[simtime, x, y, ID] -> [count, err, owner_dist, sqerr]`
pub struct CountMapSchema;

impl TableSchema for CountMapSchema {
    const GROUP: &'static str = groups::COUNT_MAP;
    const KEY_ORDER: &'static [&'static str] = &[
        CountMapKey::SIMTIME,
        CountMapKey::X,
        CountMapKey::Y,
        CountMapKey::ID,
    ];
    const COLUMNS: &'static [&'static str] = &[
        CountMapKey::COUNT,
        CountMapKey::ERR,
        CountMapKey::OWNER_DIST,
        CountMapKey::SQERR,
    ];
    const DEFAULT_KEY: &'static str = CountMapKey::SIMTIME;
}

indexed_provider! {
    /// Count map provider.
    DcdMapCount => CountMapSchema {
        select_id_exact, select_id_range => "ID";
        select_simtime_exact, select_simtime_range => "simtime";
        select_x_exact, select_x_range => "x";
        select_y_exact, select_y_range => "y";
        select_count_exact, select_count_range => "count";
        select_err_exact, select_err_range => "err";
        select_owner_dist_exact, select_owner_dist_range => "owner_dist";
        select_sqerr_exact, select_sqerr_range => "sqerr";
    }
}

impl DcdMapCount {
    /// Rows for one time and one node (the same `op` applies to both).
    pub fn select_simtime_and_node_id_exact(
        &self,
        simtime: f64,
        node_id: NodeId,
        op: Operation,
    ) -> Result<Table> {
        self.select_where(&[
            Self::build_exact(CountMapKey::SIMTIME, simtime, op)?,
            Self::build_exact(CountMapKey::ID, node_id as f64, op)?,
        ])
    }

    /// Place a selection of this map in its geographic frame.
    pub fn to_geo(&self, frame: &Table, to_crs: Option<&str>) -> Result<GeoTable> {
        GeoFrame::from_table(self.table())?.to_geo(frame, to_crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DcdError;
    use crate::store::{DataStore, TableGroup};

    fn provider() -> DcdMapCount {
        let mut g = TableGroup::new(
            groups::COUNT_MAP,
            CountMapSchema::KEY_ORDER,
            CountMapSchema::COLUMNS,
        );
        for t in 0..3 {
            for id in 0..3 {
                let err = if id == 0 { 0.0 } else { id as f64 - 1.0 };
                g.insert(
                    vec![t as f64, 0.0, 0.0, id as f64],
                    vec![1.0 + err, err, 2.0 * id as f64, err * err],
                )
                .unwrap();
            }
        }
        DcdMapCount::from_store(&DataStore::new().with_group(g)).unwrap()
    }

    #[test]
    fn test_compound_selection() {
        let p = provider();
        let t = p
            .select_simtime_and_node_id_exact(1.0, 2, Operation::Eq)
            .unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.column("err").unwrap(), vec![1.0]);
        assert_eq!(t.key_names(), CountMapSchema::KEY_ORDER);
    }

    #[test]
    fn test_per_key_vocabulary() {
        let p = provider();
        assert_eq!(p.select_id_exact(0.0, Operation::Eq).unwrap().len(), 3);
        assert_eq!(p.select_simtime_range(0.0, 2.0).unwrap().len(), 6);
        assert_eq!(p.select_id_exact(1.0, Operation::Gt).unwrap().len(), 3);
        assert_eq!(p.select_sqerr_range(0.5, 2.0).unwrap().len(), 3);
        assert_eq!(p.time_interval().unwrap(), Some((0.0, 2.0)));
    }

    #[test]
    fn test_to_geo_needs_attributes() {
        let p = provider();
        let frame = p.select_all().unwrap();
        assert!(matches!(
            p.to_geo(&frame, None),
            Err(DcdError::AttributeNotFound { .. })
        ));
    }
}
