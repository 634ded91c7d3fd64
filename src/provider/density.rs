//! Density map: each node's aggregated per-cell view.

use super::geo::{GeoFrame, GeoTable};
use super::indexed_provider;
use crate::core::NodeId;
use crate::error::Result;
use crate::query::{Operation, Table, TableSchema};
use crate::store::groups;

/// Key and column names of the density map.
pub struct DcdMapKey;

impl DcdMapKey {
    /// Owning node
    pub const ID: &'static str = "ID";
    /// Simulation time
    pub const SIMTIME: &'static str = "simtime";
    /// Cell corner x
    pub const X: &'static str = "x";
    /// Cell corner y
    pub const Y: &'static str = "y";
    /// Source node of a raw reading
    pub const SOURCE: &'static str = "source";
    /// Estimated count
    pub const COUNT: &'static str = "count";
    /// Time the value was measured
    pub const MEASURED_T: &'static str = "measured_t";
    /// Time the value was received by the owner
    pub const RECEIVED_T: &'static str = "received_t";
    /// 1 where the cell is the owner's own location
    pub const OWN_CELL: &'static str = "own_cell";
    /// Receive delay
    pub const DELAY: &'static str = "delay";
    /// Age of the measurement
    pub const MEASUREMENT_AGE: &'static str = "measurement_age";
    /// Age of the last update
    pub const UPDATE_AGE: &'static str = "update_age";
    /// Distance from cell to owner
    pub const OWNER_DIST: &'static str = "owner_dist";
}

/// `dcd_map`: `[ID, simtime, x, y] -> [count, measured_t, received_t, source,
/// own_cell, delay, measurement_age, update_age, owner_dist]`
pub struct DcdMapSchema;

impl TableSchema for DcdMapSchema {
    const GROUP: &'static str = groups::DCD_MAP;
    const KEY_ORDER: &'static [&'static str] =
        &[DcdMapKey::ID, DcdMapKey::SIMTIME, DcdMapKey::X, DcdMapKey::Y];
    const COLUMNS: &'static [&'static str] = &[
        DcdMapKey::COUNT,
        DcdMapKey::MEASURED_T,
        DcdMapKey::RECEIVED_T,
        DcdMapKey::SOURCE,
        DcdMapKey::OWN_CELL,
        DcdMapKey::DELAY,
        DcdMapKey::MEASUREMENT_AGE,
        DcdMapKey::UPDATE_AGE,
        DcdMapKey::OWNER_DIST,
    ];
    const DEFAULT_KEY: &'static str = DcdMapKey::SIMTIME;
}

indexed_provider! {
    /// Density map provider.
    DcdMapProvider => DcdMapSchema {
        select_id_exact, select_id_range => "ID";
        select_simtime_exact, select_simtime_range => "simtime";
        select_x_exact, select_x_range => "x";
        select_y_exact, select_y_range => "y";
        select_count_exact, select_count_range => "count";
        select_source_exact, select_source_range => "source";
        select_own_cell_exact, select_own_cell_range => "own_cell";
        select_delay_exact, select_delay_range => "delay";
        select_measurement_age_exact, select_measurement_age_range => "measurement_age";
        select_update_age_exact, select_update_age_range => "update_age";
        select_owner_dist_exact, select_owner_dist_range => "owner_dist";
    }
}

impl DcdMapProvider {
    /// Rows for one time and one node.
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

    /// Place a selection of this map in its geographic frame.
    pub fn to_geo(&self, frame: &Table, to_crs: Option<&str>) -> Result<GeoTable> {
        GeoFrame::from_table(self.table())?.to_geo(frame, to_crs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataStore, TableGroup};

    #[test]
    fn test_node_then_time_window() {
        let mut g = TableGroup::new(groups::DCD_MAP, DcdMapSchema::KEY_ORDER, DcdMapSchema::COLUMNS);
        for id in 1..4 {
            for t in 0..5 {
                let own = if t % 2 == 0 { 1.0 } else { 0.0 };
                g.insert(
                    vec![id as f64, t as f64, 5.0, 5.0],
                    vec![1.0, t as f64, t as f64, id as f64, own, 0.0, 0.0, 0.0, 1.0],
                )
                .unwrap();
            }
        }
        let p = DcdMapProvider::from_store(&DataStore::new().with_group(g)).unwrap();

        let t = p
            .select_simtime_and_node_id_exact(3.0, 2, Operation::Eq)
            .unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows()[0].key.components(), &[2.0, 3.0, 5.0, 5.0]);

        assert_eq!(p.select_own_cell_exact(1.0, Operation::Eq).unwrap().len(), 9);
        assert_eq!(p.select_id_range(2.0, 4.0).unwrap().len(), 10);
    }
}
