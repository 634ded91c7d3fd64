//! Node positions over time.

use super::indexed_provider;
use crate::core::NodeId;
use crate::error::Result;
use crate::query::{Operation, Table, TableSchema};
use crate::store::groups;

/// `position`: `[simtime, node_id] -> [x, y]`
pub struct PositionSchema;

impl TableSchema for PositionSchema {
    const GROUP: &'static str = groups::POSITION;
    const KEY_ORDER: &'static [&'static str] = &["simtime", "node_id"];
    const COLUMNS: &'static [&'static str] = &["x", "y"];
    const DEFAULT_KEY: &'static str = "simtime";
}

indexed_provider! {
    /// Position trace provider.
    PositionProvider => PositionSchema {
        select_simtime_exact, select_simtime_range => "simtime";
        select_node_id_exact, select_node_id_range => "node_id";
    }
}

impl PositionProvider {
    /// Position of one node at one time (at most one row).
    pub fn select_simtime_and_node_id_exact(
        &self,
        simtime: f64,
        node_id: NodeId,
        op: Operation,
    ) -> Result<Table> {
        self.select_where(&[
            Self::build_exact("simtime", simtime, op)?,
            Self::build_exact("node_id", node_id as f64, op)?,
        ])
    }
}
