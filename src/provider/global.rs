//! Ground-truth counts, independent of any node's view.

use super::geo::{GeoFrame, GeoTable};
use super::indexed_provider;
use crate::error::Result;
use crate::query::{Table, TableSchema};
use crate::store::groups;

/// `global_map`: `[simtime, x, y] -> [count]`
pub struct GlobalMapSchema;

impl TableSchema for GlobalMapSchema {
    const GROUP: &'static str = groups::GLOBAL_MAP;
    const KEY_ORDER: &'static [&'static str] = &["simtime", "x", "y"];
    const COLUMNS: &'static [&'static str] = &["count"];
    const DEFAULT_KEY: &'static str = "simtime";
}

indexed_provider! {
    /// Ground-truth map provider.
    GlobalMapProvider => GlobalMapSchema {
        select_simtime_exact, select_simtime_range => "simtime";
        select_x_exact, select_x_range => "x";
        select_y_exact, select_y_range => "y";
        select_count_exact, select_count_range => "count";
    }
}

impl GlobalMapProvider {
    /// Place a selection of this map in its geographic frame.
    pub fn to_geo(&self, frame: &Table, to_crs: Option<&str>) -> Result<GeoTable> {
        GeoFrame::from_table(self.table())?.to_geo(frame, to_crs)
    }
}
