//! Stable group names and attribute names of the backing store.

use serde::{Deserialize, Serialize};

/// Per-node count/error table
pub const COUNT_MAP: &str = "count_map";

/// Per-node density map (aggregated per cell)
pub const DCD_MAP: &str = "dcd_map";

/// Per-node density map with one row per contributing source
pub const DCD_MAP_ALL: &str = "dcd_map_all";

/// Ground-truth counts
pub const GLOBAL_MAP: &str = "global_map";

/// Node positions
pub const POSITION: &str = "position";

/// Attribute: raster offset (2-vector)
pub const ATTR_OFFSET: &str = "offset";

/// Attribute: EPSG code of the geographic frame
pub const ATTR_EPSG: &str = "epsg";

/// Attribute: cell side length
pub const ATTR_CELL_SIZE: &str = "cell_size";

/// Group names to bind providers to, overridable per store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupNames {
    /// Count map group
    pub count_map: String,
    /// Density map group
    pub dcd_map: String,
    /// Raw multi-source group
    pub dcd_map_all: String,
    /// Ground-truth group
    pub global_map: String,
    /// Position group
    pub position: String,
}

impl Default for GroupNames {
    fn default() -> Self {
        Self {
            count_map: COUNT_MAP.to_string(),
            dcd_map: DCD_MAP.to_string(),
            dcd_map_all: DCD_MAP_ALL.to_string(),
            global_map: GLOBAL_MAP.to_string(),
            position: POSITION.to_string(),
        }
    }
}
