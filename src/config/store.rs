//! Store configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::groups::GroupNames;

use super::defaults;

/// Snapshot location and group names
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    /// Path of the JSON snapshot
    #[serde(default = "defaults::store_path")]
    pub path: String,

    /// Group names (override when a run uses non-standard names)
    #[serde(default)]
    pub groups: GroupNames,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: defaults::store_path(),
            groups: GroupNames::default(),
        }
    }
}

impl StoreSection {
    /// Snapshot path
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}
