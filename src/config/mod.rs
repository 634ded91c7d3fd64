//! Configuration loading for the DCD map tools.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dcd_map::config::DcdConfig;
//!
//! // Load from default path (configs/config.yaml)
//! let config = DcdConfig::load_default()?;
//!
//! let metadata = config.grid.to_grid_metadata()?;
//! let store = dcd_map::store::load_store(&config.store.path())?;
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Cell size, raster offset, dimensions |
//! | [`StoreSection`] | Snapshot path and group names |
//! | [`AnalysisSection`] | Bin width, aggregation, quantiles |
//!
//! ## Example YAML
//!
//! ```yaml
//! grid:
//!   cell_size: 5.0
//!   x_dim: 84
//!   y_dim: 79
//!
//! store:
//!   path: ./results/dcd_map.json
//!   groups:
//!     dcd_map: dcd_map
//!
//! analysis:
//!   bins_width: 2.5
//!   aggregation: mean
//! ```

mod analysis;
mod defaults;
mod error;
mod grid;
mod store;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use analysis::AnalysisSection;
pub use error::ConfigLoadError;
pub use grid::GridSection;
pub use store::StoreSection;

/// Full configuration loaded from YAML
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DcdConfig {
    /// Grid geometry
    #[serde(default)]
    pub grid: GridSection,

    /// Snapshot store
    #[serde(default)]
    pub store: StoreSection,

    /// Analysis defaults
    #[serde(default)]
    pub analysis: AnalysisSection,
}

impl DcdConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Aggregation;

    #[test]
    fn test_default_config() {
        let config = DcdConfig::default();
        assert_eq!(config.grid.cell_size, 5.0);
        assert_eq!(config.grid.x_dim, 84);
        assert_eq!(config.store.groups.count_map, "count_map");
        assert!(matches!(config.analysis.aggregation(), Ok(Aggregation::Mean)));
    }

    #[test]
    fn test_partial_yaml() {
        let config = DcdConfig::from_yaml(
            "grid:\n  cell_size: 2.5\nstore:\n  groups:\n    dcd_map: map_b\n",
        )
        .unwrap();
        assert_eq!(config.grid.cell_size, 2.5);
        assert_eq!(config.grid.y_dim, 79);
        assert_eq!(config.store.groups.dcd_map, "map_b");
        assert_eq!(config.store.groups.position, "position");
        assert_eq!(config.analysis.time_quantiles, 4);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = DcdConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(DcdConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_parse_error() {
        let err = DcdConfig::from_yaml("grid: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
    }

    #[test]
    fn test_analysis_section() {
        let config = DcdConfig::from_yaml(
            "analysis:\n  remove_null: false\n  time_quantiles: 2\n  histogram_bins: 8\n  aggregation: max\n",
        )
        .unwrap();
        let analysis = &config.analysis;
        assert!(!analysis.remove_null);
        assert_eq!(analysis.time_quantiles, 2);
        assert_eq!(analysis.histogram_bins, 8);
        assert!(matches!(analysis.aggregation_or(None), Ok(Aggregation::Max)));
        assert!(matches!(analysis.aggregation_or(Some("sum")), Ok(Aggregation::Sum)));
        assert!(analysis.aggregation_or(Some("mode")).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = DcdConfig::load(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io(_)));
        assert!(err.to_string().starts_with("cannot read config: "));
    }

    #[test]
    fn test_to_grid_metadata() {
        let metadata = DcdConfig::default().grid.to_grid_metadata().unwrap();
        assert_eq!(metadata.dimensions(), (84, 79));
    }
}
