//! Analysis configuration section.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::map::Aggregation;

use super::defaults;

/// Defaults for the error and delay analyses
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Distance bin width (0 disables binning)
    #[serde(default = "defaults::bins_width")]
    pub bins_width: f64,

    /// Count-map column analysed by default
    #[serde(default = "defaults::value_column")]
    pub value_column: String,

    /// Aggregation name: mean, std, count, sum, min, max, median
    #[serde(default = "defaults::aggregation")]
    pub aggregation: String,

    /// Drop empty cells from delay curves
    #[serde(default = "defaults::enabled")]
    pub remove_null: bool,

    /// Number of equal time slices for per-cell error
    #[serde(default = "defaults::time_quantiles")]
    pub time_quantiles: usize,

    /// Histogram bin count
    #[serde(default = "defaults::histogram_bins")]
    pub histogram_bins: usize,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            bins_width: defaults::bins_width(),
            value_column: defaults::value_column(),
            aggregation: defaults::aggregation(),
            remove_null: true,
            time_quantiles: defaults::time_quantiles(),
            histogram_bins: defaults::histogram_bins(),
        }
    }
}

impl AnalysisSection {
    /// Parsed aggregation
    pub fn aggregation(&self) -> Result<Aggregation> {
        self.aggregation.parse()
    }

    /// `name` when given, the configured aggregation otherwise
    pub fn aggregation_or(&self, name: Option<&str>) -> Result<Aggregation> {
        match name {
            Some(name) => name.parse(),
            None => self.aggregation(),
        }
    }
}
