//! Aggregations, summaries, histograms and distance binning.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::DcdError;

/// Reduction applied to a group of values.
#[derive(Clone, Copy, Debug, Default)]
pub enum Aggregation {
    /// Arithmetic mean
    #[default]
    Mean,
    /// Sample standard deviation (n - 1 denominator)
    Std,
    /// Number of values
    Count,
    /// Sum
    Sum,
    /// Minimum
    Min,
    /// Maximum
    Max,
    /// Median
    Median,
    /// Caller-supplied reduction
    Custom(fn(&[f64]) -> f64),
}

impl Aggregation {
    /// Reduce `values`, skipping missing (`NaN`) entries.
    ///
    /// Empty input gives `NaN` except for `Count` and `Sum` (0). `Std`
    /// of a single value is `NaN`. `Custom` sees the values unfiltered.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let present = present(values);
        match self {
            Aggregation::Mean => mean(&present),
            Aggregation::Std => sample_std(&present),
            Aggregation::Count => present.len() as f64,
            Aggregation::Sum => present.iter().sum(),
            Aggregation::Min => {
                if present.is_empty() {
                    f64::NAN
                } else {
                    present.iter().copied().fold(f64::INFINITY, f64::min)
                }
            }
            Aggregation::Max => {
                if present.is_empty() {
                    f64::NAN
                } else {
                    present.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                }
            }
            Aggregation::Median => median(&present),
            Aggregation::Custom(f) => f(values),
        }
    }

    /// Short name, used as default output column name.
    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Std => "std",
            Aggregation::Count => "count",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::Median => "median",
            Aggregation::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Aggregation {
    type Err = DcdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" | "avg" => Ok(Aggregation::Mean),
            "std" => Ok(Aggregation::Std),
            "count" => Ok(Aggregation::Count),
            "sum" => Ok(Aggregation::Sum),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "median" => Ok(Aggregation::Median),
            other => Err(DcdError::Config(format!("unknown aggregation '{other}'"))),
        }
    }
}

/// Values that are not missing.
fn present(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

/// Arithmetic mean of the non-`NaN` values, `NaN` when there are none.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        return f64::NAN;
    }
    sum / n as f64
}

/// Sample standard deviation of the non-`NaN` values, `NaN` for fewer
/// than two.
pub fn sample_std(values: &[f64]) -> f64 {
    let values = present(values);
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(&values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Median of the non-`NaN` values, `NaN` when there are none.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = present(values);
    if sorted.is_empty() {
        return f64::NAN;
    }
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n.is_multiple_of(2) {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Mean, spread and range of one column.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Column name
    pub name: String,
    /// Number of values
    pub count: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

impl ColumnSummary {
    /// Summarize a column.
    pub fn from_values(name: &str, values: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            count: Aggregation::Count.apply(values) as usize,
            mean: mean(values),
            std: sample_std(values),
            min: Aggregation::Min.apply(values),
            max: Aggregation::Max.apply(values),
        }
    }

    /// Single-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{}: n={}, mean: {:.4}, std: {:.4}, min: {:.4}, max: {:.4}",
            self.name, self.count, self.mean, self.std, self.min, self.max
        )
    }
}

/// Equal-width histogram.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` ascending edges
    pub edges: Vec<f64>,
    /// Count per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Histogram of the finite values with `bins` equal-width bins.
    ///
    /// Bins are half-open except the last, which also holds the maximum.
    /// A constant input spans `[v - 0.5, v + 0.5]`.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Self::default();
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + i as f64 * width).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Self { edges, counts }
    }

    /// Total number of samples.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// One point of a value-over-distance curve.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistancePoint {
    /// `[lo, hi)` distance bin, `None` for unbinned points
    pub bin: Option<(f64, f64)>,
    /// Mean owner distance of the samples
    pub owner_dist: f64,
    /// Mean value of the samples
    pub value: f64,
    /// Number of non-missing samples
    pub samples: usize,
}

/// Value-over-distance curve sorted by increasing distance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DistanceProfile {
    /// Column that was averaged
    pub value_column: String,
    /// Bin width used (0 for unbinned)
    pub bins_width: f64,
    /// Points sorted by `owner_dist`
    pub points: Vec<DistancePoint>,
}

impl DistanceProfile {
    /// Build from `(owner_dist, value)` samples.
    ///
    /// With `bins_width > 0` samples are grouped into fixed-width bins
    /// `[k * w, (k + 1) * w)` and averaged, skipping missing values; bins
    /// without any value are dropped. Otherwise every sample is one point.
    pub fn from_samples(value_column: &str, samples: &[(f64, f64)], bins_width: f64) -> Self {
        let mut points: Vec<DistancePoint> = if bins_width > 0.0 {
            let mut bins: BTreeMap<i64, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
            for &(dist, value) in samples.iter().filter(|(d, _)| d.is_finite()) {
                let entry = bins.entry((dist / bins_width).floor() as i64).or_default();
                entry.0.push(dist);
                entry.1.push(value);
            }
            bins.into_iter()
                .map(|(k, (dists, values))| DistancePoint {
                    bin: Some((k as f64 * bins_width, (k + 1) as f64 * bins_width)),
                    owner_dist: mean(&dists),
                    value: mean(&values),
                    samples: present(&values).len(),
                })
                .filter(|p| !p.value.is_nan())
                .collect()
        } else {
            samples
                .iter()
                .map(|&(dist, value)| DistancePoint {
                    bin: None,
                    owner_dist: dist,
                    value,
                    samples: 1,
                })
                .collect()
        };

        points.sort_by(|a, b| a.owner_dist.total_cmp(&b.owner_dist));
        Self {
            value_column: value_column.to_string(),
            bins_width: bins_width.max(0.0),
            points,
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the curve is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
