//! Default value functions for serde deserialization.

pub fn cell_size() -> f64 {
    5.0
}

pub fn x_dim() -> usize {
    84
}

pub fn y_dim() -> usize {
    79
}

pub fn store_path() -> String {
    "./results/dcd_map.json".to_string()
}

pub fn bins_width() -> f64 {
    2.5
}

pub fn value_column() -> String {
    "err".to_string()
}

pub fn aggregation() -> String {
    "mean".to_string()
}

pub fn enabled() -> bool {
    true
}

pub fn time_quantiles() -> usize {
    4
}

pub fn histogram_bins() -> usize {
    20
}
