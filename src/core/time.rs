//! Simulation time, node identity and time windows.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Node identifier. `0` is reserved for the ground truth.
pub type NodeId = i64;

/// Node id under which ground-truth data is stored.
pub const GROUND_TRUTH_ID: NodeId = 0;

/// Total order on key components: `f64::total_cmp` with `-0.0 == 0.0`,
/// matching the `==` used by selection predicates.
#[inline]
pub fn key_cmp(a: f64, b: f64) -> Ordering {
    (a + 0.0).total_cmp(&(b + 0.0))
}

/// Simulation time in seconds with a total order, usable as a map key.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct SimTime(pub f64);

impl SimTime {
    /// Raw seconds
    #[inline]
    pub fn seconds(self) -> f64 {
        self.0
    }
}

impl From<f64> for SimTime {
    fn from(value: f64) -> Self {
        SimTime(value)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        key_cmp(self.0, other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        key_cmp(self.0, other.0)
    }
}

/// Half-open time window `[start, end)`. Missing bounds are unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound
    pub start: Option<f64>,
    /// Exclusive upper bound
    pub end: Option<f64>,
}

impl TimeRange {
    /// Unbounded window
    pub fn all() -> Self {
        Self::default()
    }

    /// `[start, end)`
    pub fn between(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// `[start, ∞)`
    pub fn from(start: f64) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// `(-∞, end)`
    pub fn until(end: f64) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Build from the `-1 = unbounded` convention used by callers that
    /// pass raw numbers (negative values disable the bound).
    pub fn from_sentinels(from: f64, to: f64) -> Self {
        Self {
            start: (from >= 0.0).then_some(from),
            end: (to >= 0.0).then_some(to),
        }
    }

    /// Whether `t` lies inside the window
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        self.start.is_none_or(|s| t >= s) && self.end.is_none_or(|e| t < e)
    }

    /// Both bounds absent
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_zero_is_one_time() {
        assert_eq!(SimTime(-0.0), SimTime(0.0));
        assert_eq!(key_cmp(-0.0, 0.0), Ordering::Equal);
        assert_eq!(key_cmp(-1.0, 0.0), Ordering::Less);
    }

    #[test]
    fn test_time_range_is_half_open() {
        let range = TimeRange::between(2.0, 4.0);
        assert!(!range.contains(1.9));
        assert!(range.contains(2.0));
        assert!(range.contains(3.999));
        assert!(!range.contains(4.0));
    }

    #[test]
    fn test_sentinel_bounds() {
        let range = TimeRange::from_sentinels(-1.0, -1.0);
        assert!(range.is_unbounded());

        let range = TimeRange::from_sentinels(5.0, -1.0);
        assert_eq!(range, TimeRange::from(5.0));
        assert!(range.contains(1e9));
    }

    #[test]
    fn test_simtime_total_order() {
        let mut times = vec![SimTime(2.0), SimTime(0.4), SimTime(1.2)];
        times.sort();
        assert_eq!(times, vec![SimTime(0.4), SimTime(1.2), SimTime(2.0)]);
    }
}
