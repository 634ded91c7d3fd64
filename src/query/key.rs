//! Composite keys.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;

use crate::core::key_cmp;

/// Ordered composite key: one numeric component per declared key level.
///
/// Components compare lexicographically with [`key_cmp`], so keys
/// can live in sorted storage and be binary searched along their leading
/// levels.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(Vec<f64>);

impl CompositeKey {
    /// Create a key from its components in declared order.
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Number of key levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no levels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Component at a level position.
    #[inline]
    pub fn get(&self, pos: usize) -> Option<f64> {
        self.0.get(pos).copied()
    }

    /// All components.
    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.0
    }

    /// Whether any component is NaN (not allowed in stored keys).
    pub fn has_nan(&self) -> bool {
        self.0.iter().any(|v| v.is_nan())
    }

    /// Key with the given level positions removed.
    pub fn without_levels(&self, drop: &[usize]) -> CompositeKey {
        CompositeKey(
            self.0
                .iter()
                .enumerate()
                .filter(|(i, _)| !drop.contains(i))
                .map(|(_, v)| *v)
                .collect(),
        )
    }

    /// Key made of the given level positions, in that order.
    pub fn project(&self, keep: &[usize]) -> CompositeKey {
        CompositeKey(keep.iter().filter_map(|i| self.0.get(*i).copied()).collect())
    }
}

impl From<Vec<f64>> for CompositeKey {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

impl From<&[f64]> for CompositeKey {
    fn from(components: &[f64]) -> Self {
        Self(components.to_vec())
    }
}

impl Index<usize> for CompositeKey {
    type Output = f64;

    #[inline]
    fn index(&self, pos: usize) -> &f64 {
        &self.0[pos]
    }
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CompositeKey {}

impl PartialOrd for CompositeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompositeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match key_cmp(*a, *b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic_order() {
        let a = CompositeKey::new(vec![1.0, 5.0, 0.0]);
        let b = CompositeKey::new(vec![1.0, 10.0, 0.0]);
        let c = CompositeKey::new(vec![2.0, 0.0, 0.0]);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(a, CompositeKey::new(vec![1.0, 5.0, 0.0]));
    }

    #[test]
    fn test_level_projection() {
        let key = CompositeKey::new(vec![2.0, 5.0, 10.0, 3.0]);
        assert_eq!(key.without_levels(&[0, 3]), CompositeKey::new(vec![5.0, 10.0]));
        assert_eq!(key.project(&[3, 0]), CompositeKey::new(vec![3.0, 2.0]));
        assert_eq!(key.to_string(), "(2, 5, 10, 3)");
    }
}
