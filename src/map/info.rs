//! Flat point-lookup results for interactive probing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Placeholder for values that are not available.
pub const NOT_AVAILABLE: &str = "n/a";

/// One value of an [`InfoDict`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InfoValue {
    /// Integral value (counts, ids)
    Int(i64),
    /// Measured value
    Float(f64),
    /// Text, including the `"n/a"` placeholder
    Text(String),
    /// Nested records (per-source readings)
    List(Vec<InfoDict>),
}

impl InfoValue {
    /// The `"n/a"` placeholder.
    pub fn not_available() -> Self {
        InfoValue::Text(NOT_AVAILABLE.to_string())
    }

    /// Whether this is the `"n/a"` placeholder.
    pub fn is_not_available(&self) -> bool {
        matches!(self, InfoValue::Text(s) if s == NOT_AVAILABLE)
    }

    /// Integer view.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            InfoValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InfoValue::Int(v) => Some(*v as f64),
            InfoValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Int(v) => write!(f, "{v}"),
            InfoValue::Float(v) => write!(f, "{v:.6}"),
            InfoValue::Text(s) => f.write_str(s),
            InfoValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{{{item}}}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Name to value mapping, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InfoDict(BTreeMap<String, InfoValue>);

impl InfoDict {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn insert(&mut self, key: &str, value: InfoValue) {
        self.0.insert(key.to_string(), value);
    }

    /// Value by name.
    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.0.get(key)
    }

    /// Whether a name is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InfoValue)> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InfoDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        Ok(())
    }
}
