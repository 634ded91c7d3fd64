//! Backing store of named table groups.
//!
//! A [`DataStore`] holds one [`TableGroup`] per map type. Each group has a
//! physical key ordering, a value-column set, rows sorted by composite key
//! and a bag of scalar attributes (`offset`, `epsg`, `cell_size`) written
//! when the group was created.
//!
//! Groups are immutable once they are in a store and are shared with the
//! providers through `Arc`, so attaching a provider never copies rows.
//!
//! ## Snapshots
//!
//! ```rust,ignore
//! use dcd_map::store::{load_store, save_store};
//!
//! save_store(&store, Path::new("run-0.json"))?;
//! let store = load_store(Path::new("run-0.json"))?;
//! ```

pub mod groups;
mod persistence;

pub use persistence::{load_store, read_store, save_store, write_store};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DcdError, Result};
use crate::query::{CompositeKey, Row};

/// Scalar metadata value stored alongside a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer (e.g. an EPSG code)
    Int(i64),
    /// Floating point scalar (e.g. cell size)
    Float(f64),
    /// Text (e.g. `"EPSG:32632"`)
    Text(String),
    /// Numeric vector (e.g. a 2D offset)
    Vector(Vec<f64>),
}

impl AttributeValue {
    /// Numeric scalar view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            AttributeValue::Vector(v) if v.len() == 1 => Some(v[0]),
            AttributeValue::Vector(_) => None,
        }
    }

    /// Two-component vector view.
    pub fn as_pair(&self) -> Option<(f64, f64)> {
        match self {
            AttributeValue::Vector(v) if v.len() >= 2 => Some((v[0], v[1])),
            _ => None,
        }
    }

    /// EPSG code rendered as `"EPSG:<code>"`, accepting either form.
    pub fn as_epsg(&self) -> Option<String> {
        match self {
            AttributeValue::Int(code) => Some(format!("EPSG:{code}")),
            AttributeValue::Text(s) => {
                let s = s.trim();
                if s.to_ascii_uppercase().starts_with("EPSG:") {
                    Some(format!("EPSG:{}", &s[5..]))
                } else if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
                    Some(format!("EPSG:{s}"))
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<[f64; 2]> for AttributeValue {
    fn from(v: [f64; 2]) -> Self {
        AttributeValue::Vector(v.to_vec())
    }
}

/// One logical table: schema, sorted rows and attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableGroup {
    name: String,
    key_order: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Row>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
}

impl TableGroup {
    /// Empty group with a physical key ordering and column set.
    pub fn new(name: &str, key_order: &[&str], columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            key_order: key_order.iter().map(|s| s.to_string()).collect(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set (or replace) an attribute.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// Insert a row, keeping rows sorted by key.
    pub fn insert(&mut self, key: Vec<f64>, values: Vec<f64>) -> Result<()> {
        if key.len() != self.key_order.len() {
            return Err(DcdError::SchemaMismatch(format!(
                "group '{}' expects {} key level(s), got {}",
                self.name,
                self.key_order.len(),
                key.len()
            )));
        }
        if values.len() != self.columns.len() {
            return Err(DcdError::SchemaMismatch(format!(
                "group '{}' expects {} column(s), got {}",
                self.name,
                self.columns.len(),
                values.len()
            )));
        }
        let key = CompositeKey::new(key);
        if key.has_nan() {
            return Err(DcdError::SchemaMismatch(format!(
                "group '{}': NaN in key {}",
                self.name, key
            )));
        }

        // Producers usually append in key order
        if self.rows.last().is_none_or(|last| last.key < key) {
            self.rows.push(Row::new(key, values));
            return Ok(());
        }
        match self.rows.binary_search_by(|r| r.key.cmp(&key)) {
            Ok(_) => Err(DcdError::DuplicateKey(format!("{} in group '{}'", key, self.name))),
            Err(pos) => {
                self.rows.insert(pos, Row::new(key, values));
                Ok(())
            }
        }
    }

    /// Re-check invariants after deserialization.
    pub fn validate(&mut self) -> Result<()> {
        for row in &self.rows {
            if row.key.len() != self.key_order.len() || row.values.len() != self.columns.len() {
                return Err(DcdError::SchemaMismatch(format!(
                    "group '{}': row {} does not match schema",
                    self.name, row.key
                )));
            }
            if row.key.has_nan() {
                return Err(DcdError::SchemaMismatch(format!(
                    "group '{}': NaN in key {}",
                    self.name, row.key
                )));
            }
        }
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(w) = self.rows.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(DcdError::DuplicateKey(format!(
                "{} in group '{}'",
                w[0].key, self.name
            )));
        }
        Ok(())
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical key ordering.
    pub fn key_order(&self) -> &[String] {
        &self.key_order
    }

    /// Value columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows sorted by key.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Attribute by name, `None` when absent.
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }
}

/// Collection of named groups.
#[derive(Clone, Debug, Default)]
pub struct DataStore {
    groups: BTreeMap<String, Arc<TableGroup>>,
}

impl DataStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group (replacing one with the same name).
    pub fn insert_group(&mut self, group: TableGroup) {
        log::debug!(
            "store: group '{}' with {} rows, keys [{}]",
            group.name,
            group.rows.len(),
            group.key_order.join(", ")
        );
        self.groups.insert(group.name.clone(), Arc::new(group));
    }

    /// Builder-style [`insert_group`](Self::insert_group).
    pub fn with_group(mut self, group: TableGroup) -> Self {
        self.insert_group(group);
        self
    }

    /// Shared handle to a group.
    pub fn group(&self, name: &str) -> Option<Arc<TableGroup>> {
        self.groups.get(name).cloned()
    }

    /// Shared handle to a group, `Config` error when missing.
    pub fn require_group(&self, name: &str) -> Result<Arc<TableGroup>> {
        self.group(name).ok_or_else(|| {
            DcdError::Config(format!(
                "store has no group '{}' (available: {})",
                name,
                self.group_names().join(", ")
            ))
        })
    }

    /// Whether a group exists.
    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Group names in sorted order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    /// Iterate over groups.
    pub fn groups(&self) -> impl Iterator<Item = &TableGroup> {
        self.groups.values().map(|g| g.as_ref())
    }
}
