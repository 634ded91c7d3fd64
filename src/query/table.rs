//! Tabular query results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::key::CompositeKey;
use crate::error::{DcdError, Result};

/// One record: composite key plus one value per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Composite key in declared level order
    pub key: CompositeKey,
    /// Values in declared column order, `NaN` where missing
    #[serde(with = "missing_as_null")]
    pub values: Vec<f64>,
}

/// Missing values (`NaN`) travel as JSON `null`.
mod missing_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(values.iter().map(|v| (!v.is_nan()).then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        let raw: Vec<Option<f64>> = Vec::deserialize(d)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

impl Row {
    /// Create a row.
    pub fn new(key: CompositeKey, values: Vec<f64>) -> Self {
        Self { key, values }
    }
}

/// Table with a named composite index and named value columns.
///
/// Rows are kept sorted by key and keys are unique, so point lookups are
/// binary searches. Every selection returns the full column set of the
/// schema it was taken from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    key_names: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Empty table with the given index levels and columns.
    pub fn new<K, C>(key_names: K, columns: C) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            key_names: key_names.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build from unsorted rows, validating arity and key uniqueness.
    pub fn from_rows<K, C>(key_names: K, columns: C, mut rows: Vec<Row>) -> Result<Self>
    where
        K: IntoIterator,
        K::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let mut table = Self::new(key_names, columns);
        for row in &rows {
            table.check_row(row)?;
        }
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        if let Some(pair) = rows.windows(2).find(|w| w[0].key == w[1].key) {
            return Err(DcdError::DuplicateKey(pair[0].key.to_string()));
        }
        table.rows = rows;
        Ok(table)
    }

    /// Build from rows already sorted by unique key (selection output).
    pub(crate) fn from_sorted(key_names: Vec<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].key < w[1].key));
        Self {
            key_names,
            columns,
            rows,
        }
    }

    fn check_row(&self, row: &Row) -> Result<()> {
        if row.key.len() != self.key_names.len() {
            return Err(DcdError::SchemaMismatch(format!(
                "key {} has {} level(s), index [{}] expects {}",
                row.key,
                row.key.len(),
                self.key_names.join(", "),
                self.key_names.len()
            )));
        }
        if row.key.has_nan() {
            return Err(DcdError::SchemaMismatch(format!("key {} contains NaN", row.key)));
        }
        if row.values.len() != self.columns.len() {
            return Err(DcdError::SchemaMismatch(format!(
                "row {} has {} value(s), columns [{}] expect {}",
                row.key,
                row.values.len(),
                self.columns.join(", "),
                self.columns.len()
            )));
        }
        Ok(())
    }

    /// Insert one row, keeping the table sorted.
    pub fn insert(&mut self, key: Vec<f64>, values: Vec<f64>) -> Result<()> {
        let row = Row::new(CompositeKey::new(key), values);
        self.check_row(&row)?;
        match self.rows.binary_search_by(|r| r.key.cmp(&row.key)) {
            Ok(_) => Err(DcdError::DuplicateKey(row.key.to_string())),
            Err(pos) => {
                self.rows.insert(pos, row);
                Ok(())
            }
        }
    }

    // === Basic Properties ===

    /// Index level names in order.
    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    /// Value column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, sorted by key.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row iterator.
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // === Schema Lookup ===

    /// Position of an index level.
    pub fn key_position(&self, name: &str) -> Result<usize> {
        self.key_names
            .iter()
            .position(|k| k == name)
            .ok_or_else(|| {
                DcdError::SchemaMismatch(format!(
                    "no index level '{}' in [{}]",
                    name,
                    self.key_names.join(", ")
                ))
            })
    }

    /// Index of a value column.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == name).ok_or_else(|| {
            DcdError::SchemaMismatch(format!(
                "no column '{}' in [{}]",
                name,
                self.columns.join(", ")
            ))
        })
    }

    /// Whether a value column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    // === Access ===

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// All values of one index level, in row order.
    pub fn key_level(&self, name: &str) -> Result<Vec<f64>> {
        let pos = self.key_position(name)?;
        Ok(self.rows.iter().map(|r| r.key[pos]).collect())
    }

    /// Sorted distinct values of one index level.
    pub fn unique_key_values(&self, name: &str) -> Result<Vec<f64>> {
        let mut values = self.key_level(name)?;
        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values)
    }

    /// Row with exactly this key.
    pub fn get(&self, key: &[f64]) -> Option<&Row> {
        let key = CompositeKey::from(key);
        self.rows
            .binary_search_by(|r| r.key.cmp(&key))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Named column value of a row.
    pub fn value(&self, row: &Row, name: &str) -> Result<f64> {
        Ok(row.values[self.column_index(name)?])
    }

    // === Derived Tables ===

    /// Same rows, restricted to some columns (in the given order).
    pub fn select_columns(&self, names: &[&str]) -> Result<Table> {
        let indices = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| Row::new(r.key.clone(), indices.iter().map(|i| r.values[*i]).collect()))
            .collect();
        Ok(Table::from_sorted(
            self.key_names.clone(),
            names.iter().map(|n| n.to_string()).collect(),
            rows,
        ))
    }

    /// Same rows with some index levels removed.
    ///
    /// Fails with [`DcdError::DuplicateKey`] when the remaining levels no
    /// longer identify rows uniquely.
    pub fn drop_levels(&self, names: &[&str]) -> Result<Table> {
        let drop = names
            .iter()
            .map(|n| self.key_position(n))
            .collect::<Result<Vec<_>>>()?;
        let key_names = self
            .key_names
            .iter()
            .enumerate()
            .filter(|(i, _)| !drop.contains(i))
            .map(|(_, k)| k.clone())
            .collect::<Vec<_>>();
        let rows = self
            .rows
            .iter()
            .map(|r| Row::new(r.key.without_levels(&drop), r.values.clone()))
            .collect();
        Table::from_rows(key_names, self.columns.clone(), rows)
    }

    /// Rows satisfying a predicate.
    pub fn filter<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        let rows = self.rows.iter().filter(|r| keep(r)).cloned().collect();
        Table::from_sorted(self.key_names.clone(), self.columns.clone(), rows)
    }

    /// Values of `column` grouped by the given index levels.
    pub fn group_by_levels(
        &self,
        levels: &[&str],
        column: &str,
    ) -> Result<BTreeMap<CompositeKey, Vec<f64>>> {
        let positions = levels
            .iter()
            .map(|n| self.key_position(n))
            .collect::<Result<Vec<_>>>()?;
        let idx = self.column_index(column)?;

        let mut groups: BTreeMap<CompositeKey, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row.key.project(&positions))
                .or_default()
                .push(row.values[idx]);
        }
        Ok(groups)
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let mut t = Table::new(["simtime", "x", "y", "ID"], ["count", "err"]);
        t.insert(vec![2.0, 5.0, 0.0, 1.0], vec![3.0, 1.0]).unwrap();
        t.insert(vec![1.0, 0.0, 0.0, 1.0], vec![1.0, 0.0]).unwrap();
        t.insert(vec![1.0, 0.0, 0.0, 2.0], vec![2.0, -1.0]).unwrap();
        t
    }

    #[test]
    fn test_missing_values_serialize_as_null() {
        let row = Row::new(CompositeKey::new(vec![1.0, 2.0]), vec![f64::NAN, 0.5]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"key":[1.0,2.0],"values":[null,0.5]}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert!(back.values[0].is_nan());
        assert_eq!(back.values[1], 0.5);
    }

    #[test]
    fn test_rows_stay_sorted() {
        let t = table();
        let times = t.key_level("simtime").unwrap();
        assert_eq!(times, vec![1.0, 1.0, 2.0]);
        assert_eq!(t.unique_key_values("simtime").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_duplicate_and_arity_rejected() {
        let mut t = table();
        assert!(matches!(
            t.insert(vec![1.0, 0.0, 0.0, 1.0], vec![0.0, 0.0]),
            Err(DcdError::DuplicateKey(_))
        ));
        assert!(matches!(
            t.insert(vec![1.0, 0.0, 0.0], vec![0.0, 0.0]),
            Err(DcdError::SchemaMismatch(_))
        ));
        assert!(matches!(
            t.insert(vec![3.0, 0.0, 0.0, 1.0], vec![0.0]),
            Err(DcdError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let t = table();
        assert!(matches!(t.column("delay"), Err(DcdError::SchemaMismatch(_))));
        assert!(matches!(t.key_level("source"), Err(DcdError::SchemaMismatch(_))));
    }

    #[test]
    fn test_point_lookup() {
        let t = table();
        let row = t.get(&[1.0, 0.0, 0.0, 2.0]).unwrap();
        assert_eq!(t.value(row, "count").unwrap(), 2.0);
        assert!(t.get(&[9.0, 0.0, 0.0, 2.0]).is_none());
    }

    #[test]
    fn test_drop_levels() {
        let t = table();
        let dropped = t.drop_levels(&["simtime", "ID"]);
        assert!(matches!(dropped, Err(DcdError::DuplicateKey(_))));

        let single = t.filter(|r| r.key[0] == 1.0 && r.key[3] == 2.0);
        let xy = single.drop_levels(&["simtime", "ID"]).unwrap();
        assert_eq!(xy.key_names(), ["x", "y"]);
        assert_eq!(xy.len(), 1);
    }

    #[test]
    fn test_group_by_levels() {
        let t = table();
        let groups = t.group_by_levels(&["x", "y"], "count").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&CompositeKey::new(vec![0.0, 0.0])], vec![1.0, 2.0]);
    }

    #[test]
    fn test_select_columns() {
        let t = table().select_columns(&["err"]).unwrap();
        assert_eq!(t.columns(), ["err"]);
        assert_eq!(t.column("err").unwrap(), vec![0.0, -1.0, 1.0]);
    }
}
