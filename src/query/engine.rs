//! Generic indexed table with a declared key schema.
//!
//! Every map type is the same engine configured with a different
//! [`TableSchema`]: a group name, a fixed key ordering and a column set.
//! The ordering must match the physical layout of the attached store group
//! exactly, which is checked once at attach time. Names referenced by a
//! predicate are checked when the predicate is built.
//!
//! ## Execution
//!
//! Rows are sorted by composite key, so a contiguous window can be found by
//! binary search along the leading levels for as long as they are pinned by
//! equality. The first level that is not pinned may still narrow the window
//! with a range bound. Remaining conditions filter the window.
//!
//! ```text
//! keys [simtime, x, y, ID]
//! simtime == 2 AND ID == 3   -> window on simtime, filter on ID
//! x in [0, 10)               -> full scan, filter on x
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use super::condition::{Condition, Field, Operation, Predicate};
use super::table::{Row, Table};
use crate::error::{DcdError, Result};
use crate::store::{AttributeValue, DataStore, TableGroup};

/// Declared schema of one map type.
pub trait TableSchema {
    /// Store group name.
    const GROUP: &'static str;
    /// Key level names in physical order.
    const KEY_ORDER: &'static [&'static str];
    /// Value column names in physical order.
    const COLUMNS: &'static [&'static str];
    /// Level used for [`IndexedTable::time_interval`].
    const DEFAULT_KEY: &'static str;

    /// Key levels and columns, comma separated.
    fn declared() -> String {
        Self::KEY_ORDER
            .iter()
            .chain(Self::COLUMNS.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Indexed table bound (or not yet bound) to a store group.
pub struct IndexedTable<S: TableSchema> {
    group: Option<Arc<TableGroup>>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: TableSchema> Clone for IndexedTable<S> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: TableSchema> std::fmt::Debug for IndexedTable<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedTable")
            .field("group", &S::GROUP)
            .field("attached", &self.group.is_some())
            .field("rows", &self.len())
            .finish()
    }
}

impl<S: TableSchema> Default for IndexedTable<S> {
    fn default() -> Self {
        Self::unattached()
    }
}

impl<S: TableSchema> IndexedTable<S> {
    /// Engine without a backing group. Selections fail until attached.
    pub fn unattached() -> Self {
        Self {
            group: None,
            _schema: PhantomData,
        }
    }

    /// Bind to a group, checking its physical layout against the schema.
    pub fn attach(group: Arc<TableGroup>) -> Result<Self> {
        if group.key_order() != S::KEY_ORDER {
            return Err(DcdError::Config(format!(
                "group '{}' has key ordering [{}], schema '{}' declares [{}]",
                group.name(),
                group.key_order().join(", "),
                S::GROUP,
                S::KEY_ORDER.join(", ")
            )));
        }
        if group.columns() != S::COLUMNS {
            return Err(DcdError::Config(format!(
                "group '{}' has columns [{}], schema '{}' declares [{}]",
                group.name(),
                group.columns().join(", "),
                S::GROUP,
                S::COLUMNS.join(", ")
            )));
        }
        Ok(Self {
            group: Some(group),
            _schema: PhantomData,
        })
    }

    /// Bind to the schema's default group in a store.
    pub fn from_store(store: &DataStore) -> Result<Self> {
        Self::from_store_named(store, S::GROUP)
    }

    /// Bind to a differently named group in a store.
    pub fn from_store_named(store: &DataStore, name: &str) -> Result<Self> {
        Self::attach(store.require_group(name)?)
    }

    /// Whether a group is attached.
    pub fn is_attached(&self) -> bool {
        self.group.is_some()
    }

    /// Attached group.
    pub fn group(&self) -> Result<&Arc<TableGroup>> {
        self.group.as_ref().ok_or_else(|| {
            DcdError::Config(format!("no store group attached for '{}'", S::GROUP))
        })
    }

    /// Number of rows (0 when unattached).
    pub fn len(&self) -> usize {
        self.group.as_ref().map_or(0, |g| g.len())
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a name against the key ordering, then the columns.
    pub fn resolve(name: &str) -> Result<Field> {
        if let Some(pos) = S::KEY_ORDER.iter().position(|k| *k == name) {
            return Ok(Field::Key(pos));
        }
        if let Some(idx) = S::COLUMNS.iter().position(|c| *c == name) {
            return Ok(Field::Column(idx));
        }
        Err(DcdError::UnknownKey {
            group: S::GROUP.to_string(),
            key: name.to_string(),
            declared: S::declared(),
        })
    }

    /// `key <op> value`.
    pub fn build_exact(key: &str, value: f64, op: Operation) -> Result<Condition> {
        let field = Self::resolve(key)?;
        Ok(Condition::new(
            S::GROUP,
            key,
            field,
            Predicate::Compare { op, value },
        ))
    }

    /// Half-open `min <= key < max`.
    ///
    /// To include `max`, pass a bound one step beyond it.
    pub fn build_range(key: &str, min: f64, max: f64) -> Result<Condition> {
        let field = Self::resolve(key)?;
        Ok(Condition::new(S::GROUP, key, field, Predicate::Range { min, max }))
    }

    /// All rows matching every condition, with the full column set.
    pub fn select_where(&self, conditions: &[Condition]) -> Result<Table> {
        let group = self.group()?;
        if let Some(foreign) = conditions.iter().find(|c| c.group() != S::GROUP) {
            return Err(DcdError::SchemaMismatch(format!(
                "condition '{}' was built for '{}', not '{}'",
                foreign,
                foreign.group(),
                S::GROUP
            )));
        }

        let rows = group.rows();
        let (lo, hi) = narrow_window(rows, conditions);
        let selected: Vec<Row> = rows[lo..hi]
            .iter()
            .filter(|row| conditions.iter().all(|c| c.matches(row)))
            .cloned()
            .collect();

        log::debug!(
            "select {} [{}]: scanned {} of {} rows, matched {}",
            S::GROUP,
            conditions
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" AND "),
            hi - lo,
            rows.len(),
            selected.len()
        );

        Ok(Table::from_sorted(
            group.key_order().to_vec(),
            group.columns().to_vec(),
            selected,
        ))
    }

    /// Whole table.
    pub fn select_all(&self) -> Result<Table> {
        self.select_where(&[])
    }

    /// Scalar attribute stored with the group.
    pub fn get_attribute(&self, name: &str) -> Result<AttributeValue> {
        self.group()?
            .attribute(name)
            .cloned()
            .ok_or_else(|| DcdError::AttributeNotFound {
                group: S::GROUP.to_string(),
                name: name.to_string(),
            })
    }

    /// `(min, max)` of the default key level, `None` for an empty table.
    pub fn time_interval(&self) -> Result<Option<(f64, f64)>> {
        let group = self.group()?;
        let Field::Key(pos) = Self::resolve(S::DEFAULT_KEY)? else {
            return Err(DcdError::SchemaMismatch(format!(
                "default key '{}' of '{}' is not a key level",
                S::DEFAULT_KEY,
                S::GROUP
            )));
        };

        let interval = group.rows().iter().map(|r| r.key[pos]).fold(None, |acc, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
            })
        });
        Ok(interval)
    }
}

/// Contiguous row window that can contain matches.
fn narrow_window(rows: &[Row], conditions: &[Condition]) -> (usize, usize) {
    let (mut lo, mut hi) = (0, rows.len());
    let levels = rows.first().map_or(0, |r| r.key.len());

    for level in 0..levels {
        let pinned = conditions.iter().find_map(|c| match (c.field(), c.predicate()) {
            (Field::Key(pos), Predicate::Compare { op: Operation::Eq, value }) if pos == level => {
                Some(value)
            }
            _ => None,
        });

        let window = &rows[lo..hi];
        if let Some(v) = pinned {
            let start = window.partition_point(|r| r.key[level] < v);
            let end = window.partition_point(|r| r.key[level] <= v);
            hi = lo + end;
            lo += start;
            continue;
        }

        // First free level: apply any lower/upper bound, then stop
        for c in conditions.iter().filter(|c| c.field() == Field::Key(level)) {
            let window = &rows[lo..hi];
            let (start, end) = match c.predicate() {
                Predicate::Range { min, max } => (
                    window.partition_point(|r| r.key[level] < min),
                    window.partition_point(|r| r.key[level] < max),
                ),
                Predicate::Compare { op, value } => match op {
                    Operation::Lt => (0, window.partition_point(|r| r.key[level] < value)),
                    Operation::Le => (0, window.partition_point(|r| r.key[level] <= value)),
                    Operation::Gt => (window.partition_point(|r| r.key[level] <= value), window.len()),
                    Operation::Ge => (window.partition_point(|r| r.key[level] < value), window.len()),
                    Operation::Eq => (0, window.len()),
                },
            };
            let end = end.max(start);
            hi = lo + end;
            lo += start;
        }
        break;
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestSchema;

    impl TableSchema for TestSchema {
        const GROUP: &'static str = "test";
        const KEY_ORDER: &'static [&'static str] = &["simtime", "x", "ID"];
        const COLUMNS: &'static [&'static str] = &["count"];
        const DEFAULT_KEY: &'static str = "simtime";
    }

    type Engine = IndexedTable<TestSchema>;

    fn engine() -> Engine {
        let mut g = TableGroup::new("test", &["simtime", "x", "ID"], &["count"]);
        for t in 0..4 {
            for x in 0..3 {
                for id in 1..3 {
                    g.insert(
                        vec![t as f64, x as f64, id as f64],
                        vec![(t * 10 + x + id) as f64],
                    )
                    .unwrap();
                }
            }
        }
        Engine::attach(Arc::new(g)).unwrap()
    }

    #[test]
    fn test_unattached_is_config_error() {
        let e = Engine::unattached();
        let err = e.select_all().unwrap_err();
        assert!(err.is_configuration());
        assert!(e.get_attribute("epsg").unwrap_err().is_configuration());
    }

    #[test]
    fn test_unknown_key_rejected_before_build() {
        let err = Engine::build_exact("source", 1.0, Operation::Eq).unwrap_err();
        assert!(matches!(err, DcdError::UnknownKey { .. }));
    }

    #[test]
    fn test_attach_checks_layout() {
        let g = TableGroup::new("test", &["x", "simtime", "ID"], &["count"]);
        assert!(Engine::attach(Arc::new(g)).unwrap_err().is_configuration());
        let g = TableGroup::new("test", &["simtime", "x", "ID"], &["count", "err"]);
        assert!(Engine::attach(Arc::new(g)).unwrap_err().is_configuration());
    }

    #[test]
    fn test_leading_window_matches_full_scan() {
        let e = engine();
        let conds = [
            Engine::build_exact("simtime", 2.0, Operation::Eq).unwrap(),
            Engine::build_exact("x", 1.0, Operation::Eq).unwrap(),
        ];
        let t = e.select_where(&conds).unwrap();
        assert_eq!(t.len(), 2);
        assert!(t.iter().all(|r| r.key[0] == 2.0 && r.key[1] == 1.0));

        let scanned: Vec<&Row> = e
            .group()
            .unwrap()
            .rows()
            .iter()
            .filter(|r| conds.iter().all(|c| c.matches(r)))
            .collect();
        assert_eq!(scanned.len(), t.len());
    }

    #[test]
    fn test_range_on_leading_level() {
        let e = engine();
        let t = e
            .select_where(&[Engine::build_range("simtime", 1.0, 3.0).unwrap()])
            .unwrap();
        assert_eq!(t.unique_key_values("simtime").unwrap(), vec![1.0, 2.0]);

        let t = e
            .select_where(&[Engine::build_exact("simtime", 2.0, Operation::Gt).unwrap()])
            .unwrap();
        assert_eq!(t.unique_key_values("simtime").unwrap(), vec![3.0]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let e = engine();
        let t = e
            .select_where(&[Engine::build_range("simtime", 3.0, 1.0).unwrap()])
            .unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_column_condition() {
        let e = engine();
        let t = e
            .select_where(&[Engine::build_range("count", 30.0, 32.0).unwrap()])
            .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.columns(), ["count"]);
    }

    #[test]
    fn test_time_interval() {
        assert_eq!(engine().time_interval().unwrap(), Some((0.0, 3.0)));
    }
}
