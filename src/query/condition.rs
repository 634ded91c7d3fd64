//! Predicate fragments built against a declared schema.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::table::Row;
use crate::error::DcdError;

/// Comparison operator for exact-match conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// `==`
    #[default]
    Eq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Operation {
    /// Operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Eq => "==",
            Operation::Lt => "<",
            Operation::Le => "<=",
            Operation::Gt => ">",
            Operation::Ge => ">=",
        }
    }

    /// Evaluate `lhs <op> rhs`.
    #[inline]
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operation::Eq => lhs == rhs,
            Operation::Lt => lhs < rhs,
            Operation::Le => lhs <= rhs,
            Operation::Gt => lhs > rhs,
            Operation::Ge => lhs >= rhs,
        }
    }
}

impl FromStr for Operation {
    type Err = DcdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" | "eq" => Ok(Operation::Eq),
            "<" | "lt" => Ok(Operation::Lt),
            "<=" | "le" => Ok(Operation::Le),
            ">" | "gt" => Ok(Operation::Gt),
            ">=" | "ge" => Ok(Operation::Ge),
            other => Err(DcdError::SchemaMismatch(format!("unknown operation '{other}'"))),
        }
    }
}

/// Resolved position of a referenced name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Level position within the composite key
    Key(usize),
    /// Index within the value columns
    Column(usize),
}

/// Test applied to a field value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        /// Operator
        op: Operation,
        /// Right-hand side
        value: f64,
    },
    /// Half-open `min <= field < max`
    Range {
        /// Inclusive lower bound
        min: f64,
        /// Exclusive upper bound
        max: f64,
    },
}

impl Predicate {
    /// Evaluate the predicate for one value.
    #[inline]
    pub fn matches(&self, v: f64) -> bool {
        match *self {
            Predicate::Compare { op, value } => op.compare(v, value),
            Predicate::Range { min, max } => v >= min && v < max,
        }
    }
}

/// Opaque predicate fragment, bound to the schema it was built for.
///
/// Built through [`IndexedTable::build_exact`](super::IndexedTable::build_exact)
/// and [`IndexedTable::build_range`](super::IndexedTable::build_range), which
/// validate the referenced name against the declared key ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    group: &'static str,
    name: String,
    field: Field,
    predicate: Predicate,
}

impl Condition {
    pub(crate) fn new(group: &'static str, name: &str, field: Field, predicate: Predicate) -> Self {
        Self {
            group,
            name: name.to_string(),
            field,
            predicate,
        }
    }

    /// Store group whose schema this condition was resolved against.
    pub fn group(&self) -> &'static str {
        self.group
    }

    /// Referenced key or column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved field position.
    pub fn field(&self) -> Field {
        self.field
    }

    /// Predicate applied to the field.
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Whether the condition holds for a row.
    pub fn matches(&self, row: &Row) -> bool {
        let value = match self.field {
            Field::Key(pos) => row.key.get(pos),
            Field::Column(idx) => row.values.get(idx).copied(),
        };
        value.is_some_and(|v| self.predicate.matches(v))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.predicate {
            Predicate::Compare { op, value } => {
                write!(f, "{} {} {}", self.name, op.symbol(), value)
            }
            Predicate::Range { min, max } => write!(f, "{} <= {} < {}", min, self.name, max),
        }
    }
}
