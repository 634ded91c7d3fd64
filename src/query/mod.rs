//! Indexed selection over composite-key tables.
//!
//! ## Key Components
//!
//! - [`TableSchema`]: Group name, key ordering and column set of one map type
//! - [`IndexedTable`]: Engine bound to a store group; builds and runs predicates
//! - [`Condition`]: Opaque predicate fragment (`build_exact` / `build_range`)
//! - [`Table`]: Sorted result table with the composite key as its index
//!
//! Conditions passed together are combined with AND. Range conditions are
//! half-open: `min <= key < max`.

mod condition;
mod engine;
mod key;
mod table;

pub use condition::{Condition, Field, Operation, Predicate};
pub use engine::{IndexedTable, TableSchema};
pub use key::CompositeKey;
pub use table::{Row, Table};
