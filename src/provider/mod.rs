//! Per-map-type providers over the generic indexed table.
//!
//! Each provider fixes a [`TableSchema`](crate::query::TableSchema) and adds
//! the per-key selection vocabulary on top of [`IndexedTable`]:
//!
//! | Provider | Group | Keys |
//! |----------|-------|------|
//! | [`DcdMapCount`] | `count_map` | `simtime, x, y, ID` |
//! | [`DcdMapProvider`] | `dcd_map` | `ID, simtime, x, y` |
//! | [`DcdMapRawProvider`] | `dcd_map_all` | `ID, simtime, x, y, source` |
//! | [`GlobalMapProvider`] | `global_map` | `simtime, x, y` |
//! | [`PositionProvider`] | `position` | `simtime, node_id` |
//!
//! ```rust,ignore
//! let count = DcdMapCount::from_store(&store)?;
//! let frame = count.select_simtime_and_node_id_exact(2.0, 3, Operation::Eq)?;
//! let errors = count.select_err_range(-1.0, 1.0)?;
//! ```

/// Provider struct wrapping an [`IndexedTable`](crate::query::IndexedTable)
/// plus `select_<key>_exact` / `select_<key>_range` for each listed name.
macro_rules! indexed_provider {
    (
        $(#[$meta:meta])*
        $name:ident => $schema:ty {
            $($exact:ident, $range:ident => $key:literal;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        pub struct $name {
            table: $crate::query::IndexedTable<$schema>,
        }

        impl $name {
            /// Provider without a backing group.
            pub fn unattached() -> Self {
                Self::default()
            }

            /// Bind to a store group, validating its layout.
            pub fn attach(
                group: ::std::sync::Arc<$crate::store::TableGroup>,
            ) -> $crate::error::Result<Self> {
                Ok(Self {
                    table: $crate::query::IndexedTable::attach(group)?,
                })
            }

            /// Bind to the default group of a store.
            pub fn from_store(store: &$crate::store::DataStore) -> $crate::error::Result<Self> {
                Ok(Self {
                    table: $crate::query::IndexedTable::from_store(store)?,
                })
            }

            /// Bind to a differently named group of a store.
            pub fn from_store_named(
                store: &$crate::store::DataStore,
                name: &str,
            ) -> $crate::error::Result<Self> {
                Ok(Self {
                    table: $crate::query::IndexedTable::from_store_named(store, name)?,
                })
            }

            /// Underlying engine.
            pub fn table(&self) -> &$crate::query::IndexedTable<$schema> {
                &self.table
            }

            /// Validated `key <op> value` condition.
            pub fn build_exact(
                key: &str,
                value: f64,
                op: $crate::query::Operation,
            ) -> $crate::error::Result<$crate::query::Condition> {
                $crate::query::IndexedTable::<$schema>::build_exact(key, value, op)
            }

            /// Validated half-open `min <= key < max` condition.
            pub fn build_range(
                key: &str,
                min: f64,
                max: f64,
            ) -> $crate::error::Result<$crate::query::Condition> {
                $crate::query::IndexedTable::<$schema>::build_range(key, min, max)
            }

            /// Rows matching all conditions.
            pub fn select_where(
                &self,
                conditions: &[$crate::query::Condition],
            ) -> $crate::error::Result<$crate::query::Table> {
                self.table.select_where(conditions)
            }

            /// Whole table.
            pub fn select_all(&self) -> $crate::error::Result<$crate::query::Table> {
                self.table.select_all()
            }

            /// Scalar group attribute.
            pub fn get_attribute(
                &self,
                name: &str,
            ) -> $crate::error::Result<$crate::store::AttributeValue> {
                self.table.get_attribute(name)
            }

            /// `(min, max)` of the default key level.
            pub fn time_interval(&self) -> $crate::error::Result<Option<(f64, f64)>> {
                self.table.time_interval()
            }

            /// Number of rows.
            pub fn len(&self) -> usize {
                self.table.len()
            }

            /// Whether there are no rows.
            pub fn is_empty(&self) -> bool {
                self.table.is_empty()
            }

            $(
                #[doc = concat!("Rows where `", $key, " <op> value`.")]
                pub fn $exact(
                    &self,
                    value: f64,
                    op: $crate::query::Operation,
                ) -> $crate::error::Result<$crate::query::Table> {
                    self.select_where(&[Self::build_exact($key, value, op)?])
                }

                #[doc = concat!("Rows where `min <= ", $key, " < max`.")]
                pub fn $range(
                    &self,
                    min: f64,
                    max: f64,
                ) -> $crate::error::Result<$crate::query::Table> {
                    self.select_where(&[Self::build_range($key, min, max)?])
                }
            )*
        }
    };
}

pub(crate) use indexed_provider;

mod count;
pub mod crs;
mod density;
pub mod geo;
mod global;
mod position;
mod raw;

pub use count::{CountMapKey, CountMapSchema, DcdMapCount};
pub use crs::Crs;
pub use density::{DcdMapKey, DcdMapProvider, DcdMapSchema};
pub use geo::{GeoCell, GeoFrame, GeoTable};
pub use global::{GlobalMapProvider, GlobalMapSchema};
pub use position::{PositionProvider, PositionSchema};
pub use raw::{DcdMapRawProvider, DcdMapRawSchema};
