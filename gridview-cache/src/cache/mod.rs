//! In-memory memoization of table queries.
//!
//! # Ownership
//!
//! The [`Cache`] exclusively owns every [`CacheTable`], and each table
//! exclusively owns its [`BindingGroup`]s. Nothing is evicted: entries live
//! as long as the owning `Cache`. Consumers that need a fresh view (schema
//! change, explicit refresh) construct a new `Cache`.
//!
//! # Keys
//!
//! A table is identified by a [`TableKey`] over schema, table name, binding
//! columns, database config and ordering. Requested data columns and
//! binding values are deliberately excluded so that different column
//! subsets and different groups accumulate into one table cache. Keys are
//! rendered to strings through a [`StableStringify`] implementation.
//!
//! # Staleness
//!
//! A table cached with fewer data columns than a later request asks for is
//! dropped and rebuilt instead of being extended in place.
//!
//! # Example
//!
//! ```ignore
//! let mut cache = Cache::new();
//! let table = cache.get_table_cache(&request);
//! let result = table.get_rows_result(&request);
//! if result.incomplete {
//!     let rows = provider.fetch(&request, table.loaded_count()).await?;
//!     table.append_rows(rows);
//! }
//! ```

pub mod binding_group;
pub mod registry;
pub mod stable_key;
pub mod stats;
pub mod table;
pub mod table_key;

pub use binding_group::BindingGroup;
pub use registry::Cache;
pub use stable_key::{CanonicalJson, StableStringify};
pub use stats::CacheStats;
pub use table::{BindingGroups, CacheTable, RowsResult};
pub use table_key::TableKey;
