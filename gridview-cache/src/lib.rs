//! Gridview Cache - Row Window and Binding Group Memoization
//!
//! Client-side memoization for a virtualized table viewer. The [`Cache`]
//! resolves load requests to per-table caches, each [`CacheTable`] answers
//! "what rows or groups do we already have", and the [`CachedLoader`]
//! issues fetches only for what is missing.

pub mod cache;
pub mod loader;

pub use cache::{
    BindingGroup, BindingGroups, Cache, CacheStats, CacheTable, CanonicalJson, RowsResult,
    StableStringify, TableKey,
};
pub use loader::CachedLoader;

// Re-export core types for convenience
pub use gridview_core::{
    BindingMatch, BindingTuple, CacheConfig, CellValue, DatabaseConfig, GridError, GridResult,
    LoadRequest, OrderBy, Row, RowFetcher, SortDirection,
};
