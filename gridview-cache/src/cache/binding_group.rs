//! Cached state for one combination of binding values.

use gridview_core::{BindingTuple, CellValue, Row};

/// Materialization of one group within a table cache.
///
/// A passive state holder: created lazily by its [`CacheTable`] the first
/// time a group's size or rows are recorded, and dropped only with the
/// table itself.
///
/// [`CacheTable`]: super::CacheTable
#[derive(Debug, Clone, PartialEq)]
pub struct BindingGroup {
    /// Total row count for this group if known, independent of how many
    /// rows are materialized.
    pub group_size: Option<u64>,
    /// True once the backend confirmed `loaded_rows` holds the whole group.
    pub loaded_all: bool,
    pub loaded_rows: Vec<Row>,
    binding_values: BindingTuple,
    key: String,
}

impl BindingGroup {
    pub(crate) fn new(binding_values: BindingTuple, key: String) -> Self {
        Self {
            group_size: None,
            loaded_all: false,
            loaded_rows: Vec::new(),
            binding_values,
            key,
        }
    }

    pub(crate) fn with_size(binding_values: BindingTuple, key: String, size: u64) -> Self {
        Self {
            group_size: Some(size),
            ..Self::new(binding_values, key)
        }
    }

    /// The requested tuple this group was registered under.
    pub fn binding_values(&self) -> &[CellValue] {
        &self.binding_values
    }

    /// Serialized form of `binding_values`, the group's key in its table.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_rows.len()
    }

    /// True when the group's rows can be served without fetching.
    pub fn is_materialized(&self) -> bool {
        self.loaded_all
    }
}
