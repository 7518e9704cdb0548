//! Cached materialization of one logical table query.

use std::collections::HashMap;
use std::sync::Arc;

use gridview_core::{tuple_to_json, BindingMatch, BindingTuple, CellValue, LoadRequest, Row};
use tracing::warn;

use super::binding_group::BindingGroup;
use super::stable_key::StableStringify;

/// Rows served from a table's row window.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsResult {
    /// The first `top_count` cached rows (fewer if fewer are cached).
    pub rows: Vec<Row>,
    /// False only when `rows` is guaranteed to hold every row of the table.
    pub incomplete: bool,
}

/// Partition of a grouped request into cached groups and tuples still to fetch.
#[derive(Debug)]
pub struct BindingGroups<'a> {
    pub cached: Vec<&'a BindingGroup>,
    pub uncached: Vec<BindingTuple>,
}

/// Cache for one table query: an ungrouped row window plus binding groups.
///
/// The identity fields are fixed at creation. `loaded_rows` and
/// `loaded_all` are public so the fetch layer can record new data
/// directly; group data goes through [`store_group_size`] and
/// [`store_group_rows`] so keys stay consistent.
///
/// [`store_group_size`]: CacheTable::store_group_size
/// [`store_group_rows`]: CacheTable::store_group_rows
#[derive(Debug)]
pub struct CacheTable {
    schema_name: Option<String>,
    pure_name: String,
    binding_columns: Option<Vec<String>>,
    data_columns: Vec<String>,
    /// True once the backend confirmed no rows exist beyond `loaded_rows`.
    pub loaded_all: bool,
    pub loaded_rows: Vec<Row>,
    binding_groups: HashMap<String, BindingGroup>,
    serializer: Arc<dyn StableStringify>,
    binding_match: BindingMatch,
}

impl CacheTable {
    pub(crate) fn new(
        request: &LoadRequest,
        serializer: Arc<dyn StableStringify>,
        binding_match: BindingMatch,
    ) -> Self {
        Self {
            schema_name: request.schema_name.clone(),
            pure_name: request.pure_name.clone(),
            binding_columns: request.binding_columns.clone(),
            data_columns: request.data_columns.clone(),
            loaded_all: false,
            loaded_rows: Vec::new(),
            binding_groups: HashMap::new(),
            serializer,
            binding_match,
        }
    }

    pub fn schema_name(&self) -> Option<&str> {
        self.schema_name.as_deref()
    }

    pub fn pure_name(&self) -> &str {
        &self.pure_name
    }

    pub fn binding_columns(&self) -> &[String] {
        self.binding_columns.as_deref().unwrap_or(&[])
    }

    /// Columns this cache holds data for.
    pub fn data_columns(&self) -> &[String] {
        &self.data_columns
    }

    /// Requested columns this cache does not hold, in request order.
    pub fn missing_columns<'r>(&self, requested: &'r [String]) -> Vec<&'r str> {
        requested
            .iter()
            .filter(|column| !self.data_columns.contains(column))
            .map(String::as_str)
            .collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_rows.len()
    }

    /// Serve the first `request.top_count` cached rows.
    ///
    /// `incomplete` is true when more rows than `top_count` are cached or
    /// when the backend has not confirmed completeness. Ungrouped requests only.
    pub fn get_rows_result(&self, request: &LoadRequest) -> RowsResult {
        let end = request.top_count.min(self.loaded_rows.len());
        RowsResult {
            rows: self.loaded_rows[..end].to_vec(),
            incomplete: request.top_count < self.loaded_count() || !self.loaded_all,
        }
    }

    /// Record a newly fetched page at the end of the row window.
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.loaded_rows.extend(rows);
    }

    /// Record that the backend has no rows beyond the row window.
    pub fn mark_loaded_all(&mut self) {
        self.loaded_all = true;
    }

    /// Split `request.binding_values` into groups already held and tuples
    /// not yet registered. Both outputs keep request order. Presence of a
    /// group is all that counts here; a group holding only a size is cached.
    pub fn get_binding_groups(&self, request: &LoadRequest) -> BindingGroups<'_> {
        let mut cached = Vec::new();
        let mut uncached = Vec::new();
        for tuple in request.binding_values() {
            match self.binding_groups.get(&self.binding_key(tuple)) {
                Some(group) => cached.push(group),
                None => uncached.push(tuple.clone()),
            }
        }
        BindingGroups { cached, uncached }
    }

    /// Look up the group registered for a requested tuple.
    pub fn binding_group(&self, binding_values: &[CellValue]) -> Option<&BindingGroup> {
        self.binding_groups.get(&self.binding_key(binding_values))
    }

    pub fn binding_group_mut(&mut self, binding_values: &[CellValue]) -> Option<&mut BindingGroup> {
        let key = self.binding_key(binding_values);
        self.binding_groups.get_mut(&key)
    }

    /// All registered groups, in no particular order.
    pub fn binding_groups(&self) -> impl Iterator<Item = &BindingGroup> {
        self.binding_groups.values()
    }

    pub fn group_count(&self) -> usize {
        self.binding_groups.len()
    }

    /// Register the row count of one group.
    ///
    /// `binding_values` is the tuple observed in the backend response. It is
    /// matched element-wise against `request.binding_values` and the group is
    /// keyed by the requested tuple, so later requests find it. Any previous
    /// entry for that key is replaced, rows included. Returns false, storing
    /// nothing, when no requested tuple matches.
    pub fn store_group_size(
        &mut self,
        request: &LoadRequest,
        binding_values: &[CellValue],
        count: u64,
    ) -> bool {
        let Some(original) = self.find_requested(request, binding_values) else {
            warn!(
                table = %self.pure_name,
                observed = ?binding_values,
                "Group size does not match any requested binding values"
            );
            return false;
        };
        let original = original.clone();
        let key = self.binding_key(&original);
        self.binding_groups
            .insert(key.clone(), BindingGroup::with_size(original, key, count));
        true
    }

    /// Register fetched child rows with their groups.
    ///
    /// Each row is assigned by its values in the table's binding columns,
    /// matched against `request.binding_values` like [`store_group_size`].
    /// Every requested group is created if absent (so a group with no rows
    /// is recorded as empty) and keeps its known size. With `loaded_all`
    /// every requested group is flagged complete. Rows matching no requested
    /// tuple are dropped. Returns the number of rows stored.
    ///
    /// [`store_group_size`]: CacheTable::store_group_size
    pub fn store_group_rows(
        &mut self,
        request: &LoadRequest,
        rows: impl IntoIterator<Item = Row>,
        loaded_all: bool,
    ) -> usize {
        let requested: Vec<(String, &BindingTuple)> = request
            .binding_values()
            .iter()
            .map(|tuple| (self.binding_key(tuple), tuple))
            .collect();

        for (key, tuple) in &requested {
            self.binding_groups
                .entry(key.clone())
                .or_insert_with(|| BindingGroup::new((*tuple).clone(), key.clone()));
        }

        let columns = self.binding_columns().to_vec();
        let mut stored = 0;
        let mut dropped = 0;
        for row in rows {
            let observed = row.binding_tuple(&columns);
            let target = requested
                .iter()
                .find(|(_, tuple)| self.binding_match.tuples_match(tuple, &observed));
            match target.and_then(|(key, _)| self.binding_groups.get_mut(key)) {
                Some(group) => {
                    group.loaded_rows.push(row);
                    stored += 1;
                }
                None => dropped += 1,
            }
        }

        if loaded_all {
            for (key, _) in &requested {
                if let Some(group) = self.binding_groups.get_mut(key) {
                    group.loaded_all = true;
                }
            }
        }

        if dropped > 0 {
            warn!(
                table = %self.pure_name,
                dropped,
                "Rows do not match any requested binding values"
            );
        }
        stored
    }

    fn find_requested<'r>(
        &self,
        request: &'r LoadRequest,
        observed: &[CellValue],
    ) -> Option<&'r BindingTuple> {
        request
            .binding_values()
            .iter()
            .find(|tuple| self.binding_match.tuples_match(tuple, observed))
    }

    fn binding_key(&self, binding_values: &[CellValue]) -> String {
        self.serializer.stringify(&tuple_to_json(binding_values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CanonicalJson;
    use gridview_core::DatabaseConfig;

    fn table_for(request: &LoadRequest) -> CacheTable {
        CacheTable::new(request, Arc::new(CanonicalJson), BindingMatch::Strict)
    }

    fn rows(n: i64) -> Vec<Row> {
        (0..n).map(|i| Row::new().with("id", i)).collect()
    }

    fn ungrouped(top_count: usize) -> LoadRequest {
        LoadRequest::new(DatabaseConfig::new("con", "db"), "items")
            .with_data_columns(["id"])
            .with_top_count(top_count)
    }

    fn grouped(values: Vec<BindingTuple>) -> LoadRequest {
        LoadRequest::new(DatabaseConfig::new("con", "db"), "order_lines")
            .with_data_columns(["id", "order_id"])
            .with_binding_columns(["order_id"])
            .with_binding_values(values)
            .with_top_count(100)
    }

    fn t(v: i64) -> BindingTuple {
        vec![CellValue::from(v)]
    }

    #[test]
    fn test_new_table_is_empty() {
        let req = ungrouped(10);
        let table = table_for(&req);
        assert_eq!(table.pure_name(), "items");
        assert_eq!(table.loaded_count(), 0);
        assert!(!table.loaded_all);
        assert_eq!(table.group_count(), 0);
    }

    #[test]
    fn test_rows_result_complete_table() {
        let mut table = table_for(&ungrouped(0));
        table.append_rows(rows(5));
        table.mark_loaded_all();

        let partial = table.get_rows_result(&ungrouped(3));
        assert_eq!(partial.rows, rows(3));
        assert!(partial.incomplete);

        let all = table.get_rows_result(&ungrouped(10));
        assert_eq!(all.rows, rows(5));
        assert!(!all.incomplete);

        let exact = table.get_rows_result(&ungrouped(5));
        assert_eq!(exact.rows.len(), 5);
        assert!(!exact.incomplete);
    }

    #[test]
    fn test_rows_result_unconfirmed_table() {
        let mut table = table_for(&ungrouped(0));
        table.append_rows(rows(5));

        assert!(table.get_rows_result(&ungrouped(3)).incomplete);
        let exact = table.get_rows_result(&ungrouped(5));
        assert_eq!(exact.rows.len(), 5);
        assert!(exact.incomplete);
    }

    #[test]
    fn test_rows_result_zero_top_count() {
        let mut table = table_for(&ungrouped(0));
        table.append_rows(rows(2));
        table.mark_loaded_all();
        let result = table.get_rows_result(&ungrouped(0));
        assert!(result.rows.is_empty());
        assert!(result.incomplete);
    }

    #[test]
    fn test_missing_columns() {
        let table = table_for(&ungrouped(0));
        let requested = vec!["id".to_string(), "name".to_string()];
        assert_eq!(table.missing_columns(&requested), vec!["name"]);
        assert!(table.missing_columns(&["id".to_string()]).is_empty());
    }

    #[test]
    fn test_binding_groups_partition_preserves_order() {
        let req = grouped(vec![t(1), t(2), t(3)]);
        let mut table = table_for(&req);
        assert!(table.store_group_size(&req, &t(2), 4));

        let groups = table.get_binding_groups(&req);
        assert_eq!(groups.cached.len(), 1);
        assert_eq!(groups.cached[0].binding_values(), t(2).as_slice());
        assert_eq!(groups.uncached, vec![t(1), t(3)]);
    }

    #[test]
    fn test_get_binding_groups_does_not_mutate() {
        let req = grouped(vec![t(1), t(2)]);
        let table = table_for(&req);
        let groups = table.get_binding_groups(&req);
        assert!(groups.cached.is_empty());
        assert_eq!(groups.uncached.len(), 2);
        assert_eq!(table.group_count(), 0);
    }

    #[test]
    fn test_store_group_size_round_trip() {
        let req = grouped(vec![t(1), t(2), t(3)]);
        let mut table = table_for(&req);
        table.store_group_size(&req, &t(2), 17);

        let groups = table.get_binding_groups(&req);
        assert_eq!(groups.cached.len(), 1);
        assert_eq!(groups.cached[0].group_size, Some(17));
        assert!(!groups.cached[0].loaded_all);
    }

    #[test]
    fn test_store_group_size_unmatched_is_noop() {
        let req = grouped(vec![t(1)]);
        let mut table = table_for(&req);
        assert!(!table.store_group_size(&req, &t(9), 3));
        assert_eq!(table.group_count(), 0);
    }

    #[test]
    fn test_store_group_size_keys_by_requested_tuple() {
        let req = grouped(vec![vec![CellValue::from(2)]]);
        let mut table =
            CacheTable::new(&req, Arc::new(CanonicalJson), BindingMatch::Loose);

        // Backend echoed the key back as text
        assert!(table.store_group_size(&req, &[CellValue::from("2")], 8));
        let group = table.binding_group(&t(2)).expect("group keyed by requested tuple");
        assert_eq!(group.group_size, Some(8));
        assert!(table.binding_group(&[CellValue::from("2")]).is_none());
    }

    #[test]
    fn test_store_group_size_strict_rejects_coerced_match() {
        let req = grouped(vec![t(2)]);
        let mut table = table_for(&req);
        assert!(!table.store_group_size(&req, &[CellValue::from("2")], 8));
    }

    #[test]
    fn test_store_group_size_large_ids_hit_own_group() {
        let low = t(9_007_199_254_740_992);
        let high = t(9_007_199_254_740_993);
        let req = grouped(vec![low.clone(), high.clone()]);
        let mut table = table_for(&req);

        assert!(table.store_group_size(&req, &high, 42));
        assert_eq!(table.binding_group(&high).and_then(|g| g.group_size), Some(42));
        assert!(table.binding_group(&low).is_none());
    }

    #[test]
    fn test_store_group_size_overwrites_rows() {
        let req = grouped(vec![t(1)]);
        let mut table = table_for(&req);
        table.store_group_rows(&req, vec![Row::new().with("order_id", 1)], true);
        table.store_group_size(&req, &t(1), 5);

        let group = table.binding_group(&t(1)).expect("group exists");
        assert_eq!(group.group_size, Some(5));
        assert!(group.loaded_rows.is_empty());
        assert!(!group.loaded_all);
    }

    #[test]
    fn test_store_group_rows_assigns_by_binding_columns() {
        let req = grouped(vec![t(1), t(2), t(3)]);
        let mut table = table_for(&req);
        table.store_group_size(&req, &t(1), 2);

        let fetched = vec![
            Row::new().with("id", 10).with("order_id", 1),
            Row::new().with("id", 11).with("order_id", 2),
            Row::new().with("id", 12).with("order_id", 1),
            Row::new().with("id", 13).with("order_id", 99),
        ];
        let stored = table.store_group_rows(&req, fetched, true);
        assert_eq!(stored, 3);

        let first = table.binding_group(&t(1)).expect("group 1");
        assert_eq!(first.loaded_count(), 2);
        assert_eq!(first.group_size, Some(2));
        assert!(first.is_materialized());

        let second = table.binding_group(&t(2)).expect("group 2");
        assert_eq!(second.loaded_count(), 1);

        let third = table.binding_group(&t(3)).expect("empty group recorded");
        assert_eq!(third.loaded_count(), 0);
        assert!(third.loaded_all);
    }

    #[test]
    fn test_store_group_rows_without_completion() {
        let req = grouped(vec![t(1)]);
        let mut table = table_for(&req);
        table.store_group_rows(&req, vec![Row::new().with("order_id", 1)], false);
        let group = table.binding_group(&t(1)).expect("group 1");
        assert_eq!(group.loaded_count(), 1);
        assert!(!group.is_materialized());
    }

    #[test]
    fn test_binding_group_mut_allows_direct_mutation() {
        let req = grouped(vec![t(4)]);
        let mut table = table_for(&req);
        table.store_group_size(&req, &t(4), 1);
        let group = table.binding_group_mut(&t(4)).expect("group 4");
        group.loaded_rows.push(Row::new().with("order_id", 4));
        group.loaded_all = true;
        assert!(table.binding_group(&t(4)).is_some_and(BindingGroup::is_materialized));
        assert_eq!(table.binding_groups().count(), 1);
    }
}
