//! Gridview Test Utilities
//!
//! Centralized test infrastructure for the gridview workspace:
//! - Mock row fetcher serving an in-memory dataset
//! - Proptest generators for values, tuples and requests
//! - Test fixtures for common scenarios
//! - Custom assertions for gridview-specific validation

// Re-export core types for convenience
pub use gridview_core::{
    BindingMatch, BindingTuple, CacheConfig, CellValue, ConfigError, DatabaseConfig, FetchError,
    GridError, GridResult, LoadRequest, OrderBy, Row, RowFetcher, SortDirection,
};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// MOCK FETCHER
// ============================================================================

/// Mock backend serving rows from an in-memory dataset.
///
/// Counts every call so tests can assert that cached data is not fetched
/// again, and records the group tuples it was asked about.
#[derive(Debug, Default)]
pub struct MockRowFetcher {
    rows: Vec<Row>,
    echo_keys_as_text: bool,
    fail: bool,
    row_fetches: AtomicUsize,
    size_fetches: AtomicUsize,
    group_row_fetches: AtomicUsize,
    requested_groups: Mutex<Vec<BindingTuple>>,
}

impl MockRowFetcher {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Report group sizes keyed by text, as an untyped backend would.
    pub fn echo_keys_as_text(mut self) -> Self {
        self.echo_keys_as_text = true;
        self
    }

    /// Fail every call with a [`FetchError::Failed`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn row_fetches(&self) -> usize {
        self.row_fetches.load(Ordering::SeqCst)
    }

    pub fn size_fetches(&self) -> usize {
        self.size_fetches.load(Ordering::SeqCst)
    }

    pub fn group_row_fetches(&self) -> usize {
        self.group_row_fetches.load(Ordering::SeqCst)
    }

    /// Every tuple passed to a group fetch, in call order.
    pub fn requested_groups(&self) -> Vec<BindingTuple> {
        self.requested_groups
            .lock()
            .map(|groups| groups.clone())
            .unwrap_or_default()
    }

    fn check(&self, request: &LoadRequest) -> GridResult<()> {
        if self.fail {
            return Err(FetchError::Failed {
                table: request.pure_name.clone(),
                reason: "mock backend unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn record_groups(&self, binding_values: &[BindingTuple]) {
        if let Ok(mut groups) = self.requested_groups.lock() {
            groups.extend(binding_values.iter().cloned());
        }
    }

    fn group_members<'a>(
        &'a self,
        request: &'a LoadRequest,
        tuple: &'a [CellValue],
    ) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |row| {
            BindingMatch::Strict.tuples_match(tuple, &row.binding_tuple(request.binding_columns()))
        })
    }
}

#[async_trait]
impl RowFetcher for MockRowFetcher {
    async fn fetch_rows(
        &self,
        request: &LoadRequest,
        offset: usize,
        limit: usize,
    ) -> GridResult<Vec<Row>> {
        self.row_fetches.fetch_add(1, Ordering::SeqCst);
        self.check(request)?;
        Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn fetch_group_sizes(
        &self,
        request: &LoadRequest,
        binding_values: &[BindingTuple],
    ) -> GridResult<Vec<(BindingTuple, u64)>> {
        self.size_fetches.fetch_add(1, Ordering::SeqCst);
        self.check(request)?;
        self.record_groups(binding_values);

        Ok(binding_values
            .iter()
            .map(|tuple| {
                let count = self.group_members(request, tuple).count() as u64;
                let key: BindingTuple = if self.echo_keys_as_text {
                    tuple.iter().map(text_of).collect()
                } else {
                    tuple.clone()
                };
                (key, count)
            })
            .collect())
    }

    async fn fetch_group_rows(
        &self,
        request: &LoadRequest,
        binding_values: &[BindingTuple],
    ) -> GridResult<Vec<Row>> {
        self.group_row_fetches.fetch_add(1, Ordering::SeqCst);
        self.check(request)?;
        self.record_groups(binding_values);

        Ok(binding_values
            .iter()
            .flat_map(|tuple| self.group_members(request, tuple))
            .cloned()
            .collect())
    }
}

fn text_of(value: &CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::Null,
        CellValue::Bool(b) => CellValue::Text(b.to_string()),
        CellValue::Int(i) => CellValue::Text(i.to_string()),
        CellValue::Float(f) => CellValue::Text(f.to_string()),
        CellValue::Text(s) => CellValue::Text(s.clone()),
    }
}

/// Install a test tracing subscriber honoring `RUST_LOG`. Safe to call
/// from every test.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gridview_cache=debug,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating gridview types.

    use super::*;
    use proptest::prelude::*;

    /// Generate any cell value (finite floats only).
    pub fn arb_cell_value() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Null),
            any::<bool>().prop_map(CellValue::Bool),
            any::<i64>().prop_map(CellValue::Int),
            (-1.0e9f64..1.0e9).prop_map(CellValue::Float),
            "[a-zA-Z0-9 _-]{0,12}".prop_map(CellValue::Text),
        ]
    }

    /// Generate a binding tuple of exactly `arity` values.
    pub fn arb_binding_tuple(arity: usize) -> impl Strategy<Value = BindingTuple> {
        proptest::collection::vec(arb_cell_value(), arity)
    }

    /// Generate up to `max` distinct single-column integer tuples.
    pub fn arb_distinct_int_tuples(max: usize) -> impl Strategy<Value = Vec<BindingTuple>> {
        proptest::collection::btree_set(0i64..1000, 0..=max)
            .prop_map(|ids| ids.into_iter().map(|id| vec![CellValue::Int(id)]).collect())
    }

    /// Generate a column name.
    pub fn arb_column_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,7}"
    }

    /// Generate a set of distinct column names.
    pub fn arb_column_set(max: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set(arb_column_name(), 1..=max)
            .prop_map(|set| set.into_iter().collect())
    }

    /// Generate an ordering clause.
    pub fn arb_order_by() -> impl Strategy<Value = Vec<OrderBy>> {
        proptest::collection::vec(
            (arb_column_name(), any::<bool>()).prop_map(|(column, asc)| {
                if asc {
                    OrderBy::asc(column)
                } else {
                    OrderBy::desc(column)
                }
            }),
            0..3,
        )
    }

    /// Generate a database config.
    pub fn arb_database_config() -> impl Strategy<Value = DatabaseConfig> {
        ("con[0-9]", "[a-z]{1,6}").prop_map(|(conid, db)| DatabaseConfig::new(conid, db))
    }

    /// Generate an ungrouped load request.
    pub fn arb_load_request() -> impl Strategy<Value = LoadRequest> {
        (
            arb_database_config(),
            proptest::option::of("[a-z]{1,6}"),
            "[a-z]{1,8}",
            arb_column_set(6),
            arb_order_by(),
            0usize..500,
        )
            .prop_map(|(db, schema, table, columns, order_by, top_count)| LoadRequest {
                schema_name: schema,
                pure_name: table,
                binding_columns: None,
                data_columns: columns,
                database_config: db,
                order_by,
                binding_values: None,
                top_count,
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// Database config shared by the fixtures.
    pub fn test_database() -> DatabaseConfig {
        DatabaseConfig::new("test-con", "shop")
    }

    /// `n` customer rows with ids `0..n`.
    pub fn customer_rows(n: i64) -> Vec<Row> {
        (0..n)
            .map(|id| {
                Row::new()
                    .with("id", id)
                    .with("name", format!("customer-{}", id))
            })
            .collect()
    }

    /// Ungrouped request over the customers table.
    pub fn customers_request(top_count: usize) -> LoadRequest {
        LoadRequest::new(test_database(), "customers")
            .with_schema("public")
            .with_data_columns(["id", "name"])
            .with_order_by(vec![OrderBy::asc("id")])
            .with_top_count(top_count)
    }

    /// Order rows: customer `c` has `c % 4` orders.
    pub fn order_rows(customers: i64) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut order_id = 0i64;
        for customer_id in 0..customers {
            for _ in 0..(customer_id % 4) {
                rows.push(
                    Row::new()
                        .with("id", order_id)
                        .with("customer_id", customer_id)
                        .with("total", 10.5 * order_id as f64),
                );
                order_id += 1;
            }
        }
        rows
    }

    /// Grouped request for the orders of the given customers.
    pub fn orders_request(customer_ids: &[i64]) -> LoadRequest {
        LoadRequest::new(test_database(), "orders")
            .with_schema("public")
            .with_data_columns(["id", "customer_id", "total"])
            .with_binding_columns(["customer_id"])
            .with_binding_values(customer_ids.iter().map(|id| vec![CellValue::Int(*id)]).collect())
            .with_order_by(vec![OrderBy::asc("id")])
            .with_top_count(100)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Custom assertion functions for gridview-specific validation.

    use super::*;

    /// Assert that a GridResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &GridResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a GridResult is a Fetch error.
    #[track_caller]
    pub fn assert_fetch_error<T: std::fmt::Debug>(result: &GridResult<T>) {
        match result {
            Err(GridError::Fetch(_)) => {}
            other => panic!("Expected Fetch error, got: {:?}", other),
        }
    }

    /// Assert that a GridResult is a Config error.
    #[track_caller]
    pub fn assert_config_error<T: std::fmt::Debug>(result: &GridResult<T>) {
        match result {
            Err(GridError::Config(_)) => {}
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    /// Assert that rows carry the given `id` values, in order.
    #[track_caller]
    pub fn assert_row_ids(rows: &[Row], expected: &[i64]) {
        let ids: Vec<Option<&CellValue>> = rows.iter().map(|row| row.get("id")).collect();
        let expected: Vec<CellValue> = expected.iter().map(|id| CellValue::Int(*id)).collect();
        let expected: Vec<Option<&CellValue>> = expected.iter().map(Some).collect();
        assert_eq!(ids, expected, "Row ids differ");
    }
}
