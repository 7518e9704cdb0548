//! Data provider interface consumed by the cached loader.

use crate::{BindingTuple, GridResult, LoadRequest, Row};
use async_trait::async_trait;

/// Backend that executes table queries.
///
/// Implementations translate a [`LoadRequest`] into a backend query. The
/// cache never calls this directly; the loader does, and only for data the
/// cache does not already hold.
#[async_trait]
pub trait RowFetcher: Send + Sync {
    /// Fetch up to `limit` rows of an ungrouped request, starting at `offset`
    /// in `order_by` order.
    async fn fetch_rows(
        &self,
        request: &LoadRequest,
        offset: usize,
        limit: usize,
    ) -> GridResult<Vec<Row>>;

    /// Count rows per group for the given binding tuples.
    ///
    /// Returned tuples may be normalized by the backend; the cache matches
    /// them back to the requested tuples.
    async fn fetch_group_sizes(
        &self,
        request: &LoadRequest,
        binding_values: &[BindingTuple],
    ) -> GridResult<Vec<(BindingTuple, u64)>>;

    /// Fetch every row belonging to the given groups. Rows must carry the
    /// binding columns so they can be assigned to their group.
    async fn fetch_group_rows(
        &self,
        request: &LoadRequest,
        binding_values: &[BindingTuple],
    ) -> GridResult<Vec<Row>>;
}
