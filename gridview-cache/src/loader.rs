//! Fetch orchestration on top of the cache.
//!
//! The cache itself never fetches. [`CachedLoader`] pairs a [`Cache`] with a
//! [`RowFetcher`] and asks the backend only for what the cache lacks:
//! rows past the end of a table's row window, sizes of unregistered groups,
//! and rows of groups that are not yet materialized.

use gridview_core::{BindingTuple, GridResult, LoadRequest, Row, RowFetcher};
use tracing::{debug, trace};

use crate::cache::{BindingGroup, Cache, RowsResult};

/// Read-through loader over a [`Cache`].
///
/// # Example
///
/// ```ignore
/// let mut loader = CachedLoader::new(fetcher);
/// let page = loader.load_rows(&request.with_top_count(200)).await?;
/// // Scrolling back up is served from memory
/// let again = loader.load_rows(&request.with_top_count(100)).await?;
/// ```
pub struct CachedLoader<F: RowFetcher> {
    cache: Cache,
    fetcher: F,
}

impl<F: RowFetcher> CachedLoader<F> {
    /// Create a loader with an empty default cache.
    pub fn new(fetcher: F) -> Self {
        Self::with_cache(Cache::new(), fetcher)
    }

    pub fn with_cache(cache: Cache, fetcher: F) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut Cache {
        &mut self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Drop all cached data, e.g. after a schema change or explicit refresh.
    pub fn reset(&mut self) {
        self.cache = self.cache.fresh();
    }

    /// Load the first `request.top_count` rows of an ungrouped request.
    ///
    /// Served from the row window when it already holds `top_count` rows or
    /// the table is complete. Otherwise the window is extended by at least
    /// `min_fetch_rows`; a short page marks the table complete.
    pub async fn load_rows(&mut self, request: &LoadRequest) -> GridResult<RowsResult> {
        let min_fetch_rows = self.cache.config().min_fetch_rows;
        let Self { cache, fetcher } = self;
        let table = cache.get_table_cache(request);

        let loaded = table.loaded_count();
        if table.loaded_all || loaded >= request.top_count {
            trace!(table = %request.pure_name, loaded, "Rows served from cache");
            return Ok(table.get_rows_result(request));
        }

        let limit = (request.top_count - loaded).max(min_fetch_rows);
        debug!(table = %request.pure_name, offset = loaded, limit, "Fetching rows");
        let rows = fetcher.fetch_rows(request, loaded, limit).await?;

        let fetched = rows.len();
        table.append_rows(rows);
        if fetched < limit {
            table.mark_loaded_all();
        }
        Ok(table.get_rows_result(request))
    }

    /// Group sizes for every tuple of `request.binding_values`, in request order.
    ///
    /// Only tuples without a registered group are sent to the fetcher. A
    /// group registered through its rows alone reports its row count once
    /// complete. `None` means the backend did not report the group.
    pub async fn load_group_sizes(
        &mut self,
        request: &LoadRequest,
    ) -> GridResult<Vec<(BindingTuple, Option<u64>)>> {
        let Self { cache, fetcher } = self;
        let table = cache.get_table_cache(request);

        let uncached = table.get_binding_groups(request).uncached;
        if !uncached.is_empty() {
            debug!(
                table = %request.pure_name,
                groups = uncached.len(),
                "Fetching group sizes"
            );
            let sizes = fetcher.fetch_group_sizes(request, &uncached).await?;
            for (binding_values, count) in sizes {
                table.store_group_size(request, &binding_values, count);
            }
        }

        Ok(request
            .binding_values()
            .iter()
            .map(|tuple| {
                let size = table.binding_group(tuple).and_then(|group| {
                    group
                        .group_size
                        .or_else(|| group.loaded_all.then(|| group.loaded_count() as u64))
                });
                (tuple.clone(), size)
            })
            .collect())
    }

    /// Rows of every group in `request.binding_values`, in request order,
    /// each truncated to `request.top_count`.
    ///
    /// Groups that are not materialized are fetched in one batch and
    /// recorded as complete. Rows such a group already held are replaced by
    /// the fetched ones.
    pub async fn load_group_rows(
        &mut self,
        request: &LoadRequest,
    ) -> GridResult<Vec<(BindingTuple, Vec<Row>)>> {
        let Self { cache, fetcher } = self;
        let table = cache.get_table_cache(request);

        let pending: Vec<BindingTuple> = request
            .binding_values()
            .iter()
            .filter(|tuple| {
                !table
                    .binding_group(tuple)
                    .is_some_and(BindingGroup::is_materialized)
            })
            .cloned()
            .collect();

        if !pending.is_empty() {
            debug!(
                table = %request.pure_name,
                groups = pending.len(),
                "Fetching group rows"
            );
            let rows = fetcher.fetch_group_rows(request, &pending).await?;
            // The backend returns whole groups; drop partial rows first
            for tuple in &pending {
                if let Some(group) = table.binding_group_mut(tuple) {
                    group.loaded_rows.clear();
                }
            }
            let scoped = request.clone().with_binding_values(pending);
            table.store_group_rows(&scoped, rows, true);
        }

        Ok(request
            .binding_values()
            .iter()
            .map(|tuple| {
                let rows = table
                    .binding_group(tuple)
                    .map(|group| {
                        group
                            .loaded_rows
                            .iter()
                            .take(request.top_count)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                (tuple.clone(), rows)
            })
            .collect())
    }
}
