//! Top-level registry of table caches.

use std::collections::HashMap;
use std::sync::Arc;

use gridview_core::{CacheConfig, LoadRequest};
use tracing::debug;

use super::stable_key::{CanonicalJson, StableStringify};
use super::stats::CacheStats;
use super::table::CacheTable;
use super::table_key::TableKey;

/// Outcome of looking up an existing table cache for a request.
enum Lookup {
    Reuse,
    Incomplete,
    Absent,
}

/// Registry mapping derived table keys to [`CacheTable`]s.
///
/// All operations are synchronous in-memory decisions. Callers sharing a
/// `Cache` between concurrent fetch completions must serialize access
/// themselves; `&mut self` on the mutating methods enforces that within
/// safe code.
#[derive(Debug)]
pub struct Cache {
    tables: HashMap<String, CacheTable>,
    serializer: Arc<dyn StableStringify>,
    config: CacheConfig,
    stats: CacheStats,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    /// Create an empty cache with default config and [`CanonicalJson`] keys.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_serializer(Arc::new(CanonicalJson), config)
    }

    /// Create an empty cache using a caller-supplied key serializer.
    pub fn with_serializer(serializer: Arc<dyn StableStringify>, config: CacheConfig) -> Self {
        Self {
            tables: HashMap::new(),
            serializer,
            config,
            stats: CacheStats::default(),
        }
    }

    /// Create an empty cache sharing this cache's serializer and config.
    pub fn fresh(&self) -> Self {
        Self::with_serializer(Arc::clone(&self.serializer), self.config.clone())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Derive the string key identifying the request's table cache.
    pub fn table_key(&self, request: &LoadRequest) -> String {
        TableKey::from_request(request).render(self.serializer.as_ref())
    }

    /// Resolve a request to its table cache.
    ///
    /// Returns the existing cache when it holds every requested data column.
    /// A cache missing any requested column is discarded and replaced by a
    /// fresh, empty one built from the request. Never fetches.
    pub fn get_table_cache(&mut self, request: &LoadRequest) -> &mut CacheTable {
        let key = self.table_key(request);

        let lookup = match self.tables.get(&key) {
            None => Lookup::Absent,
            Some(existing) => {
                let missing = existing.missing_columns(&request.data_columns);
                if missing.is_empty() {
                    Lookup::Reuse
                } else {
                    debug!(
                        table = %request.pure_name,
                        cached_columns = ?existing.data_columns(),
                        missing_columns = ?missing,
                        "Delete cache because incomplete columns"
                    );
                    Lookup::Incomplete
                }
            }
        };

        match lookup {
            Lookup::Reuse => self.stats.hits += 1,
            Lookup::Incomplete => {
                self.tables.remove(&key);
                self.stats.invalidations += 1;
                self.stats.misses += 1;
            }
            Lookup::Absent => self.stats.misses += 1,
        }

        let serializer = Arc::clone(&self.serializer);
        let binding_match = self.config.binding_match;
        self.tables
            .entry(key)
            .or_insert_with(|| CacheTable::new(request, serializer, binding_match))
    }

    /// Table cache stored under the request's key, without column checks
    /// and without creating one.
    pub fn table(&self, request: &LoadRequest) -> Option<&CacheTable> {
        self.tables.get(&self.table_key(request))
    }

    pub fn table_mut(&mut self, request: &LoadRequest) -> Option<&mut CacheTable> {
        let key = self.table_key(request);
        self.tables.get_mut(&key)
    }

    /// True when [`get_table_cache`](Self::get_table_cache) would reuse an
    /// existing table cache for this request.
    pub fn contains_table(&self, request: &LoadRequest) -> bool {
        self.table(request)
            .is_some_and(|table| table.missing_columns(&request.data_columns).is_empty())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every table cache. Counters are kept.
    pub fn clear(&mut self) {
        self.tables.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            tables: self.tables.len() as u64,
            ..self.stats.clone()
        }
    }
}
