//! Cache usage counters.

/// Statistics about table cache resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered by an existing table cache.
    pub hits: u64,
    /// Requests that created a new table cache.
    pub misses: u64,
    /// Table caches dropped because a request asked for more columns.
    pub invalidations: u64,
    /// Number of table caches currently held.
    pub tables: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
