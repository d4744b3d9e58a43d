//! Cache Statistics Module
//!
//! Tracks resolution outcomes and maintenance activity.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Resolutions answered by the memory index
    pub memory_hits: u64,
    /// Resolutions answered by a fresh durable record
    pub durable_hits: u64,
    /// Resolutions that found no usable record and populated one
    pub misses: u64,
    /// Durable records found stale during resolution
    pub expired: u64,
    /// Unparseable durable records found and removed
    pub malformed: u64,
    /// Durable-tier failures caught by any operation
    pub storage_failures: u64,
    /// Records removed by sweeps, clears and evictions
    pub removed: u64,
    /// Current number of entries in the memory index
    pub memory_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), counting both tiers as hits, or 0.0 if
    /// no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.durable_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_durable_hit(&mut self) {
        self.durable_hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn record_storage_failure(&mut self) {
        self.storage_failures += 1;
    }

    pub fn record_removed(&mut self, count: usize) {
        self.removed += count as u64;
    }

    // == Update Entry Count ==
    /// Updates the memory index size.
    pub fn set_memory_entries(&mut self, count: usize) {
        self.memory_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.memory_hits, 0);
        assert_eq!(stats.durable_hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.memory_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_both_tiers() {
        let mut stats = CacheStats::new();
        stats.record_memory_hit();
        stats.record_durable_hit();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_record_removed() {
        let mut stats = CacheStats::new();
        stats.record_removed(3);
        stats.record_removed(2);
        assert_eq!(stats.removed, 5);
    }
}
