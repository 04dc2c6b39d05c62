//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, writes,
//! deletions, evictions and approximate memory usage.

use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// == Cache Metrics ==
/// Cumulative counters for the life of a cache instance.
///
/// `clear()` on the store leaves these counters alone; only memory usage
/// follows the live entry set.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Number of reads that found a live entry
    pub hits: u64,
    /// Number of reads that found nothing or an expired entry
    pub misses: u64,
    /// Number of writes
    pub sets: u64,
    /// Number of explicit deletions that removed something
    pub deletes: u64,
    /// Number of entries removed by the budget pass
    pub evictions: u64,
    /// Sum of `size_bytes` across live entries
    pub memory_bytes: usize,
}

impl CacheMetrics {
    // == Constructor ==
    /// Creates a new CacheMetrics with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Memory usage in MB derived from the byte total.
    pub fn memory_usage_mb(&self) -> f64 {
        self.memory_bytes as f64 / BYTES_PER_MB
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Snapshot ==
    /// Freezes the counters together with the current entry count.
    pub fn snapshot(&self, total_entries: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits,
            misses: self.misses,
            sets: self.sets,
            deletes: self.deletes,
            evictions: self.evictions,
            memory_usage_mb: self.memory_usage_mb(),
            hit_rate: self.hit_rate(),
            total_entries,
        }
    }
}

// == Metrics Snapshot ==
/// Point-in-time view returned by `get_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub memory_usage_mb: f64,
    pub hit_rate: f64,
    pub total_entries: usize,
}
