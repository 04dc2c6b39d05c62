//! Entry Store Module
//!
//! Tier-1 cache engine: a HashMap of entries with lazy TTL checks on read,
//! approximate memory accounting, and the two sweep passes (expiry, then
//! LFU eviction under a memory budget).
//!
//! The store itself is a plain `&mut self` data structure. Callers that
//! share it across tasks wrap it in [`SharedStore`].

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::cache::entry::{approximate_size, current_timestamp_ms};
use crate::cache::lfu::{eviction_count, select_least_used};
use crate::cache::{CacheEntry, CacheMetrics, MetricsSnapshot};
use crate::config::CacheConfig;
use crate::pattern::GlobPattern;

/// Tier-1 store shared between callers and the eviction sweeper.
pub type SharedStore<T> = Arc<RwLock<EntryStore<T>>>;

// == Sweep Report ==
/// Outcome of one sweeper run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SweepReport {
    /// Entries removed by the expiry pass
    pub expired: usize,
    /// Entries removed by the budget pass
    pub evicted: usize,
    /// Memory usage after both passes
    pub memory_usage_mb: f64,
}

// == Entry Store ==
/// In-process entry store with TTL expiry and LFU budget eviction.
#[derive(Debug)]
pub struct EntryStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Cumulative counters and memory total
    metrics: CacheMetrics,
    /// Immutable per-instance parameters
    config: CacheConfig,
    /// Next write sequence number
    next_seq: u64,
}

impl<T: Clone + Serialize> EntryStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            metrics: CacheMetrics::new(),
            config,
            next_seq: 0,
        }
    }

    /// Wraps a new store for sharing with the sweeper.
    pub fn shared(config: CacheConfig) -> SharedStore<T> {
        Arc::new(RwLock::new(Self::new(config)))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value, overwriting any previous entry for the key.
    ///
    /// The entry starts with a zero hit count and a fresh creation time.
    /// A missing or zero `ttl` falls back to the configured default.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL in seconds
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl: Option<u64>) {
        let key = key.into();
        let ttl_secs = ttl.filter(|t| *t > 0).unwrap_or(self.config.default_ttl);
        let size = approximate_size(&value);

        let mut entry = CacheEntry::new(value, ttl_secs, size);
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if let Some(previous) = self.entries.insert(key, entry) {
            self.metrics.memory_bytes -= previous.size_bytes;
        }
        self.metrics.memory_bytes += size;

        if self.config.metrics_enabled {
            self.metrics.record_set();
        }
    }

    // == Get ==
    /// Retrieves a clone of the stored value.
    ///
    /// Missing and expired keys count as misses; an expired entry is
    /// removed on the spot. A live entry has its hit count bumped.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let now = current_timestamp_ms();

        let expired = match self.entries.get(key) {
            None => {
                self.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.remove_entry(key);
            self.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        let value = entry.value.clone();
        if self.config.metrics_enabled {
            self.metrics.record_hit();
        }
        Some(value)
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed && self.config.metrics_enabled {
            self.metrics.record_delete();
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.metrics.memory_bytes = 0;
    }

    /// Removes entries whose key matches the pattern, returning the count.
    pub fn clear_matching(&mut self, pattern: &GlobPattern) -> usize {
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        for key in &keys {
            self.remove_entry(key);
        }
        keys.len()
    }

    // == Metrics ==
    /// Returns a snapshot including hit rate and current entry count.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.entries.len())
    }

    pub fn memory_usage_mb(&self) -> f64 {
        self.metrics.memory_usage_mb()
    }

    pub fn is_over_budget(&self) -> bool {
        self.memory_usage_mb() > self.config.max_memory_mb
    }

    // == Cleanup Expired ==
    /// Expiry pass: removes every entry whose age exceeds its TTL.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }
        expired_keys.len()
    }

    // == Evict Least Used ==
    /// Budget pass step: removes the `ceil(10%)` least frequently used entries.
    ///
    /// Runs unconditionally; [`sweep`](Self::sweep) decides when to call it.
    pub fn evict_least_used(&mut self) -> usize {
        let count = eviction_count(self.entries.len());
        let victims = select_least_used(&self.entries, count);

        for key in &victims {
            self.remove_entry(key);
        }
        if self.config.metrics_enabled {
            self.metrics.record_evictions(victims.len());
        }
        victims.len()
    }

    // == Sweep ==
    /// Runs the expiry pass, then the budget pass if still over budget.
    pub fn sweep(&mut self) -> SweepReport {
        let expired = self.cleanup_expired();
        let evicted = if self.is_over_budget() {
            self.evict_least_used()
        } else {
            0
        };

        SweepReport {
            expired,
            evicted,
            memory_usage_mb: self.memory_usage_mb(),
        }
    }

    // == Length ==
    /// Returns the number of stored entries, including not-yet-swept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks presence without touching hit counts or metrics.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Live value for `key` without touching hit counts or metrics.
    pub fn peek(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Hit count of a stored entry, without counting as a read.
    pub fn hit_count(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|entry| entry.hit_count)
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.metrics.memory_bytes -= entry.size_bytes;
        Some(entry)
    }

    fn record_miss(&mut self) {
        if self.config.metrics_enabled {
            self.metrics.record_miss();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn store() -> EntryStore<String> {
        EntryStore::new(CacheConfig::default())
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.memory_usage_mb(), 0.0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        let value = store.get("key1");

        assert_eq!(value.as_deref(), Some("value1"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = store();

        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.metrics().misses, 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
        assert_eq!(store.metrics().deletes, 1);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = store();

        assert!(!store.delete("nonexistent"));
        assert_eq!(store.metrics().deletes, 0);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.set("key1", "value2".to_string(), None);

        assert_eq!(store.hit_count("key1"), Some(0));
        assert_eq!(store.get("key1").as_deref(), Some("value2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.metrics().sets, 2);
    }

    #[test]
    fn test_store_overwrite_replaces_size() {
        let mut store = store();

        store.set("key1", "x".repeat(1000), None);
        store.set("key1", "y".to_string(), None);

        let expected = approximate_size(&"y".to_string());
        assert_eq!(store.metrics.memory_bytes, expected);
    }

    #[test]
    fn test_store_zero_ttl_uses_default() {
        let mut store = EntryStore::new(CacheConfig::default().with_default_ttl(42));

        store.set("key1", "value1".to_string(), Some(0));
        assert_eq!(store.entries["key1"].ttl_secs, 42);

        store.set("key2", "value2".to_string(), None);
        assert_eq!(store.entries["key2"].ttl_secs, 42);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store.set("key1", "value1".to_string(), Some(1));
        assert!(store.get("key1").is_some());

        // Wait for expiration
        sleep(Duration::from_millis(1100));

        assert!(store.get("key1").is_none());
        // The expired entry is gone from storage, not just hidden
        assert!(!store.contains_key("key1"));
        assert_eq!(store.memory_usage_mb(), 0.0);

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
    }

    #[test]
    fn test_store_hit_count_tracks_reads() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("key1");
        store.get("key1");

        assert_eq!(store.hit_count("key1"), Some(3));
    }

    #[test]
    fn test_store_clear_keeps_counters() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        store.set("key2", "value2".to_string(), None);
        store.get("key1");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.memory_usage_mb(), 0.0);
        assert!(store.get("key1").is_none());
        assert!(store.get("key2").is_none());

        let metrics = store.metrics();
        assert_eq!(metrics.sets, 2);
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 2);
    }

    #[test]
    fn test_store_clear_matching() {
        let mut store = store();

        store.set("query:users:1", "a".to_string(), None);
        store.set("query:users:2", "b".to_string(), None);
        store.set("query:orders:1", "c".to_string(), None);

        let pattern = GlobPattern::new("query:users:*").unwrap();
        assert_eq!(store.clear_matching(&pattern), 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains_key("query:orders:1"));
    }

    #[test]
    fn test_store_metrics() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        store.get("key1"); // hit
        store.get("nonexistent"); // miss

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hit_rate, 0.5);
        assert_eq!(metrics.total_entries, 1);
        assert!(metrics.memory_usage_mb > 0.0);
    }

    #[test]
    fn test_store_metrics_disabled() {
        let mut store: EntryStore<String> =
            EntryStore::new(CacheConfig::default().with_metrics(false));

        store.set("key1", "value1".to_string(), None);
        store.get("key1");
        store.get("missing");
        store.delete("key1");

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(metrics.sets, 0);
        assert_eq!(metrics.deletes, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = store();

        store.set("key1", "value1".to_string(), Some(1));
        store.set("key2", "value2".to_string(), Some(10));

        // Wait for key1 to expire
        sleep(Duration::from_millis(1100));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_store_evict_least_used() {
        let mut store = store();

        for i in 0..20 {
            store.set(format!("key{}", i), format!("value{}", i), None);
        }
        // Every key except key3 and key7 gets read once
        for i in 0..20 {
            if i != 3 && i != 7 {
                store.get(&format!("key{}", i));
            }
        }

        let evicted = store.evict_least_used();
        assert_eq!(evicted, 2);
        assert!(!store.contains_key("key3"));
        assert!(!store.contains_key("key7"));
        assert_eq!(store.len(), 18);
        assert_eq!(store.metrics().evictions, 2);
    }

    #[test]
    fn test_sweep_under_budget_keeps_live_entries() {
        let mut store = store();

        store.set("key1", "value1".to_string(), None);
        let report = store.sweep();

        assert_eq!(report.expired, 0);
        assert_eq!(report.evicted, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sweep_over_budget_evicts() {
        // Roughly 20 bytes of budget
        let config = CacheConfig::default().with_max_memory_mb(0.00002);
        let mut store = EntryStore::new(config);

        for i in 0..10 {
            store.set(format!("key{}", i), "x".repeat(100), None);
        }
        store.get("key0");

        let report = store.sweep();
        assert_eq!(report.expired, 0);
        assert_eq!(report.evicted, 1);
        // key1 is the oldest of the never-read entries
        assert!(!store.contains_key("key1"));
        assert!(store.contains_key("key0"));
    }

    #[test]
    fn test_peek_does_not_count_as_read() {
        let mut store = EntryStore::new(CacheConfig::default());
        store.set("key1", "value1".to_string(), None);

        assert_eq!(store.peek("key1").as_deref(), Some("value1"));
        assert!(store.peek("missing").is_none());

        let metrics = store.metrics();
        assert_eq!(metrics.hits, 0);
        assert_eq!(metrics.misses, 0);
        assert_eq!(store.hit_count("key1"), Some(0));
    }

    #[test]
    fn test_peek_skips_expired_entry() {
        let mut store = EntryStore::new(CacheConfig::default());
        store.set("short", "v".to_string(), Some(1));
        sleep(Duration::from_millis(1100));

        assert!(store.peek("short").is_none());
        assert_eq!(store.metrics().misses, 0);
    }
}
