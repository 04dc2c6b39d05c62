//! Cache Module
//!
//! Tier-1 in-process caching with lazy TTL expiration and LFU eviction
//! under a memory budget.

mod entry;
mod lfu;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{approximate_size, current_timestamp_ms, CacheEntry};
pub use lfu::{eviction_count, select_least_used, EVICTION_FRACTION};
pub use stats::{CacheMetrics, MetricsSnapshot};
pub use store::{EntryStore, SharedStore, SweepReport};
