//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and
//! access-frequency metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value
    pub value: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime in seconds, measured from `created_at`
    pub ttl_secs: u64,
    /// Number of successful reads since the entry was written
    pub hit_count: u64,
    /// Approximate footprint in bytes, see [`approximate_size`]
    pub size_bytes: usize,
    /// Write sequence number, breaks hit-count ties during eviction
    pub(crate) seq: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_secs` - Lifetime in seconds
    /// * `size_bytes` - Precomputed approximate size
    pub fn new(value: T, ttl_secs: u64, size_bytes: usize) -> Self {
        Self {
            value,
            created_at: current_timestamp_ms(),
            ttl_secs,
            hit_count: 0,
            size_bytes,
            seq: 0,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry stays live while `now - created_at <= ttl_secs * 1000` and
    /// is expired once its age strictly exceeds the TTL.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) > self.ttl_secs.saturating_mul(1000)
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let expires = self
            .created_at
            .saturating_add(self.ttl_secs.saturating_mul(1000));
        expires.saturating_sub(current_timestamp_ms())
    }

    /// Records a successful read.
    pub fn touch(&mut self) {
        self.hit_count += 1;
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Approximate footprint of a value: twice its JSON length.
///
/// This is a cost model, not a memory measurement. It only needs to grow
/// with the data actually stored. Values that cannot be serialized fall
/// back to their shallow in-memory size.
pub fn approximate_size<T: Serialize>(value: &T) -> usize {
    serde_json::to_vec(value)
        .map(|bytes| bytes.len() * 2)
        .unwrap_or_else(|_| std::mem::size_of::<T>())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), 60, 24);

        assert_eq!(entry.value, "test_value");
        assert_eq!(entry.ttl_secs, 60);
        assert_eq!(entry.hit_count, 0);
        assert_eq!(entry.size_bytes, 24);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value".to_string(), 1, 0);

        assert!(!entry.is_expired());

        // Wait for expiration
        sleep(Duration::from_millis(1100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let mut entry = CacheEntry::new("test".to_string(), 1, 0);
        entry.created_at = now;

        // Exactly at the TTL the entry is still live
        assert!(!entry.is_expired_at(now + 1000));
        // One millisecond past the TTL it is gone
        assert!(entry.is_expired_at(now + 1001));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("test_value".to_string(), 10, 0);

        let remaining_ms = entry.ttl_remaining_ms();
        assert!(remaining_ms <= 10_000);
        assert!(remaining_ms >= 9_000);
    }

    #[test]
    fn test_ttl_remaining_expired() {
        let mut entry = CacheEntry::new("test_value".to_string(), 1, 0);
        entry.created_at = current_timestamp_ms() - 5_000;

        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_touch_increments_hit_count() {
        let mut entry = CacheEntry::new(1u32, 60, 0);
        entry.touch();
        entry.touch();
        assert_eq!(entry.hit_count, 2);
    }

    #[test]
    fn test_approximate_size_is_twice_json_length() {
        // "\"abc\"" is 5 bytes of JSON
        assert_eq!(approximate_size(&"abc"), 10);
        assert_eq!(approximate_size(&vec![1u8, 2, 3]), 14);
    }

    #[test]
    fn test_approximate_size_grows_with_data() {
        let small = approximate_size(&"x".repeat(10));
        let large = approximate_size(&"x".repeat(1000));
        assert!(large > small);
    }
}
