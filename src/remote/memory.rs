//! In-process remote tier backend
//!
//! Implements the same wire contract as Redis (server-side expiry, glob key
//! listing) on a local map. Used for local development without a Redis
//! server and for exercising the fail-open paths: it can be switched
//! offline or given artificial latency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RemoteStore;
use crate::cache::current_timestamp_ms;
use crate::error::{CacheError, Result};
use crate::pattern::GlobPattern;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: u64,
}

impl StoredValue {
    fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Map-backed [`RemoteStore`] with Redis-like expiry.
#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    data: Arc<RwLock<HashMap<String, StoredValue>>>,
    offline: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an outage: while offline every call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Adds a fixed delay before every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of stored, unexpired keys.
    pub async fn len(&self) -> usize {
        let now = current_timestamp_ms();
        self.data
            .read()
            .await
            .values()
            .filter(|v| !v.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Remote("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.check().await?;
        let now = current_timestamp_ms();

        let mut data = self.data.write().await;
        let expired = match data.get(key) {
            Some(stored) => stored.is_expired(now),
            None => return Ok(None),
        };
        if expired {
            data.remove(key);
            return Ok(None);
        }
        Ok(data.get(key).map(|stored| stored.value.clone()))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.check().await?;
        let expires_at = current_timestamp_ms() + ttl_secs.max(1) * 1000;

        self.data.write().await.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.check().await?;
        let now = current_timestamp_ms();

        let removed = self.data.write().await.remove(key);
        Ok(removed.is_some_and(|v| !v.is_expired(now)))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.check().await?;
        let glob = GlobPattern::new(pattern)?;
        let now = current_timestamp_ms();

        Ok(self
            .data
            .read()
            .await
            .iter()
            .filter(|(key, v)| !v.is_expired(now) && glob.is_match(key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize> {
        self.check().await?;
        let now = current_timestamp_ms();

        let mut data = self.data.write().await;
        Ok(keys
            .iter()
            .filter_map(|key| data.remove(key))
            .filter(|v| !v.is_expired(now))
            .count())
    }

    async fn ping(&self) -> Result<()> {
        self.check().await
    }
}
