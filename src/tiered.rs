//! Tiered Coordinator Module
//!
//! Composes the in-process entry store (Tier-1) with an optional remote
//! tier (Tier-2) behind a single read/write/delete API.
//!
//! - Writes go to both tiers (write-through). Tier-1 is written first and
//!   never waits on, or rolls back because of, Tier-2.
//! - Reads consult Tier-1 and only fall back to Tier-2 on a confirmed
//!   miss. A Tier-2 hit is backfilled into Tier-1 with Tier-1's default
//!   TTL; the original TTL is not carried across.
//! - The Tier-1 lock is never held across a Tier-2 call.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{EntryStore, MetricsSnapshot, SharedStore};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::pattern::GlobPattern;
use crate::remote::RemoteTier;
use crate::tasks::spawn_sweeper;

// == Tiered Cache ==
/// Two-tier cache handle. Clones share the same tiers.
#[derive(Debug, Clone)]
pub struct TieredCache<T> {
    config: CacheConfig,
    local: SharedStore<T>,
    remote: Option<RemoteTier>,
}

impl<T> TieredCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a Tier-1-only cache.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            local: EntryStore::shared(config.clone()),
            config,
            remote: None,
        })
    }

    /// Creates a cache backed by the given remote tier.
    pub fn with_remote(config: CacheConfig, remote: RemoteTier) -> Result<Self> {
        let mut cache = Self::new(config)?;
        cache.remote = Some(remote);
        Ok(cache)
    }

    /// Creates a cache with an optional remote tier.
    pub fn from_parts(config: CacheConfig, remote: Option<RemoteTier>) -> Result<Self> {
        let mut cache = Self::new(config)?;
        cache.remote = remote;
        Ok(cache)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Tier-1 store, shared with the sweeper.
    pub fn local(&self) -> &SharedStore<T> {
        &self.local
    }

    pub fn remote(&self) -> Option<&RemoteTier> {
        self.remote.as_ref()
    }

    /// Starts the eviction sweeper for this cache's Tier-1 store.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        spawn_sweeper(self.local.clone(), interval)
    }

    /// TTL a write with `ttl` ends up using; zero or absent means the default.
    pub fn effective_ttl(&self, ttl: Option<u64>) -> u64 {
        ttl.filter(|t| *t > 0).unwrap_or(self.config.default_ttl)
    }

    // == Set ==
    /// Writes through to both tiers.
    pub async fn set(&self, key: &str, value: T, ttl: Option<u64>) {
        let ttl_secs = self.effective_ttl(ttl);

        match &self.remote {
            Some(remote) => {
                self.local
                    .write()
                    .await
                    .set(key, value.clone(), Some(ttl_secs));
                remote.set(key, &value, ttl_secs).await;
            }
            None => {
                self.local.write().await.set(key, value, Some(ttl_secs));
            }
        }
    }

    // == Get ==
    /// Reads Tier-1, then Tier-2 on a miss, backfilling Tier-1 on a Tier-2 hit.
    pub async fn get(&self, key: &str) -> Option<T> {
        let local_hit = { self.local.write().await.get(key) };
        if local_hit.is_some() {
            return local_hit;
        }

        let remote = self.remote.as_ref()?;
        let value: T = remote.get(key).await?;

        debug!(key, "Backfilling tier-1 from remote tier");
        self.local.write().await.set(key, value.clone(), None);
        Some(value)
    }

    /// Tier-1 lookup that records nothing: no hit, no miss, no hit count.
    pub async fn peek_local(&self, key: &str) -> Option<T> {
        self.local.read().await.peek(key)
    }

    // == Delete ==
    /// Deletes from both tiers; true if either removed something.
    pub async fn delete(&self, key: &str) -> bool {
        let local_deleted = { self.local.write().await.delete(key) };
        let remote_deleted = match &self.remote {
            Some(remote) => remote.delete(key).await,
            None => false,
        };
        local_deleted || remote_deleted
    }

    /// Drops a key from every tier. Same as [`delete`](Self::delete).
    pub async fn invalidate(&self, key: &str) -> bool {
        self.delete(key).await
    }

    // == Clear ==
    /// Clears both tiers, or only keys matching a glob pattern.
    ///
    /// A pattern scopes the clear in both tiers: Tier-1 keys that do not
    /// match are kept, not flushed.
    pub async fn clear(&self, pattern: Option<&str>) {
        match pattern.map(GlobPattern::new) {
            None => self.local.write().await.clear(),
            Some(Ok(glob)) => {
                let removed = self.local.write().await.clear_matching(&glob);
                debug!(pattern = glob.as_str(), removed, "Cleared matching tier-1 entries");
            }
            Some(Err(e)) => {
                warn!(error = %e, "Unusable clear pattern, clearing all of tier-1");
                self.local.write().await.clear();
            }
        }

        if let Some(remote) = &self.remote {
            remote.clear(pattern).await;
        }
    }

    // == Metrics ==
    /// Tier-1 metrics. Tier-2 is not separately instrumented.
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        self.local.read().await.metrics()
    }

    // == Batch Operations ==
    /// Reads several keys, in order, with the same fallback rules as [`get`](Self::get).
    pub async fn get_many(&self, keys: &[&str]) -> Vec<Option<T>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await);
        }
        values
    }

    /// Writes several entries with a shared TTL.
    pub async fn set_many<I>(&self, items: I, ttl: Option<u64>)
    where
        I: IntoIterator<Item = (String, T)>,
    {
        for (key, value) in items {
            self.set(&key, value, ttl).await;
        }
    }
}
