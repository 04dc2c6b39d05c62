//! Query Cache Module
//!
//! A tiered cache preconfigured for query results (300s TTL, 50MB budget)
//! with canonical key derivation and a compute-if-absent wrapper.
//!
//! `cache_query` is single-flight per key: concurrent misses on the same
//! key wait on one producer run instead of each invoking the producer.
//! Holding the key's slot, a caller re-checks Tier-1 before producing.
//! A failed producer stores nothing, so the next waiter runs its own.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::MetricsSnapshot;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::remote::RemoteTier;
use crate::tiered::TieredCache;

/// Literal tag every query key starts with
pub const QUERY_KEY_PREFIX: &str = "query";

type Registry = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

fn lock_registry(registry: &Registry) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

// == Key Derivation ==
/// Builds `query:<resource>:<params as JSON>` with object keys sorted at
/// every depth, so logically equal parameter sets map to one key.
pub fn generate_query_key(resource: &str, params: &Value) -> String {
    format!("{}:{}:{}", QUERY_KEY_PREFIX, resource, canonicalize(params))
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key.clone(), canonicalize(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// == In-Flight Slot ==
/// Holds the per-key producer lock; unregisters the key when the last
/// holder lets go.
struct InFlight<'a> {
    registry: &'a Registry,
    key: String,
    slot: Arc<AsyncMutex<()>>,
    permit: Option<OwnedMutexGuard<()>>,
}

impl<'a> InFlight<'a> {
    /// Acquires the key's slot. The flag reports whether another caller
    /// held it first.
    async fn acquire(registry: &'a Registry, key: &str) -> (InFlight<'a>, bool) {
        let slot = lock_registry(registry)
            .entry(key.to_string())
            .or_default()
            .clone();

        let (permit, waited) = match slot.clone().try_lock_owned() {
            Ok(permit) => (permit, false),
            Err(_) => (slot.clone().lock_owned().await, true),
        };

        let flight = InFlight {
            registry,
            key: key.to_string(),
            slot,
            permit: Some(permit),
        };
        (flight, waited)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.permit.take();
        let mut registry = lock_registry(self.registry);
        // One reference in the registry, one here: nobody else is waiting
        if Arc::strong_count(&self.slot) <= 2 {
            registry.remove(&self.key);
        }
    }
}

// == Query Cache ==
/// Tiered cache specialized for query results.
#[derive(Debug, Clone)]
pub struct QueryCache<T> {
    inner: TieredCache<T>,
    in_flight: Arc<Registry>,
}

impl<T> QueryCache<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a query cache with the query baseline configuration.
    pub fn new(remote: Option<RemoteTier>) -> Result<Self> {
        Self::with_config(CacheConfig::query(), remote)
    }

    pub fn with_config(config: CacheConfig, remote: Option<RemoteTier>) -> Result<Self> {
        Ok(Self {
            inner: TieredCache::from_parts(config, remote)?,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// The underlying tiered cache.
    pub fn tiered(&self) -> &TieredCache<T> {
        &self.inner
    }

    /// See [`generate_query_key`].
    pub fn generate_query_key(&self, resource: &str, params: &Value) -> String {
        generate_query_key(resource, params)
    }

    // == Cache Query ==
    /// Returns the cached value for `key`, or runs `producer`, stores its
    /// result and returns it.
    ///
    /// Producer errors are returned as-is and never cached.
    pub async fn cache_query<F, Fut, E>(&self, key: &str, producer: F, ttl: Option<u64>) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.inner.get(key).await {
            return Ok(hit);
        }

        let (_flight, waited) = InFlight::acquire(&self.in_flight, key).await;

        // A concurrent caller may have stored the result between our miss and
        // the slot, whether or not we had to wait for it
        if let Some(hit) = self.inner.peek_local(key).await {
            debug!(key, waited, "Query result produced by concurrent caller");
            return Ok(hit);
        }

        let value = producer().await?;
        self.inner.set(key, value.clone(), ttl).await;
        Ok(value)
    }

    /// Number of keys with a producer currently running or queued.
    pub fn in_flight(&self) -> usize {
        lock_registry(&self.in_flight).len()
    }

    // == Delegated Operations ==
    pub async fn get(&self, key: &str) -> Option<T> {
        self.inner.get(key).await
    }

    pub async fn set(&self, key: &str, value: T, ttl: Option<u64>) {
        self.inner.set(key, value, ttl).await
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.inner.delete(key).await
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.inner.invalidate(key).await
    }

    pub async fn clear(&self, pattern: Option<&str>) {
        self.inner.clear(pattern).await
    }

    /// Drops every cached result for one resource.
    pub async fn invalidate_resource(&self, resource: &str) {
        let pattern = format!("{}:{}:*", QUERY_KEY_PREFIX, resource);
        self.inner.clear(Some(&pattern)).await
    }

    pub async fn get_metrics(&self) -> MetricsSnapshot {
        self.inner.get_metrics().await
    }

    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        self.inner.spawn_sweeper(interval)
    }
}
