//! Fail-open adapter over a remote backend
//!
//! Every method has a total contract: connectivity errors, timeouts and
//! (de)serialization failures are logged and turned into a miss, a
//! "not removed", or a no-op.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{RedisStore, RemoteStore};
use crate::cache::current_timestamp_ms;
use crate::config::RemoteConfig;
use crate::error::{CacheError, Result};

/// Best-effort Tier-2 handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RemoteTier {
    store: Arc<dyn RemoteStore>,
    timeout: Duration,
}

impl RemoteTier {
    /// Wraps a backend, bounding every call by `timeout`.
    pub fn new(store: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Connects to Redis using the configured host, port and credential.
    ///
    /// This is the one fallible entry point: a caller that cannot connect
    /// at startup decides whether to run without Tier-2.
    pub async fn connect(config: &RemoteConfig) -> Result<Self> {
        let store = tokio::time::timeout(config.op_timeout * 10, RedisStore::connect(config))
            .await
            .map_err(|_| {
                CacheError::Remote(format!(
                    "Timed out connecting to {}:{}",
                    config.host, config.port
                ))
            })??;
        Ok(Self::new(Arc::new(store), config.op_timeout))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Set ==
    /// Serializes and writes `value` with a server-side expiry of `ttl_secs`.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_secs: u64) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Remote tier: failed to serialize value");
                return;
            }
        };

        self.run("set", key, self.store.set_raw(key, &payload, ttl_secs))
            .await;
    }

    // == Get ==
    /// Reads and deserializes a value; any failure reads as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.run("get", key, self.store.get_raw(key)).await??;

        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Remote tier: failed to deserialize value");
                None
            }
        }
    }

    // == Delete ==
    /// Returns whether a key was removed; failures read as "not removed".
    pub async fn delete(&self, key: &str) -> bool {
        self.run("delete", key, self.store.delete(key))
            .await
            .unwrap_or(false)
    }

    // == Clear ==
    /// Removes every key matching `pattern` (all keys when `None`).
    ///
    /// Returns the number of keys removed, 0 on failure.
    pub async fn clear(&self, pattern: Option<&str>) -> usize {
        let pattern = pattern.unwrap_or("*");

        let keys = match self.run("keys", pattern, self.store.keys(pattern)).await {
            Some(keys) if !keys.is_empty() => keys,
            _ => return 0,
        };

        let removed = self
            .run("delete_many", pattern, self.store.delete_many(&keys))
            .await
            .unwrap_or(0);
        debug!(pattern, removed, "Remote tier cleared keys");
        removed
    }

    // == Health Check ==
    /// Writes, reads back and deletes a probe key.
    pub async fn health_check(&self) -> bool {
        if self.run("ping", "", self.store.ping()).await.is_none() {
            return false;
        }

        let probe_key = format!("health:check:{}", current_timestamp_ms());
        let probe_value = current_timestamp_ms().to_string();

        self.set(&probe_key, &probe_value, 10).await;
        let read_back: Option<String> = self.get(&probe_key).await;
        self.delete(&probe_key).await;

        read_back.as_deref() == Some(probe_value.as_str())
    }

    async fn run<R, F>(&self, op: &str, key: &str, fut: F) -> Option<R>
    where
        F: Future<Output = Result<R>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(op, key, error = %e, "Remote tier call failed");
                None
            }
            Err(_) => {
                warn!(op, key, timeout_ms = self.timeout.as_millis() as u64, "Remote tier call timed out");
                None
            }
        }
    }
}
