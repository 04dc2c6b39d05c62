//! Eviction Sweeper Task
//!
//! Background task that periodically runs the Tier-1 sweep: an expiry pass
//! followed by an LFU budget pass when memory usage is over the ceiling.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a background task that sweeps the store on a fixed interval.
///
/// The task sleeps for `interval` between runs and holds the store's write
/// lock only for the duration of one sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = EntryStore::<String>::shared(CacheConfig::default());
/// let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweeper<T>(store: SharedStore<T>, interval: Duration) -> JoinHandle<()>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting eviction sweeper with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let report = {
                let mut guard = store.write().await;
                guard.sweep()
            };

            if report.expired > 0 || report.evicted > 0 {
                info!(
                    expired = report.expired,
                    evicted = report.evicted,
                    memory_usage_mb = report.memory_usage_mb,
                    "Eviction sweep removed entries"
                );
            } else {
                debug!(
                    memory_usage_mb = report.memory_usage_mb,
                    "Eviction sweep: nothing to remove"
                );
            }
        }
    })
}
