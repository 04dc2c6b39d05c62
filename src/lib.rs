//! Tiered Cache - a two-tier caching layer
//!
//! Tier-1 is an in-process entry store with per-entry TTL, hit counting
//! and least-used eviction under a memory budget. Tier-2 is an optional
//! Redis store that fails open: when it is unreachable the cache keeps
//! serving from Tier-1 alone.
//!
//! [`QueryCache`] specializes the tiered cache for query results with
//! canonical keys and a single-flight compute-if-absent wrapper.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pattern;
pub mod query;
pub mod remote;
pub mod tasks;
pub mod tiered;

pub use api::AppState;
pub use config::{CacheConfig, Config, RemoteConfig};
pub use error::{CacheError, Result};
pub use query::{generate_query_key, QueryCache};
pub use remote::{MemoryRemote, RedisStore, RemoteStore, RemoteTier};
pub use tasks::spawn_sweeper;
pub use tiered::TieredCache;
