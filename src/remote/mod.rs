//! Remote Tier Module
//!
//! Tier-2: a best-effort key-value store reached over the network.
//!
//! Backends implement [`RemoteStore`], a fallible raw-string contract
//! (`SET .. EX`, `GET`, `DEL`, key listing by glob). [`RemoteTier`] wraps a
//! backend with JSON encoding, a per-call timeout and fail-open semantics,
//! so nothing above it ever sees a remote error.

mod memory;
mod redis;
mod tier;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

pub use self::memory::MemoryRemote;
pub use self::redis::RedisStore;
pub use self::tier::RemoteTier;

// == Remote Store Trait ==
/// Wire contract a Tier-2 backend must support.
#[async_trait]
pub trait RemoteStore: Send + Sync + Debug {
    /// `GET key`
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// `SET key value` with a server-side expiry of `ttl_secs`
    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// `DEL key`, returning whether a key was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Lists keys matching a glob pattern
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// `DEL k1 k2 ..`, returning the number of keys removed
    async fn delete_many(&self, keys: &[String]) -> Result<usize>;

    /// Round-trip liveness probe
    async fn ping(&self) -> Result<()>;
}
