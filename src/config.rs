//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from
//! environment variables. Cache configuration is fixed once a cache
//! instance is constructed; there is no runtime reconfiguration.

use std::env;
use std::time::Duration;

use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default TTL in seconds for general-purpose caches
pub const DEFAULT_TTL_SECS: u64 = ttl::VERY_LONG;

/// Default memory ceiling in MB for general-purpose caches
pub const DEFAULT_MAX_MEMORY_MB: f64 = 100.0;

/// Default TTL in seconds for query caches
pub const QUERY_TTL_SECS: u64 = ttl::MEDIUM;

/// Default memory ceiling in MB for query caches
pub const QUERY_MAX_MEMORY_MB: f64 = 50.0;

/// Default interval between eviction sweeps
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// TTL presets in seconds for common cache uses.
pub mod ttl {
    pub const SHORT: u64 = 60;
    pub const MEDIUM: u64 = 300;
    pub const LONG: u64 = 1800;
    pub const VERY_LONG: u64 = 3600;
    pub const DAILY: u64 = 86_400;
    pub const WEEKLY: u64 = 604_800;
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Cache Config ==
/// Per-instance cache parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL in seconds applied when a write carries no explicit TTL
    pub default_ttl: u64,
    /// Memory ceiling enforced by the eviction sweeper
    pub max_memory_mb: f64,
    /// Whether hit/miss/set/delete counters are recorded
    pub metrics_enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL_SECS,
            max_memory_mb: DEFAULT_MAX_MEMORY_MB,
            metrics_enabled: true,
        }
    }
}

impl CacheConfig {
    /// Baseline for query-result caches: shorter TTL, smaller budget.
    pub fn query() -> Self {
        Self {
            default_ttl: QUERY_TTL_SECS,
            max_memory_mb: QUERY_MAX_MEMORY_MB,
            metrics_enabled: true,
        }
    }

    /// Loads overrides from `DEFAULT_TTL`, `MAX_MEMORY_MB` and
    /// `METRICS_ENABLED`, falling back to `Default`.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            default_ttl: env_or("DEFAULT_TTL", base.default_ttl),
            max_memory_mb: env_or("MAX_MEMORY_MB", base.max_memory_mb),
            metrics_enabled: env_or("METRICS_ENABLED", base.metrics_enabled),
        }
    }

    pub fn with_default_ttl(mut self, ttl: u64) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_max_memory_mb(mut self, mb: f64) -> Self {
        self.max_memory_mb = mb;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Rejects a zero TTL and a non-positive or non-finite memory ceiling.
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl == 0 {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        if !self.max_memory_mb.is_finite() || self.max_memory_mb <= 0.0 {
            return Err(CacheError::InvalidConfig(format!(
                "max_memory_mb must be a positive number, got {}",
                self.max_memory_mb
            )));
        }
        Ok(())
    }
}

// == Remote Config ==
/// Connection parameters for the remote key-value tier.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Whether the remote tier should be used at all
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Optional credential
    pub password: Option<String>,
    /// Logical database index
    pub db: u32,
    /// Namespace prepended to every remote key as `prefix:key`
    pub key_prefix: Option<String>,
    /// Upper bound for any single remote call
    pub op_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            key_prefix: None,
            op_timeout: Duration::from_millis(500),
        }
    }
}

impl RemoteConfig {
    /// Loads the remote tier configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `REDIS_ENABLED` - Use the remote tier (default: true)
    /// - `REDIS_HOST` - Host name (default: localhost)
    /// - `REDIS_PORT` - Port (default: 6379)
    /// - `REDIS_PASSWORD` - Optional password
    /// - `REDIS_DB` - Database index (default: 0)
    /// - `REDIS_KEY_PREFIX` - Optional key namespace
    /// - `REDIS_TIMEOUT_MS` - Per-call timeout in milliseconds (default: 500)
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            enabled: env_or("REDIS_ENABLED", base.enabled),
            host: env::var("REDIS_HOST").unwrap_or(base.host),
            port: env_or("REDIS_PORT", base.port),
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: env_or("REDIS_DB", base.db),
            key_prefix: env::var("REDIS_KEY_PREFIX").ok().filter(|p| !p.is_empty()),
            op_timeout: Duration::from_millis(env_or(
                "REDIS_TIMEOUT_MS",
                base.op_timeout.as_millis() as u64,
            )),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Connection parameters for the Redis client.
    ///
    /// Built field by field rather than as a `redis://` URL, so a password
    /// containing URL delimiters (`@`, `/`, `:`, `#`) reaches the server as-is.
    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                db: i64::from(self.db),
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Eviction sweep interval in seconds
    pub sweep_interval: u64,
    /// Tier-1 parameters for the served cache
    pub cache: CacheConfig,
    /// Tier-2 connection parameters
    pub remote: RemoteConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Eviction sweep frequency in seconds (default: 300)
    /// - plus everything read by [`CacheConfig::from_env`] and [`RemoteConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 3000),
            sweep_interval: env_or("SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL_SECS),
            cache: CacheConfig::from_env(),
            remote: RemoteConfig::from_env(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_SECS,
            cache: CacheConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}
