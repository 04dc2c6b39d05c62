//! Response DTOs for the cache admin API
//!
//! Defines the structure of outgoing HTTP response bodies. Metrics are
//! served as [`MetricsSnapshot`](crate::cache::MetricsSnapshot) directly.

use serde::Serialize;
use serde_json::Value;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    /// TTL actually applied, after defaulting
    pub ttl: u64,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Stored '{}' for {}s", key, ttl),
            key,
            ttl,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Removed '{}' from all tiers", key),
            key,
        }
    }
}

/// Response body for the CLEAR operation (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Pattern that was cleared, if any
    pub pattern: Option<String>,
}

impl ClearResponse {
    pub fn new(pattern: Option<String>) -> Self {
        let message = match &pattern {
            Some(p) => format!("Keys matching '{}' cleared", p),
            None => "Cache cleared".to_string(),
        };
        Self { message, pattern }
    }
}

/// Reachability of the remote tier as seen by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    /// Probe round-trip succeeded
    Connected,
    /// Probe failed; reads fall back to Tier-1 only
    Unavailable,
    /// No remote tier configured
    Disabled,
}

/// Response body for the health endpoint (GET /health)
///
/// The cache stays usable without its remote tier, so `status` is
/// "healthy" whenever the server answers; `remote` reports Tier-2.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Remote tier reachability
    pub remote: RemoteStatus,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(remote: RemoteStatus) -> Self {
        Self {
            status: "healthy".to_string(),
            remote,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("test_key", json!({"id": 5}));
        let raw = serde_json::to_string(&resp).unwrap();
        assert!(raw.contains("test_key"));
        assert!(raw.contains("\"id\":5"));
    }

    #[test]
    fn test_set_response_reports_ttl() {
        let value = serde_json::to_value(SetResponse::new("session:9", 300)).unwrap();
        assert_eq!(value["key"], "session:9");
        assert_eq!(value["ttl"], 300);
        assert_eq!(value["message"], "Stored 'session:9' for 300s");
    }

    #[test]
    fn test_delete_response_message() {
        let resp = DeleteResponse::new("user:1");
        assert_eq!(resp.message, "Removed 'user:1' from all tiers");
    }

    #[test]
    fn test_clear_response_messages() {
        assert_eq!(ClearResponse::new(None).message, "Cache cleared");
        let scoped = ClearResponse::new(Some("query:*".to_string()));
        assert!(scoped.message.contains("query:*"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy(RemoteStatus::Disabled);
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["remote"], "disabled");
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let raw = serde_json::to_string(&resp).unwrap();
        assert!(raw.contains("error"));
        assert!(raw.contains("Something went wrong"));
    }
}
