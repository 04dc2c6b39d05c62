//! API Handlers
//!
//! HTTP request handlers for each admin endpoint. Values are arbitrary
//! JSON documents stored in a `TieredCache<Value>`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::MetricsSnapshot;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearRequest, ClearResponse, DeleteResponse, GetResponse, HealthResponse, RemoteStatus,
    SetRequest, SetResponse,
};
use crate::remote::RemoteTier;
use crate::tiered::TieredCache;

/// Application state shared across all handlers.
///
/// `TieredCache` is a cheap handle over shared tiers, so cloning the state
/// per request is fine.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The served cache
    pub cache: TieredCache<Value>,
}

impl AppState {
    /// Creates a new AppState with the given cache.
    pub fn new(cache: TieredCache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration and an optional remote tier.
    pub fn from_config(config: &Config, remote: Option<RemoteTier>) -> Result<Self> {
        let cache = TieredCache::from_parts(config.cache.clone(), remote)?;
        Ok(Self::new(cache))
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value in both tiers with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = state.cache.effective_ttl(req.ttl);
    state.cache.set(&req.key, req.value, Some(ttl)).await;

    Ok(Json(SetResponse::new(req.key, ttl)))
}

/// Handler for GET /get/:key
///
/// Misses in both tiers map to 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.cache.delete(&key).await {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(CacheError::NotFound(key))
    }
}

/// Handler for POST /clear
///
/// Clears everything, or only keys matching `?pattern=<glob>`.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(req): Query<ClearRequest>,
) -> Json<ClearResponse> {
    state.cache.clear(req.pattern.as_deref()).await;
    info!(pattern = ?req.pattern, "Cache cleared via admin API");

    Json(ClearResponse::new(req.pattern))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.cache.get_metrics().await)
}

/// Handler for GET /health
///
/// Probes the remote tier when one is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let remote = match state.cache.remote() {
        None => RemoteStatus::Disabled,
        Some(remote) => {
            if remote.health_check().await {
                RemoteStatus::Connected
            } else {
                RemoteStatus::Unavailable
            }
        }
    };

    Json(HealthResponse::healthy(remote))
}
