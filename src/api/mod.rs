//! API Module
//!
//! HTTP handlers and routing for the cache admin API.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key from both tiers
//! - `POST /clear` - Clear everything or keys matching `?pattern=`
//! - `GET /metrics` - Tier-1 metrics
//! - `GET /health` - Health check, including remote tier reachability

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
