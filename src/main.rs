//! Tiered Cache - admin server
//!
//! Serves a `TieredCache<serde_json::Value>` over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::api::create_router;
use tiered_cache::{AppState, Config, RemoteTier};

/// Main entry point for the tiered cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the remote tier (optional; runs Tier-1 only on failure)
/// 4. Start the background eviction sweeper
/// 5. Start the HTTP server on the configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tiered Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, max_memory={}MB, port={}, sweep_interval={}s",
        config.cache.default_ttl,
        config.cache.max_memory_mb,
        config.server_port,
        config.sweep_interval
    );

    let remote = if config.remote.enabled {
        match RemoteTier::connect(&config.remote).await {
            Ok(remote) => {
                info!(
                    "Remote tier connected at {}:{}",
                    config.remote.host, config.remote.port
                );
                Some(remote)
            }
            Err(e) => {
                warn!(error = %e, "Remote tier unavailable, running with tier-1 only");
                None
            }
        }
    } else {
        info!("Remote tier disabled");
        None
    };

    let state = AppState::from_config(&config, remote)?;

    let sweeper_handle = state
        .cache
        .spawn_sweeper(Duration::from_secs(config.sweep_interval));
    info!("Background eviction sweeper started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper_handle))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the sweeper.
async fn shutdown_signal(sweeper_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper_handle.abort();
    warn!("Eviction sweeper aborted");
}
