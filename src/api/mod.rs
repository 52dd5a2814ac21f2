//! Hashwatch HTTP API
//!
//! Serving layer for the dashboard, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /stats_log.json` - rolling window as five parallel arrays
//! - `GET /min_payment_threshold` - pool payout threshold in whole XMR
//! - `GET /observer_config` - wallet and observer URLs
//! - `GET /xmrig_summary` - pass-through proxy of the miner summary
//! - `GET /monerod_stats` - get_info RPC proxied to the node
//! - `GET /health/live`, `GET /health/ready`, `GET /health` - probes
//! - everything else - static dashboard assets from the data directory

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::ServerConfig;
use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.collector.data_dir);

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .route("/stats_log.json", get(routes::stats::stats_log))
        .route("/min_payment_threshold", get(routes::stats::min_payment_threshold))
        .route("/observer_config", get(routes::stats::observer_config))
        .route("/xmrig_summary", get(routes::proxy::xmrig_summary))
        .route("/monerod_stats", get(routes::proxy::monerod_stats))
        .nest("/health", health_routes)
        .fallback_service(static_dir)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server, shutting down gracefully when `shutdown` resolves
pub async fn serve(
    state: AppState,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Hashwatch API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Hashwatch API shut down gracefully");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
