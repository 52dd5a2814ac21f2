//! Health Routes
//!
//! - GET /health/live - liveness probe (process is alive)
//! - GET /health/ready - readiness probe (store is answering)
//! - GET /health - full health status

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the store answers reads. The store is in-process,
/// so this only fails if the runtime itself is wedged.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    let _ = state.store.len().await;
    StatusCode::OK
}

/// Full health response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub samples_retained: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        samples_retained: state.store.len().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
