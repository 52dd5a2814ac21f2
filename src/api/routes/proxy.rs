//! Proxy Routes
//!
//! Pass-through endpoints for the dashboard's direct views of the miner
//! and the node. Upstream responses are forwarded as-is; upstream
//! failures are returned to the caller rather than substituted.
//!
//! - GET /xmrig_summary - proxies the miner summary endpoint
//! - GET /monerod_stats - sends a get_info RPC to the node

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /xmrig_summary
pub async fn xmrig_summary(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let response = state
        .client
        .get(&state.collector.miner_api_url)
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    forward(response).await
}

/// GET /monerod_stats
pub async fn monerod_stats(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let response = state
        .client
        .post(&state.collector.node_rpc_url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": "0",
            "method": "get_info"
        }))
        .send()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    forward(response).await
}

/// Forward an upstream response body and status unchanged
async fn forward(response: reqwest::Response) -> ApiResult<Response> {
    // reqwest and axum track different http crate versions, so the
    // status code goes through its numeric value.
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_vec(),
    )
        .into_response())
}
