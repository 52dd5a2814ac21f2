//! Stats Routes
//!
//! Serves the rolling window and derived dashboard values:
//!
//! - GET /stats_log.json - the retained window as five parallel arrays
//! - GET /min_payment_threshold - pool payout threshold in whole XMR
//! - GET /observer_config - wallet and observer URLs for the dashboard

use axum::{extract::State, Json};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::api::state::AppState;
use crate::store::StatsWindow;

/// Threshold returned when the pool config file is missing or unreadable
const DEFAULT_MIN_PAYMENT_THRESHOLD: f64 = 0.01;

/// Smallest currency unit per whole XMR (piconero)
const ATOMIC_UNITS: f64 = 1e12;

/// GET /stats_log.json
///
/// Always well-formed: an empty store serves five empty arrays.
pub async fn stats_log(State(state): State<Arc<AppState>>) -> Json<StatsWindow> {
    Json(state.store.snapshot().await)
}

/// Payout threshold response body
#[derive(Debug, Serialize)]
pub struct ThresholdResponse {
    #[serde(rename = "minPaymentThreshold")]
    pub min_payment_threshold: f64,
}

/// GET /min_payment_threshold
pub async fn min_payment_threshold(State(state): State<Arc<AppState>>) -> Json<ThresholdResponse> {
    Json(ThresholdResponse {
        min_payment_threshold: read_min_payment_threshold(&state.collector.stats_mod_path()),
    })
}

/// Read `config.minPaymentThreshold` (in atomic units) from the pool's
/// stats_mod file and convert to whole XMR. Any read or parse failure
/// falls back to the documented default.
pub fn read_min_payment_threshold(path: &Path) -> f64 {
    fn parse(path: &Path) -> Option<f64> {
        let content = std::fs::read_to_string(path).ok()?;
        let doc: serde_json::Value = serde_json::from_str(&content).ok()?;
        let atomic = doc.get("config")?.get("minPaymentThreshold")?.as_f64()?;
        Some(atomic / ATOMIC_UNITS)
    }

    parse(path).unwrap_or_else(|| {
        tracing::debug!(path = %path.display(), "No readable payout threshold, using default");
        DEFAULT_MIN_PAYMENT_THRESHOLD
    })
}

/// Observer configuration response body
#[derive(Debug, Serialize)]
pub struct ObserverResponse {
    pub wallet: String,
    pub observers: Vec<String>,
}

/// GET /observer_config
pub async fn observer_config(State(state): State<Arc<AppState>>) -> Json<ObserverResponse> {
    Json(ObserverResponse {
        wallet: state.observer.wallet.clone(),
        observers: state.observer.observers.clone(),
    })
}
