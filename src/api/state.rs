//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::{CollectorConfig, ObserverConfig};
use crate::store::StatsStore;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Rolling stats store fed by the collector
    pub store: Arc<StatsStore>,
    /// Collector configuration (paths and upstream endpoints, reused by
    /// the threshold reader and the proxy routes)
    pub collector: Arc<CollectorConfig>,
    /// Observer configuration served to the dashboard
    pub observer: Arc<ObserverConfig>,
    /// HTTP client for proxy routes, shares the collector's timeout
    pub client: Client,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<StatsStore>, collector: CollectorConfig, observer: ObserverConfig) -> Self {
        let client = Client::builder()
            .timeout(collector.fetch_timeout())
            .build()
            .unwrap_or_default();

        Self {
            store,
            collector: Arc::new(collector),
            observer: Arc::new(observer),
            client,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
