//! Rolling time-series store
//!
//! `StatsStore` owns the retained window behind a `tokio::sync::RwLock`:
//! single writer (the collector), any number of concurrent readers (the
//! API handlers). The lock is held only for the duration of the in-memory
//! mutation or copy, never across I/O.

use crate::store::types::{Sample, StatsWindow};
use std::time::Duration;
use tokio::sync::RwLock;

/// Default retention horizon: keep the last 24 hours of samples
pub const DEFAULT_HORIZON: Duration = Duration::from_secs(24 * 3600);

/// Fixed-horizon rolling buffer of aligned samples
pub struct StatsStore {
    window: RwLock<StatsWindow>,
    horizon_secs: i64,
}

impl StatsStore {
    /// Create an empty store with the default 24h horizon
    pub fn new() -> Self {
        Self::with_horizon(DEFAULT_HORIZON)
    }

    /// Create an empty store with a custom retention horizon
    pub fn with_horizon(horizon: Duration) -> Self {
        Self {
            window: RwLock::new(StatsWindow::new()),
            horizon_secs: horizon.as_secs() as i64,
        }
    }

    /// Append a sample at the tail, then evict every sample older than
    /// `sample.timestamp - horizon` from the front.
    ///
    /// Samples arrive in timestamp order (one writer, one sample per
    /// tick), so eviction is always a prefix.
    pub async fn append(&self, sample: Sample) {
        let cutoff = sample.timestamp - self.horizon_secs;
        let mut window = self.window.write().await;

        window.push(sample);

        let stale = window
            .timestamps
            .iter()
            .take_while(|&&ts| ts < cutoff)
            .count();
        if stale > 0 {
            window.drain_front(stale);
        }
    }

    /// Consistent copy of the currently retained window
    pub async fn snapshot(&self) -> StatsWindow {
        self.window.read().await.clone()
    }

    /// Replace the contents wholesale.
    ///
    /// Used once at startup, before the collector starts appending.
    pub async fn restore(&self, window: StatsWindow) {
        *self.window.write().await = window;
    }

    /// Number of retained samples
    pub async fn len(&self) -> usize {
        self.window.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.window.read().await.is_empty()
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}
