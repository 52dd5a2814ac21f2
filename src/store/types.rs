//! Core data types for the rolling stats store
//!
//! - `Sample`: one aligned collection tick (timestamp + three hashrates + price)
//! - `StatsWindow`: the snapshot form — five parallel columns of equal length,
//!   used both for serving and for the on-disk mirror

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One collected data point.
///
/// All rates are hash/sec; `price` uses `0.0` as the "unknown" sentinel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    /// Unix timestamp in seconds
    pub timestamp: i64,
    /// Hashrate reported by the local miner
    pub local_hashrate: f64,
    /// Hashrate reported by the pool
    pub pool_hashrate: f64,
    /// Network hashrate derived from difficulty
    pub network_hashrate: f64,
    /// Currency price at collection time
    pub price: f64,
}

impl Sample {
    /// Create a sample stamped with the current wall-clock time
    pub fn now(local_hashrate: f64, pool_hashrate: f64, network_hashrate: f64, price: f64) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            local_hashrate,
            pool_hashrate,
            network_hashrate,
            price,
        }
    }

    /// Create a sample with an explicit timestamp
    pub fn at(
        timestamp: i64,
        local_hashrate: f64,
        pool_hashrate: f64,
        network_hashrate: f64,
        price: f64,
    ) -> Self {
        Self {
            timestamp,
            local_hashrate,
            pool_hashrate,
            network_hashrate,
            price,
        }
    }
}

/// A consistent copy of the retained window as five parallel columns.
///
/// This is both the HTTP response body for the dashboard and the persisted
/// snapshot document. Invariant: all five columns have equal length.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsWindow {
    pub timestamps: Vec<i64>,
    #[serde(rename = "localHashrate")]
    pub local_hashrate: Vec<f64>,
    #[serde(rename = "poolHashrate")]
    pub pool_hashrate: Vec<f64>,
    #[serde(rename = "networkHashrate")]
    pub network_hashrate: Vec<f64>,
    pub price: Vec<f64>,
}

impl StatsWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of samples in the window
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Check that all five columns line up (used to reject malformed
    /// snapshot files)
    pub fn is_aligned(&self) -> bool {
        let n = self.timestamps.len();
        self.local_hashrate.len() == n
            && self.pool_hashrate.len() == n
            && self.network_hashrate.len() == n
            && self.price.len() == n
    }

    pub fn push(&mut self, sample: Sample) {
        self.timestamps.push(sample.timestamp);
        self.local_hashrate.push(sample.local_hashrate);
        self.pool_hashrate.push(sample.pool_hashrate);
        self.network_hashrate.push(sample.network_hashrate);
        self.price.push(sample.price);
    }

    /// Drop the oldest `count` samples from every column
    pub fn drain_front(&mut self, count: usize) {
        self.timestamps.drain(..count);
        self.local_hashrate.drain(..count);
        self.pool_hashrate.drain(..count);
        self.network_hashrate.drain(..count);
        self.price.drain(..count);
    }

    /// Sample at index `i`, if in range
    pub fn get(&self, i: usize) -> Option<Sample> {
        Some(Sample {
            timestamp: *self.timestamps.get(i)?,
            local_hashrate: *self.local_hashrate.get(i)?,
            pool_hashrate: *self.pool_hashrate.get(i)?,
            network_hashrate: *self.network_hashrate.get(i)?,
            price: *self.price.get(i)?,
        })
    }
}

impl FromIterator<Sample> for StatsWindow {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        let mut window = StatsWindow::new();
        for sample in iter {
            window.push(sample);
        }
        window
    }
}
