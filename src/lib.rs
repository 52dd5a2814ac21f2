//! # Hashwatch
//!
//! A small metrics-aggregation service for a home mining setup: it
//! periodically polls a local miner, a pool-status file, and a remote
//! node, combines them with a currency price from an ordered chain of
//! external sources, and retains a 24-hour rolling window of aligned
//! samples in memory (mirrored to disk) for an HTTP dashboard.
//!
//! ## Modules
//!
//! - [`store`]: Rolling time-series store and its on-disk mirror
//! - [`collector`]: Periodic collection loop and stat fetchers
//! - [`price`]: Multi-source price resolution with ordered fallback
//! - [`api`]: HTTP serving layer with Axum
//! - [`config`]: TOML/env configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hashwatch::collector::Collector;
//! use hashwatch::config::Config;
//! use hashwatch::store::{SnapshotFile, StatsStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_default();
//!
//!     // Rehydrate the window from the previous run, then collect.
//!     let store = Arc::new(StatsStore::with_horizon(config.collector.retention()));
//!     store.restore(SnapshotFile::new(config.collector.log_path()).load()).await;
//!
//!     let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let collector = Collector::new(config.collector.clone(), Arc::clone(&store));
//!     tokio::spawn(collector.run(shutdown_rx));
//!
//!     // ... serve hashwatch::api over the same store ...
//!     # let _ = shutdown_tx;
//! }
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod price;
pub mod store;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};
pub use collector::{Collector, CollectorError};
pub use config::{CollectorConfig, Config, ConfigError, ObserverConfig, ServerConfig};
pub use price::{PriceError, PriceResolver, PriceSource};
pub use store::{Sample, SnapshotFile, StatsStore, StatsWindow, StoreError};
