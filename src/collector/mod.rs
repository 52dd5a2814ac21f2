//! Periodic collection loop
//!
//! Every tick the collector gathers one aligned reading from the local
//! miner, the pool status file, and the remote node, resolves the
//! current price, and appends the combined sample to the store. Any
//! failure among the three stat sources abandons the whole tick: no
//! partial sample is ever appended. Price resolution has its own
//! fallback and never fails a tick.
//!
//! The loop observes a watch-channel shutdown signal, wakes promptly
//! when it fires, and performs one final unconditional save before
//! returning.

pub mod sources;

pub use sources::{fetch_miner_hashrate, fetch_network_hashrate, read_pool_hashrate, BLOCK_TIME_SECS};

use crate::config::CollectorConfig;
use crate::price::PriceResolver;
use crate::store::{Sample, SnapshotFile, StatsStore};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Errors that abort a single collection tick
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Parse(String),
}

/// The periodic collection task
pub struct Collector {
    config: CollectorConfig,
    client: Client,
    store: Arc<StatsStore>,
    snapshot: SnapshotFile,
    resolver: PriceResolver,
}

impl Collector {
    /// Collector over the standard price source chain
    pub fn new(config: CollectorConfig, store: Arc<StatsStore>) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .unwrap_or_default();
        let snapshot = SnapshotFile::new(config.log_path());
        let resolver = PriceResolver::new(client.clone(), snapshot.clone());

        Self {
            config,
            client,
            store,
            snapshot,
            resolver,
        }
    }

    /// Collector with an explicit price resolver (used by tests)
    pub fn with_resolver(
        config: CollectorConfig,
        store: Arc<StatsStore>,
        resolver: PriceResolver,
    ) -> Self {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .unwrap_or_default();
        let snapshot = SnapshotFile::new(config.log_path());

        Self {
            config,
            client,
            store,
            snapshot,
            resolver,
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// Ticks immediately on start, then once per interval. The inter-tick
    /// wait races the sleep against the shutdown channel so cancellation
    /// never waits out a full interval.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut last_save: Option<Instant> = None;

        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.tick().await {
                Ok(()) => {
                    let due = last_save
                        .map(|t| t.elapsed() >= self.config.save_interval())
                        .unwrap_or(true);
                    if due {
                        self.save().await;
                        last_save = Some(Instant::now());
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Collection tick failed, skipping");
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval()) => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Persist whatever we have before exiting.
        self.save().await;
        tracing::info!("Collector stopped");
    }

    /// Gather one aligned sample and append it.
    ///
    /// Fails as a unit: if any stat source errors, nothing is appended.
    pub async fn tick(&self) -> Result<(), CollectorError> {
        let local = fetch_miner_hashrate(&self.client, &self.config.miner_api_url).await?;
        let pool = read_pool_hashrate(&self.config.pool_stats_path()).await?;
        let network = fetch_network_hashrate(&self.client, &self.config.node_rpc_url).await?;
        let price = self.resolver.resolve().await;

        let sample = Sample::now(local, pool, network, price);
        tracing::debug!(
            local,
            pool,
            network,
            price,
            "Collected sample"
        );
        self.store.append(sample).await;
        Ok(())
    }

    /// Persist a fresh snapshot; write failures are logged, not fatal
    async fn save(&self) {
        let window = self.store.snapshot().await;
        if let Err(e) = self.snapshot.save(&window) {
            tracing::error!(error = %e, path = %self.snapshot.path().display(), "Failed to persist stats window");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, routing::post, Json, Router};
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> CollectorConfig {
        CollectorConfig {
            data_dir: dir.to_path_buf(),
            // Nothing listens here; fetches fail fast with refused connections
            miner_api_url: "http://127.0.0.1:9/2/summary".to_string(),
            node_rpc_url: "http://127.0.0.1:9/json_rpc".to_string(),
            fetch_timeout_secs: 1,
            ..Default::default()
        }
    }

    fn stub_resolver(dir: &std::path::Path, price: f64) -> PriceResolver {
        use crate::price::{PriceError, PriceSource};

        struct Stub(f64);

        #[async_trait::async_trait]
        impl PriceSource for Stub {
            fn name(&self) -> &str {
                "stub"
            }

            async fn fetch(&self, _client: &Client) -> Result<f64, PriceError> {
                Ok(self.0)
            }
        }

        PriceResolver::with_sources(
            Client::new(),
            vec![Box::new(Stub(price))],
            SnapshotFile::new(dir.join("stats_log.json")),
        )
    }

    /// Serve miner-summary and node-RPC fixtures on an ephemeral port
    async fn spawn_fixture_server() -> String {
        let app = Router::new()
            .route(
                "/2/summary",
                get(|| async {
                    Json(serde_json::json!({
                        "hashrate": { "total": [1500.0, 1480.0, null] }
                    }))
                }),
            )
            .route(
                "/json_rpc",
                post(|| async {
                    Json(serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": "0",
                        "result": { "difficulty": 360_000_000_000.0 }
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_tick_appends_one_sample() {
        let dir = tempdir().unwrap();
        let base = spawn_fixture_server().await;

        std::fs::create_dir_all(dir.path().join("pool")).unwrap();
        std::fs::write(
            dir.path().join("pool/stats"),
            r#"{"pool_statistics":{"hashRate":2500.0}}"#,
        )
        .unwrap();

        let config = CollectorConfig {
            data_dir: dir.path().to_path_buf(),
            miner_api_url: format!("{}/2/summary", base),
            node_rpc_url: format!("{}/json_rpc", base),
            fetch_timeout_secs: 1,
            ..Default::default()
        };

        let store = Arc::new(StatsStore::new());
        let collector =
            Collector::with_resolver(config, Arc::clone(&store), stub_resolver(dir.path(), 150.0));

        collector.tick().await.unwrap();

        let window = store.snapshot().await;
        assert_eq!(window.len(), 1);
        assert_eq!(window.local_hashrate, vec![1500.0]);
        assert_eq!(window.pool_hashrate, vec![2500.0]);
        assert_eq!(window.network_hashrate, vec![360_000_000_000.0 / 120.0]);
        assert_eq!(window.price, vec![150.0]);
    }

    #[tokio::test]
    async fn test_failed_tick_appends_nothing() {
        let dir = tempdir().unwrap();
        let store = Arc::new(StatsStore::new());
        let collector = Collector::with_resolver(
            test_config(dir.path()),
            Arc::clone(&store),
            stub_resolver(dir.path(), 150.0),
        );

        assert!(collector.tick().await.is_err());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_missing_pool_file_aborts_tick() {
        let dir = tempdir().unwrap();
        let base = spawn_fixture_server().await;

        // Miner and node respond, but the pool status file does not exist.
        let config = CollectorConfig {
            data_dir: dir.path().to_path_buf(),
            miner_api_url: format!("{}/2/summary", base),
            node_rpc_url: format!("{}/json_rpc", base),
            fetch_timeout_secs: 1,
            ..Default::default()
        };

        let store = Arc::new(StatsStore::new());
        let collector =
            Collector::with_resolver(config, Arc::clone(&store), stub_resolver(dir.path(), 150.0));

        let result = collector.tick().await;
        assert!(matches!(result, Err(CollectorError::Io(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_run_saves_on_shutdown() {
        let dir = tempdir().unwrap();
        let store = Arc::new(StatsStore::new());
        store
            .append(Sample::at(1, 100.0, 2000.0, 3.0e9, 150.0))
            .await;

        let config = test_config(dir.path());
        let log_path = config.log_path();
        let collector = Collector::with_resolver(
            config,
            Arc::clone(&store),
            stub_resolver(dir.path(), 150.0),
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(collector.run(rx));

        // Give the loop time to enter its inter-tick wait, then signal.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        tx.send(true).unwrap();

        // The loop must exit promptly rather than waiting out the interval.
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("collector did not stop promptly")
            .unwrap();

        let persisted = SnapshotFile::new(log_path).load();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted.timestamps, vec![1]);
    }
}
