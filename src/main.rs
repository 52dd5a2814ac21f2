//! Hashwatch server
//!
//! Collects mining stats into a rolling window and serves them to the
//! dashboard.
//!
//! # Configuration
//!
//! Config file (TOML) and environment variables, overridden by flags:
//! - `HASHWATCH_HOST` / `HASHWATCH_PORT`: bind address
//! - `HASHWATCH_DATA_DIR`: data directory (default: ./p2pool-data)
//! - `XMRIG_API_URL`: miner summary endpoint
//! - `MONEROD_RPC_URL`: node JSON-RPC endpoint
//! - `HASHWATCH_LOG_LEVEL` / `RUST_LOG`: log level (default: info)

use anyhow::Context;
use clap::Parser;
use hashwatch::api::{serve, shutdown_signal, AppState};
use hashwatch::collector::Collector;
use hashwatch::config::Config;
use hashwatch::store::{SnapshotFile, StatsStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "hashwatch", about = "Mining stats aggregator and dashboard server")]
struct Args {
    /// HTTP server port
    #[arg(long)]
    port: Option<u16>,

    /// Directory to store logs and serve static assets from
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Monero wallet address for the p2pool observer links
    #[arg(long)]
    wallet: Option<String>,

    /// Enable p2pool.observer
    #[arg(long)]
    normal_p2pool: bool,

    /// Enable mini.p2pool.observer
    #[arg(long)]
    mini_p2pool: bool,

    /// Enable nano.p2pool.observer
    #[arg(long)]
    nano_p2pool: bool,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("hashwatch={}", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Hashwatch v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.collector.data_dir);

    std::fs::create_dir_all(&config.collector.data_dir)
        .with_context(|| format!("creating data directory {:?}", config.collector.data_dir))?;

    // Rehydrate the window from the previous run before the collector
    // starts appending, so old entries are not overwritten.
    let store = Arc::new(StatsStore::with_horizon(config.collector.retention()));
    let snapshot = SnapshotFile::new(config.collector.log_path());
    store.restore(snapshot.load()).await;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let collector = Collector::new(config.collector.clone(), Arc::clone(&store));
    let collector_handle = tokio::spawn(collector.run(shutdown_rx));

    let state = AppState::new(
        Arc::clone(&store),
        config.collector.clone(),
        config.observer.clone(),
    );
    serve(state, &config.server, shutdown_signal())
        .await
        .context("API server failed")?;

    // Server is down; stop the collector and wait for its final save.
    tracing::info!("Stopping collector...");
    let _ = shutdown_tx.send(true);
    collector_handle.await.context("collector task panicked")?;

    tracing::info!("Hashwatch stopped cleanly");
    Ok(())
}

/// Load config from file/env, then apply command-line overrides
fn load_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = &args.data_dir {
        config.collector.data_dir = data_dir.clone();
    }
    if let Some(wallet) = &args.wallet {
        config.observer.wallet = wallet.clone();
    }
    if args.normal_p2pool {
        config
            .observer
            .observers
            .push("https://p2pool.observer/api".to_string());
    }
    if args.mini_p2pool {
        config
            .observer
            .observers
            .push("https://mini.p2pool.observer/api".to_string());
    }
    if args.nano_p2pool {
        config
            .observer
            .observers
            .push("https://nano.p2pool.observer/api".to_string());
    }

    Ok(config)
}
