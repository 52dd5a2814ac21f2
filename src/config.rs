//! Configuration System
//!
//! Handles loading configuration from TOML files with environment
//! variable overrides; command-line flags (parsed in `main`) are applied
//! on top of whatever is loaded here.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub observer: ObserverConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Collector configuration: endpoints, paths, and cadences
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// Directory holding the snapshot file, pool status, and static assets
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Local miner summary endpoint
    #[serde(default = "default_miner_api_url")]
    pub miner_api_url: String,

    /// Remote node JSON-RPC endpoint
    #[serde(default = "default_node_rpc_url")]
    pub node_rpc_url: String,

    /// Seconds between collection ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Minimum seconds between snapshot saves
    #[serde(default = "default_save_interval_secs")]
    pub save_interval_secs: u64,

    /// Retention horizon in seconds
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Timeout for each external fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./p2pool-data")
}

fn default_miner_api_url() -> String {
    "http://127.0.0.1:42000/2/summary".to_string()
}

fn default_node_rpc_url() -> String {
    "http://127.0.0.1:18089/json_rpc".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

fn default_save_interval_secs() -> u64 {
    10
}

fn default_retention_secs() -> u64 {
    24 * 3600
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            miner_api_url: default_miner_api_url(),
            node_rpc_url: default_node_rpc_url(),
            interval_secs: default_interval_secs(),
            save_interval_secs: default_save_interval_secs(),
            retention_secs: default_retention_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl CollectorConfig {
    /// Path to the persisted snapshot document
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("stats_log.json")
    }

    /// Path to the pool status file written by the pool software
    pub fn pool_stats_path(&self) -> PathBuf {
        self.data_dir.join("pool").join("stats")
    }

    /// Path to the pool configuration file holding the payout threshold
    pub fn stats_mod_path(&self) -> PathBuf {
        self.data_dir.join("stats_mod")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// P2Pool observer configuration served to the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObserverConfig {
    /// Wallet address shown to the observer sites
    #[serde(default)]
    pub wallet: String,

    /// Observer API base URLs, in display order
    #[serde(default)]
    pub observers: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("hashwatch").join("config.toml")),
            Some(PathBuf::from("/etc/hashwatch/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("HASHWATCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("HASHWATCH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(data_dir) = std::env::var("HASHWATCH_DATA_DIR") {
            self.collector.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(url) = std::env::var("XMRIG_API_URL") {
            self.collector.miner_api_url = url;
        }
        if let Ok(url) = std::env::var("MONEROD_RPC_URL") {
            self.collector.node_rpc_url = url;
        }
        if let Ok(level) = std::env::var("HASHWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HASHWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.collector.interval_secs, 10);
        assert_eq!(config.collector.retention_secs, 24 * 3600);
        assert!(config.observer.observers.is_empty());
    }

    #[test]
    fn test_path_helpers() {
        let collector = CollectorConfig {
            data_dir: PathBuf::from("/data"),
            ..Default::default()
        };

        assert_eq!(collector.log_path(), PathBuf::from("/data/stats_log.json"));
        assert_eq!(collector.pool_stats_path(), PathBuf::from("/data/pool/stats"));
        assert_eq!(collector.stats_mod_path(), PathBuf::from("/data/stats_mod"));
    }

    #[test]
    fn test_load_partial_toml_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9000

[collector]
data_dir = "/srv/mining"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.collector.data_dir, PathBuf::from("/srv/mining"));
        assert_eq!(config.collector.interval_secs, 10);
    }

    #[test]
    fn test_load_invalid_toml_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
