//! Stat source fetchers
//!
//! Each fetcher pulls one reading for a collection tick: the local miner
//! summary, the pool status file, and the remote node's chain info.

use super::CollectorError;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// Average block time used to derive network hashrate from difficulty
pub const BLOCK_TIME_SECS: f64 = 120.0;

/// Fetch the miner's current hashrate from its HTTP summary endpoint.
///
/// The summary reports `hashrate.total` as an array of rolling averages;
/// the first element is the short-window rate.
pub async fn fetch_miner_hashrate(client: &Client, url: &str) -> Result<f64, CollectorError> {
    #[derive(Deserialize)]
    struct Summary {
        hashrate: Hashrate,
    }

    #[derive(Deserialize)]
    struct Hashrate {
        total: Vec<Option<f64>>,
    }

    let summary: Summary = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    summary
        .hashrate
        .total
        .first()
        .copied()
        .flatten()
        .ok_or_else(|| CollectorError::Parse("miner summary has no hashrate.total[0]".to_string()))
}

/// Read the pool's reported hashrate from its status file
pub async fn read_pool_hashrate(path: &Path) -> Result<f64, CollectorError> {
    #[derive(Deserialize)]
    struct Status {
        pool_statistics: PoolStatistics,
    }

    #[derive(Deserialize)]
    struct PoolStatistics {
        #[serde(rename = "hashRate")]
        hash_rate: f64,
    }

    let content = tokio::fs::read_to_string(path).await?;
    let status: Status = serde_json::from_str(&content)?;
    Ok(status.pool_statistics.hash_rate)
}

/// Query the node's `get_info` RPC and derive the network hashrate as
/// `difficulty / block time`.
pub async fn fetch_network_hashrate(client: &Client, url: &str) -> Result<f64, CollectorError> {
    #[derive(Deserialize)]
    struct RpcResponse {
        result: Info,
    }

    #[derive(Deserialize)]
    struct Info {
        difficulty: f64,
    }

    let response: RpcResponse = client
        .post(url)
        .json(&serde_json::json!({
            "jsonrpc": "2.0",
            "id": "0",
            "method": "get_info"
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.result.difficulty / BLOCK_TIME_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_pool_hashrate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats");
        std::fs::write(
            &path,
            r#"{"pool_list":["pplns"],"pool_statistics":{"hashRate":12345.6,"miners":3}}"#,
        )
        .unwrap();

        let rate = read_pool_hashrate(&path).await.unwrap();
        assert_eq!(rate, 12345.6);
    }

    #[tokio::test]
    async fn test_read_pool_hashrate_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_pool_hashrate(&dir.path().join("stats")).await;
        assert!(matches!(result, Err(CollectorError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_pool_hashrate_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats");
        std::fs::write(&path, "{\"pool_statistics\":{}}").unwrap();

        let result = read_pool_hashrate(&path).await;
        assert!(matches!(result, Err(CollectorError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_miner_fetch_connection_refused() {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(1))
            .build()
            .unwrap();

        let result = fetch_miner_hashrate(&client, "http://127.0.0.1:9/2/summary").await;
        assert!(matches!(result, Err(CollectorError::Http(_))));
    }
}
