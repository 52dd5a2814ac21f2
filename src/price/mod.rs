//! Currency price resolution
//!
//! Fetches the XMR price in EUR from an ordered chain of external
//! sources. Sources are tried in fixed order; the first one that
//! succeeds with a strictly positive value wins. If every source fails,
//! the resolver falls back to the last positive price recorded in the
//! persisted snapshot, or 0.0 if none exists.

mod sources;

pub use sources::{default_sources, BitfinexFx, CoinGecko, Kraken};

use crate::store::SnapshotFile;
use async_trait::async_trait;
use reqwest::Client;

/// One named price source in the fallback chain
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Source name, used only for logging which source won
    fn name(&self) -> &str;

    /// Fetch and parse the current price in the target currency
    async fn fetch(&self, client: &Client) -> Result<f64, PriceError>;
}

/// Errors from a single price source attempt
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Parse(String),
}

/// Ordered fallback chain over a fixed list of price sources
pub struct PriceResolver {
    client: Client,
    sources: Vec<Box<dyn PriceSource>>,
    snapshot: SnapshotFile,
}

impl PriceResolver {
    /// Resolver over the standard source list (CoinGecko, Kraken,
    /// Bitfinex+FX), falling back to the given snapshot file.
    pub fn new(client: Client, snapshot: SnapshotFile) -> Self {
        Self::with_sources(client, default_sources(), snapshot)
    }

    /// Resolver over an explicit source list (tests use stub sources)
    pub fn with_sources(
        client: Client,
        sources: Vec<Box<dyn PriceSource>>,
        snapshot: SnapshotFile,
    ) -> Self {
        Self {
            client,
            sources,
            snapshot,
        }
    }

    /// Resolve the current price.
    ///
    /// Never fails: a total source outage degrades to the last persisted
    /// positive price, then to 0.0. The outcome is observable via
    /// logging only.
    pub async fn resolve(&self) -> f64 {
        for source in &self.sources {
            match source.fetch(&self.client).await {
                Ok(price) if price > 0.0 => {
                    tracing::debug!(source = source.name(), price, "Price resolved");
                    return price;
                }
                Ok(price) => {
                    tracing::warn!(
                        source = source.name(),
                        price,
                        "Price source returned non-positive value, trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Price source failed, trying next");
                }
            }
        }

        let last = self.snapshot.last_price();
        tracing::warn!(price = last, "All price sources failed, using last recorded value");
        last
    }
}
