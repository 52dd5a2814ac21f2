//! Concrete price sources
//!
//! Three providers, tried in order: CoinGecko and Kraken quote XMR/EUR
//! directly; Bitfinex quotes XMR/USD and is converted to EUR with a
//! Frankfurter FX lookup (identity rate if the lookup fails).

use super::{PriceError, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// The standard ordered source list
pub fn default_sources() -> Vec<Box<dyn PriceSource>> {
    vec![
        Box::new(CoinGecko::default()),
        Box::new(Kraken::default()),
        Box::new(BitfinexFx::default()),
    ]
}

/// CoinGecko simple-price API, XMR quoted in EUR
pub struct CoinGecko {
    url: String,
}

impl Default for CoinGecko {
    fn default() -> Self {
        Self {
            url: "https://api.coingecko.com/api/v3/simple/price?ids=monero&vs_currencies=eur"
                .to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for CoinGecko {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch(&self, client: &Client) -> Result<f64, PriceError> {
        #[derive(Deserialize)]
        struct Response {
            monero: Quote,
        }

        #[derive(Deserialize)]
        struct Quote {
            eur: f64,
        }

        let resp: Response = client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.monero.eur)
    }
}

/// Kraken public ticker, XMR/EUR pair
pub struct Kraken {
    url: String,
}

impl Default for Kraken {
    fn default() -> Self {
        Self {
            url: "https://api.kraken.com/0/public/Ticker?pair=XMREUR".to_string(),
        }
    }
}

#[async_trait]
impl PriceSource for Kraken {
    fn name(&self) -> &str {
        "Kraken"
    }

    async fn fetch(&self, client: &Client) -> Result<f64, PriceError> {
        // Kraken nests the pair under its internal symbol and reports the
        // last trade as ["price", "lot volume"].
        #[derive(Deserialize)]
        struct Response {
            result: Pairs,
        }

        #[derive(Deserialize)]
        struct Pairs {
            #[serde(rename = "XXMRZEUR")]
            pair: Ticker,
        }

        #[derive(Deserialize)]
        struct Ticker {
            c: Vec<String>,
        }

        let resp: Response = client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let last = resp
            .result
            .pair
            .c
            .first()
            .ok_or_else(|| PriceError::Parse("empty last-trade array".to_string()))?;

        last.parse::<f64>()
            .map_err(|e| PriceError::Parse(format!("last-trade price not numeric: {}", e)))
    }
}

/// Bitfinex XMR/USD ticker converted to EUR with a Frankfurter lookup.
///
/// The FX leg has its own fallback: if the rate lookup fails, the raw
/// USD price is used as-is (rate 1.0).
pub struct BitfinexFx {
    ticker_url: String,
    fx_url: String,
}

impl Default for BitfinexFx {
    fn default() -> Self {
        Self {
            ticker_url: "https://api-pub.bitfinex.com/v2/ticker/tXMRUSD".to_string(),
            fx_url: "https://api.frankfurter.app/latest?from=USD&to=EUR".to_string(),
        }
    }
}

impl BitfinexFx {
    async fn usd_to_eur(&self, client: &Client) -> f64 {
        #[derive(Deserialize)]
        struct Response {
            rates: Rates,
        }

        #[derive(Deserialize)]
        struct Rates {
            #[serde(rename = "EUR")]
            eur: f64,
        }

        let result: Result<Response, PriceError> = async {
            Ok(client
                .get(&self.fx_url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?)
        }
        .await;

        match result {
            Ok(resp) => resp.rates.eur,
            Err(e) => {
                tracing::warn!(error = %e, "FX lookup failed, using identity rate");
                1.0
            }
        }
    }
}

#[async_trait]
impl PriceSource for BitfinexFx {
    fn name(&self) -> &str {
        "Bitfinex+FX"
    }

    async fn fetch(&self, client: &Client) -> Result<f64, PriceError> {
        // Bitfinex tickers are bare arrays; index 6 is the last price.
        let fields: Vec<f64> = client
            .get(&self.ticker_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let usd = fields
            .get(6)
            .copied()
            .ok_or_else(|| PriceError::Parse("ticker array too short".to_string()))?;

        Ok(usd * self.usd_to_eur(client).await)
    }
}
