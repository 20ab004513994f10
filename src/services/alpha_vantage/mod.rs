//! Alpha Vantage market data client
//!
//! One operation: fetch the 5-minute intraday series for a symbol. No
//! timeout, retry, or backoff policy; a transport failure propagates as
//! [`ProviderError`] and is mapped to a 5xx by the HTTP layer.

pub mod response;

pub use response::{classify, IntradayPayload, LatestBar};

use crate::config;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const INTERVAL: &str = "5min";

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure or a body that is not JSON.
    #[error("market data provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

pub struct AlphaVantageClient {
    base_url: String,
    client: reqwest::Client,
    api_key: String,
}

impl AlphaVantageClient {
    /// Client against the real endpoint, configured from the environment.
    pub fn new() -> Self {
        Self::with_client(
            config::get_alpha_vantage_base_url(),
            reqwest::Client::new(),
            config::get_alpha_vantage_api_key(),
        )
    }

    /// Client with an injected base URL and reqwest client, used by tests to
    /// route requests through a mock server.
    pub fn with_client(base_url: String, client: reqwest::Client, api_key: String) -> Self {
        Self {
            base_url,
            client,
            api_key,
        }
    }

    /// Fetch the intraday time series for `symbol` at the fixed 5-minute
    /// interval and return the raw JSON payload.
    pub async fn fetch_intraday(&self, symbol: &str) -> Result<Value, ProviderError> {
        debug!(symbol = %symbol, interval = INTERVAL, "fetching intraday series");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", symbol),
                ("interval", INTERVAL),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let payload = response.json::<Value>().await?;
        Ok(payload)
    }
}

impl Default for AlphaVantageClient {
    fn default() -> Self {
        Self::new()
    }
}
