//! DexScreener API Client
//!
//! HTTP client for the DexScreener token-pairs endpoint.
//! One request per batch of token addresses; the caller does the batching.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::DexPair;
use crate::domain::{TokenAddress, TradingPair};
use crate::ports::{PriceFetchError, PriceSourcePort};

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// Base URL for the DexScreener API
    pub api_base_url: String,
    /// Chain slug used in the path, e.g. "pulsechain"
    pub chain_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.dexscreener.com".to_string(),
            chain_id: "pulsechain".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// DexScreener market-data client
#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
}

impl DexScreenerClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, PriceFetchError> {
        Self::with_config(DexScreenerConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: DexScreenerConfig) -> Result<Self, PriceFetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PriceFetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Endpoint for one batch of addresses
    pub fn pairs_url(&self, tokens: &[TokenAddress]) -> String {
        let joined = tokens.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(",");
        format!(
            "{}/tokens/v1/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.chain_id,
            joined
        )
    }

    /// Fetch the raw pairs for one batch
    pub async fn get_pairs(&self, tokens: &[TokenAddress]) -> Result<Vec<DexPair>, PriceFetchError> {
        let url = self.pairs_url(tokens);
        tracing::debug!(%url, tokens = tokens.len(), "requesting pairs");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PriceFetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PriceFetchError::Status(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| PriceFetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PriceSourcePort for DexScreenerClient {
    async fn fetch_pairs(&self, tokens: &[TokenAddress]) -> Result<Vec<TradingPair>, PriceFetchError> {
        let pairs = self.get_pairs(tokens).await?;
        Ok(pairs.into_iter().map(TradingPair::from).collect())
    }
}
