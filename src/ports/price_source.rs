use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TokenAddress, TradingPair};

/// Failure of one market-data batch request
#[derive(Debug, Error)]
pub enum PriceFetchError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Price API returned {0}: {1}")]
    Status(u16, String),

    #[error("Failed to decode price response: {0}")]
    Decode(String),
}

/// Market-data source returning trading pairs for a batch of tokens
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSourcePort: Send + Sync {
    /// Fetch every trading pair the source knows for `tokens`, in one request
    async fn fetch_pairs(&self, tokens: &[TokenAddress]) -> Result<Vec<TradingPair>, PriceFetchError>;
}
