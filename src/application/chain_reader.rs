//! Chain Reader
//!
//! Reads one token's balance for a wallet, together with its decimals and
//! symbol, and scales the raw amount into a human decimal.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::utils::format_units;
use thiserror::Error;

use crate::domain::{TokenAddress, TokenHolding, WalletAddress};
use crate::ports::{ChainError, ChainPort};

/// Decimals assumed when `decimals()` cannot be read
pub const DEFAULT_DECIMALS: u8 = 18;

/// Symbol assumed when `symbol()` cannot be read
pub const DEFAULT_SYMBOL: &str = "TOKEN";

#[derive(Debug, Error)]
pub enum BalanceReadError {
    #[error("{0}")]
    Chain(#[from] ChainError),
    #[error("Cannot scale balance by {decimals} decimals: {reason}")]
    Scale { decimals: u8, reason: String },
}

/// Per-token reader over a [`ChainPort`], with a timeout on every call
pub struct ChainReader<C> {
    chain: Arc<C>,
    timeout: Duration,
}

impl<C> Clone for ChainReader<C> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            timeout: self.timeout,
        }
    }
}

impl<C: ChainPort> ChainReader<C> {
    pub fn new(chain: Arc<C>, timeout: Duration) -> Self {
        Self { chain, timeout }
    }

    /// Connectivity probe: latest block number
    pub async fn probe(&self) -> Result<u64, ChainError> {
        self.bounded(self.chain.block_number()).await
    }

    /// Read balance, decimals and symbol concurrently.
    ///
    /// Only a `balanceOf` failure fails the read; decimals and symbol fall
    /// back to [`DEFAULT_DECIMALS`] and [`DEFAULT_SYMBOL`].
    pub async fn read_token(
        &self,
        wallet: &WalletAddress,
        token: &TokenAddress,
    ) -> Result<TokenHolding, BalanceReadError> {
        let (raw, decimals, symbol) = tokio::join!(
            self.bounded(self.chain.balance_of(token, wallet)),
            self.bounded(self.chain.decimals(token)),
            self.bounded(self.chain.symbol(token)),
        );

        let decimals = decimals.unwrap_or_else(|e| {
            tracing::debug!(token = %token, error = %e, "decimals() failed, assuming {}", DEFAULT_DECIMALS);
            DEFAULT_DECIMALS
        });
        let symbol = symbol.unwrap_or_else(|e| {
            tracing::debug!(token = %token, error = %e, "symbol() failed, using placeholder");
            DEFAULT_SYMBOL.to_string()
        });
        let raw = raw?;

        let scaled = format_units(raw, decimals).map_err(|e| BalanceReadError::Scale {
            decimals,
            reason: e.to_string(),
        })?;
        let balance = scaled.parse::<f64>().map_err(|e| BalanceReadError::Scale {
            decimals,
            reason: e.to_string(),
        })?;

        Ok(TokenHolding::new(symbol, balance))
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ChainError>
    where
        F: Future<Output = Result<T, ChainError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}
