use alloy::primitives::U256;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{TokenAddress, WalletAddress};

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("Timed out after {0} ms")]
    Timeout(u64),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Failed to connect to RPC endpoint: {0}")]
    Connect(String),
}

/// Read-only access to a chain and its fungible-token contracts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainPort: Send + Sync {
    /// Latest block number, used as a connectivity probe
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Raw `balanceOf(owner)` amount, unscaled
    async fn balance_of(&self, token: &TokenAddress, owner: &WalletAddress) -> Result<U256, ChainError>;

    async fn decimals(&self, token: &TokenAddress) -> Result<u8, ChainError>;

    async fn symbol(&self, token: &TokenAddress) -> Result<String, ChainError>;
}
