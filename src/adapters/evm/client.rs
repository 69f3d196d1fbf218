//! EVM JSON-RPC client
//!
//! Read-only ERC20 calls over an HTTP provider.

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;

use super::erc20::ERC20;
use crate::domain::{HexAddress, TokenAddress, WalletAddress};
use crate::ports::{ChainError, ChainPort};

/// Chain access through one RPC endpoint
#[derive(Clone)]
pub struct EvmClient {
    rpc_url: String,
    provider: DynProvider,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient").field("rpc_url", &self.rpc_url).finish()
    }
}

impl EvmClient {
    /// Build an HTTP provider for `rpc_url`. No request is made until the first read.
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let url = rpc_url
            .trim()
            .parse::<reqwest::Url>()
            .map_err(|e| ChainError::Connect(format!("invalid RPC url {:?}: {}", rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            rpc_url: rpc_url.trim().to_string(),
            provider,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn contract(&self, token: &TokenAddress) -> Result<ERC20::ERC20Instance<DynProvider>, ChainError> {
        Ok(ERC20::new(to_address(token)?, self.provider.clone()))
    }
}

fn to_address(address: &HexAddress) -> Result<Address, ChainError> {
    address
        .as_str()
        .parse::<Address>()
        .map_err(|e| ChainError::InvalidAddress(format!("{}: {}", address, e)))
}

#[async_trait]
impl ChainPort for EvmClient {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn balance_of(&self, token: &TokenAddress, owner: &WalletAddress) -> Result<U256, ChainError> {
        let owner = to_address(owner)?;
        self.contract(token)?
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn decimals(&self, token: &TokenAddress) -> Result<u8, ChainError> {
        self.contract(token)?
            .decimals()
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn symbol(&self, token: &TokenAddress) -> Result<String, ChainError> {
        self.contract(token)?
            .symbol()
            .call()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}
