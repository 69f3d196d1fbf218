//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - DexScreener: market-data API client (PriceSourcePort)
//! - EVM: JSON-RPC ERC20 reader (ChainPort)
//! - Console: terminal render sink (RenderSink)
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod console;
pub mod dexscreener;
pub mod evm;

pub use cli::CliApp;
pub use console::ConsoleSink;
pub use dexscreener::DexScreenerClient;
pub use evm::EvmClient;
