//! EVM Adapter
//!
//! Implementation of the ChainPort over an alloy HTTP provider.

mod client;
mod erc20;

pub use client::EvmClient;
