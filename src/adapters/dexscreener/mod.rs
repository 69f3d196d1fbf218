//! DexScreener Adapter
//!
//! Implementation of the PriceSourcePort over the DexScreener public API.

mod client;
mod types;

pub use client::{DexScreenerClient, DexScreenerConfig};
pub use types::{DexPair, DexToken, Liquidity, PriceChange};
