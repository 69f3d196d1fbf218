//! Domain Layer - Core portfolio logic for Pulsefolio
//!
//! This module contains pure domain types and logic with no external dependencies.
//! All external interactions happen through the ports layer.
//!
//! - `address`: address validation, token-list parsing, short display form
//! - `format`: USD, percent and amount formatting
//! - `portfolio`: holdings, price quotes, table rows and load totals
//! - `pricing`: trading-pair matching and best-liquidity selection

pub mod address;
pub mod format;
pub mod portfolio;
pub mod pricing;

pub use address::{is_address, parse_token_list, shorten_address, HexAddress, TokenAddress, WalletAddress};
pub use format::{format_amount, format_optional_percent, format_percent, format_usd, PLACEHOLDER};
pub use portfolio::{LoadSummary, PriceQuote, TokenHolding, TokenRow, FALLBACK_LABEL, NO_PRICE};
pub use pricing::{best_pair, select_quotes, PriceMap, TradingPair};
