//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Market data (trading pairs with USD prices)
//! - Chain reads (block probe, token balance/decimals/symbol)
//! - The render surface the orchestrator writes to

pub mod chain;
pub mod mocks;
pub mod price_source;
pub mod render;

pub use chain::{ChainError, ChainPort};
pub use price_source::{PriceFetchError, PriceSourcePort};
pub use render::{RenderSink, StatusKind};
