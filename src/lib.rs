//! Pulsefolio - Token portfolio viewer library
//!
//! Reads ERC20 balances for a wallet over JSON-RPC and values them with
//! DexScreener prices.
//!
//! # Modules
//!
//! - `domain`: Core logic (addresses, formatting, rows and totals, pair selection)
//! - `ports`: Trait abstractions (ChainPort, PriceSourcePort, RenderSink) and mocks
//! - `adapters`: External implementations (EVM RPC, DexScreener, console, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Load orchestrator, price lookup, chain reader, shell session

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
