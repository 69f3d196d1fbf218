//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    load_config, ChainSection, Config, ConfigError, LoaderSection, LoggingSection, PricesSection,
    ENV_PRICE_API_URL, ENV_RPC_URL, MAX_PRICE_BATCH,
};
