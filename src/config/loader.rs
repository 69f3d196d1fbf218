//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/pulsechain.toml.
//! Every section is optional; missing values fall back to the PulseChain defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Overrides `chain.rpc_url`
pub const ENV_RPC_URL: &str = "PULSEFOLIO_RPC_URL";
/// Overrides `prices.api_url`
pub const ENV_PRICE_API_URL: &str = "PULSEFOLIO_PRICE_API_URL";

/// DexScreener accepts at most this many addresses per request
pub const MAX_PRICE_BATCH: usize = 30;

/// Main configuration structure matching config/pulsechain.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chain: ChainSection,
    pub prices: PricesSection,
    pub loader: LoaderSection,
    pub logging: LoggingSection,
}

/// Chain RPC configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainSection {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Per-read and probe timeout
    pub rpc_timeout_secs: u64,
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://pulsechain-rpc.publicnode.com".to_string(),
            rpc_timeout_secs: 15,
        }
    }
}

impl ChainSection {
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

/// Market-data configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricesSection {
    /// DexScreener API base URL
    pub api_url: String,
    /// DexScreener chain slug
    pub chain_id: String,
    /// Tokens per request (1..=30)
    pub max_batch: usize,
    pub timeout_secs: u64,
}

impl Default for PricesSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.dexscreener.com".to_string(),
            chain_id: "pulsechain".to_string(),
            max_batch: MAX_PRICE_BATCH,
            timeout_secs: 15,
        }
    }
}

impl PricesSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load orchestration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Tokens whose balances are read at the same time
    pub concurrency: usize,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Apply `PULSEFOLIO_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_RPC_URL) {
            tracing::debug!(rpc_url = %url, "rpc url overridden from environment");
            self.chain.rpc_url = url;
        }
        if let Some(url) = non_empty(ENV_PRICE_API_URL) {
            tracing::debug!(api_url = %url, "price api url overridden from environment");
            self.prices.api_url = url;
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chain.rpc_url must not be empty".to_string(),
            ));
        }

        if self.chain.rpc_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "chain.rpc_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.prices.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "prices.api_url must not be empty".to_string(),
            ));
        }

        if self.prices.chain_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "prices.chain_id must not be empty".to_string(),
            ));
        }

        if self.prices.max_batch == 0 || self.prices.max_batch > MAX_PRICE_BATCH {
            return Err(ConfigError::ValidationError(format!(
                "prices.max_batch must be between 1 and {}, got {}",
                MAX_PRICE_BATCH, self.prices.max_batch
            )));
        }

        if self.prices.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "prices.timeout_secs must be > 0".to_string(),
            ));
        }

        if self.loader.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "loader.concurrency must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
