//! DexScreener wire types
//!
//! `GET /tokens/v1/{chainId}/{addresses}` answers with a bare JSON array of pairs.
//! Only the fields used for pricing are modelled; everything else is ignored.

use serde::Deserialize;

use crate::domain::TradingPair;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    #[serde(default)]
    pub base_token: Option<DexToken>,
    #[serde(default)]
    pub quote_token: Option<DexToken>,
    /// Decimal string, e.g. "0.00002841"
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub price_change: Option<PriceChange>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexToken {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceChange {
    #[serde(default)]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<f64>,
}

impl DexPair {
    /// Numeric USD price, if present and parseable
    pub fn price(&self) -> Option<f64> {
        self.price_usd
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }
}

impl From<DexPair> for TradingPair {
    fn from(pair: DexPair) -> Self {
        let price_usd = pair.price();
        TradingPair {
            base_address: pair.base_token.and_then(|t| t.address),
            quote_address: pair.quote_token.and_then(|t| t.address),
            price_usd,
            change_24h: pair.price_change.and_then(|c| c.h24),
            liquidity_usd: pair.liquidity.and_then(|l| l.usd),
        }
    }
}
