//! Price matching
//!
//! A market-data batch returns trading pairs for many tokens at once. Each
//! token is matched against the pairs where it is either side, and the
//! deepest pool with a usable USD price wins.

use std::collections::HashMap;

use super::address::TokenAddress;
use super::portfolio::PriceQuote;

/// One market-data trading pair, reduced to the fields used for pricing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradingPair {
    pub base_address: Option<String>,
    pub quote_address: Option<String>,
    /// USD price of the pair's base token
    pub price_usd: Option<f64>,
    pub change_24h: Option<f64>,
    pub liquidity_usd: Option<f64>,
}

impl TradingPair {
    fn matches(&self, key: &str) -> bool {
        let side = |a: &Option<String>| a.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(key));
        side(&self.base_address) || side(&self.quote_address)
    }
}

/// Lowercased token address -> quote
pub type PriceMap = HashMap<String, PriceQuote>;

/// Pick the highest-liquidity priced pair among `pairs` matching `token`.
///
/// Missing liquidity counts as zero. Ties go to the first pair seen.
pub fn best_pair<'a>(token: &TokenAddress, pairs: &'a [TradingPair]) -> Option<&'a TradingPair> {
    let key = token.key();
    let mut best: Option<&TradingPair> = None;
    let mut best_liquidity = f64::NEG_INFINITY;

    for pair in pairs.iter().filter(|p| p.matches(&key)) {
        if pair.price_usd.is_none() {
            continue;
        }
        let liquidity = pair.liquidity_usd.unwrap_or(0.0);
        if liquidity > best_liquidity {
            best = Some(pair);
            best_liquidity = liquidity;
        }
    }

    best
}

/// Reduce one batch's pairs to a quote per token in `batch`.
///
/// Every token in the batch gets an entry, with an empty quote when nothing matched.
pub fn select_quotes(batch: &[TokenAddress], pairs: &[TradingPair]) -> Vec<(String, PriceQuote)> {
    batch
        .iter()
        .map(|token| {
            let quote = best_pair(token, pairs)
                .map(|pair| PriceQuote {
                    price: pair.price_usd,
                    change_24h: pair.change_24h,
                })
                .unwrap_or_default();
            (token.key(), quote)
        })
        .collect()
}
