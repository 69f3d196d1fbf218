use serde::Serialize;

use super::address::TokenAddress;
use super::format::{format_amount, format_optional_percent, format_usd, PLACEHOLDER};

/// Row error shown when no trading pair produced a price
pub const NO_PRICE: &str = "No price";

/// Label used for rows whose token could not be read at all
pub const FALLBACK_LABEL: &str = "Token";

/// A token balance read from chain, already scaled by the token's decimals
#[derive(Debug, Clone, PartialEq)]
pub struct TokenHolding {
    pub symbol: String,
    pub balance: f64,
}

impl TokenHolding {
    pub fn new(symbol: String, balance: f64) -> Self {
        TokenHolding { symbol, balance }
    }

    pub fn value_at(&self, price: f64) -> f64 {
        self.balance * price
    }
}

/// Best available market price for one token
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PriceQuote {
    /// USD price, absent when no trading pair carried one
    pub price: Option<f64>,
    /// 24h change in percent
    pub change_24h: Option<f64>,
}

/// One rendered line of the portfolio table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRow {
    pub label: String,
    pub address: TokenAddress,
    pub balance: String,
    pub price: String,
    pub value: String,
    pub change_24h: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TokenRow {
    /// Row for a token with both a balance and a price
    pub fn priced(address: TokenAddress, holding: &TokenHolding, price: f64, change_24h: Option<f64>) -> Self {
        TokenRow {
            label: holding.symbol.clone(),
            address,
            balance: format_amount(holding.balance),
            price: format_usd(price),
            value: format_usd(holding.value_at(price)),
            change_24h: format_optional_percent(change_24h),
            error: None,
        }
    }

    /// Row for a token whose balance was read but no price was found
    pub fn unpriced(address: TokenAddress, holding: &TokenHolding) -> Self {
        TokenRow {
            label: holding.symbol.clone(),
            address,
            balance: format_amount(holding.balance),
            price: PLACEHOLDER.to_string(),
            value: PLACEHOLDER.to_string(),
            change_24h: PLACEHOLDER.to_string(),
            error: Some(NO_PRICE.to_string()),
        }
    }

    /// Row for a token whose balance could not be read
    pub fn errored(address: TokenAddress, message: impl Into<String>) -> Self {
        TokenRow {
            label: FALLBACK_LABEL.to_string(),
            address,
            balance: PLACEHOLDER.to_string(),
            price: PLACEHOLDER.to_string(),
            value: PLACEHOLDER.to_string(),
            change_24h: PLACEHOLDER.to_string(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Running totals for one load
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LoadSummary {
    pub total_usd: f64,
    pub tokens_count: usize,
    pub priced_count: usize,
}

impl LoadSummary {
    pub fn new(tokens_count: usize) -> Self {
        LoadSummary {
            total_usd: 0.0,
            tokens_count,
            priced_count: 0,
        }
    }

    /// Add the value of a token that had both balance and price
    pub fn record_priced(&mut self, value: f64) {
        self.total_usd += value;
        self.priced_count += 1;
    }

    pub fn total_display(&self) -> String {
        format_usd(self.total_usd)
    }

    pub fn meta_display(&self) -> String {
        format!("Tokens: {} • Priced: {}", self.tokens_count, self.priced_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::HexAddress;
    use approx::assert_relative_eq;

    fn token() -> TokenAddress {
        HexAddress::parse("0x1111111111111111111111111111111111111111").unwrap()
    }

    #[test]
    fn test_holding_value() {
        let holding = TokenHolding::new("PLS".to_string(), 10.0);
        assert_relative_eq!(holding.value_at(2.0), 20.0);
        assert_relative_eq!(holding.value_at(0.0), 0.0);
    }

    #[test]
    fn test_priced_row() {
        let holding = TokenHolding::new("HEX".to_string(), 10.0);
        let row = TokenRow::priced(token(), &holding, 2.0, Some(-3.456));

        assert_eq!(row.label, "HEX");
        assert_eq!(row.balance, "10");
        assert_eq!(row.price, "$2.00");
        assert_eq!(row.value, "$20.00");
        assert_eq!(row.change_24h, "-3.46%");
        assert!(!row.is_error());
    }

    #[test]
    fn test_priced_row_without_change() {
        let holding = TokenHolding::new("HEX".to_string(), 1.0);
        let row = TokenRow::priced(token(), &holding, 0.5, None);
        assert_eq!(row.change_24h, PLACEHOLDER);
        assert_eq!(row.value, "$0.50");
    }

    #[test]
    fn test_unpriced_row() {
        let holding = TokenHolding::new("PLSX".to_string(), 1234.5);
        let row = TokenRow::unpriced(token(), &holding);

        assert_eq!(row.label, "PLSX");
        assert_eq!(row.balance, "1,234.5");
        assert_eq!(row.price, PLACEHOLDER);
        assert_eq!(row.value, PLACEHOLDER);
        assert_eq!(row.error.as_deref(), Some(NO_PRICE));
    }

    #[test]
    fn test_errored_row() {
        let row = TokenRow::errored(token(), "execution reverted");
        assert_eq!(row.label, FALLBACK_LABEL);
        assert_eq!(row.value, PLACEHOLDER);
        assert_eq!(row.error.as_deref(), Some("execution reverted"));
    }

    #[test]
    fn test_summary_accumulation() {
        let mut summary = LoadSummary::new(3);
        summary.record_priced(20.0);
        summary.record_priced(0.5);

        assert_relative_eq!(summary.total_usd, 20.5);
        assert_eq!(summary.priced_count, 2);
        assert_eq!(summary.total_display(), "$20.50");
        assert_eq!(summary.meta_display(), "Tokens: 3 • Priced: 2");
    }

    #[test]
    fn test_empty_summary() {
        let summary = LoadSummary::default();
        assert_eq!(summary.total_display(), "$0.00");
        assert_eq!(summary.meta_display(), "Tokens: 0 • Priced: 0");
    }
}
