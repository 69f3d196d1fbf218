//! Price Lookup Service
//!
//! Splits the token list into batches, requests each batch from the market-data
//! source one after another, and reduces the returned pairs to one quote per token.

use std::sync::Arc;
use std::time::Instant;

use crate::domain::{select_quotes, PriceMap, TokenAddress};
use crate::ports::{PriceFetchError, PriceSourcePort};

/// Default tokens per market-data request
pub const DEFAULT_MAX_BATCH: usize = 30;

pub struct PriceLookup<P> {
    source: Arc<P>,
    max_batch: usize,
}

impl<P> Clone for PriceLookup<P> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            max_batch: self.max_batch,
        }
    }
}

impl<P: PriceSourcePort> PriceLookup<P> {
    pub fn new(source: Arc<P>) -> Self {
        Self::with_max_batch(source, DEFAULT_MAX_BATCH)
    }

    pub fn with_max_batch(source: Arc<P>, max_batch: usize) -> Self {
        Self {
            source,
            max_batch: max_batch.max(1),
        }
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    /// Quote every token, keyed by lowercased address.
    ///
    /// Batches are requested sequentially. Any failed batch fails the whole call.
    pub async fn get_prices(&self, tokens: &[TokenAddress]) -> Result<PriceMap, PriceFetchError> {
        let t0 = Instant::now();
        let mut prices = PriceMap::new();

        for (index, batch) in tokens.chunks(self.max_batch).enumerate() {
            let pairs = self.source.fetch_pairs(batch).await.map_err(|e| {
                tracing::warn!(batch = index, size = batch.len(), error = %e, "price batch failed");
                e
            })?;
            tracing::debug!(batch = index, size = batch.len(), pairs = pairs.len(), "price batch received");
            prices.extend(select_quotes(batch, &pairs));
        }

        let priced = prices.values().filter(|q| q.price.is_some()).count();
        tracing::info!(
            tokens = tokens.len(),
            priced,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "prices fetched"
        );
        Ok(prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{HexAddress, TradingPair};
    use crate::ports::mocks::MockPriceSource;
    use crate::ports::price_source::MockPriceSourcePort;

    fn numbered(n: usize) -> TokenAddress {
        HexAddress::parse(&format!("0x{:040x}", n + 1)).unwrap()
    }

    #[tokio::test]
    async fn test_batches_of_thirty() {
        let tokens: Vec<TokenAddress> = (0..65).map(numbered).collect();
        let source = Arc::new(MockPriceSource::new());
        let lookup = PriceLookup::new(Arc::clone(&source));

        let prices = lookup.get_prices(&tokens).await.unwrap();

        let sizes: Vec<usize> = source.get_calls().iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![30, 30, 5]);
        assert_eq!(source.get_calls()[1][0], tokens[30].key());
        // Every requested token has an entry, priced or not
        assert_eq!(prices.len(), 65);
        assert!(prices.values().all(|q| q.price.is_none()));
    }

    #[tokio::test]
    async fn test_keys_are_lowercased() {
        let token = HexAddress::parse("0xABCDEFabcdef0000000000000000000000000001").unwrap();
        let source = Arc::new(MockPriceSource::new().with_price(token.as_str(), 1.25, 3.0, 10.0));
        let lookup = PriceLookup::new(source);

        let prices = lookup.get_prices(std::slice::from_ref(&token)).await.unwrap();
        let quote = prices.get("0xabcdefabcdef0000000000000000000000000001").unwrap();
        assert_eq!(quote.price, Some(1.25));
        assert_eq!(quote.change_24h, Some(3.0));
    }

    #[tokio::test]
    async fn test_failed_batch_fails_everything() {
        let tokens: Vec<TokenAddress> = (0..4).map(numbered).collect();
        let source = Arc::new(
            MockPriceSource::new()
                .with_price(tokens[0].as_str(), 1.0, 0.0, 1.0)
                .failing_on_call(1),
        );
        let lookup = PriceLookup::with_max_batch(Arc::clone(&source), 2);

        let result = lookup.get_prices(&tokens).await;
        assert!(matches!(result, Err(PriceFetchError::Status(503, _))));
        assert_eq!(source.get_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_batch_size_is_clamped() {
        let lookup = PriceLookup::with_max_batch(Arc::new(MockPriceSource::new()), 0);
        assert_eq!(lookup.max_batch(), 1);
    }

    #[tokio::test]
    async fn test_empty_token_list_makes_no_request() {
        let mut source = MockPriceSourcePort::new();
        source.expect_fetch_pairs().never();

        let lookup = PriceLookup::new(Arc::new(source));
        assert!(lookup.get_prices(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_best_liquidity_across_base_and_quote() {
        let token = numbered(0);
        let other = "0x00000000000000000000000000000000000000ff".to_string();

        let mut source = MockPriceSourcePort::new();
        let (t_base, t_quote) = (token.key(), token.key());
        source
            .expect_fetch_pairs()
            .withf(|batch: &[TokenAddress]| batch.len() == 1)
            .times(1)
            .returning(move |_| {
                Ok(vec![
                    TradingPair {
                        base_address: Some(t_base.clone()),
                        quote_address: Some(other.clone()),
                        price_usd: Some(1.0),
                        change_24h: Some(1.0),
                        liquidity_usd: Some(100.0),
                    },
                    TradingPair {
                        base_address: Some(other.clone()),
                        quote_address: Some(t_quote.clone()),
                        price_usd: Some(4.0),
                        change_24h: Some(-4.0),
                        liquidity_usd: Some(500.0),
                    },
                ])
            });

        let lookup = PriceLookup::new(Arc::new(source));
        let prices = lookup.get_prices(std::slice::from_ref(&token)).await.unwrap();
        let quote = prices[&token.key()];
        assert_eq!(quote.price, Some(4.0));
        assert_eq!(quote.change_24h, Some(-4.0));
    }
}
