//! In-memory port implementations for tests and headless runs

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use tokio::sync::Notify;

use super::{ChainError, ChainPort, PriceFetchError, PriceSourcePort, RenderSink, StatusKind};
use crate::domain::{TokenAddress, TokenRow, TradingPair, WalletAddress};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock price source serving a fixed set of pairs and recording each batch request
#[derive(Debug, Default)]
pub struct MockPriceSource {
    pairs: Vec<TradingPair>,
    fail_on_call: Option<usize>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a pair to the market
    pub fn with_pair(mut self, pair: TradingPair) -> Self {
        self.pairs.push(pair);
        self
    }

    /// Convenience for a base-token pair with a price, 24h change and liquidity
    pub fn with_price(self, base: &str, price: f64, change_24h: f64, liquidity: f64) -> Self {
        self.with_pair(TradingPair {
            base_address: Some(base.to_string()),
            quote_address: Some("0x0000000000000000000000000000000000000000".to_string()),
            price_usd: Some(price),
            change_24h: Some(change_24h),
            liquidity_usd: Some(liquidity),
        })
    }

    /// Make the n-th request (0-based) fail
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Lowercased addresses of every batch requested so far
    pub fn get_calls(&self) -> Vec<Vec<String>> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PriceSourcePort for MockPriceSource {
    async fn fetch_pairs(&self, tokens: &[TokenAddress]) -> Result<Vec<TradingPair>, PriceFetchError> {
        let keys: Vec<String> = tokens.iter().map(|t| t.key()).collect();
        let call = {
            let mut calls = lock(&self.calls);
            calls.push(keys.clone());
            calls.len() - 1
        };

        if self.fail_on_call == Some(call) {
            return Err(PriceFetchError::Status(503, "service unavailable".to_string()));
        }

        let is_requested = |a: &Option<String>| {
            a.as_deref()
                .is_some_and(|a| keys.iter().any(|k| k.eq_ignore_ascii_case(a)))
        };
        Ok(self
            .pairs
            .iter()
            .filter(|p| is_requested(&p.base_address) || is_requested(&p.quote_address))
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
struct MockToken {
    symbol: Option<String>,
    decimals: Option<u8>,
    balance: Result<U256, String>,
    delay: Duration,
}

/// Mock chain with per-token contract state
#[derive(Debug, Default)]
pub struct MockChain {
    tokens: HashMap<String, MockToken>,
    unreachable: bool,
    probe_gate: Option<Arc<Notify>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    balance_calls: Mutex<Vec<String>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a readable token
    pub fn with_token(mut self, address: &str, symbol: &str, decimals: u8, raw_balance: U256) -> Self {
        self.tokens.insert(
            address.to_ascii_lowercase(),
            MockToken {
                symbol: Some(symbol.to_string()),
                decimals: Some(decimals),
                balance: Ok(raw_balance),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Token whose `decimals()` and `symbol()` calls revert but `balanceOf` works
    pub fn with_bare_token(mut self, address: &str, raw_balance: U256) -> Self {
        self.tokens.insert(
            address.to_ascii_lowercase(),
            MockToken {
                symbol: None,
                decimals: None,
                balance: Ok(raw_balance),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Token whose `balanceOf` call fails with `message`
    pub fn with_failing_balance(mut self, address: &str, message: &str) -> Self {
        self.tokens.insert(
            address.to_ascii_lowercase(),
            MockToken {
                symbol: Some("BAD".to_string()),
                decimals: Some(18),
                balance: Err(message.to_string()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Delay every read of an already registered token
    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        if let Some(token) = self.tokens.get_mut(&address.to_ascii_lowercase()) {
            token.delay = delay;
        }
        self
    }

    /// Make the block-number probe fail
    pub fn with_unreachable_rpc(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Hold the block-number probe until `gate` is notified
    pub fn with_probe_gate(mut self, gate: Arc<Notify>) -> Self {
        self.probe_gate = Some(gate);
        self
    }

    /// Highest number of `balanceOf` calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Lowercased token addresses in the order `balanceOf` was called
    pub fn balance_calls(&self) -> Vec<String> {
        lock(&self.balance_calls).clone()
    }

    fn token(&self, token: &TokenAddress) -> Result<MockToken, ChainError> {
        self.tokens
            .get(&token.key())
            .cloned()
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }
}

#[async_trait]
impl ChainPort for MockChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        if let Some(gate) = &self.probe_gate {
            gate.notified().await;
        }
        if self.unreachable {
            return Err(ChainError::Rpc("connection refused".to_string()));
        }
        Ok(1_000_000)
    }

    async fn balance_of(&self, token: &TokenAddress, _owner: &WalletAddress) -> Result<U256, ChainError> {
        lock(&self.balance_calls).push(token.key());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.token(token) {
            Ok(t) => {
                if !t.delay.is_zero() {
                    tokio::time::sleep(t.delay).await;
                }
                t.balance.map_err(ChainError::Rpc)
            }
            Err(e) => Err(e),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn decimals(&self, token: &TokenAddress) -> Result<u8, ChainError> {
        self.token(token)?
            .decimals
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }

    async fn symbol(&self, token: &TokenAddress) -> Result<String, ChainError> {
        self.token(token)?
            .symbol
            .ok_or_else(|| ChainError::Rpc("execution reverted".to_string()))
    }
}

/// Snapshot of what a [`RecordingSink`] currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct SinkState {
    pub status: String,
    pub status_kind: StatusKind,
    pub rows: Vec<TokenRow>,
    pub total: String,
    pub meta: String,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            status: String::new(),
            status_kind: StatusKind::Ok,
            rows: Vec::new(),
            total: "$0.00".to_string(),
            meta: crate::domain::PLACEHOLDER.to_string(),
        }
    }
}

/// Render sink that keeps the surface in memory and logs every status change
#[derive(Debug, Default)]
pub struct RecordingSink {
    state: Mutex<SinkState>,
    statuses: Mutex<Vec<(String, StatusKind)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SinkState {
        lock(&self.state).clone()
    }

    /// Every status set so far, oldest first
    pub fn statuses(&self) -> Vec<(String, StatusKind)> {
        lock(&self.statuses).clone()
    }
}

impl RenderSink for RecordingSink {
    fn set_status(&self, text: &str, kind: StatusKind) {
        let mut state = lock(&self.state);
        state.status = text.to_string();
        state.status_kind = kind;
        lock(&self.statuses).push((text.to_string(), kind));
    }

    fn append_row(&self, row: &TokenRow) {
        lock(&self.state).rows.push(row.clone());
    }

    fn clear_rows(&self) {
        lock(&self.state).rows.clear();
    }

    fn set_total(&self, text: &str) {
        lock(&self.state).total = text.to_string();
    }

    fn set_meta(&self, text: &str) {
        lock(&self.state).meta = text.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HexAddress;

    const T: &str = "0x95B303987A60C71504D99Aa1b13B4DA07b0790ab";

    #[tokio::test]
    async fn test_mock_price_source_filters_and_records() {
        let mock = MockPriceSource::new()
            .with_price(T, 2.0, 1.0, 100.0)
            .with_price("0x1111111111111111111111111111111111111111", 9.0, 0.0, 1.0);

        let token = HexAddress::parse(T).unwrap();
        let pairs = mock.fetch_pairs(std::slice::from_ref(&token)).await.unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].price_usd, Some(2.0));
        assert_eq!(mock.get_calls(), vec![vec![T.to_lowercase()]]);
    }

    #[tokio::test]
    async fn test_mock_price_source_failure() {
        let mock = MockPriceSource::new().failing_on_call(0);
        let token = HexAddress::parse(T).unwrap();
        assert!(mock.fetch_pairs(&[token]).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_chain_reads() {
        let chain = MockChain::new().with_token(T, "PLSX", 18, U256::from(5u64));
        let token = HexAddress::parse(T).unwrap();

        assert_eq!(chain.symbol(&token).await.unwrap(), "PLSX");
        assert_eq!(chain.decimals(&token).await.unwrap(), 18);
        assert_eq!(chain.balance_of(&token, &token).await.unwrap(), U256::from(5u64));
        assert_eq!(chain.balance_calls(), vec![T.to_lowercase()]);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.set_status("Loading balances…", StatusKind::Ok);
        sink.set_total("$1.00");
        sink.set_meta("Tokens: 1 • Priced: 1");

        let state = sink.snapshot();
        assert_eq!(state.status, "Loading balances…");
        assert_eq!(state.total, "$1.00");
        assert_eq!(sink.statuses().len(), 1);
    }
}
