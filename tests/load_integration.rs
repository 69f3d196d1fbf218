//! Portfolio Load Integration Tests
//!
//! Drive the whole load pipeline through the in-memory ports:
//! 1. Validation -> chain probe -> prices -> balances -> summary
//! 2. Clear after a completed load
//! 3. Price service outage
//! 4. Row order and bounded fan-out
//! 5. Single-flight rejection
//!
//! All tests are deterministic (no real network calls).

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use tokio::sync::Notify;

use pulsefolio::application::orchestrator::{
    EMPTY_TOTAL, STATUS_CLEARED, STATUS_CONNECTING, STATUS_LOADED, STATUS_LOADED_NO_PRICES,
    STATUS_PRICES_DOWN,
};
use pulsefolio::application::{
    ChainReader, LoadError, LoadOrchestrator, LoadRequest, LoaderSettings, PriceLookup,
};
use pulsefolio::domain::{FALLBACK_LABEL, NO_PRICE, PLACEHOLDER};
use pulsefolio::ports::mocks::{MockChain, MockPriceSource, RecordingSink};
use pulsefolio::ports::StatusKind;

// ============================================================================
// Test Fixtures
// ============================================================================

const WALLET: &str = "0x9Cd83BE15a79646A3D22B81fc8dDf7B7240a62cB";
const T1: &str = "0x95B303987A60C71504D99Aa1b13B4DA07b0790ab";
const T2: &str = "0x2b591e99afE9f32eAA6214f7B7629768c40Eeb39";

type TestOrchestrator = LoadOrchestrator<MockChain, MockPriceSource, RecordingSink>;

fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

fn numbered(i: usize) -> String {
    format!("0x{:040x}", i + 1)
}

fn create_orchestrator(chain: MockChain, source: MockPriceSource) -> TestOrchestrator {
    LoadOrchestrator::new(
        ChainReader::new(Arc::new(chain), Duration::from_secs(5)),
        PriceLookup::new(Arc::new(source)),
        Arc::new(RecordingSink::new()),
    )
}

/// T1 holds 10 units priced at $2; T2 reverts on balanceOf
fn two_token_market() -> (MockChain, MockPriceSource) {
    let chain = MockChain::new()
        .with_token(T1, "PLSX", 18, units(10))
        .with_failing_balance(T2, "execution reverted: not a token");
    let source = MockPriceSource::new()
        .with_price(T1, 2.0, 1.5, 50_000.0)
        .with_price(T2, 0.004, -2.0, 10_000.0);
    (chain, source)
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test]
async fn test_priced_and_failed_tokens_end_to_end() {
    let (chain, source) = two_token_market();
    let orch = create_orchestrator(chain, source);

    let report = orch
        .load(&LoadRequest::new(WALLET, format!("{}\n{}", T1, T2)))
        .await
        .unwrap();

    let state = orch.sink().snapshot();
    assert_eq!(state.rows.len(), 2);

    let priced = &state.rows[0];
    assert_eq!(priced.label, "PLSX");
    assert_eq!(priced.balance, "10");
    assert_eq!(priced.price, "$2.00");
    assert_eq!(priced.value, "$20.00");
    assert_eq!(priced.change_24h, "1.50%");
    assert!(priced.error.is_none());

    let failed = &state.rows[1];
    assert_eq!(failed.label, FALLBACK_LABEL);
    assert_eq!(failed.balance, PLACEHOLDER);
    assert_eq!(failed.value, PLACEHOLDER);
    assert!(failed.error.as_deref().unwrap().contains("execution reverted"));

    assert_eq!(state.total, "$20.00");
    assert_eq!(state.meta, "Tokens: 2 • Priced: 1");
    assert_eq!(state.status, STATUS_LOADED);
    assert_eq!(state.status_kind, StatusKind::Ok);

    assert_eq!(report.rows, state.rows);
    assert_eq!(report.wallet.as_str(), WALLET);
    assert!(report.prices_available);
}

#[tokio::test]
async fn test_unpriced_token_counts_but_adds_nothing() {
    let chain = MockChain::new().with_token(T1, "PLSX", 18, units(3));
    let orch = create_orchestrator(chain, MockPriceSource::new());

    let report = orch.load(&LoadRequest::new(WALLET, T1)).await.unwrap();

    let row = &report.rows[0];
    assert_eq!(row.balance, "3");
    assert_eq!(row.price, PLACEHOLDER);
    assert_eq!(row.error.as_deref(), Some(NO_PRICE));
    assert_eq!(orch.sink().snapshot().meta, "Tokens: 1 • Priced: 0");
    assert_eq!(orch.sink().snapshot().total, "$0.00");
}

#[test]
fn test_load_from_sync_context() {
    let (chain, source) = two_token_market();
    let orch = create_orchestrator(chain, source);

    let report = tokio_test::block_on(orch.load(&LoadRequest::new(WALLET, T1))).unwrap();
    assert_eq!(report.summary.total_display(), "$20.00");
}

// ============================================================================
// Clear
// ============================================================================

#[tokio::test]
async fn test_clear_after_load() {
    let (chain, source) = two_token_market();
    let orch = create_orchestrator(chain, source);
    orch.load(&LoadRequest::new(WALLET, format!("{},{}", T1, T2))).await.unwrap();

    assert!(orch.clear());

    let state = orch.sink().snapshot();
    assert!(state.rows.is_empty());
    assert_eq!(state.total, EMPTY_TOTAL);
    assert_eq!(state.meta, PLACEHOLDER);
    assert_eq!(state.status, STATUS_CLEARED);
}

// ============================================================================
// Price outage
// ============================================================================

#[tokio::test]
async fn test_price_outage_still_lists_balances() {
    let (chain, source) = two_token_market();
    let orch = create_orchestrator(chain, source.failing_on_call(0));

    let report = orch
        .load(&LoadRequest::new(WALLET, format!("{}\n{}", T1, T2)))
        .await
        .unwrap();

    assert!(!report.prices_available);
    assert_eq!(report.rows[0].balance, "10");
    assert_eq!(report.rows[0].error.as_deref(), Some(NO_PRICE));
    assert_eq!(report.rows[1].label, FALLBACK_LABEL);

    let sink = orch.sink();
    assert!(sink
        .statuses()
        .contains(&(STATUS_PRICES_DOWN.to_string(), StatusKind::Warn)));
    let state = sink.snapshot();
    assert_eq!(state.status, STATUS_LOADED_NO_PRICES);
    assert_eq!(state.status_kind, StatusKind::Warn);
    assert_eq!(state.meta, "Tokens: 2 • Priced: 0");
}

#[tokio::test]
async fn test_large_list_is_priced_in_batches() {
    let tokens: Vec<String> = (0..61).map(numbered).collect();
    let mut chain = MockChain::new();
    let mut source = MockPriceSource::new();
    for token in &tokens {
        chain = chain.with_token(token, "T", 0, U256::from(1u64));
        source = source.with_price(token, 1.0, 0.0, 1.0);
    }
    let source = Arc::new(source);
    let orch = LoadOrchestrator::new(
        ChainReader::new(Arc::new(chain), Duration::from_secs(5)),
        PriceLookup::new(Arc::clone(&source)),
        Arc::new(RecordingSink::new()),
    );

    let report = orch.load(&LoadRequest::new(WALLET, tokens.join(","))).await.unwrap();

    let sizes: Vec<usize> = source.get_calls().iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![30, 30, 1]);
    assert_eq!(report.summary.priced_count, 61);
    assert_eq!(orch.sink().snapshot().total, "$61.00");
}

// ============================================================================
// Fan-out
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_rows_keep_input_order_under_fan_out() {
    let tokens: Vec<String> = (0..8).map(numbered).collect();
    let mut chain = MockChain::new();
    for (i, token) in tokens.iter().enumerate() {
        // Earlier tokens answer later
        chain = chain
            .with_token(token, &format!("T{}", i), 0, U256::from(i as u64 + 1))
            .with_delay(token, Duration::from_millis(100 * (8 - i as u64)));
    }
    let chain = Arc::new(chain);
    let orch = LoadOrchestrator::new(
        ChainReader::new(Arc::clone(&chain), Duration::from_secs(5)),
        PriceLookup::new(Arc::new(MockPriceSource::new())),
        Arc::new(RecordingSink::new()),
    )
    .with_settings(LoaderSettings { concurrency: 3 });

    orch.load(&LoadRequest::new(WALLET, tokens.join("\n"))).await.unwrap();

    let labels: Vec<String> = orch.sink().snapshot().rows.into_iter().map(|r| r.label).collect();
    let expected: Vec<String> = (0..8).map(|i| format!("T{}", i)).collect();
    assert_eq!(labels, expected);

    assert!(chain.max_in_flight() <= 3);
    assert!(chain.max_in_flight() > 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_balance_read_times_out_into_error_row() {
    let chain = MockChain::new()
        .with_token(T1, "PLSX", 18, units(1))
        .with_delay(T1, Duration::from_secs(60));
    let orch = LoadOrchestrator::new(
        ChainReader::new(Arc::new(chain), Duration::from_secs(5)),
        PriceLookup::new(Arc::new(MockPriceSource::new())),
        Arc::new(RecordingSink::new()),
    );

    let report = orch.load(&LoadRequest::new(WALLET, T1)).await.unwrap();
    assert_eq!(report.rows[0].label, FALLBACK_LABEL);
    assert!(report.rows[0].error.as_deref().unwrap().contains("Timed out"));
}

// ============================================================================
// Single flight
// ============================================================================

#[tokio::test]
async fn test_second_load_rejected_while_first_runs() {
    let gate = Arc::new(Notify::new());
    let (chain, source) = two_token_market();
    let orch = Arc::new(create_orchestrator(chain.with_probe_gate(Arc::clone(&gate)), source));

    let first = tokio::spawn({
        let orch = Arc::clone(&orch);
        async move { orch.load(&LoadRequest::new(WALLET, T1)).await }
    });
    while !orch.is_loading() {
        tokio::task::yield_now().await;
    }

    let second = orch.load(&LoadRequest::new(WALLET, T2)).await;
    assert!(matches!(second, Err(LoadError::AlreadyRunning)));
    assert!(!orch.clear());
    // The status line still belongs to the running load
    let state = orch.sink().snapshot();
    assert_eq!(state.status, STATUS_CONNECTING);
    assert_eq!(state.status_kind, StatusKind::Ok);

    gate.notify_one();
    let report = first.await.unwrap().unwrap();

    // The rejected trigger left the first load's rows alone
    assert_eq!(report.rows.len(), 1);
    assert_eq!(orch.sink().snapshot().rows[0].label, "PLSX");
    assert_eq!(orch.sink().snapshot().status, STATUS_LOADED);
    assert!(!orch.is_loading());

    // And a new load is accepted afterwards
    gate.notify_one();
    assert!(orch.load(&LoadRequest::new(WALLET, T1)).await.is_ok());
}
