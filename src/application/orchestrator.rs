//! Load Orchestrator
//!
//! Runs one portfolio load end to end:
//! validate inputs → probe the chain → fetch prices → read balances → summarise.
//! Everything visible goes through the injected [`RenderSink`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use serde::Serialize;
use thiserror::Error;

use super::chain_reader::ChainReader;
use super::price_lookup::PriceLookup;
use crate::domain::{
    parse_token_list, HexAddress, LoadSummary, PriceMap, TokenAddress, TokenRow, WalletAddress,
    PLACEHOLDER,
};
use crate::ports::{ChainPort, PriceSourcePort, RenderSink, StatusKind};

/// Default number of tokens whose balances are read at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

pub const STATUS_INVALID_WALLET: &str = "Invalid wallet address";
pub const STATUS_NO_TOKENS: &str = "Enter at least one token";
pub const STATUS_CONNECTING: &str = "Connecting RPC…";
pub const STATUS_RPC_BLOCKED: &str = "RPC blocked";
pub const STATUS_FETCHING_PRICES: &str = "Fetching prices…";
pub const STATUS_PRICES_DOWN: &str = "Price service unavailable";
pub const STATUS_LOADING_BALANCES: &str = "Loading balances…";
pub const STATUS_LOADED: &str = "Loaded ✓";
pub const STATUS_LOADED_NO_PRICES: &str = "Loaded ✓ (prices unavailable)";
pub const STATUS_CLEARED: &str = "Cleared";

/// Total shown when nothing is loaded
pub const EMPTY_TOTAL: &str = "$0.00";

/// Reasons a load stops before reading balances
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid wallet address: {0:?}")]
    InvalidWallet(String),
    #[error("Token list contains no valid addresses")]
    EmptyTokenList,
    #[error("Chain RPC unreachable: {0}")]
    ChainConnect(String),
    #[error("A load is already in progress")]
    AlreadyRunning,
}

/// Phases of a load, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Idle,
    ValidatingInput,
    ConnectingChain,
    FetchingPrices,
    LoadingBalances,
    Done,
    Aborted,
}

/// Raw form input for one load
#[derive(Debug, Clone, Default)]
pub struct LoadRequest {
    pub wallet: String,
    pub tokens: String,
}

impl LoadRequest {
    pub fn new(wallet: impl Into<String>, tokens: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            tokens: tokens.into(),
        }
    }
}

/// Everything a completed load rendered
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub wallet: WalletAddress,
    pub rows: Vec<TokenRow>,
    pub summary: LoadSummary,
    /// False when the price service failed and every token went unpriced
    pub prices_available: bool,
    pub loaded_at: DateTime<Utc>,
}

/// Orchestrator tuning
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub concurrency: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Clears the in-flight flag when a load ends, however it ends
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sequences validation, chain probe, price lookup and balance reads for one load at a time
pub struct LoadOrchestrator<C, P, S> {
    reader: ChainReader<C>,
    prices: PriceLookup<P>,
    sink: Arc<S>,
    settings: LoaderSettings,
    in_flight: AtomicBool,
    phase: std::sync::Mutex<LoadPhase>,
}

impl<C, P, S> LoadOrchestrator<C, P, S>
where
    C: ChainPort,
    P: PriceSourcePort,
    S: RenderSink,
{
    pub fn new(reader: ChainReader<C>, prices: PriceLookup<P>, sink: Arc<S>) -> Self {
        Self {
            reader,
            prices,
            sink,
            settings: LoaderSettings::default(),
            in_flight: AtomicBool::new(false),
            phase: std::sync::Mutex::new(LoadPhase::Idle),
        }
    }

    /// Set custom loader settings
    pub fn with_settings(mut self, settings: LoaderSettings) -> Self {
        self.settings = LoaderSettings {
            concurrency: settings.concurrency.max(1),
        };
        self
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Phase reached by the current or most recent load
    pub fn phase(&self) -> LoadPhase {
        *self.phase.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    /// Run one load.
    ///
    /// Input and connectivity failures abort with a warning status and no rows.
    /// Price and per-token failures are absorbed: every token still gets a row.
    pub async fn load(&self, request: &LoadRequest) -> Result<LoadReport, LoadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // The status line keeps showing the running load
            tracing::warn!("load requested while another load is running");
            return Err(LoadError::AlreadyRunning);
        }
        let _guard = FlightGuard(&self.in_flight);

        let result = self.run(request).await;
        if let Err(e) = &result {
            self.enter(LoadPhase::Aborted);
            tracing::warn!(error = %e, "load aborted");
        }
        result
    }

    /// Reset the render surface. Refused while a load is running.
    pub fn clear(&self) -> bool {
        if self.is_loading() {
            tracing::warn!("clear requested while a load is running");
            return false;
        }
        self.reset_surface();
        self.sink.set_status(STATUS_CLEARED, StatusKind::Ok);
        self.enter(LoadPhase::Idle);
        true
    }

    async fn run(&self, request: &LoadRequest) -> Result<LoadReport, LoadError> {
        let t0 = Instant::now();

        self.enter(LoadPhase::ValidatingInput);
        self.reset_surface();

        let wallet = HexAddress::parse(&request.wallet).ok_or_else(|| {
            self.sink.set_status(STATUS_INVALID_WALLET, StatusKind::Warn);
            LoadError::InvalidWallet(request.wallet.trim().to_string())
        })?;
        let tokens = parse_token_list(&request.tokens);
        if tokens.is_empty() {
            self.sink.set_status(STATUS_NO_TOKENS, StatusKind::Warn);
            return Err(LoadError::EmptyTokenList);
        }

        self.enter(LoadPhase::ConnectingChain);
        self.sink.set_status(STATUS_CONNECTING, StatusKind::Ok);
        let block = self.reader.probe().await.map_err(|e| {
            self.sink.set_status(STATUS_RPC_BLOCKED, StatusKind::Warn);
            LoadError::ChainConnect(e.to_string())
        })?;
        tracing::info!(block, "chain reachable");

        self.enter(LoadPhase::FetchingPrices);
        self.sink.set_status(STATUS_FETCHING_PRICES, StatusKind::Ok);
        let (prices, prices_available) = match self.prices.get_prices(&tokens).await {
            Ok(prices) => (prices, true),
            Err(e) => {
                tracing::warn!(error = %e, "price service unavailable, continuing without prices");
                self.sink.set_status(STATUS_PRICES_DOWN, StatusKind::Warn);
                (PriceMap::new(), false)
            }
        };

        self.enter(LoadPhase::LoadingBalances);
        self.sink.set_status(STATUS_LOADING_BALANCES, StatusKind::Ok);
        let (rows, summary) = self.load_balances(&wallet, &tokens, &prices).await;

        self.sink.set_total(&summary.total_display());
        self.sink.set_meta(&summary.meta_display());
        if prices_available {
            self.sink.set_status(STATUS_LOADED, StatusKind::Ok);
        } else {
            self.sink.set_status(STATUS_LOADED_NO_PRICES, StatusKind::Warn);
        }
        self.enter(LoadPhase::Done);

        tracing::info!(
            tokens = summary.tokens_count,
            priced = summary.priced_count,
            total_usd = summary.total_usd,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "load complete"
        );

        Ok(LoadReport {
            wallet,
            rows,
            summary,
            prices_available,
            loaded_at: Utc::now(),
        })
    }

    /// Read every token with bounded concurrency, appending rows in input order
    async fn load_balances(
        &self,
        wallet: &WalletAddress,
        tokens: &[TokenAddress],
        prices: &PriceMap,
    ) -> (Vec<TokenRow>, LoadSummary) {
        let mut summary = LoadSummary::new(tokens.len());
        let mut rows = Vec::with_capacity(tokens.len());

        let mut reads = stream::iter(tokens.iter().cloned())
            .map(|token| {
                let reader = self.reader.clone();
                let wallet = wallet.clone();
                async move {
                    let holding = reader.read_token(&wallet, &token).await;
                    (token, holding)
                }
            })
            .buffered(self.settings.concurrency);

        while let Some((token, holding)) = reads.next().await {
            let row = match holding {
                Ok(holding) => match prices.get(&token.key()).and_then(|q| q.price.map(|p| (p, q.change_24h))) {
                    Some((price, change_24h)) => {
                        summary.record_priced(holding.value_at(price));
                        TokenRow::priced(token, &holding, price, change_24h)
                    }
                    None => TokenRow::unpriced(token, &holding),
                },
                Err(e) => {
                    tracing::warn!(token = %token, error = %e, "balance read failed");
                    TokenRow::errored(token, e.to_string())
                }
            };
            tracing::debug!(token = %row.address, label = %row.label, value = %row.value, "row ready");
            self.sink.append_row(&row);
            rows.push(row);
        }

        (rows, summary)
    }

    fn reset_surface(&self) {
        self.sink.clear_rows();
        self.sink.set_total(EMPTY_TOTAL);
        self.sink.set_meta(PLACEHOLDER);
    }

    fn enter(&self, phase: LoadPhase) {
        tracing::debug!(?phase, "load phase");
        *self.phase.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = phase;
    }
}
