pub mod chain_reader;
pub mod orchestrator;
pub mod price_lookup;
pub mod session;

pub use chain_reader::{BalanceReadError, ChainReader, DEFAULT_DECIMALS, DEFAULT_SYMBOL};
pub use orchestrator::{
    LoadError, LoadOrchestrator, LoadPhase, LoadReport, LoadRequest, LoaderSettings,
    DEFAULT_CONCURRENCY,
};
pub use price_lookup::{PriceLookup, DEFAULT_MAX_BATCH};
pub use session::{FormState, Session, SessionOutcome, ShellCommand};
