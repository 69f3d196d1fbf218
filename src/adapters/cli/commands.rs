//! CLI Command Handlers
//!
//! Implementation of all CLI commands for Pulsefolio.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::adapters::console::{ConsoleSink, OutputMode};
use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::evm::EvmClient;
use crate::application::{
    ChainReader, LoadOrchestrator, LoadRequest, LoaderSettings, PriceLookup, Session,
    SessionOutcome, ShellCommand,
};
use crate::config::{load_config, Config};
use crate::domain::{format_optional_percent, format_usd, parse_token_list, NO_PRICE};

/// Pulsefolio - Token portfolio viewer for PulseChain wallets
#[derive(Parser, Debug)]
#[command(
    name = "pulsefolio",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Token portfolio viewer for PulseChain wallets",
    long_about = "Pulsefolio reads ERC20 balances for a wallet over JSON-RPC, prices each \
                  token from its deepest DexScreener pool and prints a valued table."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load balances and prices for a wallet
    Load(LoadCmd),

    /// Look up prices only
    Prices(PricesCmd),

    /// Interactive form: set wallet and tokens, then load
    Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load a portfolio
#[derive(Parser, Debug)]
pub struct LoadCmd {
    /// Wallet address (0x + 40 hex)
    #[arg(short, long, value_name = "ADDRESS")]
    pub wallet: String,

    /// Token addresses, comma or newline separated
    #[arg(short, long, value_name = "LIST")]
    pub tokens: Option<String>,

    /// File with token addresses, one per line
    #[arg(long, value_name = "FILE")]
    pub tokens_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Price lookup
#[derive(Parser, Debug)]
pub struct PricesCmd {
    /// Token addresses, comma or newline separated
    #[arg(short, long, value_name = "LIST")]
    pub tokens: String,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let config = resolve_config(app.config.as_deref())?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Load(cmd) => load_command(cmd, &config).await,
        Command::Prices(cmd) => prices_command(cmd, &config).await,
        Command::Shell => shell_command(&config).await,
    }
}

/// Initialize logging system. `RUST_LOG` wins over flags and config.
fn init_logging(verbose: bool, debug: bool, configured: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured
    };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("Invalid log level '{}'", fallback))?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn resolve_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let path = expand_path(path);
            load_config(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };
    config.apply_env_overrides();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn price_lookup(config: &Config) -> Result<PriceLookup<DexScreenerClient>> {
    let client = DexScreenerClient::with_config(DexScreenerConfig {
        api_base_url: config.prices.api_url.clone(),
        chain_id: config.prices.chain_id.clone(),
        timeout: config.prices.timeout(),
    })
    .context("Failed to create DexScreener client")?;

    Ok(PriceLookup::with_max_batch(Arc::new(client), config.prices.max_batch))
}

fn build_orchestrator(
    config: &Config,
    mode: OutputMode,
) -> Result<LoadOrchestrator<EvmClient, DexScreenerClient, ConsoleSink>> {
    let chain = EvmClient::connect(&config.chain.rpc_url).context("Failed to create RPC client")?;
    tracing::info!(rpc_url = %chain.rpc_url(), "rpc client ready");

    let reader = ChainReader::new(Arc::new(chain), config.chain.rpc_timeout());
    let orchestrator = LoadOrchestrator::new(reader, price_lookup(config)?, Arc::new(ConsoleSink::new(mode)))
        .with_settings(LoaderSettings {
            concurrency: config.loader.concurrency,
        });
    Ok(orchestrator)
}

/// Concatenate `--tokens` and `--tokens-file` contents, newline separated
fn collect_tokens(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    let mut parts = Vec::new();
    if let Some(inline) = inline {
        parts.push(inline.to_string());
    }
    if let Some(file) = file {
        let path = expand_path(file);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read token file {}", path.display()))?;
        parts.push(content);
    }
    Ok(parts.join("\n"))
}

/// Handle load command
async fn load_command(cmd: LoadCmd, config: &Config) -> Result<()> {
    let tokens = collect_tokens(cmd.tokens.as_deref(), cmd.tokens_file.as_deref())?;
    let mode = match cmd.format {
        OutputFormat::Text => OutputMode::Text,
        OutputFormat::Json => OutputMode::Json,
    };

    let orchestrator = build_orchestrator(config, mode)?;
    let report = orchestrator
        .load(&LoadRequest::new(cmd.wallet, tokens))
        .await
        .context("Load aborted")?;

    if cmd.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    }

    Ok(())
}

/// Handle prices command
async fn prices_command(cmd: PricesCmd, config: &Config) -> Result<()> {
    let tokens = parse_token_list(&cmd.tokens);
    if tokens.is_empty() {
        bail!("Enter at least one token");
    }

    let prices = price_lookup(config)?
        .get_prices(&tokens)
        .await
        .context("Price service unavailable")?;

    for token in &tokens {
        match prices.get(&token.key()).and_then(|q| q.price.map(|p| (p, q.change_24h))) {
            Some((price, change)) => println!(
                "{}  {:>16}  {:>9}",
                token,
                format_usd(price),
                format_optional_percent(change)
            ),
            None => println!("{}  {}", token, NO_PRICE),
        }
    }

    Ok(())
}

/// Handle shell command
async fn shell_command(config: &Config) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(config, OutputMode::Text)?);
    let mut session = Session::new(orchestrator);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("pulsefolio shell, type 'help' for commands");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match session.execute(ShellCommand::parse(&line)).await {
            SessionOutcome::Continue | SessionOutcome::Loaded(_) => {}
            SessionOutcome::Print(text) => println!("{}", text),
            SessionOutcome::Quit => break,
        }
    }

    Ok(())
}
