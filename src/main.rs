//! Pulsefolio - Token portfolio viewer for PulseChain wallets

use anyhow::Result;

use pulsefolio::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (RPC overrides go here, not in the config file)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
