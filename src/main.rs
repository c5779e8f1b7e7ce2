use std::sync::Arc;

use aeronyx_sentinel::utils::logging::init_logging;
use aeronyx_sentinel::{Agent, AgentArgs, AgentConfig, SystemMetricsProvider, TelegramTransport};
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first so `.env` values feed the argument fallbacks
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = AgentArgs::parse();
    let config = AgentConfig::from_args(args).context("Invalid configuration")?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = init_logging(&config.log_level, &config.log_file)
        .context("Failed to initialize logging")?;

    tracing::info!("Starting AeroNyx Sentinel");
    tracing::info!("Agent version: {}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let transport = TelegramTransport::new(&config.api_url, &config.bot_token, config.poll_timeout)
        .context("Failed to create Telegram client")?;
    let metrics = SystemMetricsProvider::new();

    let mut agent = Agent::new(config, Arc::new(transport), Arc::new(metrics));
    agent.run().await;

    Ok(())
}
