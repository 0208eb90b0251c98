//! Mercado Bitcoin ingestor - Entry Point
//!
//! Fetches every pending day for the configured APIs and coins, then exits.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use mbtc_core::Coin;
use mbtc_ingestor::{AppConfig, Application};
use tracing::{info, warn};

/// Mercado Bitcoin market data ingestor
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MBTC_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured coins (e.g. BTC,ETH)
    #[arg(long, value_delimiter = ',')]
    coins: Option<Vec<Coin>>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config path: CLI arg > MBTC_CONFIG env var > config/default.toml
    let (mut config, loaded_from) = AppConfig::load(args.config)?;
    if let Some(coins) = args.coins {
        config.coins = coins;
    }

    mbtc_telemetry::init_logging(config.telemetry.log_level.as_deref())?;

    info!("Starting mbtc-ingestor v{}", env!("CARGO_PKG_VERSION"));
    match &loaded_from {
        Some(path) => info!(config_path = %path.display(), "Configuration loaded"),
        None => warn!("Config file not found, using defaults"),
    }

    let app = Application::new(config)?;
    let summaries = app.run_once(Utc::now().date_naive()).await?;

    for summary in &summaries {
        info!(
            api = %summary.api,
            periods = summary.periods,
            records = summary.records,
            next = %summary.next_date,
            "API done"
        );
    }

    Ok(())
}
