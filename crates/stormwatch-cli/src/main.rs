mod alerts;
mod export;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stormwatch_core::AppConfig;
use stormwatch_nws::NwsClient;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stormwatch-cli")]
#[command(about = "Storm-related store closure tracking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch alerts and stores, classify every store, and print the tally.
    Scan {
        /// Stores classified per batch; defaults to `STORMWATCH_BATCH_SIZE`.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Only list stores whose closure is storm-related.
        #[arg(long)]
        storm_only: bool,
    },
    /// List active alerts after zone enrichment.
    Alerts {
        /// Only show alerts of this event type, e.g. "Tornado Warning".
        #[arg(long)]
        event: Option<String>,
    },
    /// Write the full store directory to a CSV file.
    Export {
        /// Output path; `-` writes to stdout.
        #[arg(long, default_value = "store_locations.csv")]
        csv: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = stormwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Scan {
            batch_size,
            storm_only,
        }) => scan::run_scan(&config, batch_size, storm_only).await?,
        Some(Commands::Alerts { event }) => alerts::run_alerts(&config, event.as_deref()).await?,
        Some(Commands::Export { csv }) => export::run_export(&config, &csv).await?,
        None => println!(
            "no command given; try `stormwatch-cli scan`, `stormwatch-cli alerts` or `stormwatch-cli export`"
        ),
    }

    Ok(())
}

fn nws_client(config: &AppConfig) -> anyhow::Result<NwsClient> {
    Ok(NwsClient::with_base_url(
        &config.nws_base_url,
        &config.user_agent,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
    )?)
}

/// Cut `text` to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
