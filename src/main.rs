//! mvp-scraper - batch scraper for divine-pride.net MVP data
//!
//! Two subcommands:
//! - `extract` (default): discover MVP ids, fetch details and images, write
//!   the `mvps_data.json` sink
//! - `load`: rebuild the SQLite store from the sink

mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::{ExtractOutcome, ExtractorService, SINK_FILE};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::confirm::StdinConfirm;
use crate::infrastructure::divine_pride::{DivinePrideClient, DIVINE_PRIDE_BASE_URL};
use crate::infrastructure::listing_parser::MvpRowParser;
use crate::infrastructure::persistence::load_sink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mvp_scraper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let command = std::env::args().nth(1).unwrap_or_else(|| "extract".to_string());
    match command.as_str() {
        "extract" => extract(config).await,
        "load" => load(config).await,
        other => anyhow::bail!("unknown command '{}' (expected 'extract' or 'load')", other),
    }
}

async fn extract(config: AppConfig) -> anyhow::Result<()> {
    let api_key = config.require_api_key()?;

    let site = Arc::new(DivinePrideClient::new(DIVINE_PRIDE_BASE_URL, api_key));
    let service = ExtractorService::new(
        site,
        Arc::new(MvpRowParser),
        Arc::new(StdinConfirm),
        config.extractor_config(),
    );

    // Interrupting mid-run leaves no partial sink: the file is only written
    // once every entity has settled.
    tokio::select! {
        result = service.run() => match result? {
            ExtractOutcome::Completed(summary) => {
                tracing::info!(
                    "Done: {} included, {} without detail, {} with empty maps, {} failed -> {}",
                    summary.included,
                    summary.skipped_no_detail,
                    summary.skipped_empty_maps,
                    summary.failed,
                    summary.sink_path.display()
                );
            }
            ExtractOutcome::Aborted => {
                tracing::info!("Aborting, existing sink left untouched");
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, no output written");
        }
    }

    Ok(())
}

async fn load(config: AppConfig) -> anyhow::Result<()> {
    let sink_path = config.output_path.join(SINK_FILE);
    let summary = load_sink(&sink_path, &config.database_path).await?;
    tracing::info!(
        "Loaded {} mvps and {} respawn rows into {}",
        summary.mvps,
        summary.respawns,
        config.database_path.display()
    );
    Ok(())
}
