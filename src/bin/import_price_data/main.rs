//! Price-to-income importer - CSV of listings in, monthly affordability documents out

use anyhow::Result;
use price_to_income::ingestion::pipeline::{render_output, run_import};
use price_to_income::ingestion::write::{DocumentStore, MongoStore};
use price_to_income::ingestion::Config;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; stdout is reserved for the run's output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("✗ Import failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    info!("Starting price-to-income import");

    // The backend keeps its .env next to the server; fall back to the working directory
    dotenvy::from_filename("backend/.env").ok();
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    info!("Configuration loaded");

    let store = if config.dry_run {
        None
    } else {
        Some(MongoStore::connect(&config).await?)
    };

    let report = run_import(&config, store.as_ref().map(|s| s as &dyn DocumentStore)).await?;

    println!("{}", render_output(&report)?);

    info!("✓ Import complete: {}", report);

    Ok(())
}
