use std::{path::Path, time::Duration};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod database;
mod importer;
mod models;
mod omdb;

use common::database::{DatabaseConfig, health_check, init_pool};
use database::Database;
use importer::{Importer, load_ttids};
use omdb::{IngestConfig, OmdbClient};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting catalog ingestion");

    let config = IngestConfig::from_env()?;
    let ttids = load_ttids(Path::new(&config.input_file))?;
    info!("Loaded {} ids from {}", ttids.len(), config.input_file);

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    if !health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }

    let omdb = OmdbClient::new(reqwest::Client::new(), config.base_url, config.api_key);
    let importer = Importer::new(
        omdb,
        Database::new(pool),
        Duration::from_millis(config.delay_ms),
    );

    let summary = importer.run(&ttids).await;
    info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        stored = summary.stored,
        "Catalog ingestion finished"
    );

    Ok(())
}
