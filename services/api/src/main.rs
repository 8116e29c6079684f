use anyhow::Result;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod auth;
mod catalog;
mod config;
mod error;
mod favorites;
mod friendship;
mod jwt;
mod metadata_proxy;
mod middleware;
mod models;
mod password;
mod repositories;
mod routes;
mod state;
mod validation;
mod watch_status;

#[cfg(test)]
mod testutil;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{
    config::Settings,
    jwt::{JwtConfig, JwtService},
    password::PasswordService,
    state::{AppState, Stores},
};

static MIGRATOR: Migrator = sqlx::migrate!();

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let settings = Settings::from_env()?;
    let jwt = JwtService::new(JwtConfig::from_env()?)?;
    let passwords = PasswordService::from_settings(&settings)?;
    info!("Tokens expire after {} seconds", jwt.token_expiry());

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;

    let app_state = AppState::new(Stores::postgres(pool), jwt, passwords, &settings)?;
    let app = routes::create_router(app_state, &settings.cors_origins);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("API service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
