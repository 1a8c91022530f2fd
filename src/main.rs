//! Daybook server binary
//!
//! Loads configuration, runs migrations, and serves the REST API.

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use daybook::api::{build_router, AppState};
use daybook::config::Config;
use daybook::db::{create_pool, migrations};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("daybook=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load_with_env(std::path::Path::new("config.yml"))
        .context("Failed to load configuration")?;

    tracing::info!(
        driver = ?config.database.driver,
        "Connecting to database"
    );
    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    pool.ping().await.context("Database ping failed")?;

    let applied = migrations::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    if applied > 0 {
        tracing::info!("Database schema is up to date ({} applied)", applied);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, pool);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
