use std::sync::Arc;

use anyhow::Context;
use rest_notes::config::Config;
use rest_notes::db::{self, SqliteStore};
use rest_notes::{AppState, app};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, public_url = %config.public_url, "starting rest-notes");

    let pool = db::init_db(&config.database_url)
        .await
        .context("database connection failed")?;
    db::migrate(&pool).await.context("database migration failed")?;

    let state = AppState::new(Arc::new(SqliteStore::new(pool)), &config.public_url);
    let router = app(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!("listening on {}", config.addr);
    axum::serve(listener, router).await?;
    Ok(())
}
