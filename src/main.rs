use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod state;
mod storage;
mod tattoos;
#[cfg(test)]
mod testing;
mod uploads;
mod validation;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tattoo_gallery=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    let pool = db::connect(&config).await?;
    if let Err(e) = db::migrate(&pool).await {
        tracing::warn!(error = ?e, "migration failed; continuing");
    }
    tracing::info!("database ready");

    let storage = storage::from_config(&config.storage).await?;
    let state = AppState::new(config.clone(), pool.clone(), storage);

    let result = app::serve(app::build_app(state), &config.host, config.port).await;

    pool.close().await;
    tracing::info!("database pool closed");
    result
}
