use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

/// Failure of a single store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the offending field.
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Opens the process-wide pool. The caller owns it and closes it on shutdown.
pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("connect to database")
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")
}

/// Turns unique-violation errors into [`StoreError::Duplicate`] using the
/// constraint name to pick the field.
pub fn map_unique(e: sqlx::Error, constraints: &[(&str, &'static str)]) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            if let Some(field) = db
                .constraint()
                .and_then(|c| constraints.iter().find(|(name, _)| *name == c))
                .map(|(_, field)| *field)
            {
                return StoreError::Duplicate(field);
            }
        }
    }
    StoreError::Database(e)
}
