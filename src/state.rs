use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    storage::StorageClient,
    tattoos::repo::{PgTattooRepo, TattooRepo},
};

/// Everything a handler may touch. Built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub users: Arc<dyn UserRepo>,
    pub tattoos: Arc<dyn TattooRepo>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    /// Wires the Postgres repositories over an already opened pool.
    pub fn new(config: Arc<AppConfig>, pool: PgPool, storage: Arc<dyn StorageClient>) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgUserRepo::new(pool.clone())),
            Arc::new(PgTattooRepo::new(pool)),
            storage,
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        tattoos: Arc<dyn TattooRepo>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        Self {
            keys: JwtKeys::from_config(&config.jwt),
            config,
            users,
            tattoos,
            storage,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
