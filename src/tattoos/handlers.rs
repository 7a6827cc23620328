use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{Pagination, TattooRequest};
use super::repo_types::{Tattoo, TattooFields};
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState, validation::ValidatedJson};

pub fn tattoo_routes() -> Router<AppState> {
    Router::new()
        .route("/tattoos", get(list_tattoos).post(create_tattoo))
        .route(
            "/tattoos/:id",
            get(get_tattoo).patch(update_tattoo).delete(delete_tattoo),
        )
}

#[instrument(skip(state))]
pub async fn list_tattoos(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Tattoo>>, AppError> {
    let Query(p) = query?;
    let limit = p.limit.map(|l| l.max(0));
    let tattoos = state.tattoos.list(limit, p.offset.max(0)).await?;
    Ok(Json(tattoos))
}

#[instrument(skip(state))]
pub async fn get_tattoo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tattoo>, AppError> {
    let id = parse_id(&id)?;
    let tattoo = state
        .tattoos
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Tattoo"))?;
    Ok(Json(tattoo))
}

#[instrument(skip(state, payload))]
pub async fn create_tattoo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ValidatedJson(payload): ValidatedJson<TattooRequest>,
) -> Result<(StatusCode, Json<Tattoo>), AppError> {
    if state.users.find_by_id(user_id).await?.is_none() {
        warn!(%user_id, "token for a user that no longer exists");
        return Err(AppError::NotFound("User"));
    }

    let tattoo = state.tattoos.create(user_id, &TattooFields::from(payload)).await?;

    info!(tattoo_id = %tattoo.id, %user_id, "tattoo created");
    Ok((StatusCode::CREATED, Json(tattoo)))
}

#[instrument(skip(state, payload))]
pub async fn update_tattoo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<TattooRequest>,
) -> Result<Json<Tattoo>, AppError> {
    let id = parse_id(&id)?;
    ensure_may_modify(&state, user_id, id).await?;

    let tattoo = state
        .tattoos
        .update(id, &TattooFields::from(payload))
        .await?
        .ok_or(AppError::NotFound("Tattoo"))?;

    info!(tattoo_id = %id, %user_id, "tattoo updated");
    Ok(Json(tattoo))
}

#[instrument(skip(state))]
pub async fn delete_tattoo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    ensure_may_modify(&state, user_id, id).await?;

    if !state.tattoos.delete(id).await? {
        return Err(AppError::NotFound("Tattoo"));
    }

    info!(tattoo_id = %id, %user_id, "tattoo deleted");
    Ok(Json(json!({ "success": true })))
}

/// Owner check, active only with `TATTOO_OWNER_ONLY`. Without it any
/// authenticated caller may modify any tattoo.
async fn ensure_may_modify(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    if !state.config.tattoo_owner_only {
        return Ok(());
    }
    let tattoo = state
        .tattoos
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Tattoo"))?;
    if tattoo.user_id != user_id {
        warn!(tattoo_id = %id, %user_id, owner = %tattoo.user_id, "modification by non-owner");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid tattoo id".into()))
}
