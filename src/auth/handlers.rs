use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{normalize_email, AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::AuthUser,
        password::{hash_password, verify_against_dummy, verify_password},
        repo_types::NewUser,
    },
    error::AppError,
    state::AppState,
    validation::ValidatedJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email);
    let full_name = payload.full_name.trim();

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }
    if state.users.full_name_taken(full_name).await? {
        warn!(full_name = %full_name, "display name already taken");
        return Err(AppError::Conflict("Display name already taken".into()));
    }

    let hash = hash_password(&payload.password)?;
    // Unique constraints reject a concurrent duplicate that passed the checks above.
    let user = state
        .users
        .create(NewUser {
            email: &email,
            full_name,
            password_hash: &hash,
            avatar_url: payload.avatar_url.as_deref(),
        })
        .await?;

    let token = state.keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        verify_against_dummy(&payload.password);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state.keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user.into()))
}
