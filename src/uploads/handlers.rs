use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use super::services::{store_upload, StoredUpload, UploadItem};
use crate::{auth::jwt::AuthUser, error::AppError, state::AppState};

pub const PICTURE_FIELD: &str = "picture";

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_picture))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /upload (multipart, field `picture`)
#[instrument(skip(state, mp))]
pub async fn upload_picture(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<Json<StoredUpload>, AppError> {
    let mut mp = mp?;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(PICTURE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.is_empty() {
            return Err(AppError::BadRequest("picture is empty".into()));
        }

        let stored = store_upload(
            state.storage.as_ref(),
            UploadItem {
                file_name: file_name.as_deref(),
                content_type: &content_type,
                body,
            },
        )
        .await?;

        info!(%user_id, key = %stored.key, "picture uploaded");
        return Ok(Json(stored));
    }

    Err(AppError::BadRequest(format!("{PICTURE_FIELD} is required")))
}
