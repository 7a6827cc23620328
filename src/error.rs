use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::{db::StoreError, validation::FieldError};

/// Error type for every handler and extractor.
///
/// `Display` is for logs only; the client sees the message built in
/// [`AppError::into_response`].
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            Self::Validation(errors) => ("Validation failed".to_string(), errors),
            Self::BadRequest(msg) | Self::Conflict(msg) => (msg, Vec::new()),
            // One message for every token failure.
            Self::Unauthenticated => ("Unauthorized".to_string(), Vec::new()),
            Self::InvalidCredentials => ("Invalid login or password".to_string(), Vec::new()),
            Self::Forbidden => ("Only the owner can modify this tattoo".to_string(), Vec::new()),
            Self::NotFound(what) => (format!("{what} not found"), Vec::new()),
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                ("Internal server error".to_string(), Vec::new())
            }
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
                errors,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => Self::Conflict(format!("{field} is already taken")),
            StoreError::Database(e) => Self::Internal(e.into()),
        }
    }
}
