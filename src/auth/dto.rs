use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::User;
use crate::validation::{Chain, Check, Rule, Validated};

pub const MIN_PASSWORD_LEN: usize = 5;

lazy_static! {
    static ref REGISTER_CHAIN: Chain = Chain::new(
        "register",
        vec![
            Rule::new("email", Check::Email, "Invalid email format"),
            Rule::new(
                "password",
                Check::MinLength(MIN_PASSWORD_LEN),
                "Password must be at least 5 characters"
            ),
            Rule::new("fullName", Check::IsString, "Display name must be a string"),
            Rule::new("fullName", Check::Required, "Display name is required"),
            Rule::new("avatarUrl", Check::Url, "Invalid avatar URL").optional(),
        ],
    );
    static ref LOGIN_CHAIN: Chain = Chain::new(
        "login",
        vec![
            Rule::new("email", Check::Email, "Invalid email format"),
            Rule::new(
                "password",
                Check::MinLength(MIN_PASSWORD_LEN),
                "Password must be at least 5 characters"
            ),
        ],
    );
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl Validated for RegisterRequest {
    fn chain() -> &'static Chain {
        &REGISTER_CHAIN
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validated for LoginRequest {
    fn chain() -> &'static Chain {
        &LOGIN_CHAIN
    }
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            avatar_url: u.avatar_url,
            created_at: u.created_at,
        }
    }
}

/// Login identifiers are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
