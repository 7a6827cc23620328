use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::db::{map_unique, StoreError};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, avatar_url, created_at, updated_at";

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn full_name_taken(&self, full_name: &str) -> Result<bool, StoreError>;
    /// Inserts the user; a duplicate email or display name is [`StoreError::Duplicate`].
    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn full_name_taken(&self, full_name: &str) -> Result<bool, StoreError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE full_name = $1)",
        )
        .bind(full_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, full_name, password_hash, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.email)
        .bind(new.full_name)
        .bind(new.password_hash)
        .bind(new.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique(
                e,
                &[("users_email_key", "email"), ("users_full_name_key", "fullName")],
            )
        })
    }
}
