use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::tattoos::repo_types::{Tattoo, TattooFields};

const TATTOO_COLUMNS: &str =
    "id, user_id, title, description, style, image_url, created_at, updated_at";

#[async_trait]
pub trait TattooRepo: Send + Sync {
    /// Newest first. `limit: None` returns everything after `offset`.
    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Tattoo>, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Option<Tattoo>, StoreError>;
    async fn create(&self, user_id: Uuid, fields: &TattooFields) -> Result<Tattoo, StoreError>;
    /// `None` when no tattoo has this id.
    async fn update(&self, id: Uuid, fields: &TattooFields) -> Result<Option<Tattoo>, StoreError>;
    /// `false` when no tattoo has this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgTattooRepo {
    pool: PgPool,
}

impl PgTattooRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TattooRepo for PgTattooRepo {
    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Tattoo>, StoreError> {
        // LIMIT NULL means no limit in Postgres.
        let rows = sqlx::query_as::<_, Tattoo>(&format!(
            r#"
            SELECT {TATTOO_COLUMNS}
            FROM tattoos
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tattoo>, StoreError> {
        let row = sqlx::query_as::<_, Tattoo>(&format!(
            "SELECT {TATTOO_COLUMNS} FROM tattoos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create(&self, user_id: Uuid, fields: &TattooFields) -> Result<Tattoo, StoreError> {
        let row = sqlx::query_as::<_, Tattoo>(&format!(
            r#"
            INSERT INTO tattoos (user_id, title, description, style, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TATTOO_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.style)
        .bind(&fields.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, fields: &TattooFields) -> Result<Option<Tattoo>, StoreError> {
        let row = sqlx::query_as::<_, Tattoo>(&format!(
            r#"
            UPDATE tattoos
               SET title = $2, description = $3, style = $4, image_url = $5, updated_at = now()
             WHERE id = $1
            RETURNING {TATTOO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.style)
        .bind(&fields.image_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tattoos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
