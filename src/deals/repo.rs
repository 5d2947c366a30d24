use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deal {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Deal {
    pub async fn create(
        db: &PgPool,
        title: &str,
        content: &str,
        user_id: Uuid,
    ) -> Result<Deal, ApiError> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals (id, title, content, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(user_id)
        .fetch_one(db)
        .await?;
        Ok(deal)
    }

    pub async fn list(db: &PgPool) -> Result<Vec<Deal>, ApiError> {
        let rows = sqlx::query_as::<_, Deal>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM deals
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<Deal>, ApiError> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM deals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(deal)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Option<Deal>, ApiError> {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals
            SET title = $1, content = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(deal)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM deals WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
