use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// Post record in the secondary (SQLite) store. Timestamps are assigned in
/// process since SQLite has no NOW() default worth relying on here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn ensure_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            user_id BLOB NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(db)
    .await?;
    Ok(())
}

impl Post {
    pub async fn create(
        db: &SqlitePool,
        title: &str,
        content: &str,
        user_id: Uuid,
    ) -> Result<Post, ApiError> {
        let now = OffsetDateTime::now_utc();
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, content, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(post)
    }

    pub async fn list(db: &SqlitePool) -> Result<Vec<Post>, ApiError> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find(db: &SqlitePool, id: Uuid) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, user_id, created_at, updated_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    /// Partial update; missing fields keep their stored value.
    pub async fn update(
        db: &SqlitePool,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Post>, ApiError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                updated_at = ?
            WHERE id = ?
            RETURNING id, title, content, user_id, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(post)
    }

    pub async fn delete(db: &SqlitePool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
