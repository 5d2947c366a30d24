use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, sqlite::SqlitePoolOptions, PgPool, SqlitePool};

use crate::config::AppConfig;

/// Shared per-process state: both connection pools and the config, injected
/// into handlers through axum's `State` extraction.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub posts_db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await
            .context("connect to postgres")?;

        let posts_db = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.posts_database_url)
            .await
            .context("connect to sqlite posts store")?;

        Ok(Self {
            db,
            posts_db,
            config,
        })
    }
}
