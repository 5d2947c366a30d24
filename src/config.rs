use serde::Deserialize;

/// Default bcrypt work factor, matching the cost the service has always used.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub posts_database_url: String,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_values(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("POSTS_DATABASE_URL").ok(),
            std::env::var("JWT_SECRET").ok(),
            std::env::var("JWT_TTL_DAYS").ok().and_then(|v| v.parse().ok()),
            std::env::var("BCRYPT_COST").ok().and_then(|v| v.parse().ok()),
        )
    }

    /// Builds a config from already-read values so the startup invariants
    /// stay testable without touching the process environment.
    fn from_values(
        database_url: Option<String>,
        posts_database_url: Option<String>,
        secret: Option<String>,
        ttl_days: Option<i64>,
        bcrypt_cost: Option<u32>,
    ) -> anyhow::Result<Self> {
        let database_url = database_url.ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let posts_database_url =
            posts_database_url.unwrap_or_else(|| "sqlite://posts.db?mode=rwc".into());

        let secret = secret.unwrap_or_default();
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set and non-empty");
        }

        Ok(Self {
            database_url,
            posts_database_url,
            jwt: JwtConfig {
                secret,
                ttl_days: ttl_days.unwrap_or(DEFAULT_TOKEN_TTL_DAYS),
            },
            bcrypt_cost: bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST),
        })
    }
}
