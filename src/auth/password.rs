use async_trait::async_trait;
use tracing::error;

use crate::error::ApiError;

/// One-way password hashing behind a trait so tests can swap in a cheap
/// deterministic fake. The real implementation is bcrypt with a configurable
/// work factor.
#[async_trait]
pub trait Hasher: Send + Sync {
    async fn hash(&self, plain: &str) -> Result<String, ApiError>;
    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

#[async_trait]
impl Hasher for BcryptHasher {
    async fn hash(&self, plain: &str) -> Result<String, ApiError> {
        // bcrypt is CPU-bound; keep it off the async executor.
        let plain = plain.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| {
                error!(error = %e, "hash task panicked");
                ApiError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "bcrypt hash failed");
                ApiError::Internal
            })
    }

    async fn verify(&self, plain: &str, digest: &str) -> Result<bool, ApiError> {
        let plain = plain.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &digest))
            .await
            .map_err(|e| {
                error!(error = %e, "verify task panicked");
                ApiError::Internal
            })?
            .map_err(|e| {
                error!(error = %e, "bcrypt verify failed");
                ApiError::Internal
            })
    }
}
