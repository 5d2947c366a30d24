use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT payload: subject id plus issued/expiry times. Nothing else is encoded
/// and nothing is persisted server-side.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// Why a token was rejected. The auth gate flattens all three to the same
/// generic 401; the distinction exists for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("malformed token")]
    Malformed,
    #[error("expired token")]
    Expired,
    #[error("bad signature")]
    BadSignature,
}

/// Issues and verifies bearer tokens. Trait-backed so tests can use a
/// deterministic codec instead of real signing.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, subject: Uuid) -> Result<String, ApiError>;
    fn verify(&self, token: &str) -> Result<Uuid, VerifyError>;
}

/// HMAC (HS256) codec over the process-wide signing secret.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl JwtCodec {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

impl FromRef<AppState> for JwtCodec {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        JwtCodec::new(&jwt.secret, jwt.ttl_days * 24 * 60 * 60)
    }
}

impl TokenCodec for JwtCodec {
    fn issue(&self, subject: Uuid) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::seconds(self.ttl_seconds);
        let claims = Claims {
            sub: subject,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            ApiError::Internal
        })?;
        debug!(subject = %subject, "jwt issued");
        Ok(token)
    }

    fn verify(&self, token: &str) -> Result<Uuid, VerifyError> {
        let mut validation = Validation::default();
        // Expiry is checked exactly; an expired token must fail even when its
        // signature is valid.
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => VerifyError::BadSignature,
                _ => VerifyError::Malformed,
            }
        })?;
        Ok(data.claims.sub)
    }
}
