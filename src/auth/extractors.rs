use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::{JwtCodec, TokenCodec};
use crate::error::ApiError;

/// Auth gate: extracts and verifies a bearer token, handing the subject id to
/// the handler. Protected handlers never run when extraction fails.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtCodec: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = JwtCodec::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        // All verification failures collapse into one generic message so the
        // response cannot be used as an oracle for which check failed.
        match codec.verify(token) {
            Ok(subject) => Ok(AuthUser(subject)),
            Err(e) => {
                warn!(reason = %e, "token rejected");
                Err(ApiError::Unauthorized("Invalid or expired token".into()))
            }
        }
    }
}
