use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::response::ApiResponse;

/// Error taxonomy for the whole API. Every variant maps onto one status code
/// and the shared error envelope; `Internal` never exposes what went wrong.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            // Pool exhaustion is the one retriable failure; surface it as 503
            // instead of a generic 500.
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => ApiError::ServiceUnavailable,
            sqlx::Error::Database(db_err) => {
                // The store's uniqueness constraint is the final arbiter of a
                // duplicate-registration race; name the losing field from the
                // constraint so the caller sees the same 409 the pre-check
                // would have produced.
                if db_err.is_unique_violation() {
                    let message = match db_err.constraint() {
                        Some("users_email_key") => "Email already in use",
                        Some("users_phone_number_key") => "Phone number already in use",
                        _ => "Resource already exists",
                    };
                    return ApiError::Conflict(message.to_string());
                }
                error!(error = %e, "database error");
                ApiError::Internal
            }
            _ => {
                error!(error = %e, "database error");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ApiResponse::error(&self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ServiceUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_error_message_is_fixed() {
        assert_eq!(ApiError::Internal.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn error_response_uses_envelope() {
        let res = ApiError::Unauthorized("Invalid credentials".into()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Invalid credentials");
        assert!(body["data"].is_null());
    }

    #[test]
    fn pool_timeout_maps_to_service_unavailable() {
        assert_eq!(
            ApiError::from(sqlx::Error::PoolTimedOut),
            ApiError::ServiceUnavailable
        );
    }
}
