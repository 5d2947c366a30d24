use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::AuthUser,
        jwt::JwtCodec,
        password::BcryptHasher,
        repo::PgUsers,
        service,
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PublicUser>>), ApiError> {
    let users = PgUsers::new(state.db.clone());
    let hasher = BcryptHasher::new(state.config.bcrypt_cost);
    let user = service::register(&users, &hasher, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "User registered successfully",
            user,
        )),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let users = PgUsers::new(state.db.clone());
    let hasher = BcryptHasher::new(state.config.bcrypt_cost);
    let codec = JwtCodec::from_ref(&state);
    let token = service::login(&users, &hasher, &codec, payload).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Login successful",
        TokenResponse { token },
    )))
}

#[instrument(skip(state))]
async fn profile(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> Result<Json<ApiResponse<PublicUser>>, ApiError> {
    let users = PgUsers::new(state.db.clone());
    let user = service::profile(&users, subject).await?;
    Ok(Json(ApiResponse::success_with_message(
        "Profile retrieved successfully",
        user,
    )))
}
