use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser, deals::dto::DealRequest, deals::repo::Deal, error::ApiError,
    response::ApiResponse, state::AppState,
};

pub fn deal_routes() -> Router<AppState> {
    Router::new()
        .route("/deals", post(create_deal))
        .route("/deals", get(list_deals))
        .route("/deals/:id", get(get_deal))
        .route("/deals/:id", put(update_deal))
        .route("/deals/:id", delete(delete_deal))
}

#[instrument(skip(state, payload))]
async fn create_deal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<DealRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Deal>>), ApiError> {
    let deal = Deal::create(&state.db, &payload.title, &payload.content, user_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(deal))))
}

#[instrument(skip(state))]
async fn list_deals(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<ApiResponse<Vec<Deal>>>, ApiError> {
    let deals = Deal::list(&state.db).await?;
    Ok(Json(ApiResponse::success(deals)))
}

#[instrument(skip(state))]
async fn get_deal(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Deal>>, ApiError> {
    match Deal::find(&state.db, id).await? {
        Some(deal) => Ok(Json(ApiResponse::success(deal))),
        None => Err(ApiError::NotFound("Deal not found".into())),
    }
}

#[instrument(skip(state, payload))]
async fn update_deal(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DealRequest>,
) -> Result<Json<ApiResponse<Deal>>, ApiError> {
    match Deal::update(&state.db, id, &payload.title, &payload.content).await? {
        Some(deal) => Ok(Json(ApiResponse::success(deal))),
        None => Err(ApiError::NotFound("Deal not found".into())),
    }
}

#[instrument(skip(state))]
async fn delete_deal(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !Deal::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Deal not found".into()));
    }
    Ok(Json(ApiResponse::message_only("Deleted")))
}
