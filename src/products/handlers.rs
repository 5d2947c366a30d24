use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiError,
    products::dto::{ProductFilter, ProductRequest},
    products::repo::Product,
    response::ApiResponse,
    state::AppState,
};

// Product routes are public; listings are browsable without an account.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id", put(update_product))
        .route("/products/:id", delete(delete_product))
}

#[instrument(skip(state, payload))]
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    if payload.price < Decimal::ZERO {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }
    let product = Product::create(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = Product::list(&state.db, &filter).await?;
    Ok(Json(ApiResponse::success(products)))
}

#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    match Product::find(&state.db, id).await? {
        Some(product) => Ok(Json(ApiResponse::success(product))),
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

#[instrument(skip(state, payload))]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    if payload.price < Decimal::ZERO {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }
    match Product::update(&state.db, id, &payload).await? {
        Some(product) => Ok(Json(ApiResponse::success(product))),
        None => Err(ApiError::NotFound("Product not found".into())),
    }
}

#[instrument(skip(state))]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found".into()));
    }
    Ok(Json(ApiResponse::message_only("Product deleted successfully")))
}
