use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    posts::dto::{CreatePostRequest, UpdatePostRequest},
    posts::repo::Post,
    response::ApiResponse,
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
        .route("/posts/:id", put(update_post))
        .route("/posts/:id", delete(delete_post))
}

#[instrument(skip(state, payload))]
async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Post>>), ApiError> {
    let post = Post::create(&state.posts_db, &payload.title, &payload.content, user_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(post))))
}

#[instrument(skip(state))]
async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> Result<Json<ApiResponse<Vec<Post>>>, ApiError> {
    let posts = Post::list(&state.posts_db).await?;
    Ok(Json(ApiResponse::success(posts)))
}

#[instrument(skip(state))]
async fn get_post(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    match Post::find(&state.posts_db, id).await? {
        Some(post) => Ok(Json(ApiResponse::success(post))),
        None => Err(ApiError::NotFound("Post not found".into())),
    }
}

#[instrument(skip(state, payload))]
async fn update_post(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    match Post::update(
        &state.posts_db,
        id,
        payload.title.as_deref(),
        payload.content.as_deref(),
    )
    .await?
    {
        Some(post) => Ok(Json(ApiResponse::success(post))),
        None => Err(ApiError::NotFound("Post not found".into())),
    }
}

#[instrument(skip(state))]
async fn delete_post(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !Post::delete(&state.posts_db, id).await? {
        return Err(ApiError::NotFound("Post not found".into()));
    }
    Ok(Json(ApiResponse::message_only("Deleted")))
}
