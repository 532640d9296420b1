use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::TextRequest;
use super::model::{Comment, Like, Post};
use super::services::{self, COMMENT_NOT_FOUND, POST_NOT_FOUND};
use crate::{
    auth::extractors::AuthUser, error::AppError, profiles::MessageResponse, state::AppState,
    validation::JsonBody,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", delete(delete_post))
        .route("/posts/like/:id", put(toggle_like))
        .route("/posts/comment/:id", post(add_comment))
        .route("/posts/comment/:id/:comment_id", delete(remove_comment))
}

/// Ids that are not UUIDs cannot name a post, so they are reported as missing.
fn post_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(POST_NOT_FOUND))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<TextRequest>,
) -> Result<Json<Post>, AppError> {
    let text = services::validate_text(payload.text)?;
    let post = services::create(state.store.as_ref(), user_id, text).await?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.store.list_posts().await?))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let post = services::get(state.store.as_ref(), post_id(&id)?).await?;
    Ok(Json(post))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete(state.store.as_ref(), user_id, post_id(&id)?).await?;
    Ok(Json(MessageResponse { msg: "Post removed" }))
}

#[instrument(skip(state))]
pub async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, AppError> {
    let likes = services::toggle_like(state.store.as_ref(), user_id, post_id(&id)?).await?;
    Ok(Json(likes))
}

#[instrument(skip(state, payload))]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<TextRequest>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let text = services::validate_text(payload.text)?;
    let comments = services::add_comment(state.store.as_ref(), user_id, post_id(&id)?, text).await?;
    Ok(Json(comments))
}

#[instrument(skip(state))]
pub async fn remove_comment(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comment_id =
        Uuid::parse_str(&comment_id).map_err(|_| AppError::NotFound(COMMENT_NOT_FOUND))?;
    let comments =
        services::remove_comment(state.store.as_ref(), user_id, post_id(&id)?, comment_id).await?;
    Ok(Json(comments))
}
