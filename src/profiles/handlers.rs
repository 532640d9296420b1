use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{EducationRequest, ExperienceRequest, MessageResponse, ProfileRequest};
use super::model::{Profile, ProfileView};
use super::services::{self, PROFILE_NOT_FOUND};
use crate::{
    auth::extractors::AuthUser, error::AppError, state::AppState, validation::JsonBody,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/profiles/me", get(get_own_profile))
        .route("/profiles/user/:user_id", get(get_profile_by_user))
        .route("/profiles/github/:username", get(get_github_repos))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profiles",
            get(list_profiles).post(upsert_profile).delete(delete_account),
        )
        .route("/profiles/experience", put(add_experience))
        .route("/profiles/experience/:exp_id", delete(remove_experience))
        .route("/profiles/education", put(add_education))
        .route("/profiles/education/:edu_id", delete(remove_education))
}

#[instrument(skip(state))]
pub async fn get_own_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileView>, AppError> {
    let view = services::view(state.store.as_ref(), user_id, PROFILE_NOT_FOUND).await?;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<ProfileView>>, AppError> {
    let profiles = state
        .store
        .list_profiles()
        .await?
        .into_iter()
        .map(|(profile, user)| ProfileView { profile, user })
        .collect();
    Ok(Json(profiles))
}

/// Unparseable ids are reported the same way as unknown ones.
#[instrument(skip(state))]
pub async fn get_profile_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| AppError::NotFound("Profile not found"))?;
    let view = services::view(state.store.as_ref(), user_id, "Profile not found").await?;
    Ok(Json(view))
}

#[instrument(skip(state, payload))]
pub async fn upsert_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<ProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let patch = services::build_patch(payload)?;
    let profile = services::upsert(state.store.as_ref(), user_id, patch).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    services::delete_account(state.store.as_ref(), user_id).await?;
    Ok(Json(MessageResponse { msg: "User deleted" }))
}

#[instrument(skip(state, payload))]
pub async fn add_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<ExperienceRequest>,
) -> Result<Json<Profile>, AppError> {
    let entry = services::build_experience(payload)?;
    let profile = services::add_experience(state.store.as_ref(), user_id, entry).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_experience(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let exp_id = Uuid::parse_str(&exp_id).map_err(|_| AppError::NotFound("Experience not found"))?;
    let profile = services::remove_experience(state.store.as_ref(), user_id, exp_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn add_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<EducationRequest>,
) -> Result<Json<Profile>, AppError> {
    let entry = services::build_education(payload)?;
    let profile = services::add_education(state.store.as_ref(), user_id, entry).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn remove_education(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let edu_id = Uuid::parse_str(&edu_id).map_err(|_| AppError::NotFound("Education not found"))?;
    let profile = services::remove_education(state.store.as_ref(), user_id, edu_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
pub async fn get_github_repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .github
        .recent_repos(&username)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("No Github profile found"))
}
