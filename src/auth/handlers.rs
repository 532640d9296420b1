use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, RegisterRequest, TokenResponse},
        extractors::{AuthRejection, AuthUser},
        services,
    },
    error::AppError,
    state::AppState,
    validation::JsonBody,
};

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", get(get_me).post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (_, token) = services::register(state.store.as_ref(), &state.tokens, payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (_, token) = services::login(state.store.as_ref(), &state.tokens, payload).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.store.find_user_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "token subject has no account");
        AppError::Unauthenticated(AuthRejection::InvalidToken)
    })?;
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod me_tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_user_never_carries_the_hash() {
        let user = crate::auth::repo_types::User {
            id: uuid::Uuid::new_v4(),
            name: "A".into(),
            email: "test@example.com".into(),
            avatar: "https://avatar".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&PublicUser::from(user.clone())).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("argon2"));

        let raw = serde_json::to_string(&user).unwrap();
        assert!(!raw.contains("password_hash"));
    }
}
