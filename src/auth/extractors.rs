use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::jwt::TokenService;
use crate::error::AppError;

/// Header the web client sends the identity token in.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Why the guard turned a request away. Token failures are deliberately
/// collapsed into a single variant.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("No token, authorization denied")]
    Unauthenticated,
    #[error("Token is not valid")]
    InvalidToken,
}

/// Runs the guard over a request's headers and yields the verified user id.
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Result<Uuid, AuthRejection> {
    let raw = match headers.get(TOKEN_HEADER) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(AuthRejection::Unauthenticated),
    };
    let token = raw.to_str().map_err(|_| AuthRejection::InvalidToken)?;
    tokens.verify(token.trim()).map_err(|e| {
        debug!(reason = %e, "token rejected");
        AuthRejection::InvalidToken
    })
}

/// Extracts and validates the identity token, returning the user ID.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);
        let user_id = authenticate(&tokens, &parts.headers)?;
        Ok(AuthUser(user_id))
    }
}
