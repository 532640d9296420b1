use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{LoginRequest, RegisterRequest};
use super::jwt::TokenService;
use super::password::{burn_verification, hash_password, verify_password};
use super::repo_types::User;
use crate::error::AppError;
use crate::store::{Store, StoreError};
use crate::validation::{is_valid_email, Checks};

const MIN_PASSWORD_LEN: usize = 6;

/// Gravatar URL for `email`: 200px, PG rated, mystery-man fallback.
pub fn gravatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?s=200&r=pg&d=mm", digest)
}

/// Creates the account and returns a token for it.
pub async fn register(
    store: &dyn Store,
    tokens: &TokenService,
    payload: RegisterRequest,
) -> Result<(Uuid, String), AppError> {
    let name = payload.name.unwrap_or_default().trim().to_string();
    let email = payload.email.unwrap_or_default().trim().to_string();
    let password = payload.password.unwrap_or_default();

    Checks::new()
        .check(!name.is_empty(), "name", "Name is required")
        .check(is_valid_email(&email), "email", "Please include a valid email")
        .check(
            password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "Please enter a password with 6 or more characters",
        )
        .finish()?;

    if store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict);
    }

    let user = User {
        id: Uuid::new_v4(),
        name,
        avatar: gravatar_url(&email),
        email,
        password_hash: hash_password(&password)?,
        created_at: OffsetDateTime::now_utc(),
    };

    match store.insert_user(&user).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            warn!(email = %user.email, "email registered concurrently");
            return Err(AppError::Conflict);
        }
        Err(e) => return Err(e.into()),
    }

    let token = tokens.issue(user.id)?;
    info!(user_id = %user.id, "user registered");
    Ok((user.id, token))
}

/// Checks the credentials and returns a fresh token. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn login(
    store: &dyn Store,
    tokens: &TokenService,
    payload: LoginRequest,
) -> Result<(Uuid, String), AppError> {
    let email = payload.email.unwrap_or_default().trim().to_string();
    let password = payload.password.unwrap_or_default();

    Checks::new()
        .check(is_valid_email(&email), "email", "Please include a valid email")
        .check(!password.is_empty(), "password", "Password is required")
        .finish()?;

    let user = match store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => {
            burn_verification(&password);
            warn!("login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = tokens.issue(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user.id, token))
}
