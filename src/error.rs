use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::extractors::AuthRejection;
use crate::auth::jwt::TokenError;
use crate::store::StoreError;

/// A single failed input check, rendered as `{"param", "msg"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Unauthenticated(AuthRejection),
    #[error("User not authorized")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("User already exists")]
    Conflict,
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<AuthRejection> for AppError {
    fn from(r: AuthRejection) -> Self {
        AppError::Unauthenticated(r)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "rejecting request body");
        let msg = match rejection {
            JsonRejection::JsonDataError(_) => "Request body has fields of the wrong type",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Request body must be sent as application/json",
            _ => "Request body could not be read",
        };
        AppError::Validation(vec![FieldError { param: "body", msg }])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::Conflict | AppError::InvalidCredentials => {
                json!({ "errors": [{ "msg": self.to_string() }] })
            }
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                json!({ "msg": "Server error" })
            }
            _ => json!({ "msg": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
