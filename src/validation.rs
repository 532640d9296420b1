use axum::extract::FromRequest;
use lazy_static::lazy_static;
use regex::Regex;
use time::{macros::format_description, Date};

use crate::error::{AppError, FieldError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// JSON request body whose decoding failures render like any other
/// validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Parses a calendar date as sent by HTML date inputs.
pub(crate) fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Treats blank strings the same as a missing field.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Collects per-field failures so a request reports all of them at once.
#[derive(Debug, Default)]
pub(crate) struct Checks(Vec<FieldError>);

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, param: &'static str, msg: &'static str) -> &mut Self {
        if !ok {
            self.0.push(FieldError { param, msg });
        }
        self
    }

    pub fn required(&mut self, value: Option<&str>, param: &'static str, msg: &'static str) -> &mut Self {
        let ok = value.is_some_and(|v| !v.trim().is_empty());
        self.check(ok, param, msg)
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.0)))
        }
    }
}
