//! Error taxonomy for the signup and verify pipelines and its JSON rendering.
//!
//! Signup failures render as `{"error": "<summary>", "details": ...}`.
//! Verify keeps the same flat shape for a missing `user_id` and a rejected
//! event, and renders everything else through a catch-all as
//! `{"error": {"message", "details", "code", "hint"}}` with status 400.

use super::types::{DetailedErrorResponse, ErrorDetail, ErrorResponse};
use crate::{provider::ProviderError, supabase::StoreError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use thiserror::Error;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INVALID_SIGNUP: &str = "Missing or invalid email/password";
pub const USER_CREATION_FAILED: &str = "User creation failed";
pub const INSERT_FAILED: &str = "Failed to insert into public.users";
pub const EMAIL_SEND_FAILED: &str = "Email send failed";
pub const MISSING_USER_ID: &str = "Missing user_id in request body";
pub const LOOKUP_FAILED: &str = "Failed to fetch user email from public.users";
pub const EVENT_SEND_FAILED: &str = "Failed to send event to Bento";

fn flat(status: StatusCode, error: &str, details: Option<Value>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            details,
        }),
    )
        .into_response()
}

fn detailed(status: StatusCode, detail: ErrorDetail) -> Response {
    (status, Json(DetailedErrorResponse { error: detail })).into_response()
}

impl From<StoreError> for ErrorDetail {
    fn from(err: StoreError) -> Self {
        Self {
            message: err.message,
            details: err.details,
            code: err.code,
            hint: err.hint,
        }
    }
}

impl ErrorDetail {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            code: None,
            hint: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SignupError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("missing or invalid email/password")]
    Validation,
    #[error("user creation failed: {0}")]
    UserCreation(#[source] ProviderError),
    #[error("users insert failed: {0}")]
    Insert(#[source] StoreError),
    #[error("confirmation email failed: {0}")]
    EmailSend(#[source] ProviderError),
}

impl SignupError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::UserCreation(_) | Self::Insert(_) | Self::EmailSend(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::MethodNotAllowed => flat(status, METHOD_NOT_ALLOWED, None),
            Self::Validation => flat(status, INVALID_SIGNUP, None),
            Self::UserCreation(err) => flat(status, USER_CREATION_FAILED, Some(err.details())),
            Self::Insert(err) => flat(
                status,
                INSERT_FAILED,
                serde_json::to_value(&err).ok(),
            ),
            Self::EmailSend(err) => flat(status, EMAIL_SEND_FAILED, Some(err.details())),
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    /// `user_id` missing or empty.
    #[error("missing user_id")]
    Validation,
    /// Update of `confirmed_at` failed.
    #[error("store error: {0}")]
    Store(#[source] StoreError),
    /// Row missing, email empty, or the select itself failed.
    #[error("email lookup failed")]
    Lookup(#[source] Option<StoreError>),
    /// Event API call failed.
    #[error("event send failed: {0}")]
    Downstream(#[source] ProviderError),
    /// Anything else, e.g. an unparseable body.
    #[error("{0}")]
    Unknown(String),
}

impl VerifyError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Downstream(ProviderError::Status { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation
            | Self::Store(_)
            | Self::Lookup(_)
            | Self::Downstream(_)
            | Self::Unknown(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for VerifyError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation => flat(status, MISSING_USER_ID, None),
            Self::Store(err) => detailed(status, err.into()),
            Self::Lookup(_) => detailed(status, ErrorDetail::message(LOOKUP_FAILED)),
            // A rejected event is reported flat; a request that never got an
            // answer falls through to the catch-all shape.
            Self::Downstream(err @ ProviderError::Status { .. }) => {
                flat(status, EVENT_SEND_FAILED, Some(err.details()))
            }
            Self::Downstream(err) => detailed(status, ErrorDetail::message(err.to_string())),
            Self::Unknown(message) => detailed(status, ErrorDetail::message(message)),
        }
    }
}
