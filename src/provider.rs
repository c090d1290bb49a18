//! Shared plumbing for outbound provider calls (GoTrue, PostgREST, Bento).

use crate::APP_USER_AGENT;
use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Failure talking to an HTTP provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider answered with a non-success status.
    #[error("provider returned {status}")]
    Status { status: StatusCode, details: Value },
    /// Provider answered with success but the payload is unusable.
    #[error("unexpected provider response: {reason}")]
    Malformed { reason: &'static str, details: Value },
    /// Request never produced a response (DNS, TLS, connection reset, ...).
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Payload surfaced to API callers under `details`.
    #[must_use]
    pub fn details(&self) -> Value {
        match self {
            Self::Status { details, .. } | Self::Malformed { details, .. } => details.clone(),
            Self::Transport(err) => Value::String(err.to_string()),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Malformed { .. } | Self::Transport(_) => None,
        }
    }

    /// Build a `Status` error keeping the raw body text as `details`.
    pub(crate) async fn from_response_text(response: Response) -> Self {
        let status = response.status();
        match response.text().await {
            Ok(body) => Self::Status {
                status,
                details: Value::String(body),
            },
            Err(err) => Self::Transport(err),
        }
    }

    /// Build a `Status` error keeping the body as JSON when it parses, raw text otherwise.
    pub(crate) async fn from_response_json(response: Response) -> Self {
        let status = response.status();
        match response.text().await {
            Ok(body) => Self::Status {
                status,
                details: json_or_text(body),
            },
            Err(err) => Self::Transport(err),
        }
    }
}

/// Parse `body` as JSON, falling back to a JSON string holding the raw text.
pub(crate) fn json_or_text(body: String) -> Value {
    serde_json::from_str(&body).unwrap_or(Value::String(body))
}

/// Build the reqwest client shared by every provider.
///
/// # Errors
/// Returns an error if the TLS backend cannot be initialised.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent(APP_USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}
