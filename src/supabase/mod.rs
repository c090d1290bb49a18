//! Supabase collaborators: the GoTrue admin API and the `users` table.
//!
//! The `users` table can be reached two ways:
//! - [`PostgrestUsers`] goes through the project's PostgREST endpoint with the
//!   service-role key, the same path the hosted client libraries use.
//! - [`PgUsers`] talks to the project's Postgres directly through a sqlx pool
//!   when a DSN is configured.
//!
//! Both implement [`UserStore`], which is all the handlers depend on.

pub mod auth;
pub mod postgres;
pub mod rest;

pub use auth::{AuthAdmin, AuthUser, GoTrueAdmin};
pub use postgres::PgUsers;
pub use rest::PostgrestUsers;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use utoipa::ToSchema;

/// Error reported by the `users` store.
///
/// Field names follow the PostgREST error body so provider errors round-trip
/// to API callers unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl StoreError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            code: None,
            hint: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Row written by signup. `confirmed_at` is left to the column default (null).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub id: String,
    pub email: String,
}

/// Access to the mirrored `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a fresh row.
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError>;

    /// Set `confirmed_at` on the row matching `id`. Matching no row is not an error.
    async fn update_confirmed_at(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Read `email` for `id`; `None` when the row is missing or has no email.
    async fn select_email(&self, id: &str) -> Result<Option<String>, StoreError>;
}

/// Project base URL plus the service-role key used for every admin call.
#[derive(Clone)]
pub struct Project {
    base_url: String,
    service_role_key: SecretString,
}

impl Project {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, service_role_key: SecretString) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid Supabase URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Supabase URL must use http or https: {base_url}"));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_role_key,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the `apikey` and bearer headers GoTrue and PostgREST expect.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.service_role_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("base_url", &self.base_url)
            .field("service_role_key", &"***")
            .finish()
    }
}
