//! GoTrue admin API: server-side user creation with the service-role key.

use super::Project;
use crate::provider::{ProviderError, json_or_text};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, debug, info_span, instrument};

const ADMIN_USERS_PATH: &str = "auth/v1/admin/users";

/// The slice of the GoTrue user record the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

/// Auth provider admin operations.
#[async_trait]
pub trait AuthAdmin: Send + Sync {
    /// Create a user whose email is not yet confirmed.
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError>;
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    email: &'a str,
    password: &'a str,
    email_confirm: bool,
}

#[derive(Debug, Clone)]
pub struct GoTrueAdmin {
    client: Client,
    project: Project,
}

impl GoTrueAdmin {
    #[must_use]
    pub fn new(client: Client, project: Project) -> Self {
        Self { client, project }
    }
}

#[async_trait]
impl AuthAdmin for GoTrueAdmin {
    #[instrument(skip(self, password))]
    async fn create_user(&self, email: &str, password: &str) -> Result<AuthUser, ProviderError> {
        let url = self.project.endpoint(ADMIN_USERS_PATH);
        let span = info_span!("http.client", http.method = "POST", http.url = %url);

        let request = self.project.authorize(self.client.post(&url)).json(&CreateUserRequest {
            email,
            password,
            email_confirm: false,
        });
        let response = request.send().instrument(span).await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response_json(response).await);
        }

        let body = json_or_text(response.text().await?);
        match body.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => {
                debug!(user_id = id, "auth user created");
                Ok(AuthUser { id: id.to_string() })
            }
            _ => Err(ProviderError::Malformed {
                reason: "missing user id",
                details: body,
            }),
        }
    }
}
