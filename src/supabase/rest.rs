//! `users` table over PostgREST.

use super::{NewUser, Project, StoreError, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{Instrument, info_span, instrument};

const USERS_PATH: &str = "rest/v1/users";
// PostgREST code for "JSON object requested, multiple (or no) rows returned".
const SINGULAR_ROW_CODE: &str = "PGRST116";

#[derive(Deserialize)]
struct EmailRow {
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostgrestUsers {
    client: Client,
    project: Project,
}

impl PostgrestUsers {
    #[must_use]
    pub fn new(client: Client, project: Project) -> Self {
        Self { client, project }
    }

    fn url(&self) -> String {
        self.project.endpoint(USERS_PATH)
    }
}

/// Turn a failed PostgREST response into a [`StoreError`], keeping its fields when the
/// body is a PostgREST error document.
async fn store_error(response: Response) -> StoreError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return StoreError::from(err),
    };

    serde_json::from_str::<StoreError>(&body).unwrap_or_else(|_| {
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        StoreError::new(message).with_code(status.as_str())
    })
}

#[async_trait]
impl UserStore for PostgrestUsers {
    #[instrument(skip(self))]
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        let url = self.url();
        let span = info_span!("http.client", http.method = "POST", http.url = %url);
        let response = self
            .project
            .authorize(self.client.post(&url))
            .header("Prefer", "return=minimal")
            .json(user)
            .send()
            .instrument(span)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(store_error(response).await)
        }
    }

    #[instrument(skip(self))]
    async fn update_confirmed_at(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let url = self.url();
        let span = info_span!("http.client", http.method = "PATCH", http.url = %url);
        let response = self
            .project
            .authorize(self.client.patch(&url))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "confirmed_at": at.to_rfc3339_opts(SecondsFormat::Millis, true) }))
            .send()
            .instrument(span)
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(store_error(response).await)
        }
    }

    #[instrument(skip(self))]
    async fn select_email(&self, id: &str) -> Result<Option<String>, StoreError> {
        let url = self.url();
        let span = info_span!("http.client", http.method = "GET", http.url = %url);
        let response = self
            .project
            .authorize(self.client.get(&url))
            .query(&[("select", "email".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(store_error(response).await);
        }

        let mut rows: Vec<EmailRow> = response.json().await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop().and_then(|row| row.email)),
            n => Err(
                StoreError::new("JSON object requested, multiple (or no) rows returned")
                    .with_code(SINGULAR_ROW_CODE)
                    .with_details(format!("The result contains {n} rows")),
            ),
        }
    }
}
