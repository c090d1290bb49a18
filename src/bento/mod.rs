//! Bento batch API: transactional emails and tracked events.
//!
//! Both endpoints take the site UUID as a query parameter and authenticate
//! with HTTP Basic (`publishable_key:secret_key`).

use crate::provider::ProviderError;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

pub const DEFAULT_BENTO_URL: &str = "https://app.bentonow.com";
pub const USER_CONFIRMED_EVENT: &str = "$user_confirmed";

const BATCH_EMAILS_PATH: &str = "api/v1/batch/emails";
const BATCH_EVENTS_PATH: &str = "api/v1/batch/events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
    pub transactional: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub email: String,
}

impl Event {
    #[must_use]
    pub fn user_confirmed(email: &str) -> Self {
        Self {
            kind: USER_CONFIRMED_EVENT.to_string(),
            email: email.to_string(),
        }
    }
}

#[derive(Serialize)]
struct EmailBatch<'a> {
    emails: &'a [EmailMessage],
}

#[derive(Serialize)]
struct EventBatch<'a> {
    events: &'a [Event],
}

/// Outbound messaging used by the signup and verify pipelines.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_emails(&self, emails: &[EmailMessage]) -> Result<(), ProviderError>;
    async fn send_events(&self, events: &[Event]) -> Result<(), ProviderError>;
}

/// Site credentials for the Bento API.
#[derive(Clone)]
pub struct Credentials {
    pub site_uuid: String,
    pub publishable_key: String,
    pub secret_key: SecretString,
}

impl Credentials {
    fn basic_auth(&self) -> String {
        let pair = format!(
            "{}:{}",
            self.publishable_key,
            self.secret_key.expose_secret()
        );
        format!("Basic {}", Base64::encode_string(pair.as_bytes()))
    }

    fn user_agent(&self) -> String {
        format!("bento-suprabase-{}", self.site_uuid)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("site_uuid", &self.site_uuid)
            .field("publishable_key", &self.publishable_key)
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BentoClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl BentoClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(client: Client, base_url: &str, credentials: Credentials) -> Result<Self> {
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid Bento URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Bento URL must use http or https: {base_url}"));
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn post(&self, path: &str) -> (String, RequestBuilder) {
        let url = format!("{}/{path}", self.base_url);
        let request = self
            .client
            .post(&url)
            .query(&[("site_uuid", self.credentials.site_uuid.as_str())])
            .header("User-Agent", self.credentials.user_agent())
            .header("Authorization", self.credentials.basic_auth());
        (url, request)
    }
}

#[async_trait]
impl Messenger for BentoClient {
    #[instrument(skip(self, emails), fields(count = emails.len()))]
    async fn send_emails(&self, emails: &[EmailMessage]) -> Result<(), ProviderError> {
        let (url, request) = self.post(BATCH_EMAILS_PATH);
        let span = info_span!("http.client", http.method = "POST", http.url = %url);
        let response = request
            .header("Accept", "application/json")
            .json(&EmailBatch { emails })
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response_text(response).await);
        }

        debug!("bento accepted email batch");
        Ok(())
    }

    #[instrument(skip(self, events), fields(count = events.len()))]
    async fn send_events(&self, events: &[Event]) -> Result<(), ProviderError> {
        let (url, request) = self.post(BATCH_EVENTS_PATH);
        let span = info_span!("http.client", http.method = "POST", http.url = %url);
        let response = request
            .json(&EventBatch { events })
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response_text(response).await);
        }

        debug!("bento accepted event batch");
        Ok(())
    }
}
