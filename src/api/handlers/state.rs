//! Handler configuration and injected collaborators.

use crate::{
    bento::{EmailMessage, Messenger},
    supabase::{AuthAdmin, UserStore},
};
use std::sync::Arc;
use url::Url;

pub const DEFAULT_CONFIRM_URL: &str = "https://docs.bentonow.com/verify";
pub const DEFAULT_EMAIL_FROM: &str = "supabase@ibleedpixels.com";
pub const DEFAULT_EMAIL_SUBJECT: &str = "Confirm your Email";

#[derive(Clone, Debug)]
pub struct EnrollConfig {
    confirm_url: Url,
    email_from: String,
    email_subject: String,
}

impl EnrollConfig {
    #[must_use]
    pub fn new(confirm_url: Url) -> Self {
        Self {
            confirm_url,
            email_from: DEFAULT_EMAIL_FROM.to_string(),
            email_subject: DEFAULT_EMAIL_SUBJECT.to_string(),
        }
    }

    #[must_use]
    pub fn with_email_from(mut self, email_from: String) -> Self {
        self.email_from = email_from;
        self
    }

    #[must_use]
    pub fn with_email_subject(mut self, email_subject: String) -> Self {
        self.email_subject = email_subject;
        self
    }

    #[must_use]
    pub fn email_from(&self) -> &str {
        &self.email_from
    }

    #[must_use]
    pub fn email_subject(&self) -> &str {
        &self.email_subject
    }

    /// Confirmation link for `user_id`: the configured URL with `user=<id>` appended.
    #[must_use]
    pub fn confirm_link(&self, user_id: &str) -> Url {
        let mut url = self.confirm_url.clone();
        url.query_pairs_mut().append_pair("user", user_id);
        url
    }

    #[must_use]
    pub fn confirmation_email(&self, to: &str, user_id: &str) -> EmailMessage {
        let link = self.confirm_link(user_id);
        EmailMessage {
            to: to.to_string(),
            from: self.email_from.clone(),
            subject: self.email_subject.clone(),
            html_body: format!(r#"<p>Click <a href="{link}">here</a> to confirm your email.</p>"#),
            transactional: true,
        }
    }
}

/// Everything a request needs, built once at startup and shared through an `Extension`.
#[derive(Clone)]
pub struct EnrollState {
    config: EnrollConfig,
    auth: Arc<dyn AuthAdmin>,
    users: Arc<dyn UserStore>,
    messenger: Arc<dyn Messenger>,
}

impl EnrollState {
    #[must_use]
    pub fn new(
        config: EnrollConfig,
        auth: Arc<dyn AuthAdmin>,
        users: Arc<dyn UserStore>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            auth,
            users,
            messenger,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EnrollConfig {
        &self.config
    }

    pub(crate) fn auth(&self) -> &dyn AuthAdmin {
        self.auth.as_ref()
    }

    pub(crate) fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub(crate) fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }
}

impl std::fmt::Debug for EnrollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
