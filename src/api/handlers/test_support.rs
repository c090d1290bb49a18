//! In-memory collaborators with call counters for handler tests.

use super::state::{DEFAULT_CONFIRM_URL, EnrollConfig, EnrollState};
use crate::{
    bento::{EmailMessage, Event, Messenger},
    provider::ProviderError,
    supabase::{AuthAdmin, AuthUser, NewUser, StoreError, UserStore},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};
use url::Url;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn state(
    auth: &FakeAuth,
    users: &FakeUsers,
    messenger: &FakeMessenger,
) -> Result<Arc<EnrollState>> {
    let config = EnrollConfig::new(Url::parse(DEFAULT_CONFIRM_URL)?);
    Ok(Arc::new(EnrollState::new(
        config,
        Arc::new(auth.clone()),
        Arc::new(users.clone()),
        Arc::new(messenger.clone()),
    )))
}

#[derive(Clone, Debug)]
pub struct FakeAuth {
    id: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl FakeAuth {
    pub fn ok(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            calls: Arc::default(),
        }
    }

    /// Every call answers 422 like GoTrue does for an existing email.
    pub fn rejecting() -> Self {
        Self {
            id: None,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthAdmin for FakeAuth {
    async fn create_user(&self, _email: &str, _password: &str) -> Result<AuthUser, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.id {
            Some(id) => Ok(AuthUser { id: id.clone() }),
            None => Err(ProviderError::Status {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                details: json!({"error_code": "email_exists"}),
            }),
        }
    }
}

#[derive(Debug, Default)]
struct Row {
    email: Option<String>,
    confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct FakeUsers {
    rows: Arc<Mutex<HashMap<String, Row>>>,
    insert_error: Option<StoreError>,
    update_error: Option<StoreError>,
    select_error: Option<StoreError>,
    inserts: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
    selects: Arc<AtomicUsize>,
}

impl FakeUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(id: &str, email: Option<&str>) -> Self {
        let users = Self::new();
        lock(&users.rows).insert(
            id.to_string(),
            Row {
                email: email.map(ToString::to_string),
                confirmed_at: None,
            },
        );
        users
    }

    pub fn failing_insert() -> Self {
        Self {
            insert_error: Some(StoreError::new("insert failed").with_code("XX000")),
            ..Self::default()
        }
    }

    pub fn failing_update() -> Self {
        Self {
            update_error: Some(
                StoreError::new("permission denied for table users")
                    .with_code("42501")
                    .with_hint("grant update to service_role"),
            ),
            ..Self::default()
        }
    }

    pub fn failing_select(id: &str, email: &str) -> Self {
        let users = Self::with_user(id, Some(email));
        Self {
            select_error: Some(StoreError::new("canceling statement due to statement timeout")),
            ..users
        }
    }

    pub fn rows(&self) -> Vec<(String, String)> {
        let mut rows: Vec<_> = lock(&self.rows)
            .iter()
            .map(|(id, row)| (id.clone(), row.email.clone().unwrap_or_default()))
            .collect();
        rows.sort();
        rows
    }

    pub fn confirmed_at(&self, id: &str) -> Option<DateTime<Utc>> {
        lock(&self.rows).get(id).and_then(|row| row.confirmed_at)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn selects(&self) -> usize {
        self.selects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for FakeUsers {
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.insert_error {
            return Err(err.clone());
        }

        let mut rows = lock(&self.rows);
        if rows.contains_key(&user.id) {
            return Err(
                StoreError::new("duplicate key value violates unique constraint \"users_pkey\"")
                    .with_code("23505"),
            );
        }
        rows.insert(
            user.id.clone(),
            Row {
                email: Some(user.email.clone()),
                confirmed_at: None,
            },
        );
        Ok(())
    }

    async fn update_confirmed_at(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.update_error {
            return Err(err.clone());
        }

        if let Some(row) = lock(&self.rows).get_mut(id) {
            row.confirmed_at = Some(at);
        }
        Ok(())
    }

    async fn select_email(&self, id: &str) -> Result<Option<String>, StoreError> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.select_error {
            return Err(err.clone());
        }

        Ok(lock(&self.rows).get(id).and_then(|row| row.email.clone()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct FakeMessenger {
    reject: bool,
    emails: Arc<Mutex<Vec<EmailMessage>>>,
    events: Arc<Mutex<Vec<Event>>>,
    email_calls: Arc<AtomicUsize>,
    event_calls: Arc<AtomicUsize>,
}

impl FakeMessenger {
    pub fn ok() -> Self {
        Self::default()
    }

    /// Every call answers 502 with a plain-text body.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn emails(&self) -> usize {
        self.email_calls.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> usize {
        self.event_calls.load(Ordering::SeqCst)
    }

    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        lock(&self.emails).clone()
    }

    pub fn sent_events(&self) -> Vec<Event> {
        lock(&self.events).clone()
    }

    fn rejection(&self) -> Result<(), ProviderError> {
        if self.reject {
            Err(ProviderError::Status {
                status: StatusCode::BAD_GATEWAY,
                details: Value::String("bento down".to_string()),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_emails(&self, emails: &[EmailMessage]) -> Result<(), ProviderError> {
        self.email_calls.fetch_add(1, Ordering::SeqCst);
        self.rejection()?;
        lock(&self.emails).extend_from_slice(emails);
        Ok(())
    }

    async fn send_events(&self, events: &[Event]) -> Result<(), ProviderError> {
        self.event_calls.fetch_add(1, Ordering::SeqCst);
        self.rejection()?;
        lock(&self.events).extend_from_slice(events);
        Ok(())
    }
}
