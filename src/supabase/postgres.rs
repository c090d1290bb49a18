//! `users` table over a direct Postgres connection.
//!
//! `users.id` mirrors `auth.users.id`, which is a `uuid` column in Supabase
//! projects, so ids are cast on the way in.

use super::{NewUser, StoreError, UserStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgDatabaseError, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{Instrument, info_span, instrument};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let mut store_err = Self::new(db_err.message());
                if let Some(code) = db_err.code() {
                    store_err = store_err.with_code(code);
                }
                if let Some(pg_err) = db_err.try_downcast_ref::<PgDatabaseError>() {
                    if let Some(detail) = pg_err.detail() {
                        store_err = store_err.with_details(detail);
                    }
                    if let Some(hint) = pg_err.hint() {
                        store_err = store_err.with_hint(hint);
                    }
                }
                store_err
            }
            other => Self::new(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgUsers {
    pool: PgPool,
}

impl PgUsers {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily connecting pool, so startup does not block on the database.
    ///
    /// # Errors
    /// Returns an error if the DSN cannot be parsed.
    pub fn connect_lazy(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect_lazy(dsn)
            .context("Failed to configure database pool")?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl UserStore for PgUsers {
    #[instrument(skip(self))]
    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        let query = "INSERT INTO users (id, email) VALUES ($1::uuid, $2)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&user.id)
            .bind(&user.email)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_confirmed_at(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let query = "UPDATE users SET confirmed_at = $2 WHERE id = $1::uuid";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn select_email(&self, id: &str) -> Result<Option<String>, StoreError> {
        let query = "SELECT email FROM users WHERE id = $1::uuid";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let email: Option<Option<String>> = sqlx::query_scalar(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        Ok(email.flatten())
    }
}
