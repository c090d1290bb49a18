//! # Enroll (signup and email verification orchestration)
//!
//! `enroll` chains three external services into two request pipelines:
//!
//! - **Signup** (`/signup-user`): create a Supabase auth user through the GoTrue
//!   admin API, mirror it into the `users` table, then send a confirmation email
//!   through Bento.
//! - **Verify** (`/verify-user`): stamp `users.confirmed_at`, read the user's email
//!   back and emit a `$user_confirmed` event to Bento.
//!
//! ## Consistency
//!
//! Each step is a hard dependency on the previous one and failures return
//! immediately. Nothing is rolled back: an auth user created before a failed
//! `users` insert stays in place, and repeated verification simply overwrites
//! `confirmed_at`.
//!
//! ## Collaborators
//!
//! The handlers only see the [`supabase::AuthAdmin`], [`supabase::UserStore`] and
//! [`bento::Messenger`] traits. Production wiring uses reqwest clients (and
//! optionally a sqlx pool for `users`); tests inject in-memory fakes.

pub mod api;
pub mod bento;
pub mod cli;
pub mod provider;
pub mod supabase;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
