//! Signup: create the auth user, mirror it into `users`, send the confirmation email.

use super::{
    error::SignupError,
    state::EnrollState,
    types::{ErrorResponse, SignupRequest, SignupResponse},
};
use crate::supabase::NewUser;
use axum::{
    Json,
    body::Bytes,
    extract::Extension,
    http::{Method, StatusCode},
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Email and password after validation.
struct Credentials {
    email: String,
    password: String,
}

/// Both fields present and non-empty, and the email contains `@`.
fn validate(body: &[u8]) -> Result<Credentials, SignupError> {
    let request: SignupRequest = serde_json::from_slice(body).map_err(|err| {
        debug!("unparseable signup body: {err}");
        SignupError::Validation
    })?;

    match (request.email, request.password) {
        (Some(email), Some(password))
            if !email.is_empty() && !password.is_empty() && email.contains('@') =>
        {
            Ok(Credentials { email, password })
        }
        _ => Err(SignupError::Validation),
    }
}

#[utoipa::path(
    post,
    path = "/signup-user",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created and confirmation sent", body = SignupResponse),
        (status = 400, description = "Missing or invalid email/password", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Auth provider, users insert or email send failed", body = ErrorResponse)
    ),
    tag = "enroll"
)]
#[instrument(skip(state, body))]
pub async fn signup(
    method: Method,
    state: Extension<Arc<EnrollState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SignupResponse>), SignupError> {
    if method != Method::POST {
        return Err(SignupError::MethodNotAllowed);
    }

    let Credentials { email, password } = validate(&body)?;

    // 1. auth user, unconfirmed
    let user = state
        .auth()
        .create_user(&email, &password)
        .await
        .map_err(|err| {
            error!("Failed to create auth user: {err}");
            SignupError::UserCreation(err)
        })?;

    // 2. mirror row; the auth user is kept if this fails
    let row = NewUser {
        id: user.id.clone(),
        email: email.clone(),
    };
    state.users().insert(&row).await.map_err(|err| {
        error!(user_id = %user.id, "Failed to insert user row: {err}");
        SignupError::Insert(err)
    })?;

    // 3. confirmation email
    let message = state.config().confirmation_email(&email, &user.id);
    state
        .messenger()
        .send_emails(std::slice::from_ref(&message))
        .await
        .map_err(|err| {
            error!(user_id = %user.id, "Failed to send confirmation email: {err}");
            SignupError::EmailSend(err)
        })?;

    info!(user_id = %user.id, "user created and confirmation sent");

    Ok((
        StatusCode::OK,
        Json(SignupResponse {
            message: "User created and confirmation sent".to_string(),
            user_id: user.id,
        }),
    ))
}
