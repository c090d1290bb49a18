//! Verify: stamp `confirmed_at`, read the email back, emit `$user_confirmed`.

use super::{
    error::VerifyError,
    state::EnrollState,
    types::{DetailedErrorResponse, ErrorResponse, VerifyRequest, VerifyResponse},
};
use crate::{bento::Event, provider::ProviderError};
use axum::{Json, body::Bytes, extract::Extension};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Falsy ids (`null`, `false`, `0`, `""`) are a missing id. Other scalars are
/// used in their JSON text form.
fn parse(body: &[u8]) -> Result<String, VerifyError> {
    let request: VerifyRequest =
        serde_json::from_slice(body).map_err(|err| VerifyError::Unknown(err.to_string()))?;

    match request.user_id {
        None | Some(Value::Null | Value::Bool(false)) => Err(VerifyError::Validation),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(VerifyError::Validation),
        Some(Value::String(user_id)) if user_id.is_empty() => Err(VerifyError::Validation),
        Some(Value::String(user_id)) => Ok(user_id),
        Some(other) => Ok(other.to_string()),
    }
}

async fn run(state: &EnrollState, body: &[u8]) -> Result<VerifyResponse, VerifyError> {
    let user_id = parse(body)?;

    // Repeated calls overwrite confirmed_at.
    state
        .users()
        .update_confirmed_at(&user_id, Utc::now())
        .await
        .map_err(VerifyError::Store)?;

    let email = match state.users().select_email(&user_id).await {
        Ok(Some(email)) if !email.is_empty() => email,
        Ok(_) => return Err(VerifyError::Lookup(None)),
        Err(err) => return Err(VerifyError::Lookup(Some(err))),
    };

    state
        .messenger()
        .send_events(&[Event::user_confirmed(&email)])
        .await
        .map_err(VerifyError::Downstream)?;

    info!(user_id = %user_id, "user verified and event sent");

    Ok(VerifyResponse {
        message: "User verified and event sent".to_string(),
        email,
    })
}

#[utoipa::path(
    post,
    path = "/verify-user",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "User verified and event sent", body = VerifyResponse),
        (status = 400, description = "Missing user_id, or store/lookup failure", body = DetailedErrorResponse),
        (status = 500, description = "Event send failed", body = ErrorResponse)
    ),
    tag = "enroll"
)]
#[instrument(skip(state, body))]
pub async fn verify(
    state: Extension<Arc<EnrollState>>,
    body: Bytes,
) -> Result<Json<VerifyResponse>, VerifyError> {
    run(&state, &body).await.map(Json).map_err(|err| {
        match &err {
            VerifyError::Validation => {}
            VerifyError::Lookup(Some(source)) => error!("Failed to look up user email: {source}"),
            VerifyError::Downstream(ProviderError::Status { status, .. }) => {
                error!("Bento rejected confirmation event: {status}");
            }
            other => error!("Verification failed: {other}"),
        }
        err
    })
}
