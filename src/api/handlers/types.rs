//! Request/response bodies for the enroll endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Signup body. Fields are optional so a missing field is a validation error
/// rather than a JSON rejection.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

/// Verify body. `user_id` is kept as raw JSON so falsy values (`null`, `false`,
/// `0`, `""`) can be told apart from a body that does not parse.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct VerifyRequest {
    #[schema(value_type = Option<String>)]
    pub user_id: Option<Value>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyResponse {
    pub message: String,
    pub email: String,
}

/// Flat error body: `{"error": "...", "details": ...}`.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// Structured error produced by the verify catch-all.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub details: Option<String>,
    pub code: Option<String>,
    pub hint: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct DetailedErrorResponse {
    pub error: ErrorDetail,
}
