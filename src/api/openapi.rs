#![allow(clippy::needless_for_each)]

use super::handlers::{
    health,
    health::__path_health,
    signup::__path_signup,
    types::{
        DetailedErrorResponse, ErrorDetail, ErrorResponse, SignupRequest, SignupResponse,
        VerifyRequest, VerifyResponse,
    },
    verify::__path_verify,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Where the document is served and where the UI lives.
pub const OPENAPI_PATH: &str = "/openapi.json";
pub const DOCS_PATH: &str = "/docs";

#[derive(OpenApi)]
#[openapi(
    paths(health, signup, verify),
    components(schemas(
        health::Health,
        SignupRequest,
        SignupResponse,
        VerifyRequest,
        VerifyResponse,
        ErrorResponse,
        ErrorDetail,
        DetailedErrorResponse
    )),
    tags(
        (name = "enroll", description = "Signup and email verification"),
        (name = "health", description = "Liveness")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub(crate) fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, openapi())
}
