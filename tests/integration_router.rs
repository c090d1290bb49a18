#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use enroll::{
    api::{self, EnrollConfig, EnrollState},
    bento::{BentoClient, Credentials},
    provider::http_client,
    supabase::{GoTrueAdmin, PostgrestUsers, Project},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    supabase: MockServer,
    bento: MockServer,
    app: Router,
}

async fn harness() -> Result<Harness> {
    let supabase = MockServer::start().await;
    let bento = MockServer::start().await;

    let client = http_client()?;
    let project = Project::new(
        &supabase.uri(),
        SecretString::from("service-key".to_string()),
    )?;
    let messenger = BentoClient::new(
        client.clone(),
        &bento.uri(),
        Credentials {
            site_uuid: "site-123".to_string(),
            publishable_key: "pub".to_string(),
            secret_key: SecretString::from("sec".to_string()),
        },
    )?;
    let state = Arc::new(EnrollState::new(
        EnrollConfig::new(Url::parse("https://app.example.com/confirm")?),
        Arc::new(GoTrueAdmin::new(client.clone(), project.clone())),
        Arc::new(PostgrestUsers::new(client, project)),
        Arc::new(messenger),
    ));

    Ok(Harness {
        supabase,
        bento,
        app: api::router(state),
    })
}

async fn call(app: &Router, method: Method, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn signup_runs_all_three_calls() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(header("apikey", "service-key"))
        .and(body_partial_json(
            json!({"email": "a@b.com", "password": "pw", "email_confirm": false}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u-1"})))
        .expect(1)
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({"id": "u-1", "email": "a@b.com"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/emails"))
        .and(query_param("site_uuid", "site-123"))
        .and(header("user-agent", "bento-suprabase-site-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 1})))
        .expect(1)
        .mount(&h.bento)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/signup-user",
        json!({"email": "a@b.com", "password": "pw"}),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "User created and confirmation sent", "user_id": "u-1"})
    );

    let requests = h.bento.received_requests().await.unwrap_or_default();
    let sent: Value = serde_json::from_slice(&requests[0].body)?;
    let html = sent["emails"][0]["html_body"].as_str().unwrap_or_default();
    assert!(html.contains("https://app.example.com/confirm?user=u-1"));
    Ok(())
}

#[tokio::test]
async fn signup_rejects_get_without_calls() -> Result<()> {
    let h = harness().await?;

    let (status, body) = call(&h.app, Method::GET, "/signup-user", Value::Null).await?;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "Method not allowed"}));
    assert!(h.supabase.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn signup_surfaces_provider_body() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(422).set_body_json(
            json!({"code": 422, "error_code": "email_exists", "msg": "already registered"}),
        ))
        .mount(&h.supabase)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/signup-user",
        json!({"email": "a@b.com", "password": "pw"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "User creation failed");
    assert_eq!(body["details"]["error_code"], "email_exists");
    assert!(h.bento.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn signup_insert_failure_keeps_postgrest_fields() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u-1"})))
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "duplicate key value violates unique constraint \"users_pkey\"",
            "details": "Key (id)=(u-1) already exists.",
            "code": "23505",
            "hint": null
        })))
        .mount(&h.supabase)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/signup-user",
        json!({"email": "a@b.com", "password": "pw"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to insert into public.users");
    assert_eq!(body["details"]["code"], "23505");
    assert!(h.bento.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn signup_email_failure_returns_raw_text() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u-1"})))
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/emails"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&h.bento)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/signup-user",
        json!({"email": "a@b.com", "password": "pw"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Email send failed", "details": "Unauthorized"})
    );
    Ok(())
}

#[tokio::test]
async fn verify_updates_reads_back_and_emits_event() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.supabase)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "email"))
        .and(query_param("id", "eq.u-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"email": "a@b.com"}])))
        .expect(1)
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/events"))
        .and(body_partial_json(
            json!({"events": [{"type": "$user_confirmed", "email": "a@b.com"}]}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": 1})))
        .expect(1)
        .mount(&h.bento)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/verify-user",
        json!({"user_id": "u-1"}),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "User verified and event sent", "email": "a@b.com"})
    );
    Ok(())
}

#[tokio::test]
async fn verify_unknown_user_is_lookup_failure() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.supabase)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.supabase)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/verify-user",
        json!({"user_id": "ghost"}),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Failed to fetch user email from public.users"
    );
    assert!(h.bento.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn verify_rejected_event_is_server_error() -> Result<()> {
    let h = harness().await?;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.supabase)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"email": "a@b.com"}])))
        .mount(&h.supabase)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/batch/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&h.bento)
        .await;

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/verify-user",
        json!({"user_id": "u-1"}),
    )
    .await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"error": "Failed to send event to Bento", "details": "boom"})
    );
    Ok(())
}

#[tokio::test]
async fn verify_missing_user_id_makes_no_calls() -> Result<()> {
    let h = harness().await?;

    let (status, body) = call(&h.app, Method::POST, "/verify-user", json!({})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing user_id in request body"}));
    assert!(h.supabase.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn responses_carry_request_id() -> Result<()> {
    let h = harness().await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/verify-user")
        .header("x-request-id", "req-42")
        .body(Body::from("{}"))?;
    let response = h.app.clone().oneshot(request).await?;

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-42")
    );
    Ok(())
}

#[tokio::test]
async fn health_and_openapi_are_served() -> Result<()> {
    let h = harness().await?;

    let (status, body) = call(&h.app, Method::GET, "/health", Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));

    let (status, body) = call(&h.app, Method::GET, api::OPENAPI_PATH, Value::Null).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/signup-user"].is_object());
    Ok(())
}
