//! Router-level tests
//!
//! These exercise routing, authentication, authorization, and input
//! validation against a lazily connected pool; none of them reach the
//! database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use domain_billing::sign_payload;
use interface_api::auth::issue_token_pair;
use interface_api::config::ApiConfig;
use interface_api::create_router;

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: "router-test-secret".to_string(),
        ..ApiConfig::default()
    }
}

fn app() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/coverline_test")
        .expect("lazy pool");
    create_router(pool, test_config())
}

fn bearer_for(user: &domain_identity::User) -> String {
    let config = test_config();
    let tokens = issue_token_pair(
        user,
        &config.jwt_secret,
        config.access_token_secs,
        config.refresh_token_secs,
    )
    .expect("token pair");
    format!("Bearer {}", tokens.access_token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn liveness_probe_is_public() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let response = app()
        .oneshot(Request::get("/api/v1/policies").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn garbage_tokens_are_rejected() {
    let response = app()
        .oneshot(
            Request::get("/api/v1/policies")
                .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_do_not_open_protected_routes() {
    let user = test_utils::customer();
    let config = test_config();
    let tokens = issue_token_pair(
        &user,
        &config.jwt_secret,
        config.access_token_secs,
        config.refresh_token_secs,
    )
    .unwrap();

    let response = app()
        .oneshot(
            Request::get("/api/v1/policies")
                .header(
                    header::AUTHORIZATION,
                    format!("Bearer {}", tokens.refresh_token),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_refuse_customers() {
    let customer = test_utils::customer();

    let response = app()
        .oneshot(
            Request::get("/api/v1/admin/summary")
                .header(header::AUTHORIZATION, bearer_for(&customer))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registration_validates_before_touching_storage() {
    let request = Request::post("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "not-an-email",
                "password": "short",
                "full_name": ""
            })
            .to_string(),
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn webhooks_for_unknown_gateways_are_not_found() {
    let response = app()
        .oneshot(
            Request::post("/api/v1/webhooks/paypal")
                .header("x-webhook-signature", "00")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhooks_without_a_signature_are_rejected() {
    let response = app()
        .oneshot(
            Request::post("/api/v1/webhooks/stripe")
                .body(Body::from(r#"{"event":"payment.completed","order_id":"pi_1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forged_webhook_signatures_are_rejected() {
    let payload = r#"{"event":"payment.completed","order_id":"pi_1"}"#;
    let forged = sign_payload("some-other-secret", payload.as_bytes());

    let response = app()
        .oneshot(
            Request::post("/api/v1/webhooks/stripe")
                .header("x-webhook-signature", forged)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_webhook_with_unknown_event_is_bad_request() {
    let config = test_config();
    let payload = r#"{"event":"payment.refunded","order_id":"pi_1"}"#;
    let signature = sign_payload(&config.stripe_webhook_secret, payload.as_bytes());

    let response = app()
        .oneshot(
            Request::post("/api/v1/webhooks/stripe")
                .header("x-webhook-signature", signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
