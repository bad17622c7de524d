//! Shared fixtures for the workspace integration tests.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use bloom_api::{build_app_with_config, ApiConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-bloom-key";

pub fn test_config() -> ApiConfig {
    ApiConfig {
        bind: "127.0.0.1:0".to_string(),
        api_key: TEST_API_KEY.to_string(),
        rate_limit_window: Duration::from_secs(60),
        rate_limit_max: 1_000,
        session_ttl: Duration::from_secs(600),
        trust_forwarded_for: true,
    }
}

pub async fn test_app() -> Router {
    build_app_with_config(test_config())
        .await
        .expect("app should build")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-api-key", TEST_API_KEY)
        .body(Body::empty())
        .expect("valid request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", TEST_API_KEY)
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Sends one request through a clone of `app` and decodes the JSON body, if any.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body should be json")
    };
    (status, value)
}
