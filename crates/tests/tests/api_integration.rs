use axum::body::Body;
use axum::http::{Request, StatusCode};
use bloom_tests::{get, post_json, send, test_app};
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["zones"], 5);
}

#[tokio::test]
async fn zones_require_api_key() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/v1/zones")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn zones_are_listed_in_seed_order() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/v1/zones")).await;

    assert_eq!(status, StatusCode::OK);
    let names = body
        .as_array()
        .unwrap()
        .iter()
        .map(|zone| zone["name"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        [
            "Historic Center",
            "San Pedro Market",
            "Wanchaq",
            "San Blas",
            "Sacsayhuamán"
        ]
    );
}

#[tokio::test]
async fn unknown_zone_is_404() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/v1/zones/Nonexistent%20Zone")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "zone_not_found");
}

#[tokio::test]
async fn alert_for_market_with_medium_sensitivity() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        get("/v1/zones/San%20Pedro%20Market/alert?sensitivity=medium"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["alert"]["tier"], "high");
    assert!(body["alert"]["pollen_summary"]
        .as_str()
        .unwrap()
        .contains("92"));
    assert!(body["alert"]["special_notice"].is_null());
}

#[tokio::test]
async fn alert_for_respiratory_profile_carries_notice() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        get("/v1/zones/San%20Pedro%20Market/alert?sensitivity=asthma"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sensitivity"], "respiratory");
    assert!(body["alert"]["special_notice"].is_string());
}

#[tokio::test]
async fn alert_rejects_unknown_sensitivity() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/v1/zones/Wanchaq/alert?sensitivity=extreme")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_sensitivity");
}

#[tokio::test]
async fn chat_builds_an_alternating_transcript() {
    let app = test_app().await;

    let (status, first) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({ "zone": "Wanchaq", "text": "What about tomorrow's forecast?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["intent"], "forecast");
    assert!(first["reply_text"].as_str().unwrap().contains("Today: Low risk"));
    assert_eq!(first["turn_count"], 2);

    let session_id = first["session_id"].as_str().unwrap().to_string();
    let (status, second) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({
                "session_id": session_id,
                "zone": "Wanchaq",
                "sensitivity": "high",
                "text": "Does NASA track pollen?"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["intent"], "pollen_situation");
    assert_eq!(second["turn_count"], 4);

    let (status, transcript) =
        send(&app, get(&format!("/v1/sessions/{session_id}/turns"))).await;
    assert_eq!(status, StatusCode::OK);
    let roles = transcript["turns"]
        .as_array()
        .unwrap()
        .iter()
        .map(|turn| turn["role"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(roles, ["user", "assistant", "user", "assistant"]);
}

#[tokio::test]
async fn blank_chat_is_a_no_op() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({ "session_id": "quiet", "zone": "Wanchaq", "text": "   " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get("/v1/sessions/quiet/turns")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

#[tokio::test]
async fn chat_with_unknown_zone_is_404_and_creates_no_session() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({ "session_id": "lost", "zone": "Atlantis", "text": "pollen?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "zone_not_found");

    let (status, _) = send(&app, get("/v1/sessions/lost/turns")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_applies_per_forwarded_ip() {
    use bloom_api::{build_app_with_config, ApiConfig};
    use tower::ServiceExt;

    let app = build_app_with_config(ApiConfig {
        rate_limit_max: 2,
        ..bloom_tests::test_config()
    })
    .await
    .unwrap();

    let request = |ip: &str| {
        Request::builder()
            .uri("/v1/zones")
            .header("x-api-key", bloom_tests::TEST_API_KEY)
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let limited = app.clone().oneshot(request("203.0.113.7")).await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));

    let other = app.clone().oneshot(request("198.51.100.1")).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn zone_lookup_returns_the_seeded_zone() {
    let app = test_app().await;
    let (status, body) = send(&app, get("/v1/zones/San%20Blas")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "San Blas");
    assert_eq!(body["pollen_count"], 65);
    assert_eq!(body["risk_level"], "medium");
}

#[tokio::test]
async fn idle_sessions_expire_before_the_next_chat() {
    use std::time::Duration;

    use bloom_api::{build_app_with_config, ApiConfig};

    let app = build_app_with_config(ApiConfig {
        session_ttl: Duration::ZERO,
        ..bloom_tests::test_config()
    })
    .await
    .unwrap();

    let (status, first) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({ "session_id": "short-lived", "zone": "San Blas", "text": "pollen?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["turn_count"], 2);

    let (status, _) = send(
        &app,
        post_json(
            "/v1/chat",
            json!({ "session_id": "other", "zone": "San Blas", "text": "hello" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/v1/sessions/short-lived/turns")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

#[tokio::test]
async fn forwarded_header_is_ignored_unless_trusted() {
    use std::net::SocketAddr;

    use axum::extract::ConnectInfo;
    use bloom_api::{build_app_with_config, ApiConfig};
    use tower::ServiceExt;

    let app = build_app_with_config(ApiConfig {
        rate_limit_max: 2,
        trust_forwarded_for: false,
        ..bloom_tests::test_config()
    })
    .await
    .unwrap();

    let request = |peer: &str, forwarded: &str| {
        let mut request = Request::builder()
            .uri("/v1/zones")
            .header("x-api-key", bloom_tests::TEST_API_KEY)
            .header("x-forwarded-for", forwarded)
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        request
    };

    for forwarded in ["10.0.0.1", "10.0.0.2"] {
        let response = app
            .clone()
            .oneshot(request("192.0.2.10:5000", forwarded))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let spoofed = app
        .clone()
        .oneshot(request("192.0.2.10:5001", "10.0.0.3"))
        .await
        .unwrap();
    assert_eq!(spoofed.status(), StatusCode::TOO_MANY_REQUESTS);

    let other_peer = app
        .clone()
        .oneshot(request("192.0.2.11:5000", "10.0.0.3"))
        .await
        .unwrap();
    assert_eq!(other_peer.status(), StatusCode::OK);
}
