mod config;
mod rate_limit;
mod session_store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::extract::{ConnectInfo, Json, Path, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use bloom_agents::{AdvisoryAgent, AskInput};
use bloom_core::{SensitivityProfile, ZoneNotFound};
use bloom_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use crate::config::ApiConfig;
pub use crate::rate_limit::{IpRateLimiter, RateDecision};
pub use crate::session_store::SessionStore;

const DEFAULT_SENSITIVITY: SensitivityProfile = SensitivityProfile::Medium;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<AdvisoryAgent>,
    pub metrics: Arc<AppMetrics>,
    pub sessions: SessionStore,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    zones: usize,
    sessions: usize,
    metrics: bloom_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct AlertQuery {
    sensitivity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    session_id: Option<String>,
    zone: String,
    sensitivity: Option<String>,
    text: String,
}

pub async fn build_app() -> Result<Router> {
    build_app_with_config(ApiConfig::from_env()).await
}

pub async fn build_app_with_config(config: ApiConfig) -> Result<Router> {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(AdvisoryAgent::seeded(metrics.clone()));

    info!(
        zones = agent.zone_count(),
        rate_limit_max = config.rate_limit_max,
        session_ttl_secs = config.session_ttl.as_secs(),
        trust_forwarded_for = config.trust_forwarded_for,
        "advisory api configured"
    );

    let state = ApiState {
        agent,
        metrics,
        sessions: SessionStore::new(config.session_ttl),
        api_key: config.api_key,
        limiter: IpRateLimiter::new(config.rate_limit_window, config.rate_limit_max),
        trust_forwarded_for: config.trust_forwarded_for,
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/zones", get(zones_list))
        .route("/v1/zones/:name", get(zone_get))
        .route("/v1/zones/:name/alert", get(zone_alert))
        .route("/v1/chat", post(chat))
        .route("/v1/sessions/:id/turns", get(session_turns))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(16 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        zones: state.agent.zone_count(),
        sessions: state.sessions.len(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn zones_list(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.agent.list_zones().to_vec()))
}

async fn zone_get(State(state): State<ApiState>, Path(name): Path<String>) -> Response {
    match state.agent.zone(&name) {
        Ok(zone) => (StatusCode::OK, Json(zone.clone())).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn zone_alert(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<AlertQuery>,
) -> Response {
    let sensitivity = match parse_sensitivity(query.sensitivity.as_deref()) {
        Ok(sensitivity) => sensitivity,
        Err(response) => return response,
    };

    match state.agent.alert(&name, sensitivity) {
        Ok(alert) => (StatusCode::OK, Json(alert)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let sensitivity = match parse_sensitivity(request.sensitivity.as_deref()) {
        Ok(sensitivity) => sensitivity,
        Err(response) => return response,
    };

    if request.text.trim().is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let purged = state.sessions.purge_expired(chrono::Utc::now());
    if purged > 0 {
        info!(purged, "expired sessions purged");
    }

    let input = AskInput {
        zone: request.zone,
        sensitivity,
        text: request.text,
    };

    // Resolve the zone first so an unknown zone never allocates a session.
    if let Err(err) = state.agent.zone(&input.zone) {
        return error_response(&err);
    }

    let result = state
        .sessions
        .with_session(request.session_id.as_deref(), |session| {
            state.agent.ask(session, &input)
        });

    match result {
        Ok(Some(reply)) => (StatusCode::OK, Json(reply)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err),
    }
}

async fn session_turns(State(state): State<ApiState>, Path(id): Path<String>) -> Response {
    match state.sessions.transcript(&id) {
        Some(turns) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "session_id": id,
                "turns": turns,
            })),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "session_not_found",
                "message": format!("no active session {}", id)
            })),
        )
            .into_response(),
    }
}

fn parse_sensitivity(value: Option<&str>) -> Result<SensitivityProfile, Response> {
    let Some(value) = value else {
        return Ok(DEFAULT_SENSITIVITY);
    };

    SensitivityProfile::parse(value).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "invalid_sensitivity",
                "message": "sensitivity must be one of low, medium, high, respiratory"
            })),
        )
            .into_response()
    })
}

fn error_response(err: &anyhow::Error) -> Response {
    if let Some(not_found) = err.downcast_ref::<ZoneNotFound>() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "zone_not_found",
                "message": not_found.to_string()
            })),
        )
            .into_response();
    }

    warn!(error = %err, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "internal_error",
            "message": err.to_string()
        })),
    )
        .into_response()
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || is_public_endpoint(request.uri().path()) {
        return next.run(request).await;
    }

    let ip = client_key(&request, state.trust_forwarded_for);
    if let RateDecision::Limited { retry_after } = state.limiter.check(&ip) {
        warn!(ip = %ip, retry_after_secs = retry_after.as_secs(), "rate limited");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
        let retry_secs = retry_after.as_secs().max(1).to_string();
        if let Ok(value) = HeaderValue::from_str(&retry_secs) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}

/// Rate-limit key for a request: the first forwarded hop when the proxy is
/// trusted, otherwise the peer address. Requests without a peer (in-process
/// callers) share the `local` bucket.
fn client_key(request: &Request<Body>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "local".to_string())
}
