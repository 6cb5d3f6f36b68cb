//! HTTP gateway (Axum) for registration and recommendation queries.
//!
//! This module is primarily used by the `bizmatch` server binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{RegisterResponse, recommend_handler, register_handler};
pub use state::HandlerState;

/// Response header carrying a short machine-readable outcome.
pub const STATUS_HEADER: &str = "x-bizmatch-status";
pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_NOT_READY: &str = "not_ready";
pub const STATUS_REGISTERED: &str = "registered";

pub const BANNER: &str = "Company Recommendation System is Running 🚀";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/", get(banner_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/register", post(register_handler))
        .route("/recommend", post(recommend_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub store: &'static str,
    pub companies: usize,
    pub embedder_mode: &'static str,
    pub embedding_dim: usize,
}

pub async fn banner_handler() -> &'static str {
    BANNER
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_HEALTHY));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let accessor = state.service.engine().accessor();

    let (store_status, companies) = match state.service.store().count().await {
        Ok(count) => (STATUS_READY, count),
        Err(e) => {
            tracing::warn!(error = %e, "Record store not ready");
            (STATUS_NOT_READY, 0)
        }
    };

    let components = ComponentStatus {
        http: STATUS_READY,
        store: store_status,
        companies,
        embedder_mode: accessor.backend_name(),
        embedding_dim: accessor.dimension(),
    };

    let is_ready = components.store == STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        STATUS_HEADER,
        HeaderValue::from_static(if is_ready { STATUS_READY } else { STATUS_NOT_READY }),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
