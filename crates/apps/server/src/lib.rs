use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod relay;

use relay::Relay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            relay: Arc::new(Relay::new(channel_capacity)),
        }
    }
}

/// Relay routes, with everything else served from `static_root`.
pub fn app(state: AppState, static_root: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/status", get(status))
        .route("/ws", get(relay::ws_handler))
        .fallback_service(ServeDir::new(static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn status(State(state): State<AppState>) -> Response {
    Json(json!({
        "connections": state.relay.connection_count(),
    }))
    .into_response()
}
