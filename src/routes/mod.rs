// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::lifecycle::LifecycleController;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) controller: Arc<LifecycleController>,
    pub(crate) ws_stats_connections: Arc<AtomicUsize>,
}

pub fn app(controller: Arc<LifecycleController>, ws_stats_connections: Arc<AtomicUsize>) -> Router {
    let state = AppState {
        controller,
        ws_stats_connections,
    };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats", get(http::stats_handler)) // GET /api/stats
        .route("/api/status", get(http::status_handler)) // GET /api/status
        .route(
            "/api/settings",
            get(http::get_settings_handler).put(http::update_settings_handler),
        ) // GET, PUT /api/settings
        .route("/api/settings/reset", post(http::reset_settings_handler)) // POST /api/settings/reset
        .route("/api/refresh", post(http::refresh_handler)) // POST /api/refresh
        .route("/api/visibility", post(http::visibility_handler)) // POST /api/visibility
        .route("/api/update-check", post(http::update_check_handler)) // POST /api/update-check
        .route("/ws/stats", get(ws::ws_stats)) // WS /ws/stats
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}
