// HTTP handlers: version, stats, status, settings, control operations

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::settings::SettingsUpdate;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/stats: current snapshot.
pub(super) async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.snapshot())
}

pub(super) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": state.controller.status() }))
}

pub(super) async fn get_settings_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.settings())
}

/// PUT /api/settings: partial update; polling restarts with the result.
pub(super) async fn update_settings_handler(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Response {
    match state.controller.update_settings(update) {
        Ok(settings) => Json(settings).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

pub(super) async fn reset_settings_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.reset_settings())
}

pub(super) async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.request_refresh();
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize)]
pub(super) struct VisibilityRequest {
    visible: bool,
}

/// POST /api/visibility: show starts polling, hide stops it.
pub(super) async fn visibility_handler(
    State(state): State<AppState>,
    Json(req): Json<VisibilityRequest>,
) -> impl IntoResponse {
    state.controller.set_visible(req.visible);
    Json(serde_json::json!({
        "visible": state.controller.is_visible(),
        "running": state.controller.is_running(),
    }))
}

/// POST /api/update-check: runs the check now; the result is also pushed on /ws/stats.
pub(super) async fn update_check_handler(State(state): State<AppState>) -> impl IntoResponse {
    let info = state.controller.check_updates().await;
    Json(serde_json::json!({
        "updateAvailable": info.is_some(),
        "update": info,
    }))
}
