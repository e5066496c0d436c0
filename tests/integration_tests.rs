// Integration tests: HTTP and WebSocket endpoints

mod common;

use axum_test::TestServer;
use common::FakeCollector;
use hudcore::derived::Heuristics;
use hudcore::lifecycle::{LifecycleController, LifecycleDeps};
use hudcore::publisher::Publisher;
use hudcore::routes;
use hudcore::settings::Settings;
use hudcore::store::SnapshotStore;
use hudcore::update::{UpdateChecker, UpdateInfo};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

/// Controller over a fake collector; starts hidden so nothing polls unless a test shows it.
fn test_controller() -> Arc<LifecycleController> {
    test_controller_with_updates(None)
}

fn test_controller_with_updates(update_checker: Option<Arc<UpdateChecker>>) -> Arc<LifecycleController> {
    let controller = LifecycleController::new(
        LifecycleDeps {
            collector: Arc::new(FakeCollector::default()),
            store: Arc::new(SnapshotStore::new()),
            publisher: Arc::new(Publisher::new(16)),
            state_tx: None,
            update_checker,
            heuristics: Heuristics::default(),
            ping_hosts: vec!["192.168.1.1".into(), "8.8.8.8".into()],
        },
        Settings::default(),
        false,
    );
    Arc::new(controller)
}

fn test_app() -> (axum::Router, Arc<LifecycleController>) {
    let controller = test_controller();
    let app = routes::app(controller.clone(), Arc::new(AtomicUsize::new(0)));
    (app, controller)
}

/// Build TestServer with http_transport (required for WebSocket tests).
fn test_server_with_http() -> (TestServer, Arc<LifecycleController>) {
    let (app, controller) = test_app();
    let server = TestServer::builder().http_transport().build(app);
    (server, controller)
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("hudcore"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_stats_endpoint_returns_snapshot() {
    let (app, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/api/stats").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["health"], 100);
    assert_eq!(json["networkInfo"]["publicIP"], "Fetching...");
    assert!(json["cpu"]["loadAvg"].get("1m").is_some());
}

#[tokio::test]
async fn test_status_endpoint() {
    let (app, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/api/status").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "CPU: 0% | RAM: 0% | GPU: 0% | C: 0%");
}

#[tokio::test]
async fn test_get_settings_returns_defaults() {
    let (app, _) = test_app();
    let server = TestServer::new(app);
    let response = server.get("/api/settings").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["performancePreset"], "medium");
    assert_eq!(json["refreshRates"]["fast"], 2000);
}

#[tokio::test]
async fn test_put_settings_applies_preset() {
    let (app, controller) = test_app();
    let server = TestServer::new(app);
    let response = server
        .put("/api/settings")
        .json(&serde_json::json!({ "performancePreset": "high" }))
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["performancePreset"], "high");
    assert_eq!(json["refreshRates"]["fast"], 1000);
    assert_eq!(controller.settings().refresh_rates.fast, 1000);
}

#[tokio::test]
async fn test_put_settings_rejects_zero_rate() {
    let (app, controller) = test_app();
    let server = TestServer::new(app);
    let response = server
        .put("/api/settings")
        .json(&serde_json::json!({ "refreshRates": { "slow": 0 } }))
        .await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("refreshRates.slow"));
    assert_eq!(controller.settings(), Settings::default());
}

#[tokio::test]
async fn test_reset_settings() {
    let (app, controller) = test_app();
    let server = TestServer::new(app);
    server
        .put("/api/settings")
        .json(&serde_json::json!({ "showAllTabs": true }))
        .await
        .assert_status_ok();
    let response = server.post("/api/settings/reset").await;
    response.assert_status_ok();
    assert_eq!(controller.settings(), Settings::default());
}

#[tokio::test]
async fn test_visibility_toggles_polling() {
    let (app, controller) = test_app();
    let server = TestServer::new(app);

    let response = server
        .post("/api/visibility")
        .json(&serde_json::json!({ "visible": true }))
        .await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["visible"], true);
    assert_eq!(json["running"], true);

    let response = server
        .post("/api/visibility")
        .json(&serde_json::json!({ "visible": false }))
        .await;
    let json: serde_json::Value = response.json();
    assert_eq!(json["running"], false);
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_refresh_is_accepted() {
    let (app, controller) = test_app();
    let server = TestServer::new(app);
    controller.set_visible(true);
    let before = controller.generation().unwrap();
    let response = server.post("/api/refresh").await;
    response.assert_status(axum::http::StatusCode::ACCEPTED);
    assert!(controller.generation().unwrap() > before);
}

#[tokio::test]
async fn test_update_check_without_feed() {
    let (app, _) = test_app();
    let server = TestServer::new(app);
    let response = server.post("/api/update-check").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["updateAvailable"], false);
    assert!(json["update"].is_null());
}

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_stats_sends_current_snapshot_first() {
    let (server, _) = test_server_with_http();
    let mut ws = server.get_websocket("/ws/stats").await.into_websocket().await;
    let first: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(first["type"], "update-stats");
    assert_eq!(first["data"]["health"], 100);
}

#[tokio::test]
async fn test_ws_stats_receives_update_available() {
    let (server, controller) = test_server_with_http();
    let mut ws = server.get_websocket("/ws/stats").await.into_websocket().await;
    let _first: serde_json::Value = receive_first_json_text(&mut ws).await;

    let publisher = controller.publisher().clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        publisher.publish_update(UpdateInfo {
            current: "1.2.0".into(),
            latest: "1.3.0".into(),
            changelog: serde_json::json!([]),
        });
    });
    let event: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(event["type"], "update-available");
    assert_eq!(event["data"]["latest"], "1.3.0");
}

/// Serves a fixed version manifest on an ephemeral port; returns its URL.
async fn serve_manifest(manifest: serde_json::Value) -> String {
    let app = axum::Router::new().route(
        "/version.json",
        axum::routing::get(move || async move { axum::Json(manifest) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/version.json", addr)
}

#[tokio::test]
async fn test_update_check_publishes_newer_version() {
    let url = serve_manifest(serde_json::json!({
        "version": "9.9.9",
        "changelog": ["tiered polling"]
    }))
    .await;
    let checker = UpdateChecker::new(url, std::time::Duration::from_secs(5))
        .unwrap()
        .with_current("1.2.0");
    let controller = test_controller_with_updates(Some(Arc::new(checker)));
    let mut rx = controller.publisher().subscribe();
    let server =
        TestServer::new(routes::app(controller.clone(), Arc::new(AtomicUsize::new(0))));

    let response = server.post("/api/update-check").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["updateAvailable"], true);
    assert_eq!(json["update"]["current"], "1.2.0");
    assert_eq!(json["update"]["latest"], "9.9.9");

    match rx.try_recv().unwrap() {
        hudcore::publisher::HudEvent::UpdateAvailable(info) => {
            assert_eq!(info.changelog[0], "tiered polling")
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_update_check_same_version_is_quiet() {
    let url = serve_manifest(serde_json::json!({ "version": "1.2.0" })).await;
    let checker = UpdateChecker::new(url, std::time::Duration::from_secs(5))
        .unwrap()
        .with_current("1.2.0");
    let controller = test_controller_with_updates(Some(Arc::new(checker)));
    assert_eq!(controller.check_updates().await, None);
}
