// WebSocket stream of HUD events

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::publisher::HudEvent;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements ws_stats connection count on drop (connect = +1, drop = -1).
struct WsStatsGuard(Arc<AtomicUsize>);

impl Drop for WsStatsGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
    }
}

pub(super) async fn ws_stats(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let controller = state.controller.clone();
    let conn_count = state.ws_stats_connections.clone();
    ws.on_upgrade(move |socket| async move {
        // Subscribe before sending the current snapshot so no merge falls in between.
        let mut rx = controller.publisher().subscribe();
        let current = HudEvent::UpdateStats(controller.snapshot());
        if let Err(e) = stream_stats(socket, current, &mut rx, conn_count).await {
            tracing::info!("Stats stream error: {}", e);
        }
    })
}

async fn send_json(socket: &mut WebSocket, event: &HudEvent) -> anyhow::Result<bool> {
    let json = serde_json::to_string(event)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_stats(
    mut socket: WebSocket,
    current: HudEvent,
    rx: &mut broadcast::Receiver<HudEvent>,
    conn_count: Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let _guard = WsStatsGuard(conn_count);
    tracing::info!("Client connected to stats stream");

    if !send_json(&mut socket, &current).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(event) => {
                        if !send_json(&mut socket, &event).await? {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("WebSocket /ws/stats client lagged, skipped {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
