use anyhow::Result;
use hudcore::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let monitoring = &app_config.monitoring;

    let state_repo = Arc::new(state_repo::StateRepo::connect(&app_config.database.path).await?);
    state_repo.init().await?;

    let store = Arc::new(store::SnapshotStore::new());
    let settings = lifecycle::restore_state(&state_repo, &store).await;

    let (state_tx, state_rx) = mpsc::channel(state_repo::STATE_WRITE_CAPACITY);
    let writer_handle = state_repo::spawn_state_writer(
        state_rx,
        state_repo.clone(),
        Arc::new(AtomicU64::new(0)),
    );

    let collector = Arc::new(collector::SysinfoCollector::new(
        collector::SysinfoCollectorConfig {
            public_ip_url: monitoring.public_ip_url.clone(),
            http_timeout: Duration::from_millis(monitoring.http_timeout_ms),
            ping_timeout: Duration::from_millis(monitoring.ping_timeout_ms),
        },
    )?);
    let update_checker = if monitoring.update_check_url.is_empty() {
        None
    } else {
        Some(Arc::new(update::UpdateChecker::new(
            monitoring.update_check_url.clone(),
            Duration::from_millis(monitoring.http_timeout_ms),
        )?))
    };
    let publisher = Arc::new(publisher::Publisher::new(
        app_config.publishing.broadcast_capacity,
    ));

    let controller = Arc::new(lifecycle::LifecycleController::new(
        lifecycle::LifecycleDeps {
            collector,
            store,
            publisher,
            state_tx: Some(state_tx),
            update_checker,
            heuristics: app_config.heuristics,
            ping_hosts: monitoring.ping_hosts.clone(),
        },
        settings,
        monitoring.start_visible,
    ));
    controller.start();
    let update_handle =
        controller.schedule_update_check(Duration::from_secs(monitoring.update_check_delay_secs));

    let ws_stats_connections = Arc::new(AtomicUsize::new(0));
    let app = routes::app(controller.clone(), ws_stats_connections);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
        }
    }

    update_handle.abort();
    controller.shutdown();
    // Scheduler tasks and the controller hold the remaining write senders.
    drop(controller);
    if tokio::time::timeout(Duration::from_secs(5), writer_handle)
        .await
        .is_err()
    {
        tracing::warn!("State writer did not drain before exit");
    }

    Ok(())
}
