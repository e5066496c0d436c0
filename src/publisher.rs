// Publisher: fan-out of merged snapshots and the one-line status summary.
// Sends never wait on subscribers; a lagging client skips messages.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::models::Snapshot;
use crate::update::UpdateInfo;

const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Events pushed to the presentation layer, e.g.
/// `{"type":"update-stats","data":{...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum HudEvent {
    UpdateStats(Arc<Snapshot>),
    UpdateAvailable(UpdateInfo),
}

pub struct Publisher {
    tx: broadcast::Sender<HudEvent>,
    status_tx: watch::Sender<String>,
    published_total: AtomicU64,
    last_no_receivers_log: Mutex<Option<Instant>>,
}

impl Publisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        let (status_tx, _) = watch::channel(status_summary(&Snapshot::default()));
        Self {
            tx,
            status_tx,
            published_total: AtomicU64::new(0),
            last_no_receivers_log: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HudEvent> {
        self.tx.subscribe()
    }

    pub fn watch_status(&self) -> watch::Receiver<String> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> String {
        self.status_tx.borrow().clone()
    }

    /// Snapshots published since start.
    pub fn published_total(&self) -> u64 {
        self.published_total.load(Ordering::Relaxed)
    }

    /// Pushes a merged snapshot and refreshes the status line.
    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        self.status_tx.send_replace(status_summary(&snapshot));
        self.published_total.fetch_add(1, Ordering::Relaxed);
        self.send(HudEvent::UpdateStats(snapshot), "broadcast_snapshot");
    }

    pub fn publish_update(&self, info: UpdateInfo) {
        self.send(HudEvent::UpdateAvailable(info), "broadcast_update");
    }

    fn send(&self, event: HudEvent, operation: &'static str) {
        if self.tx.send(event).is_err() {
            let mut last = self.last_no_receivers_log.lock();
            if last.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL) {
                tracing::debug!(operation, "No subscribers; broadcast channel has no receivers");
                *last = Some(Instant::now());
            }
        }
    }
}

/// `CPU: x% | RAM: y% | GPU: z% | C: w%` for passive surfaces such as a tray tooltip.
pub fn status_summary(snapshot: &Snapshot) -> String {
    let cpu = snapshot.cpu.current_load.round() as i64;
    let ram = snapshot.mem.usage_percent().round() as i64;
    let gpu = snapshot
        .gpu
        .controllers
        .first()
        .map(|c| c.utilization_gpu)
        .unwrap_or(0.0)
        .round() as i64;
    let disk = snapshot
        .storage
        .fs
        .first()
        .map(|f| f.use_)
        .unwrap_or(0.0)
        .round() as i64;
    format!("CPU: {}% | RAM: {}% | GPU: {}% | C: {}%", cpu, ram, gpu, disk)
}
