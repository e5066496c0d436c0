// Lifecycle controller: owns the scheduler and the current settings, and turns
// visibility changes and settings edits into atomic scheduler restarts.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};

use crate::collector::Collector;
use crate::derived::Heuristics;
use crate::models::Snapshot;
use crate::publisher::Publisher;
use crate::scheduler::{SchedulerDeps, Tier, TierScheduler};
use crate::settings::{Settings, SettingsError, SettingsUpdate};
use crate::state_repo::{StateRepo, StateWrite, queue_write};
use crate::store::SnapshotStore;
use crate::update::{UpdateChecker, UpdateInfo};

pub struct LifecycleDeps {
    pub collector: Arc<dyn Collector>,
    pub store: Arc<SnapshotStore>,
    pub publisher: Arc<Publisher>,
    pub state_tx: Option<mpsc::Sender<StateWrite>>,
    pub update_checker: Option<Arc<UpdateChecker>>,
    pub heuristics: Heuristics,
    pub ping_hosts: Vec<String>,
}

pub struct LifecycleController {
    // Held across every stop/start so restarts never interleave.
    scheduler: Mutex<TierScheduler>,
    settings: RwLock<Settings>,
    visible_tx: watch::Sender<bool>,
    store: Arc<SnapshotStore>,
    publisher: Arc<Publisher>,
    state_tx: Option<mpsc::Sender<StateWrite>>,
    update_checker: Option<Arc<UpdateChecker>>,
}

/// Loads persisted settings and restores the network ledger into `store`.
pub async fn restore_state(repo: &StateRepo, store: &SnapshotStore) -> Settings {
    store.restore_network_usage(repo.load_network_usage().await);
    repo.load_settings().await
}

impl LifecycleController {
    pub fn new(deps: LifecycleDeps, settings: Settings, visible: bool) -> Self {
        let (visible_tx, visibility) = watch::channel(visible);
        let scheduler = TierScheduler::new(SchedulerDeps {
            collector: deps.collector,
            store: deps.store.clone(),
            publisher: deps.publisher.clone(),
            visibility,
            state_tx: deps.state_tx.clone(),
            heuristics: deps.heuristics,
            ping_hosts: deps.ping_hosts,
        });
        Self {
            scheduler: Mutex::new(scheduler),
            settings: RwLock::new(settings),
            visible_tx,
            store: deps.store,
            publisher: deps.publisher,
            state_tx: deps.state_tx,
            update_checker: deps.update_checker,
        }
    }

    /// Starts polling if the target is visible.
    pub fn start(&self) {
        let mut scheduler = self.scheduler.lock();
        if self.is_visible() {
            scheduler.start(&self.settings.read());
        } else {
            tracing::info!("Target hidden at start; polling deferred until shown");
        }
    }

    pub fn is_visible(&self) -> bool {
        *self.visible_tx.borrow()
    }

    /// Show starts polling, hide stops it. Repeated transitions are no-ops.
    pub fn set_visible(&self, visible: bool) {
        let mut scheduler = self.scheduler.lock();
        let was_visible = self.visible_tx.send_replace(visible);
        if visible == was_visible && scheduler.is_running() == visible {
            return;
        }
        tracing::info!(visible, "Visibility changed");
        if visible {
            scheduler.start(&self.settings.read());
        } else {
            scheduler.stop();
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Applies a partial update, persists it and restarts polling with the new
    /// settings. A rejected update leaves everything unchanged.
    pub fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, SettingsError> {
        let mut scheduler = self.scheduler.lock();
        let next = self.settings.read().apply(update)?;
        self.replace_settings(&mut scheduler, next.clone());
        Ok(next)
    }

    pub fn reset_settings(&self) -> Settings {
        let mut scheduler = self.scheduler.lock();
        let defaults = Settings::default();
        self.replace_settings(&mut scheduler, defaults.clone());
        defaults
    }

    fn replace_settings(&self, scheduler: &mut TierScheduler, next: Settings) {
        *self.settings.write() = next.clone();
        if let Some(tx) = &self.state_tx {
            queue_write(tx, StateWrite::Settings(next.clone()));
        }
        if self.is_visible() {
            scheduler.restart(&next);
        }
    }

    /// Restarts polling with the current settings, which also re-runs the initial fill.
    pub fn request_refresh(&self) {
        let mut scheduler = self.scheduler.lock();
        if self.is_visible() {
            scheduler.restart(&self.settings.read());
        }
    }

    /// Runs the update check and publishes `update-available` when there is one.
    pub async fn check_updates(&self) -> Option<UpdateInfo> {
        let checker = self.update_checker.as_ref()?;
        match checker.check().await {
            Ok(Some(info)) => {
                self.publisher.publish_update(info.clone());
                Some(info)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, operation = "check_updates", "Update check failed");
                None
            }
        }
    }

    /// Runs one update check after `delay`.
    pub fn schedule_update_check(self: &Arc<Self>, delay: Duration) -> tokio::task::JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.check_updates().await;
        })
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.read()
    }

    pub fn status(&self) -> String {
        self.publisher.status()
    }

    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.lock().is_running()
    }

    pub fn generation(&self) -> Option<u64> {
        self.scheduler.lock().generation()
    }

    pub fn live_tiers(&self) -> Vec<Tier> {
        self.scheduler.lock().live_tiers()
    }

    /// Stops polling and queues a final ledger write.
    pub fn shutdown(&self) {
        self.scheduler.lock().stop();
        if let Some(tx) = &self.state_tx {
            queue_write(tx, StateWrite::NetworkUsage(self.store.network_usage()));
        }
        tracing::info!("Lifecycle controller shut down");
    }
}
