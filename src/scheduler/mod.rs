// Tiered scheduler: five independently timed collection loops over one snapshot store.
//
// Each run of the scheduler owns a generation. Stopping advances the store's
// generation before aborting the tier tasks, so a tick that is mid-fetch when
// the run ends finds its generation stale at merge time and drops its results.

mod needs;
mod tiers;

pub use needs::{FetchPlan, Metric, NeedSet};

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

use crate::collector::Collector;
use crate::derived::Heuristics;
use crate::publisher::Publisher;
use crate::settings::{RefreshRates, Settings};
use crate::state_repo::StateWrite;
use crate::store::SnapshotStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Fast,
    Medium,
    Slow,
    Network,
    System,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Fast, Tier::Medium, Tier::Slow, Tier::Network, Tier::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Fast => "fast",
            Tier::Medium => "medium",
            Tier::Slow => "slow",
            Tier::Network => "network",
            Tier::System => "system",
        }
    }

    pub fn period(&self, rates: &RefreshRates) -> Duration {
        let ms = match self {
            Tier::Fast => rates.fast,
            Tier::Medium => rates.medium,
            Tier::Slow => rates.slow,
            Tier::Network => rates.network,
            Tier::System => rates.system,
        };
        Duration::from_millis(ms.max(1))
    }

    /// Every query this tier is able to issue.
    pub fn capabilities(&self) -> &'static [Metric] {
        match self {
            Tier::Fast => &[Metric::HudUsage, Metric::Cpu, Metric::Memory, Metric::NetworkStats],
            Tier::Medium => &[Metric::Graphics, Metric::Temperature, Metric::FsIo],
            Tier::Slow => &[
                Metric::DiskLayout,
                Metric::FsSize,
                Metric::OsInfo,
                Metric::Battery,
                Metric::MemoryLayout,
                Metric::CpuCache,
            ],
            Tier::Network => &[Metric::Interfaces, Metric::Wifi, Metric::Ping],
            Tier::System => &[Metric::ActiveWindow, Metric::AudioVolume],
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a tier tick reads or writes.
#[derive(Clone)]
pub struct SchedulerDeps {
    pub collector: Arc<dyn Collector>,
    pub store: Arc<SnapshotStore>,
    pub publisher: Arc<Publisher>,
    /// Ticks are no-ops while this reads `false`.
    pub visibility: watch::Receiver<bool>,
    /// Ledger persistence; `None` keeps usage in memory only.
    pub state_tx: Option<mpsc::Sender<StateWrite>>,
    pub heuristics: Heuristics,
    /// First host fills `ping.gateway`, second `ping.google`. `"gateway"` resolves
    /// to the default route.
    pub ping_hosts: Vec<String>,
}

struct RunningTiers {
    generation: u64,
    rates: RefreshRates,
    tiers: Vec<(Tier, JoinHandle<()>)>,
    priming: JoinHandle<()>,
}

enum SchedulerState {
    Stopped,
    Running(RunningTiers),
}

pub struct TierScheduler {
    deps: SchedulerDeps,
    state: SchedulerState,
}

impl TierScheduler {
    pub fn new(deps: SchedulerDeps) -> Self {
        Self {
            deps,
            state: SchedulerState::Stopped,
        }
    }

    /// Starts a new run from `settings`. A running scheduler is stopped first, so
    /// at most one task per tier is ever alive. Returns the run's generation.
    pub fn start(&mut self, settings: &Settings) -> u64 {
        self.stop();

        let rates = settings.effective_rates();
        let needs = NeedSet::from_tabs(&settings.effective_tabs());
        let generation = self.deps.store.advance_generation();
        let deps = Arc::new(self.deps.clone());

        let tiers = Tier::ALL
            .into_iter()
            .filter(|tier| *tier != Tier::Network || needs.net)
            .map(|tier| {
                let plan = FetchPlan::for_tier(tier, &needs);
                let handle = spawn_tier(tier, tier.period(&rates), plan, generation, deps.clone());
                (tier, handle)
            })
            .collect::<Vec<_>>();

        let priming = tokio::spawn(
            tiers::prime(generation, deps)
                .instrument(tracing::info_span!("prime", generation)),
        );

        tracing::info!(
            generation,
            fast_ms = rates.fast,
            medium_ms = rates.medium,
            slow_ms = rates.slow,
            network_ms = rates.network,
            system_ms = rates.system,
            tiers = tiers.len(),
            "Scheduler started"
        );
        self.state = SchedulerState::Running(RunningTiers {
            generation,
            rates,
            tiers,
            priming,
        });
        generation
    }

    /// Cancels every tier. Results of ticks already in flight are discarded.
    pub fn stop(&mut self) {
        let SchedulerState::Running(running) =
            std::mem::replace(&mut self.state, SchedulerState::Stopped)
        else {
            return;
        };
        let next = self.deps.store.advance_generation();
        for (_, handle) in &running.tiers {
            handle.abort();
        }
        running.priming.abort();
        tracing::info!(
            generation = running.generation,
            next_generation = next,
            "Scheduler stopped"
        );
    }

    pub fn restart(&mut self, settings: &Settings) -> u64 {
        self.start(settings)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }

    /// Generation of the current run.
    pub fn generation(&self) -> Option<u64> {
        match &self.state {
            SchedulerState::Running(r) => Some(r.generation),
            SchedulerState::Stopped => None,
        }
    }

    pub fn rates(&self) -> Option<RefreshRates> {
        match &self.state {
            SchedulerState::Running(r) => Some(r.rates),
            SchedulerState::Stopped => None,
        }
    }

    /// Tiers whose task is still alive.
    pub fn live_tiers(&self) -> Vec<Tier> {
        match &self.state {
            SchedulerState::Running(r) => r
                .tiers
                .iter()
                .filter(|(_, h)| !h.is_finished())
                .map(|(t, _)| *t)
                .collect(),
            SchedulerState::Stopped => vec![],
        }
    }
}

impl Drop for TierScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_tier(
    tier: Tier,
    period: Duration,
    plan: FetchPlan,
    generation: u64,
    deps: Arc<SchedulerDeps>,
) -> JoinHandle<()> {
    let span = tracing::info_span!("tier", tier = tier.as_str(), generation);
    tokio::spawn(
        async move {
            let metrics: Vec<Metric> = plan.metrics().collect();
            tracing::debug!(?metrics, period_ms = period.as_millis() as u64, "Tier started");
            // First tick one period after start; priming covers the initial fill.
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if deps.store.generation() != generation {
                    tracing::debug!("Generation ended; tier exiting");
                    break;
                }
                if !*deps.visibility.borrow() {
                    tracing::trace!("Target hidden; skipping tick");
                    continue;
                }
                let tick = tiers::run(tier, &plan, generation, &deps);
                if AssertUnwindSafe(tick).catch_unwind().await.is_err() {
                    tracing::error!("Tier tick panicked; continuing with next tick");
                }
            }
        }
        .instrument(span),
    )
}
