// Snapshot store: the single aggregate of latest metric values.
//
// Readers get an `Arc<Snapshot>` they cannot mutate. Writers merge under the
// write lock through `Arc::make_mut`, so a reader holding an older Arc keeps a
// consistent view while the store moves on. Every merge carries the generation
// of the scheduler run that produced it and is dropped if that run has ended.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::derived::{LoadHistory, NetworkLedger};
use crate::models::{NetworkUsage, Snapshot};

/// Stateful derived-metric components, mutated only inside a merge.
#[derive(Debug, Default)]
pub struct Trackers {
    pub load_history: LoadHistory,
    pub ledger: NetworkLedger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stale generation {attempted} (current {current})")]
pub struct StaleGeneration {
    pub attempted: u64,
    pub current: u64,
}

struct Inner {
    snapshot: Arc<Snapshot>,
    generation: u64,
    trackers: Trackers,
}

pub struct SnapshotStore {
    inner: RwLock<Inner>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                snapshot: Arc::new(Snapshot::default()),
                generation: 0,
                trackers: Trackers::default(),
            }),
        }
    }

    /// Current snapshot. The returned value is frozen; later merges do not affect it.
    pub fn read(&self) -> Arc<Snapshot> {
        self.inner.read().snapshot.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Ends the current generation and returns the new one. Any merge still
    /// carrying the old value is rejected from here on.
    pub fn advance_generation(&self) -> u64 {
        let mut inner = self.inner.write();
        inner.generation += 1;
        inner.generation
    }

    /// Applies `apply` atomically if `generation` is still current. Bumps the
    /// snapshot version and timestamp and returns the new snapshot.
    pub fn merge<F>(&self, generation: u64, apply: F) -> Result<Arc<Snapshot>, StaleGeneration>
    where
        F: FnOnce(&mut Snapshot, &mut Trackers),
    {
        self.merge_then(generation, apply, |_| {})
    }

    /// Like [`merge`](Self::merge), but hands the new snapshot to `then` before
    /// the write lock is released. Concurrent callers therefore see versions in
    /// merge order. `then` must not touch the store.
    pub fn merge_then<F, T>(
        &self,
        generation: u64,
        apply: F,
        then: T,
    ) -> Result<Arc<Snapshot>, StaleGeneration>
    where
        F: FnOnce(&mut Snapshot, &mut Trackers),
        T: FnOnce(&Arc<Snapshot>),
    {
        let mut guard = self.inner.write();
        if guard.generation != generation {
            return Err(StaleGeneration {
                attempted: generation,
                current: guard.generation,
            });
        }
        let inner = &mut *guard;
        let snapshot = Arc::make_mut(&mut inner.snapshot);
        apply(snapshot, &mut inner.trackers);
        snapshot.version += 1;
        snapshot.generation = generation;
        snapshot.timestamp = chrono::Utc::now().timestamp_millis().max(0) as u64;
        then(&inner.snapshot);
        Ok(inner.snapshot.clone())
    }

    /// Replaces the ledger with persisted counters. The baseline is cleared, so the
    /// next observation only seeds it.
    pub fn restore_network_usage(&self, usage: NetworkUsage) {
        let mut inner = self.inner.write();
        Arc::make_mut(&mut inner.snapshot).network_usage = usage.clone();
        inner.trackers.ledger = NetworkLedger::new(usage);
    }

    pub fn network_usage(&self) -> NetworkUsage {
        self.inner.read().trackers.ledger.usage().clone()
    }

    pub fn load_history_len(&self) -> usize {
        self.inner.read().trackers.load_history.len()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
