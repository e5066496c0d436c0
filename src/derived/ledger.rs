// Daily / monthly network usage ledger

use chrono::{Datelike, NaiveDate};

use crate::models::{DailyUsage, InterfaceStats, MonthlyUsage, NetworkUsage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageDelta {
    pub rx: u64,
    pub tx: u64,
}

/// Accumulates traffic deltas into day and month counters. The first
/// observation of a process lifetime only seeds the baseline, so a restart
/// never books the whole since-boot counter as fresh traffic.
#[derive(Debug, Clone, Default)]
pub struct NetworkLedger {
    usage: NetworkUsage,
    baseline: Option<(u64, u64)>,
}

impl NetworkLedger {
    /// Starts from persisted counters with no baseline.
    pub fn new(restored: NetworkUsage) -> Self {
        Self {
            usage: restored,
            baseline: None,
        }
    }

    pub fn usage(&self) -> &NetworkUsage {
        &self.usage
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline.is_some()
    }

    /// Records absolute rx/tx totals observed on `today`. Returns the delta that was
    /// accumulated, or `None` when this observation only seeded the baseline.
    pub fn observe(&mut self, rx_total: u64, tx_total: u64, today: NaiveDate) -> Option<UsageDelta> {
        let Some((last_rx, last_tx)) = self.baseline.replace((rx_total, tx_total)) else {
            return None;
        };
        // Counters that went backwards (interface reset) contribute nothing.
        let delta = UsageDelta {
            rx: rx_total.saturating_sub(last_rx),
            tx: tx_total.saturating_sub(last_tx),
        };

        let day = day_key(today);
        if self.usage.daily.date != day {
            self.usage.daily = DailyUsage {
                rx: 0,
                tx: 0,
                date: day,
            };
        }
        self.usage.daily.rx = self.usage.daily.rx.saturating_add(delta.rx);
        self.usage.daily.tx = self.usage.daily.tx.saturating_add(delta.tx);

        let month = month_key(today);
        if self.usage.monthly.month != month {
            self.usage.monthly = MonthlyUsage { rx: 0, tx: 0, month };
        }
        self.usage.monthly.rx = self.usage.monthly.rx.saturating_add(delta.rx);
        self.usage.monthly.tx = self.usage.monthly.tx.saturating_add(delta.tx);

        Some(delta)
    }
}

/// Day period key, e.g. "Fri Oct 16 2026".
pub fn day_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Month period key, zero-based.
pub fn month_key(date: NaiveDate) -> u32 {
    date.month0()
}

/// Sums rx/tx across all interfaces; `None` when there are none.
pub fn sum_counters(interfaces: &[InterfaceStats]) -> Option<(u64, u64)> {
    if interfaces.is_empty() {
        return None;
    }
    Some(interfaces.iter().fold((0u64, 0u64), |(rx, tx), i| {
        (rx.saturating_add(i.rx_bytes), tx.saturating_add(i.tx_bytes))
    }))
}
