// Bounded load history and trailing averages

use std::collections::VecDeque;

use crate::models::LoadAverages;

pub const LOAD_HISTORY_CAPACITY: usize = 600;

/// Sample counts for the 1m / 5m / 15m averages (one sample per fast tick).
pub const LOAD_WINDOWS: [usize; 3] = [60, 300, 600];

/// FIFO of instantaneous CPU load samples, capped at [`LOAD_HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct LoadHistory {
    samples: VecDeque<f64>,
}

impl LoadHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(LOAD_HISTORY_CAPACITY),
        }
    }

    /// Appends a sample, evicting the oldest past capacity, and returns the new averages.
    pub fn push(&mut self, load: f64) -> LoadAverages {
        if self.samples.len() >= LOAD_HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(load);
        self.averages()
    }

    pub fn averages(&self) -> LoadAverages {
        let [one, five, fifteen] = LOAD_WINDOWS;
        LoadAverages {
            one: self.trailing_mean(one),
            five: self.trailing_mean(five),
            fifteen: self.trailing_mean(fifteen),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    fn trailing_mean(&self, window: usize) -> f64 {
        let n = window.min(self.samples.len());
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().rev().take(n).sum();
        round1(sum / n as f64)
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
