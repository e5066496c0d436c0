// Memory models

use serde::{Deserialize, Serialize};

use super::raw::RawMemory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryStats {
    /// Total bytes. Defaults to 1 so usage ratios stay finite before the first fetch.
    pub total: u64,
    pub active: u64,
    pub available: u64,
    pub used: u64,
    pub swapused: u64,
    pub swaptotal: u64,
    /// Inferred maximum supported capacity in GB.
    pub max_capacity: u64,
    pub channels: String,
    pub temperature: f64,
    pub layout: Vec<MemoryModule>,
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self {
            total: 1,
            active: 0,
            available: 0,
            used: 0,
            swapused: 0,
            swaptotal: 0,
            max_capacity: 0,
            channels: "Unknown".into(),
            temperature: 0.0,
            layout: vec![],
        }
    }
}

impl MemoryStats {
    pub fn overlay(&mut self, raw: &RawMemory) {
        if let Some(v) = raw.total {
            self.total = v;
        }
        if let Some(v) = raw.active {
            self.active = v;
        }
        if let Some(v) = raw.available {
            self.available = v;
        }
        if let Some(v) = raw.used {
            self.used = v;
        }
        if let Some(v) = raw.swapused {
            self.swapused = v;
        }
        if let Some(v) = raw.swaptotal {
            self.swaptotal = v;
        }
    }

    /// Active / total in percent, with a zero total treated as 1.
    pub fn usage_percent(&self) -> f64 {
        self.active as f64 / self.total.max(1) as f64 * 100.0
    }
}

/// One populated or empty memory slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryModule {
    /// Module size in bytes; 0 for an empty slot.
    pub size: u64,
    pub form_factor: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub clock_speed: u32,
    pub manufacturer: String,
    pub bank: String,
}
