// CPU models: identity, live load, derived load averages and cache sizes

use serde::{Deserialize, Serialize};

use super::raw::{RawCpu, RawLoad};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuStats {
    pub manufacturer: String,
    pub brand: String,
    pub cores: u32,
    pub physical_cores: u32,
    /// Current clock in GHz.
    pub speed: f64,
    /// Rated maximum clock in GHz; 0 when unknown.
    pub speed_max: f64,
    pub governor: String,
    pub current_load: f64,
    /// Die temperature in °C, written by the medium tier.
    pub main: f64,
    pub load_avg: LoadAverages,
    pub throttling: bool,
    /// Estimated package power in watts.
    pub power: i64,
    pub ppt: i64,
    pub voltage: f64,
    pub fan_speed: u32,
    pub cache: CpuCache,
}

impl CpuStats {
    /// Overlays the fields present in `raw` and `load`; absent fields keep their value.
    pub fn overlay(&mut self, raw: &RawCpu, load: &RawLoad) {
        if let Some(v) = &raw.manufacturer {
            self.manufacturer = v.clone();
        }
        if let Some(v) = &raw.brand {
            self.brand = v.clone();
        }
        if let Some(v) = raw.cores {
            self.cores = v;
        }
        if let Some(v) = raw.physical_cores {
            self.physical_cores = v;
        }
        if let Some(v) = raw.speed {
            self.speed = v;
        }
        if let Some(v) = raw.speed_max {
            self.speed_max = v;
        }
        if let Some(v) = &raw.governor {
            self.governor = v.clone();
        }
        self.current_load = load.current_load;
    }
}

/// Trailing means over the last 60 / 300 / 600 fast-tier samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadAverages {
    #[serde(rename = "1m")]
    pub one: f64,
    #[serde(rename = "5m")]
    pub five: f64,
    #[serde(rename = "15m")]
    pub fifteen: f64,
}

/// Cache sizes in KB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuCache {
    pub l1: u64,
    pub l2: u64,
    pub l3: u64,
}
