// Derived metrics: pure transforms over raw collector data and previous state.
// LoadHistory and NetworkLedger are the only stateful pieces; both are owned by
// the snapshot store and mutated under its lock.

mod gpu;
mod ledger;
mod load;
mod memory;

pub use gpu::enrich_graphics;
pub use ledger::{NetworkLedger, UsageDelta, day_key, month_key, sum_counters};
pub use load::{LOAD_HISTORY_CAPACITY, LOAD_WINDOWS, LoadHistory};
pub use memory::{MemoryTopology, channel_label, infer_memory_topology};

use serde::Deserialize;

use crate::models::raw::{RawCpuCache, RawFsIo, RawProcessUsage};
use crate::models::{
    CpuCache, DiskIo, FsSize, GpuStats, HudStats, NetworkInfo, NetworkInterface, SmartStatus,
    WifiNetwork,
};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Heuristic thresholds and weights used by the derived metrics. The defaults
/// are the values the HUD has always shipped with; they have no sensor-backed
/// derivation, so they are exposed as config rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    pub cpu_hot_celsius: f64,
    pub cpu_busy_load_percent: f64,
    pub cpu_slow_speed_ratio: f64,
    pub nominal_cpu_watts: f64,
    pub nominal_cpu_voltage: f64,
    pub gpu_hotspot_offset_celsius: f64,
    pub gpu_throttle_celsius: f64,
    pub gpu_fan_rpm_per_percent: f64,
    pub health_load_divisor: f64,
    pub health_memory_weight: f64,
    pub system_power_overhead_watts: f64,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            cpu_hot_celsius: 90.0,
            cpu_busy_load_percent: 80.0,
            cpu_slow_speed_ratio: 0.8,
            nominal_cpu_watts: 65.0,
            nominal_cpu_voltage: 1.2,
            gpu_hotspot_offset_celsius: 10.0,
            gpu_throttle_celsius: 83.0,
            gpu_fan_rpm_per_percent: 30.0,
            health_load_divisor: 4.0,
            health_memory_weight: 20.0,
            system_power_overhead_watts: 20.0,
        }
    }
}

/// CPU is throttling when it runs hot, or when it is busy but clocked well
/// below its rated maximum. A zero (unknown) temperature or speed never trips it.
pub fn is_throttling(h: &Heuristics, temperature: f64, load: f64, speed: f64, speed_max: f64) -> bool {
    let hot = temperature > h.cpu_hot_celsius;
    let slow = load > h.cpu_busy_load_percent
        && speed > 0.0
        && speed_max > 0.0
        && speed < speed_max * h.cpu_slow_speed_ratio;
    hot || slow
}

/// Package power estimate in watts from load alone (no power sensor assumed).
pub fn estimated_power(h: &Heuristics, load: f64) -> i64 {
    (h.nominal_cpu_watts * (load / 100.0)).round() as i64
}

/// `100 - load/4 - used_ratio*20`, nearest integer with exact halves rounded down.
pub fn health_score(h: &Heuristics, load: f64, mem_active: u64, mem_total: u64) -> i64 {
    let used_ratio = if mem_total == 0 {
        0.0
    } else {
        mem_active as f64 / mem_total as f64
    };
    let score = 100.0 - load / h.health_load_divisor - used_ratio * h.health_memory_weight;
    round_half_down(score) as i64
}

fn round_half_down(x: f64) -> f64 {
    (x - 0.5).ceil()
}

/// HUD self-usage: working set in MB and summed CPU percent.
pub fn hud_stats(usage: &RawProcessUsage) -> HudStats {
    HudStats {
        memory: (usage.memory_bytes as f64 / BYTES_PER_MIB).round() as u64,
        cpu: usage.cpu_percent.max(0.0).round() as u64,
    }
}

/// Cache sizes in KB (L1 reports the data cache).
pub fn cache_kb(cache: &RawCpuCache) -> CpuCache {
    let kb = |v: Option<u64>| (v.unwrap_or(0) as f64 / 1024.0).round() as u64;
    CpuCache {
        l1: kb(cache.l1d),
        l2: kb(cache.l2),
        l3: kb(cache.l3),
    }
}

/// One I/O row per known filesystem, in MB/s. Devices without a rate read as 0.
pub fn disk_io(filesystems: &[FsSize], rates: &[RawFsIo]) -> Vec<DiskIo> {
    filesystems
        .iter()
        .map(|fs| {
            let rate = rates.iter().find(|r| r.device == fs.fs);
            let mb = |v: Option<f64>| (v.unwrap_or(0.0).max(0.0) / BYTES_PER_MIB).round() as u64;
            DiskIo {
                device: fs.fs.clone(),
                r_sec: mb(rate.and_then(|r| r.rx_sec)),
                w_sec: mb(rate.and_then(|r| r.wx_sec)),
                smart: SmartStatus::default(),
            }
        })
        .collect()
}

/// First external interface with an IPv4 address, else "N/A".
pub fn local_ip(interfaces: &[NetworkInterface]) -> String {
    interfaces
        .iter()
        .find(|i| !i.ip4.is_empty() && !i.internal)
        .map(|i| i.ip4.clone())
        .unwrap_or_else(|| NetworkInfo::NOT_AVAILABLE.into())
}

/// Quality of the first network with a signal. `None` when the scan found nothing,
/// so the previous reading is kept.
pub fn wifi_signal(networks: &[WifiNetwork]) -> Option<u8> {
    if networks.is_empty() {
        return None;
    }
    Some(
        networks
            .iter()
            .find(|n| n.quality > 0)
            .map(|n| n.quality)
            .unwrap_or(0),
    )
}

/// CPU estimate + first GPU draw + fixed platform overhead.
pub fn system_power(h: &Heuristics, cpu_power: i64, gpu: &GpuStats) -> i64 {
    let gpu_draw = gpu.controllers.first().map(|c| c.power_draw).unwrap_or(0.0);
    (cpu_power as f64 + gpu_draw + h.system_power_overhead_watts).round() as i64
}
