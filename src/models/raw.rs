// Raw collector payloads. Optional fields are "not reported this call"; the
// snapshot keeps its previous value for them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCpu {
    pub manufacturer: Option<String>,
    pub brand: Option<String>,
    pub cores: Option<u32>,
    pub physical_cores: Option<u32>,
    /// GHz.
    pub speed: Option<f64>,
    /// GHz.
    pub speed_max: Option<f64>,
    pub governor: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLoad {
    /// Instantaneous load, 0-100.
    pub current_load: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMemory {
    pub total: Option<u64>,
    pub active: Option<u64>,
    pub available: Option<u64>,
    pub used: Option<u64>,
    pub swapused: Option<u64>,
    pub swaptotal: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraphics {
    pub controllers: Vec<RawGpuController>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGpuController {
    pub model: Option<String>,
    pub vendor: Option<String>,
    pub vram: Option<u64>,
    pub memory_used: Option<u64>,
    pub memory_total: Option<u64>,
    pub utilization_gpu: Option<f64>,
    pub temperature_gpu: Option<f64>,
    pub clock_core: Option<f64>,
    pub clock_mem: Option<f64>,
    pub power_draw: Option<f64>,
    pub power_limit: Option<f64>,
    /// Fan duty in percent.
    pub fan_speed: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTemperature {
    /// Package / die temperature.
    pub main: Option<f64>,
    pub cores: Vec<f64>,
    pub chipset: Option<f64>,
    /// ACPI / thermal zone readings.
    pub zones: Vec<f64>,
}

/// Filesystem throughput in bytes per second for one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFsIo {
    pub device: String,
    pub rx_sec: Option<f64>,
    pub wx_sec: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBattery {
    pub has_battery: bool,
    pub is_charging: Option<bool>,
    pub ac_connected: Option<bool>,
    pub percent: Option<f64>,
    pub time_remaining: Option<i64>,
}

/// Cache sizes in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCpuCache {
    pub l1d: Option<u64>,
    pub l1i: Option<u64>,
    pub l2: Option<u64>,
    pub l3: Option<u64>,
}

/// Resource usage summed across the HUD process and its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProcessUsage {
    pub memory_bytes: u64,
    pub cpu_percent: f64,
}
