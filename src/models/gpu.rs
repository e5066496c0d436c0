// GPU models (enriched controllers)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpuStats {
    pub controllers: Vec<GpuController>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpuController {
    pub model: String,
    pub vendor: String,
    /// Dedicated memory in MB.
    pub vram: u64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub utilization_gpu: f64,
    pub temperature_gpu: f64,
    pub clock_core: f64,
    pub clock_mem: f64,
    pub power_draw: f64,
    pub power_limit: f64,
    pub temp_hotspot: f64,
    pub fan_rpm: u64,
    pub throttling: bool,
    #[serde(rename = "load3D")]
    pub load_3d: f64,
    pub load_video: f64,
    pub load_compute: f64,
}
