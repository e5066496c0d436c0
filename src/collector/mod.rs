// Collector boundary: one best-effort async query per metric group.
// Implementations never fail past this trait; `None` means "no update this tick".

mod linux;
mod net;
mod sysinfo_collector;

pub use sysinfo_collector::{SysinfoCollector, SysinfoCollectorConfig};
pub use net::{fetch_public_ip, tcp_ping};

use async_trait::async_trait;

use crate::models::raw::{
    RawBattery, RawCpu, RawCpuCache, RawFsIo, RawGraphics, RawLoad, RawMemory, RawProcessUsage,
    RawTemperature,
};
use crate::models::{
    DiskLayout, FsSize, InterfaceStats, MemoryModule, NetworkInterface, OsInfo, WifiNetwork,
};

#[async_trait]
pub trait Collector: Send + Sync {
    async fn fetch_cpu(&self) -> Option<RawCpu>;
    async fn fetch_current_load(&self) -> Option<RawLoad>;
    async fn fetch_memory(&self) -> Option<RawMemory>;
    /// Cumulative counters and rates for every interface.
    async fn fetch_network_stats(&self) -> Option<Vec<InterfaceStats>>;
    async fn fetch_graphics(&self) -> Option<RawGraphics>;
    async fn fetch_cpu_temperature(&self) -> Option<RawTemperature>;
    async fn fetch_fs_stats(&self) -> Option<Vec<RawFsIo>>;
    async fn fetch_disk_layout(&self) -> Option<Vec<DiskLayout>>;
    async fn fetch_fs_size(&self) -> Option<Vec<FsSize>>;
    async fn fetch_os_info(&self) -> Option<OsInfo>;
    async fn fetch_uuid(&self) -> Option<String>;
    async fn fetch_battery(&self) -> Option<RawBattery>;
    async fn fetch_cpu_cache(&self) -> Option<RawCpuCache>;
    async fn fetch_network_interfaces(&self) -> Option<Vec<NetworkInterface>>;
    async fn fetch_wifi_networks(&self) -> Option<Vec<WifiNetwork>>;
    /// Round-trip time in ms; `None` when the host did not answer in time.
    async fn fetch_ping(&self, host: &str) -> Option<f64>;
    async fn fetch_public_ip(&self) -> Option<String>;
    /// Usage of this process and its children.
    async fn fetch_hud_usage(&self) -> Option<RawProcessUsage>;

    /// Slot-level DIMM data usually needs elevated firmware access.
    async fn fetch_memory_layout(&self) -> Option<Vec<MemoryModule>> {
        None
    }

    /// Foreground window title; empty when no window has focus.
    async fn fetch_active_window(&self) -> Option<String> {
        None
    }

    /// Master output volume, 0-100.
    async fn fetch_audio_volume(&self) -> Option<u8> {
        None
    }
}

/// Folds an internal failure into "no data", logging it.
pub(crate) fn best_effort<T>(operation: &'static str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, operation, "collector query failed");
            None
        }
    }
}
