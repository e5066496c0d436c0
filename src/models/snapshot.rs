// The aggregate snapshot pushed to subscribers

use serde::{Deserialize, Serialize};

use super::{
    CpuStats, GpuStats, HudStats, InterfaceStats, MemoryStats, NetworkInfo, NetworkUsage, OsInfo,
    PowerStats, StorageStats, SystemActivity, Thermals,
};

/// Latest known value of every metric. Every field has a default, so a fresh
/// snapshot is renderable before any fetch completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Bumped on every applied merge.
    pub version: u64,
    /// Scheduler run that produced the last merge.
    pub generation: u64,
    /// Unix ms of the last merge.
    pub timestamp: u64,
    pub cpu: CpuStats,
    pub mem: MemoryStats,
    pub gpu: GpuStats,
    pub storage: StorageStats,
    pub network: Vec<InterfaceStats>,
    pub network_info: NetworkInfo,
    pub network_usage: NetworkUsage,
    pub power: PowerStats,
    pub thermals: Thermals,
    pub system: SystemActivity,
    pub os: OsInfo,
    pub health: i64,
    pub hud_stats: HudStats,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: 0,
            generation: 0,
            timestamp: 0,
            cpu: CpuStats::default(),
            mem: MemoryStats::default(),
            gpu: GpuStats::default(),
            storage: StorageStats::default(),
            network: vec![],
            network_info: NetworkInfo::default(),
            network_usage: NetworkUsage::default(),
            power: PowerStats::default(),
            thermals: Thermals::default(),
            system: SystemActivity::default(),
            os: OsInfo::default(),
            health: 100,
            hud_stats: HudStats::default(),
        }
    }
}

/// Metric domain tags, used when logging which part of a tick produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Domain {
    Cpu,
    Mem,
    Gpu,
    Storage,
    Network,
    NetworkInfo,
    NetworkUsage,
    Power,
    Thermals,
    System,
    Os,
    Health,
    HudStats,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Cpu => "cpu",
            Domain::Mem => "mem",
            Domain::Gpu => "gpu",
            Domain::Storage => "storage",
            Domain::Network => "network",
            Domain::NetworkInfo => "networkInfo",
            Domain::NetworkUsage => "networkUsage",
            Domain::Power => "power",
            Domain::Thermals => "thermals",
            Domain::System => "system",
            Domain::Os => "os",
            Domain::Health => "health",
            Domain::HudStats => "hudStats",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
