// Which metric groups the presentation layer needs, and what each tier fetches.

use std::collections::BTreeSet;

use crate::settings::Tab;

use super::Tier;

/// Collector queries a tier can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    HudUsage,
    Cpu,
    Memory,
    NetworkStats,
    Graphics,
    Temperature,
    FsIo,
    DiskLayout,
    FsSize,
    OsInfo,
    Battery,
    MemoryLayout,
    CpuCache,
    Interfaces,
    Wifi,
    Ping,
    ActiveWindow,
    AudioVolume,
}

/// Domain needs derived from the visible tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeedSet {
    pub cpu: bool,
    pub mem: bool,
    pub net: bool,
    pub gpu: bool,
    pub temps: bool,
    pub io: bool,
    pub battery: bool,
    pub mem_layout: bool,
}

impl NeedSet {
    pub fn from_tabs(tabs: &[Tab]) -> Self {
        let has = |t: Tab| tabs.contains(&t);
        let overview = has(Tab::Overview);
        Self {
            cpu: overview || has(Tab::Cpu),
            mem: overview || has(Tab::Memory),
            net: overview || has(Tab::Network),
            gpu: overview || has(Tab::Gpu),
            temps: overview || has(Tab::Cpu) || has(Tab::Gpu),
            io: overview,
            battery: overview || has(Tab::Power),
            mem_layout: has(Tab::Memory),
        }
    }

    pub fn needs(&self, metric: Metric) -> bool {
        match metric {
            Metric::HudUsage
            | Metric::DiskLayout
            | Metric::FsSize
            | Metric::OsInfo
            | Metric::ActiveWindow
            | Metric::AudioVolume => true,
            Metric::Cpu => self.cpu,
            Metric::Memory => self.mem,
            Metric::NetworkStats | Metric::Interfaces | Metric::Wifi | Metric::Ping => self.net,
            Metric::Graphics => self.gpu,
            Metric::Temperature => self.temps,
            Metric::FsIo => self.io,
            Metric::Battery => self.battery,
            Metric::MemoryLayout | Metric::CpuCache => self.mem_layout,
        }
    }
}

/// Fixed fetch list of one tier for one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    metrics: BTreeSet<Metric>,
}

impl FetchPlan {
    /// Capabilities of `tier` intersected with what is needed.
    pub fn for_tier(tier: Tier, needs: &NeedSet) -> Self {
        Self {
            metrics: tier
                .capabilities()
                .iter()
                .copied()
                .filter(|m| needs.needs(*m))
                .collect(),
        }
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.iter().copied()
    }
}
