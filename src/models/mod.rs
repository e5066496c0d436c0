// Domain models: the aggregate snapshot, its per-domain groups, and raw collector payloads

mod cpu;
mod gpu;
mod memory;
mod network;
pub mod raw;
mod snapshot;
mod storage;
mod system;

pub use cpu::{CpuCache, CpuStats, LoadAverages};
pub use gpu::{GpuController, GpuStats};
pub use memory::{MemoryModule, MemoryStats};
pub use network::{
    DailyUsage, InterfaceStats, MonthlyUsage, NetworkInfo, NetworkInterface, NetworkUsage,
    PingStats, WifiNetwork,
};
pub use snapshot::{Domain, Snapshot};
pub use storage::{DiskIo, DiskLayout, FsSize, SmartStatus, StorageStats};
pub use system::{HudStats, OsInfo, PowerStats, SystemActivity, Thermals};
