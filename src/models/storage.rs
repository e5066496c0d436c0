// Storage models: filesystem sizes, physical disk layout, per-device I/O

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageStats {
    pub fs: Vec<FsSize>,
    pub layout: Vec<DiskLayout>,
    pub io: Vec<DiskIo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FsSize {
    /// Device name; the key used to match I/O rates.
    pub fs: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub size: u64,
    pub used: u64,
    pub available: u64,
    /// Used space in percent.
    #[serde(rename = "use")]
    pub use_: f64,
    pub mount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskLayout {
    pub device: String,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub vendor: String,
    pub size: u64,
    pub interface_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskIo {
    pub device: String,
    /// Read rate in MB/s.
    pub r_sec: u64,
    /// Write rate in MB/s.
    pub w_sec: u64,
    pub smart: SmartStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartStatus {
    pub health: u8,
}

impl Default for SmartStatus {
    fn default() -> Self {
        Self { health: 100 }
    }
}
