// Power, thermals, OS identity, foreground activity and HUD self-usage

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PowerStats {
    pub has_battery: bool,
    pub is_charging: bool,
    pub ac_connected: bool,
    pub percent: f64,
    /// Minutes remaining; -1 when unknown.
    pub time_remaining: i64,
    /// Estimated whole-system draw in watts.
    pub system_power: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thermals {
    pub motherboard: f64,
    pub fans: Vec<u32>,
    pub acpi_zones: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemActivity {
    pub active_window: String,
    pub audio_volume: u8,
    pub brightness: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OsInfo {
    pub platform: String,
    pub distro: String,
    pub release: String,
    pub kernel: String,
    pub arch: String,
    pub hostname: String,
    pub uuid: String,
}

/// Resource usage of the HUD process tree itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudStats {
    /// Working set in MB.
    pub memory: u64,
    /// CPU percent summed over the process and its children.
    pub cpu: u64,
}
