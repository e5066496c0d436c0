// Network models: throughput, connectivity info, usage ledger

use serde::{Deserialize, Serialize};

/// Per-interface counters from the fast tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceStats {
    pub iface: String,
    pub operstate: String,
    /// Cumulative bytes received since the interface came up.
    pub rx_bytes: u64,
    /// Cumulative bytes transmitted since the interface came up.
    pub tx_bytes: u64,
    pub rx_sec: f64,
    pub tx_sec: f64,
}

/// Interface enumeration entry (network tier and initial fetch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    pub iface: String,
    pub ip4: String,
    pub mac: String,
    pub internal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WifiNetwork {
    pub ssid: String,
    /// Signal quality 0-100.
    pub quality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInfo {
    #[serde(rename = "publicIP")]
    pub public_ip: String,
    #[serde(rename = "localIP")]
    pub local_ip: String,
    pub ping: PingStats,
    pub wifi_signal: u8,
}

impl NetworkInfo {
    pub const PUBLIC_IP_PENDING: &'static str = "Fetching...";
    pub const PUBLIC_IP_UNAVAILABLE: &'static str = "Unavailable";
    pub const NOT_AVAILABLE: &'static str = "N/A";
}

impl Default for NetworkInfo {
    fn default() -> Self {
        Self {
            public_ip: Self::PUBLIC_IP_PENDING.into(),
            local_ip: String::new(),
            ping: PingStats::default(),
            wifi_signal: 0,
        }
    }
}

/// Round-trip times in ms; 0 when the host did not answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingStats {
    pub gateway: u64,
    pub google: u64,
}

/// Accumulated traffic for the current day and month. Persisted across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkUsage {
    pub daily: DailyUsage,
    pub monthly: MonthlyUsage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyUsage {
    pub rx: u64,
    pub tx: u64,
    /// Period key, e.g. "Fri Oct 16 2026".
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyUsage {
    pub rx: u64,
    pub tx: u64,
    /// Zero-based month index (January = 0).
    pub month: u32,
}
