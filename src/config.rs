use serde::Deserialize;

use crate::derived::Heuristics;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub publishing: PublishingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Thresholds for throttling, power and health estimates.
    #[serde(default)]
    pub heuristics: Heuristics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding settings and the network usage ledger.
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of events kept in the broadcast channel for /ws/stats (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// First entry is reported as the gateway ping, second as the public ping.
    pub ping_hosts: Vec<String>,
    pub ping_timeout_ms: u64,
    /// Timeout for outbound HTTP (public IP, update check).
    pub http_timeout_ms: u64,
    pub public_ip_url: String,
    pub update_check_url: String,
    pub update_check_delay_secs: u64,
    /// Whether the presentation target starts shown.
    pub start_visible: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            ping_hosts: vec!["192.168.1.1".into(), "8.8.8.8".into()],
            ping_timeout_ms: 2000,
            http_timeout_ms: 5000,
            public_ip_url: "https://api.ipify.org?format=json".into(),
            update_check_url: String::new(),
            update_check_delay_secs: 10,
            start_visible: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.ping_timeout_ms > 0,
            "monitoring.ping_timeout_ms must be > 0, got {}",
            self.monitoring.ping_timeout_ms
        );
        anyhow::ensure!(
            self.monitoring.http_timeout_ms > 0,
            "monitoring.http_timeout_ms must be > 0, got {}",
            self.monitoring.http_timeout_ms
        );
        anyhow::ensure!(
            self.monitoring.update_check_delay_secs > 0,
            "monitoring.update_check_delay_secs must be > 0, got {}",
            self.monitoring.update_check_delay_secs
        );
        anyhow::ensure!(
            self.monitoring.ping_hosts.iter().all(|h| !h.trim().is_empty()),
            "monitoring.ping_hosts must not contain empty hosts"
        );
        anyhow::ensure!(
            self.heuristics.health_load_divisor > 0.0,
            "heuristics.health_load_divisor must be > 0, got {}",
            self.heuristics.health_load_divisor
        );
        Ok(())
    }
}
