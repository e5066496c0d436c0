// Host collector backed by sysinfo, with /proc and /sys fallbacks on Linux.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sysinfo::{Components, DiskKind, Disks, Networks, ProcessesToUpdate, System};
use tracing::instrument;

use super::{Collector, best_effort, linux, net};
use crate::models::raw::{
    RawBattery, RawCpu, RawCpuCache, RawFsIo, RawGraphics, RawLoad, RawMemory, RawProcessUsage,
    RawTemperature,
};
use crate::models::{
    DiskLayout, FsSize, InterfaceStats, MemoryModule, NetworkInterface, OsInfo, WifiNetwork,
};

#[derive(Debug, Clone)]
pub struct SysinfoCollectorConfig {
    pub public_ip_url: String,
    pub http_timeout: Duration,
    pub ping_timeout: Duration,
}

type Counters = HashMap<String, (u64, u64)>;

pub struct SysinfoCollector {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    // Separate list so size refreshes do not shorten the I/O sampling window.
    disk_io: Arc<Mutex<(Disks, Instant)>>,
    networks: Arc<Mutex<Networks>>,
    components: Arc<Mutex<Components>>,
    last_network: Arc<Mutex<Option<(Counters, Instant)>>>,
    last_cpu_refresh: Arc<Mutex<Option<(Instant, f64)>>>,
    http: reqwest::Client,
    config: SysinfoCollectorConfig,
}

impl SysinfoCollector {
    pub fn new(config: SysinfoCollectorConfig) -> anyhow::Result<Self> {
        let mut sys = System::new_all();
        sys.refresh_all();
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            disk_io: Arc::new(Mutex::new((Disks::new_with_refreshed_list(), Instant::now()))),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            components: Arc::new(Mutex::new(Components::new_with_refreshed_list())),
            last_network: Arc::new(Mutex::new(None)),
            last_cpu_refresh: Arc::new(Mutex::new(None)),
            http,
            config,
        })
    }
}

fn lock<T>(m: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))
}

/// Runs a sysinfo query on the blocking pool and folds any failure into `None`.
async fn blocking<T, F>(operation: &'static str, f: F) -> Option<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))
        .and_then(|r| r);
    best_effort(operation, result)
}

/// Like [`blocking`] for readers whose absence is normal (missing desktop tool,
/// no root); logs at debug instead of warning every tick.
async fn optional<T, F>(operation: &'static str, f: F) -> Option<T>
where
    F: FnOnce() -> Option<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Some(v)) => Some(v),
        Ok(None) => {
            tracing::debug!(operation, "No data from host tool");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, operation, "collector query failed");
            None
        }
    }
}

fn usage_percent(used: u64, total: u64) -> f64 {
    if total > 0 {
        (used as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[async_trait]
impl Collector for SysinfoCollector {
    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_cpu"))]
    async fn fetch_cpu(&self) -> Option<RawCpu> {
        let sys = self.sys.clone();
        blocking("fetch_cpu", move || {
            let mut sys = lock(&sys)?;
            sys.refresh_cpu_frequency();
            let cpus = sys.cpus();
            let speed_mhz = cpus.iter().map(|c| c.frequency()).max().unwrap_or(0);
            let brand = linux::read_cpu_model().or_else(|| {
                cpus.first()
                    .map(|c| c.brand().trim().to_string())
                    .filter(|s| !s.is_empty())
            });
            Ok(RawCpu {
                manufacturer: cpus
                    .first()
                    .map(|c| c.vendor_id().to_string())
                    .filter(|s| !s.is_empty()),
                brand,
                cores: Some(cpus.len() as u32),
                physical_cores: System::physical_core_count().map(|n| n as u32),
                speed: (speed_mhz > 0).then(|| speed_mhz as f64 / 1000.0),
                speed_max: linux::read_cpu_max_freq_ghz(),
                governor: linux::read_cpu_governor(),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_current_load"))]
    async fn fetch_current_load(&self) -> Option<RawLoad> {
        let sys = self.sys.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        blocking("fetch_current_load", move || {
            let mut sys = lock(&sys)?;
            let mut last = lock(&last_cpu_refresh)?;
            let now = Instant::now();
            let usage = match *last {
                Some((prev_ts, prev_usage))
                    if now.duration_since(prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
                {
                    // Too soon for a meaningful delta; reuse the last reading.
                    prev_usage
                }
                Some(_) => {
                    sys.refresh_cpu_usage();
                    sys.global_cpu_usage() as f64
                }
                None => {
                    // First call establishes the baseline.
                    sys.refresh_cpu_usage();
                    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
                    sys.refresh_cpu_usage();
                    sys.global_cpu_usage() as f64
                }
            };
            *last = Some((now, usage));
            Ok(RawLoad {
                current_load: usage.clamp(0.0, 100.0),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_memory"))]
    async fn fetch_memory(&self) -> Option<RawMemory> {
        let sys = self.sys.clone();
        blocking("fetch_memory", move || {
            let mut sys = lock(&sys)?;
            sys.refresh_memory();
            let total = sys.total_memory();
            let available = sys.available_memory();
            let active = total.saturating_sub(available);
            Ok(RawMemory {
                total: (total > 0).then_some(total),
                active: Some(active),
                available: Some(available),
                used: Some(sys.used_memory()),
                swapused: Some(sys.used_swap()),
                swaptotal: Some(sys.total_swap()),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_network_stats"))]
    async fn fetch_network_stats(&self) -> Option<Vec<InterfaceStats>> {
        let networks = self.networks.clone();
        let last_network = self.last_network.clone();
        blocking("fetch_network_stats", move || {
            let mut networks = lock(&networks)?;
            networks.refresh(true);
            let mut stats: Vec<InterfaceStats> = networks
                .list()
                .iter()
                .map(|(name, data)| InterfaceStats {
                    iface: name.clone(),
                    operstate: linux::read_operstate(name),
                    rx_bytes: data.total_received(),
                    tx_bytes: data.total_transmitted(),
                    rx_sec: 0.0,
                    tx_sec: 0.0,
                })
                .collect();
            stats.sort_by(|a, b| a.iface.cmp(&b.iface));

            let now = Instant::now();
            let mut last = lock(&last_network)?;
            if let Some((prev, prev_ts)) = last.as_ref() {
                let dt_secs = now.duration_since(*prev_ts).as_secs_f64();
                if dt_secs > 0.0 {
                    for iface in &mut stats {
                        if let Some((prx, ptx)) = prev.get(&iface.iface) {
                            iface.rx_sec = iface.rx_bytes.saturating_sub(*prx) as f64 / dt_secs;
                            iface.tx_sec = iface.tx_bytes.saturating_sub(*ptx) as f64 / dt_secs;
                        }
                    }
                }
            }
            *last = Some((
                stats
                    .iter()
                    .map(|i| (i.iface.clone(), (i.rx_bytes, i.tx_bytes)))
                    .collect(),
                now,
            ));
            Ok(stats)
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_graphics"))]
    async fn fetch_graphics(&self) -> Option<RawGraphics> {
        blocking("fetch_graphics", || {
            Ok(RawGraphics {
                controllers: linux::read_drm_gpus(),
            })
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_cpu_temperature"))]
    async fn fetch_cpu_temperature(&self) -> Option<RawTemperature> {
        let components = self.components.clone();
        blocking("fetch_cpu_temperature", move || {
            let mut components = lock(&components)?;
            components.refresh(false);
            let mut temp = RawTemperature::default();
            let mut package = None;
            for c in components.list() {
                let Some(t) = c.temperature().map(f64::from) else {
                    continue;
                };
                let label = c.label().to_lowercase();
                if label.contains("package") || label.contains("tctl") || label.contains("tdie") {
                    package = Some(package.map_or(t, |p: f64| p.max(t)));
                } else if label.contains("core") {
                    temp.cores.push(t);
                } else if label.contains("acpitz") {
                    temp.zones.push(t);
                } else if label.contains("pch") || label.contains("chipset") {
                    temp.chipset = Some(t);
                }
            }
            temp.main = package.or_else(|| temp.cores.iter().copied().reduce(f64::max));
            if temp.main.is_none() && temp.zones.is_empty() && temp.chipset.is_none() {
                anyhow::bail!("no temperature sensors");
            }
            Ok(temp)
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_fs_stats"))]
    async fn fetch_fs_stats(&self) -> Option<Vec<RawFsIo>> {
        let disk_io = self.disk_io.clone();
        blocking("fetch_fs_stats", move || {
            let mut guard = lock(&disk_io)?;
            let (disks, last_ts) = &mut *guard;
            disks.refresh(false);
            let now = Instant::now();
            let dt_secs = now.duration_since(*last_ts).as_secs_f64();
            *last_ts = now;
            let rates = disks
                .list()
                .iter()
                .map(|d| {
                    let usage = d.usage();
                    let per_sec = |bytes: u64| (dt_secs > 0.0).then(|| bytes as f64 / dt_secs);
                    RawFsIo {
                        device: d.name().to_string_lossy().into_owned(),
                        rx_sec: per_sec(usage.read_bytes),
                        wx_sec: per_sec(usage.written_bytes),
                    }
                })
                .collect();
            Ok(rates)
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_disk_layout"))]
    async fn fetch_disk_layout(&self) -> Option<Vec<DiskLayout>> {
        let disks = self.disks.clone();
        blocking("fetch_disk_layout", move || {
            let mut disks = lock(&disks)?;
            disks.refresh(false);
            let mut seen = HashSet::new();
            let layout = disks
                .list()
                .iter()
                .filter(|d| seen.insert(d.name().to_string_lossy().into_owned()))
                .map(|d| {
                    let device = d.name().to_string_lossy().into_owned();
                    let (vendor, model) = linux::read_block_identity(&device);
                    let type_ = match d.kind() {
                        DiskKind::SSD => "SSD",
                        DiskKind::HDD => "HDD",
                        DiskKind::Unknown(_) => "Unknown",
                    };
                    DiskLayout {
                        name: model.unwrap_or_else(|| device.clone()),
                        device,
                        type_: type_.into(),
                        vendor: vendor.unwrap_or_default(),
                        size: d.total_space(),
                        interface_type: String::new(),
                    }
                })
                .collect();
            Ok(layout)
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_fs_size"))]
    async fn fetch_fs_size(&self) -> Option<Vec<FsSize>> {
        let disks = self.disks.clone();
        blocking("fetch_fs_size", move || {
            let mut disks = lock(&disks)?;
            disks.refresh(false);
            let filesystems = disks
                .list()
                .iter()
                .map(|d| {
                    let size = d.total_space();
                    let available = d.available_space();
                    let used = size.saturating_sub(available);
                    FsSize {
                        fs: d.name().to_string_lossy().into_owned(),
                        type_: d.file_system().to_string_lossy().into_owned(),
                        size,
                        used,
                        available,
                        use_: (usage_percent(used, size) * 100.0).round() / 100.0,
                        mount: d.mount_point().to_string_lossy().into_owned(),
                    }
                })
                .collect();
            Ok(filesystems)
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_os_info"))]
    async fn fetch_os_info(&self) -> Option<OsInfo> {
        blocking("fetch_os_info", || {
            Ok(OsInfo {
                platform: std::env::consts::OS.into(),
                distro: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
                release: System::os_version().unwrap_or_default(),
                kernel: System::kernel_version().unwrap_or_default(),
                arch: std::env::consts::ARCH.into(),
                hostname: System::host_name().unwrap_or_default(),
                uuid: String::new(),
            })
        })
        .await
    }

    async fn fetch_uuid(&self) -> Option<String> {
        blocking("fetch_uuid", || {
            linux::read_machine_id().ok_or_else(|| anyhow::anyhow!("machine id unavailable"))
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_battery"))]
    async fn fetch_battery(&self) -> Option<RawBattery> {
        blocking("fetch_battery", || {
            linux::read_battery().ok_or_else(|| anyhow::anyhow!("power supply class unavailable"))
        })
        .await
    }

    async fn fetch_cpu_cache(&self) -> Option<RawCpuCache> {
        blocking("fetch_cpu_cache", || {
            linux::read_cpu_cache().ok_or_else(|| anyhow::anyhow!("cpu cache info unavailable"))
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_network_interfaces"))]
    async fn fetch_network_interfaces(&self) -> Option<Vec<NetworkInterface>> {
        let networks = self.networks.clone();
        blocking("fetch_network_interfaces", move || {
            let mut networks = lock(&networks)?;
            networks.refresh(true);
            let mut interfaces: Vec<NetworkInterface> = networks
                .list()
                .iter()
                .map(|(name, data)| {
                    let v4 = data.ip_networks().iter().find(|n| n.addr.is_ipv4());
                    NetworkInterface {
                        iface: name.clone(),
                        ip4: v4.map(|n| n.addr.to_string()).unwrap_or_default(),
                        mac: data.mac_address().to_string(),
                        internal: name == "lo" || v4.is_some_and(|n| n.addr.is_loopback()),
                    }
                })
                .collect();
            interfaces.sort_by(|a, b| a.iface.cmp(&b.iface));
            Ok(interfaces)
        })
        .await
    }

    async fn fetch_wifi_networks(&self) -> Option<Vec<WifiNetwork>> {
        blocking("fetch_wifi_networks", || Ok(linux::read_wireless())).await
    }

    async fn fetch_ping(&self, host: &str) -> Option<f64> {
        let host = if host == "gateway" {
            linux::default_gateway().unwrap_or_else(|| "192.168.1.1".into())
        } else {
            host.to_string()
        };
        net::tcp_ping(&host, self.config.ping_timeout).await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_public_ip"))]
    async fn fetch_public_ip(&self) -> Option<String> {
        best_effort(
            "fetch_public_ip",
            net::fetch_public_ip(&self.http, &self.config.public_ip_url).await,
        )
    }

    async fn fetch_hud_usage(&self) -> Option<RawProcessUsage> {
        let sys = self.sys.clone();
        blocking("fetch_hud_usage", move || {
            let pid = sysinfo::get_current_pid()
                .map_err(|e| anyhow::anyhow!("current pid: {}", e))?;
            let mut sys = lock(&sys)?;
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let (memory_bytes, cpu_percent) = sys
                .processes()
                .values()
                .filter(|p| p.pid() == pid || p.parent() == Some(pid))
                .fold((0u64, 0f64), |(mem, cpu), p| {
                    (mem + p.memory(), cpu + p.cpu_usage() as f64)
                });
            Ok(RawProcessUsage {
                memory_bytes,
                cpu_percent,
            })
        })
        .await
    }

    #[instrument(skip(self), fields(collector = "sysinfo", operation = "fetch_memory_layout"))]
    async fn fetch_memory_layout(&self) -> Option<Vec<MemoryModule>> {
        optional("fetch_memory_layout", linux::read_memory_layout).await
    }

    async fn fetch_active_window(&self) -> Option<String> {
        optional("fetch_active_window", linux::read_active_window).await
    }

    async fn fetch_audio_volume(&self) -> Option<u8> {
        optional("fetch_audio_volume", linux::read_audio_volume).await
    }
}
