// Shared test helpers: a scripted collector that counts calls and can be told
// to fail or panic per operation

#![allow(dead_code)]

use async_trait::async_trait;
use hudcore::collector::Collector;
use hudcore::derived::Heuristics;
use hudcore::models::raw::*;
use hudcore::models::*;
use hudcore::publisher::Publisher;
use hudcore::scheduler::SchedulerDeps;
use hudcore::settings::{Preset, RefreshRates, Settings, Tab};
use hudcore::state_repo::StateWrite;
use hudcore::store::SnapshotStore;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Answers every query with fixed data, counting calls per operation.
/// Network counters grow by 500 rx / 200 tx bytes per call.
pub struct FakeCollector {
    calls: Mutex<HashMap<&'static str, usize>>,
    /// Applied to `fetch_current_load` to keep a fast tick in flight.
    pub load_delay: Mutex<Option<Duration>>,
    pub load: Mutex<f64>,
    pub public_ip: Mutex<Option<String>>,
    pub memory_layout: Mutex<Option<Vec<MemoryModule>>>,
    failing: Mutex<HashSet<&'static str>>,
    panicking: Mutex<HashSet<&'static str>>,
}

impl Default for FakeCollector {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            load_delay: Mutex::new(None),
            load: Mutex::new(50.0),
            public_ip: Mutex::new(Some("203.0.113.7".into())),
            memory_layout: Mutex::new(Some(vec![
                MemoryModule {
                    size: 8 * GIB,
                    form_factor: "DIMM".into(),
                    ..Default::default()
                },
                MemoryModule {
                    size: 8 * GIB,
                    form_factor: "DIMM".into(),
                    ..Default::default()
                },
            ])),
            failing: Mutex::new(HashSet::new()),
            panicking: Mutex::new(HashSet::new()),
        }
    }
}

impl FakeCollector {
    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    /// `operation` answers `None` until [`recover`](Self::recover).
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    /// `operation` panics until [`recover`](Self::recover).
    pub fn panic_on(&self, operation: &'static str) {
        self.panicking.lock().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().remove(operation);
        self.panicking.lock().remove(operation);
    }

    /// Counts the call; `None` when the operation is set to fail.
    fn hit(&self, operation: &'static str) -> Option<usize> {
        let n = {
            let mut calls = self.calls.lock();
            let n = calls.entry(operation).or_insert(0);
            *n += 1;
            *n
        };
        if self.panicking.lock().contains(operation) {
            panic!("{operation} exploded");
        }
        if self.failing.lock().contains(operation) {
            return None;
        }
        Some(n)
    }
}

#[async_trait]
impl Collector for FakeCollector {
    async fn fetch_cpu(&self) -> Option<RawCpu> {
        self.hit("cpu")?;
        Some(RawCpu {
            manufacturer: Some("AuthenticAMD".into()),
            brand: Some("Ryzen 7".into()),
            cores: Some(16),
            physical_cores: Some(8),
            speed: Some(3.6),
            speed_max: Some(4.4),
            governor: Some("schedutil".into()),
        })
    }

    async fn fetch_current_load(&self) -> Option<RawLoad> {
        self.hit("current_load")?;
        let delay = *self.load_delay.lock();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        Some(RawLoad {
            current_load: *self.load.lock(),
        })
    }

    async fn fetch_memory(&self) -> Option<RawMemory> {
        self.hit("memory")?;
        Some(RawMemory {
            total: Some(8 * GIB),
            active: Some(4 * GIB),
            available: Some(4 * GIB),
            used: Some(5 * GIB),
            swapused: Some(0),
            swaptotal: Some(2 * GIB),
        })
    }

    async fn fetch_network_stats(&self) -> Option<Vec<InterfaceStats>> {
        let n = self.hit("network_stats")? as u64;
        Some(vec![InterfaceStats {
            iface: "eth0".into(),
            operstate: "up".into(),
            rx_bytes: 1000 + 500 * (n - 1),
            tx_bytes: 500 + 200 * (n - 1),
            rx_sec: 0.0,
            tx_sec: 0.0,
        }])
    }

    async fn fetch_graphics(&self) -> Option<RawGraphics> {
        self.hit("graphics")?;
        Some(RawGraphics {
            controllers: vec![RawGpuController {
                model: Some("RX 7800".into()),
                utilization_gpu: Some(40.0),
                temperature_gpu: Some(85.0),
                power_draw: Some(120.0),
                fan_speed: Some(50.0),
                ..Default::default()
            }],
        })
    }

    async fn fetch_cpu_temperature(&self) -> Option<RawTemperature> {
        self.hit("cpu_temperature")?;
        Some(RawTemperature {
            main: Some(61.0),
            ..Default::default()
        })
    }

    async fn fetch_fs_stats(&self) -> Option<Vec<RawFsIo>> {
        self.hit("fs_stats")?;
        Some(vec![RawFsIo {
            device: "/dev/nvme0n1p2".into(),
            rx_sec: Some(3.0 * 1024.0 * 1024.0),
            wx_sec: Some(1024.0 * 1024.0),
        }])
    }

    async fn fetch_disk_layout(&self) -> Option<Vec<DiskLayout>> {
        self.hit("disk_layout")?;
        Some(vec![DiskLayout {
            device: "/dev/nvme0n1".into(),
            name: "Samsung SSD 980".into(),
            type_: "SSD".into(),
            size: 1000 * GIB,
            ..Default::default()
        }])
    }

    async fn fetch_fs_size(&self) -> Option<Vec<FsSize>> {
        self.hit("fs_size")?;
        Some(vec![FsSize {
            fs: "/dev/nvme0n1p2".into(),
            type_: "ext4".into(),
            size: 100 * GIB,
            used: 42 * GIB,
            available: 58 * GIB,
            use_: 42.0,
            mount: "/".into(),
        }])
    }

    async fn fetch_os_info(&self) -> Option<OsInfo> {
        self.hit("os_info")?;
        Some(OsInfo {
            platform: "linux".into(),
            distro: "Debian".into(),
            hostname: "desk".into(),
            ..Default::default()
        })
    }

    async fn fetch_uuid(&self) -> Option<String> {
        self.hit("uuid")?;
        Some("machine-uuid".into())
    }

    async fn fetch_battery(&self) -> Option<RawBattery> {
        self.hit("battery")?;
        Some(RawBattery {
            has_battery: true,
            is_charging: Some(true),
            ac_connected: Some(true),
            percent: Some(80.0),
            time_remaining: None,
        })
    }

    async fn fetch_cpu_cache(&self) -> Option<RawCpuCache> {
        self.hit("cpu_cache")?;
        Some(RawCpuCache {
            l1d: Some(32 * 1024),
            l1i: Some(32 * 1024),
            l2: Some(512 * 1024),
            l3: Some(32 * 1024 * 1024),
        })
    }

    async fn fetch_network_interfaces(&self) -> Option<Vec<NetworkInterface>> {
        self.hit("network_interfaces")?;
        Some(vec![
            NetworkInterface {
                iface: "lo".into(),
                ip4: "127.0.0.1".into(),
                internal: true,
                ..Default::default()
            },
            NetworkInterface {
                iface: "eth0".into(),
                ip4: "192.168.1.20".into(),
                ..Default::default()
            },
        ])
    }

    async fn fetch_wifi_networks(&self) -> Option<Vec<WifiNetwork>> {
        self.hit("wifi_networks")?;
        Some(vec![WifiNetwork {
            ssid: "home".into(),
            quality: 70,
        }])
    }

    async fn fetch_ping(&self, host: &str) -> Option<f64> {
        self.hit("ping")?;
        match host {
            "unreachable" => None,
            _ => Some(12.4),
        }
    }

    async fn fetch_public_ip(&self) -> Option<String> {
        self.hit("public_ip")?;
        self.public_ip.lock().clone()
    }

    async fn fetch_hud_usage(&self) -> Option<RawProcessUsage> {
        self.hit("hud_usage")?;
        Some(RawProcessUsage {
            memory_bytes: 150 * 1024 * 1024,
            cpu_percent: 1.6,
        })
    }

    async fn fetch_memory_layout(&self) -> Option<Vec<MemoryModule>> {
        self.hit("memory_layout")?;
        self.memory_layout.lock().clone()
    }

    async fn fetch_active_window(&self) -> Option<String> {
        self.hit("active_window")?;
        Some("Terminal".into())
    }

    async fn fetch_audio_volume(&self) -> Option<u8> {
        self.hit("audio_volume")?;
        Some(35)
    }
}

/// fast 1s, medium 2s, slow 5s, network 3s, system 4s.
pub fn test_rates() -> RefreshRates {
    RefreshRates {
        fast: 1000,
        medium: 2000,
        slow: 5000,
        network: 3000,
        system: 4000,
    }
}

pub fn test_settings(tabs: Vec<Tab>) -> Settings {
    Settings {
        performance_preset: Preset::Custom,
        refresh_rates: test_rates(),
        visible_tabs: tabs,
        ..Default::default()
    }
}

pub struct Harness {
    pub collector: Arc<FakeCollector>,
    pub store: Arc<SnapshotStore>,
    pub publisher: Arc<Publisher>,
    pub visible_tx: watch::Sender<bool>,
    pub state_rx: mpsc::Receiver<StateWrite>,
    pub deps: SchedulerDeps,
}

pub fn harness() -> Harness {
    let collector = Arc::new(FakeCollector::default());
    let store = Arc::new(SnapshotStore::new());
    let publisher = Arc::new(Publisher::new(256));
    let (visible_tx, visibility) = watch::channel(true);
    let (state_tx, state_rx) = mpsc::channel(64);
    let deps = SchedulerDeps {
        collector: collector.clone(),
        store: store.clone(),
        publisher: publisher.clone(),
        visibility,
        state_tx: Some(state_tx),
        heuristics: Heuristics::default(),
        ping_hosts: vec!["192.168.1.1".into(), "8.8.8.8".into()],
    };
    Harness {
        collector,
        store,
        publisher,
        visible_tx,
        state_rx,
        deps,
    }
}

/// Lets spawned tasks run without moving the paused clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
