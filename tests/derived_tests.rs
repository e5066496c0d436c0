// Derived metric tests: load history, ledger, health, throttling, topology, GPU enrichment

use chrono::NaiveDate;
use hudcore::derived::*;
use hudcore::models::raw::{RawCpuCache, RawFsIo, RawGpuController, RawGraphics, RawProcessUsage};
use hudcore::models::*;

const GIB: u64 = 1024 * 1024 * 1024;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn load_history_is_bounded_fifo() {
    let mut history = LoadHistory::new();
    for i in 0..(LOAD_HISTORY_CAPACITY + 25) {
        history.push(i as f64);
        assert!(history.len() <= LOAD_HISTORY_CAPACITY);
    }
    assert_eq!(history.len(), LOAD_HISTORY_CAPACITY);
    // The 25 oldest samples were evicted first.
    assert_eq!(history.samples().next(), Some(25.0));
    assert_eq!(history.samples().last(), Some((LOAD_HISTORY_CAPACITY + 24) as f64));
}

#[test]
fn load_averages_use_available_samples() {
    let mut history = LoadHistory::new();
    history.push(10.0);
    history.push(20.0);
    let avg = history.push(30.0);
    assert_eq!(avg.one, 20.0);
    assert_eq!(avg.five, 20.0);
    assert_eq!(avg.fifteen, 20.0);
}

#[test]
fn load_averages_empty_history_is_zero() {
    let avg = LoadHistory::new().averages();
    assert_eq!((avg.one, avg.five, avg.fifteen), (0.0, 0.0, 0.0));
}

#[test]
fn load_averages_windows_are_trailing() {
    let mut history = LoadHistory::new();
    for _ in 0..540 {
        history.push(0.0);
    }
    let mut avg = LoadAverages::default();
    for _ in 0..60 {
        avg = history.push(100.0);
    }
    assert_eq!(avg.one, 100.0);
    assert_eq!(avg.five, 20.0);
    assert_eq!(avg.fifteen, 10.0);
}

#[test]
fn load_averages_round_to_one_decimal() {
    let mut history = LoadHistory::new();
    history.push(10.0);
    history.push(10.0);
    let avg = history.push(11.0);
    assert_eq!(avg.one, 10.3);
}

#[test]
fn ledger_first_observation_only_seeds() {
    let mut ledger = NetworkLedger::new(NetworkUsage::default());
    assert!(!ledger.has_baseline());
    assert_eq!(ledger.observe(5_000_000_000, 9_000_000, date(2026, 3, 4)), None);
    assert!(ledger.has_baseline());
    assert_eq!(ledger.usage().daily.rx, 0);
    assert_eq!(ledger.usage().monthly.tx, 0);
}

#[test]
fn ledger_accumulates_deltas_into_day_and_month() {
    let mut ledger = NetworkLedger::new(NetworkUsage::default());
    let today = date(2026, 3, 4);
    ledger.observe(1000, 500, today);
    let delta = ledger.observe(1500, 700, today);
    assert_eq!(delta, Some(UsageDelta { rx: 500, tx: 200 }));
    let usage = ledger.usage();
    assert_eq!((usage.daily.rx, usage.daily.tx), (500, 200));
    assert_eq!((usage.monthly.rx, usage.monthly.tx), (500, 200));
    assert_eq!(usage.daily.date, day_key(today));
    assert_eq!(usage.monthly.month, 2);
}

#[test]
fn ledger_rolls_over_day_then_month() {
    let restored = NetworkUsage {
        daily: DailyUsage {
            rx: 10,
            tx: 10,
            date: day_key(date(2026, 3, 31)),
        },
        monthly: MonthlyUsage {
            rx: 100,
            tx: 100,
            month: 2,
        },
    };
    let mut ledger = NetworkLedger::new(restored);
    ledger.observe(0, 0, date(2026, 3, 31));
    ledger.observe(5, 5, date(2026, 3, 31));
    assert_eq!(ledger.usage().daily.rx, 15);
    assert_eq!(ledger.usage().monthly.rx, 105);

    ledger.observe(8, 9, date(2026, 4, 1));
    let usage = ledger.usage();
    assert_eq!((usage.daily.rx, usage.daily.tx), (3, 4));
    assert_eq!((usage.monthly.rx, usage.monthly.tx), (3, 4));
    assert_eq!(usage.monthly.month, 3);
}

#[test]
fn ledger_ignores_counter_reset() {
    let mut ledger = NetworkLedger::new(NetworkUsage::default());
    let today = date(2026, 5, 1);
    ledger.observe(1000, 1000, today);
    assert_eq!(ledger.observe(10, 10, today), Some(UsageDelta { rx: 0, tx: 0 }));
    assert_eq!(ledger.observe(60, 20, today), Some(UsageDelta { rx: 50, tx: 10 }));
}

#[test]
fn day_key_matches_persisted_format() {
    assert_eq!(day_key(date(2026, 10, 16)), "Fri Oct 16 2026");
    assert_eq!(month_key(date(2026, 1, 5)), 0);
}

#[test]
fn sum_counters_over_interfaces() {
    assert_eq!(sum_counters(&[]), None);
    let ifaces = vec![
        InterfaceStats {
            rx_bytes: 100,
            tx_bytes: 1,
            ..Default::default()
        },
        InterfaceStats {
            rx_bytes: 50,
            tx_bytes: 2,
            ..Default::default()
        },
    ];
    assert_eq!(sum_counters(&ifaces), Some((150, 3)));
}

#[test]
fn health_score_example() {
    let h = Heuristics::default();
    assert_eq!(health_score(&h, 50.0, 4 * GIB, 8 * GIB), 77);
    assert_eq!(health_score(&h, 0.0, 0, 8 * GIB), 100);
    assert_eq!(health_score(&h, 100.0, 8 * GIB, 8 * GIB), 55);
    // Zero total reads as an empty ratio; 97.5 ties downward.
    assert_eq!(health_score(&h, 10.0, 1, 0), 97);
}

#[test]
fn throttling_hot_or_slow_under_load() {
    let h = Heuristics::default();
    assert!(is_throttling(&h, 91.0, 10.0, 4.0, 4.0));
    assert!(!is_throttling(&h, 90.0, 10.0, 4.0, 4.0));
    assert!(is_throttling(&h, 50.0, 85.0, 3.0, 4.0));
    assert!(!is_throttling(&h, 50.0, 85.0, 3.3, 4.0));
    assert!(!is_throttling(&h, 50.0, 70.0, 1.0, 4.0));
}

#[test]
fn throttling_missing_fields_do_not_trigger() {
    let h = Heuristics::default();
    assert!(!is_throttling(&h, 0.0, 100.0, 0.0, 0.0));
    assert!(!is_throttling(&h, 0.0, 100.0, 1.0, 0.0));
    assert!(!is_throttling(&h, 0.0, 100.0, 0.0, 4.0));
}

#[test]
fn heuristics_thresholds_are_configurable() {
    let h = Heuristics {
        cpu_hot_celsius: 70.0,
        ..Default::default()
    };
    assert!(is_throttling(&h, 75.0, 0.0, 0.0, 0.0));
}

#[test]
fn estimated_power_from_load() {
    let h = Heuristics::default();
    assert_eq!(estimated_power(&h, 0.0), 0);
    assert_eq!(estimated_power(&h, 100.0), 65);
    assert_eq!(estimated_power(&h, 50.0), 33);
    assert_eq!(estimated_power(&h, 20.0), 13);
}

#[test]
fn memory_topology_from_two_dimms() {
    let module = MemoryModule {
        size: 8 * GIB,
        form_factor: "DIMM".into(),
        ..Default::default()
    };
    let topology = infer_memory_topology(&[module.clone(), module]).unwrap();
    assert_eq!(topology.max_capacity_gb, 32);
    assert_eq!(topology.channels, "Dual Channel");
}

#[test]
fn memory_topology_laptop_counts_populated_slots() {
    let layout = vec![
        MemoryModule {
            size: 16 * GIB,
            form_factor: "SODIMM".into(),
            ..Default::default()
        },
        MemoryModule {
            size: 0,
            form_factor: "SODIMM".into(),
            ..Default::default()
        },
    ];
    // SODIMM still carries the DIMM marker.
    let topology = infer_memory_topology(&layout).unwrap();
    assert_eq!(topology.max_capacity_gb, 64);
    assert_eq!(topology.channels, "Single Channel");

    let soldered = vec![MemoryModule {
        size: 8 * GIB,
        form_factor: "Row of chips".into(),
        ..Default::default()
    }];
    assert_eq!(infer_memory_topology(&soldered).unwrap().max_capacity_gb, 16);
    assert_eq!(infer_memory_topology(&[]), None);
}

#[test]
fn channel_labels() {
    assert_eq!(channel_label(1), "Single Channel");
    assert_eq!(channel_label(2), "Dual Channel");
    assert_eq!(channel_label(4), "Quad Channel");
    assert_eq!(channel_label(3), "3 Channels");
    assert_eq!(channel_label(0), "0 Channels");
}

#[test]
fn gpu_enrichment_hot_die() {
    let h = Heuristics::default();
    let raw = RawGraphics {
        controllers: vec![RawGpuController {
            temperature_gpu: Some(85.0),
            ..Default::default()
        }],
    };
    let gpu = enrich_graphics(&h, &raw);
    let c = &gpu.controllers[0];
    assert_eq!(c.temp_hotspot, 95.0);
    assert!(c.throttling);
    assert_eq!(c.fan_rpm, 0);
    assert_eq!(c.clock_core, 0.0);
    assert_eq!(c.power_draw, 0.0);
}

#[test]
fn gpu_enrichment_unknown_die() {
    let h = Heuristics::default();
    let raw = RawGraphics {
        controllers: vec![RawGpuController {
            fan_speed: Some(40.0),
            utilization_gpu: Some(12.0),
            ..Default::default()
        }],
    };
    let c = &enrich_graphics(&h, &raw).controllers[0];
    assert_eq!(c.temp_hotspot, 0.0);
    assert!(!c.throttling);
    assert_eq!(c.fan_rpm, 1200);
    assert_eq!(c.load_3d, 12.0);
}

#[test]
fn hud_stats_in_megabytes() {
    let stats = hud_stats(&RawProcessUsage {
        memory_bytes: 300 * 1024 * 1024 + 600 * 1024,
        cpu_percent: 3.4,
    });
    assert_eq!(stats, HudStats { memory: 301, cpu: 3 });
}

#[test]
fn cache_sizes_in_kilobytes() {
    let cache = cache_kb(&RawCpuCache {
        l1d: Some(49152),
        l1i: Some(32768),
        l2: Some(1310720),
        l3: None,
    });
    assert_eq!(cache, CpuCache { l1: 48, l2: 1280, l3: 0 });
}

#[test]
fn disk_io_rows_follow_filesystems() {
    let fs = vec![
        FsSize {
            fs: "/dev/sda1".into(),
            ..Default::default()
        },
        FsSize {
            fs: "/dev/sdb1".into(),
            ..Default::default()
        },
    ];
    let rates = vec![RawFsIo {
        device: "/dev/sda1".into(),
        rx_sec: Some(10.0 * 1024.0 * 1024.0),
        wx_sec: None,
    }];
    let io = disk_io(&fs, &rates);
    assert_eq!(io.len(), 2);
    assert_eq!((io[0].r_sec, io[0].w_sec), (10, 0));
    assert_eq!((io[1].r_sec, io[1].w_sec), (0, 0));
    assert!(io.iter().all(|d| d.smart.health == 100));
}

#[test]
fn local_ip_skips_internal_and_unaddressed() {
    let ifaces = vec![
        NetworkInterface {
            iface: "lo".into(),
            ip4: "127.0.0.1".into(),
            internal: true,
            ..Default::default()
        },
        NetworkInterface {
            iface: "wg0".into(),
            ..Default::default()
        },
        NetworkInterface {
            iface: "wlan0".into(),
            ip4: "10.0.0.8".into(),
            ..Default::default()
        },
    ];
    assert_eq!(local_ip(&ifaces), "10.0.0.8");
    assert_eq!(local_ip(&ifaces[..2]), "N/A");
}

#[test]
fn wifi_signal_first_with_quality() {
    assert_eq!(wifi_signal(&[]), None);
    let nets = vec![
        WifiNetwork {
            ssid: "a".into(),
            quality: 0,
        },
        WifiNetwork {
            ssid: "b".into(),
            quality: 64,
        },
    ];
    assert_eq!(wifi_signal(&nets), Some(64));
    assert_eq!(wifi_signal(&nets[..1]), Some(0));
}

#[test]
fn system_power_adds_first_gpu_and_overhead() {
    let h = Heuristics::default();
    let gpu = GpuStats {
        controllers: vec![GpuController {
            power_draw: 150.4,
            ..Default::default()
        }],
    };
    assert_eq!(system_power(&h, 40, &gpu), 210);
    assert_eq!(system_power(&h, 40, &GpuStats::default()), 60);
}
