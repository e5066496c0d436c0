// Tier tick bodies: fan out the tier's queries, join, then merge once under
// the store lock and publish.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;

use super::needs::{FetchPlan, Metric};
use super::{SchedulerDeps, Tier};
use crate::derived::{self, Heuristics};
use crate::models::raw::RawBattery;
use crate::models::{Domain, MemoryModule, NetworkInfo, NetworkUsage, PowerStats, Snapshot};
use crate::state_repo::{StateWrite, queue_write};
use crate::store::Trackers;

/// Awaits `fut` only when `enabled`; a skipped query reads as "no data".
async fn when<T>(enabled: bool, fut: impl Future<Output = Option<T>>) -> Option<T> {
    if enabled { fut.await } else { None }
}

pub(super) async fn run(tier: Tier, plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    match tier {
        Tier::Fast => fast(plan, generation, deps).await,
        Tier::Medium => medium(plan, generation, deps).await,
        Tier::Slow => slow(plan, generation, deps).await,
        Tier::Network => network(plan, generation, deps).await,
        Tier::System => system(plan, generation, deps).await,
    }
}

/// Merges under `generation` and publishes the result, or drops it if the run ended.
/// Publishing happens inside the merge so subscribers never see versions go backwards.
fn commit<F>(deps: &SchedulerDeps, tier: &'static str, generation: u64, apply: F) -> bool
where
    F: FnOnce(&mut Snapshot, &mut Trackers),
{
    let publisher = &deps.publisher;
    match deps
        .store
        .merge_then(generation, apply, |snapshot| publisher.publish(snapshot.clone()))
    {
        Ok(snapshot) => {
            tracing::trace!(tier, version = snapshot.version, "Merged tick");
            true
        }
        Err(stale) => {
            tracing::debug!(tier, error = %stale, "Discarding results of ended run");
            false
        }
    }
}

/// Traces the domains a tick asked for but got nothing back from.
fn note_gaps(tier: &'static str, requested: &[(Domain, bool, bool)]) {
    let missing: Vec<&str> = requested
        .iter()
        .filter(|(_, wanted, got)| *wanted && !*got)
        .map(|(domain, _, _)| domain.as_str())
        .collect();
    if !missing.is_empty() {
        tracing::trace!(tier, ?missing, "No data this tick");
    }
}

fn persist_usage(deps: &SchedulerDeps, usage: Option<NetworkUsage>) {
    if let (Some(tx), Some(usage)) = (&deps.state_tx, usage) {
        queue_write(tx, StateWrite::NetworkUsage(usage));
    }
}

async fn fast(plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    let c = &*deps.collector;
    let need_cpu = plan.contains(Metric::Cpu);
    let (hud, cpu, load, mem, net) = tokio::join!(
        when(plan.contains(Metric::HudUsage), c.fetch_hud_usage()),
        when(need_cpu, c.fetch_cpu()),
        when(need_cpu, c.fetch_current_load()),
        when(plan.contains(Metric::Memory), c.fetch_memory()),
        when(plan.contains(Metric::NetworkStats), c.fetch_network_stats()),
    );
    note_gaps(
        "fast",
        &[
            (Domain::HudStats, plan.contains(Metric::HudUsage), hud.is_some()),
            (Domain::Cpu, need_cpu, cpu.is_some() && load.is_some()),
            (Domain::Mem, plan.contains(Metric::Memory), mem.is_some()),
            (Domain::Network, plan.contains(Metric::NetworkStats), net.is_some()),
        ],
    );

    let h = deps.heuristics;
    let today = chrono::Local::now().date_naive();
    let mut usage_changed = None;
    let committed = commit(deps, "fast", generation, |snap, trackers| {
        if let Some(usage) = &hud {
            snap.hud_stats = derived::hud_stats(usage);
        }
        if let (Some(cpu), Some(load)) = (&cpu, &load) {
            snap.cpu.overlay(cpu, load);
            snap.cpu.load_avg = trackers.load_history.push(load.current_load);
            snap.cpu.throttling = derived::is_throttling(
                &h,
                snap.cpu.main,
                load.current_load,
                snap.cpu.speed,
                snap.cpu.speed_max,
            );
            snap.cpu.power = derived::estimated_power(&h, load.current_load);
            snap.cpu.voltage = h.nominal_cpu_voltage;
        }
        if let Some(mem) = &mem {
            snap.mem.overlay(mem);
        }
        if let Some(interfaces) = net {
            if let Some((rx, tx)) = derived::sum_counters(&interfaces)
                && trackers.ledger.observe(rx, tx, today).is_some()
            {
                snap.network_usage = trackers.ledger.usage().clone();
                usage_changed = Some(snap.network_usage.clone());
            }
            snap.network = interfaces;
        }
        if let (Some(load), Some(_)) = (&load, &mem) {
            snap.health = derived::health_score(&h, load.current_load, snap.mem.active, snap.mem.total);
        }
    });
    if committed {
        persist_usage(deps, usage_changed);
    }
}

async fn medium(plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    let c = &*deps.collector;
    let (graphics, temp, fs_io) = tokio::join!(
        when(plan.contains(Metric::Graphics), c.fetch_graphics()),
        when(plan.contains(Metric::Temperature), c.fetch_cpu_temperature()),
        when(plan.contains(Metric::FsIo), c.fetch_fs_stats()),
    );
    note_gaps(
        "medium",
        &[
            (Domain::Gpu, plan.contains(Metric::Graphics), graphics.is_some()),
            (Domain::Thermals, plan.contains(Metric::Temperature), temp.is_some()),
            (Domain::Storage, plan.contains(Metric::FsIo), fs_io.is_some()),
        ],
    );

    let h = deps.heuristics;
    commit(deps, "medium", generation, |snap, _| {
        if let Some(graphics) = &graphics {
            snap.gpu = derived::enrich_graphics(&h, graphics);
        }
        if let Some(temp) = &temp {
            if let Some(main) = temp.main {
                snap.cpu.main = main;
            }
            if let Some(chipset) = temp.chipset {
                snap.thermals.motherboard = chipset;
            }
            if !temp.zones.is_empty() {
                snap.thermals.acpi_zones = temp.zones.clone();
            }
        }
        if let Some(rates) = &fs_io {
            snap.storage.io = derived::disk_io(&snap.storage.fs, rates);
        }
    });
}

async fn slow(plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    let c = &*deps.collector;
    let need_layout = plan.contains(Metric::MemoryLayout);
    let (layout, fs, os, battery, modules, cache) = tokio::join!(
        when(plan.contains(Metric::DiskLayout), c.fetch_disk_layout()),
        when(plan.contains(Metric::FsSize), c.fetch_fs_size()),
        when(plan.contains(Metric::OsInfo), c.fetch_os_info()),
        when(plan.contains(Metric::Battery), c.fetch_battery()),
        when(need_layout, c.fetch_memory_layout()),
        when(plan.contains(Metric::CpuCache), c.fetch_cpu_cache()),
    );

    let h = deps.heuristics;
    commit(deps, "slow", generation, |snap, _| {
        if let Some(layout) = layout {
            snap.storage.layout = layout;
        }
        if let Some(fs) = fs {
            snap.storage.fs = fs;
        }
        if let Some(mut os) = os {
            if os.uuid.is_empty() {
                os.uuid = std::mem::take(&mut snap.os.uuid);
            }
            snap.os = os;
        }
        if let Some(battery) = &battery {
            apply_battery(&h, snap, battery);
        }
        if let Some(modules) = modules {
            apply_memory_layout(snap, modules);
        }
        if let Some(cache) = &cache {
            snap.cpu.cache = derived::cache_kb(cache);
        }
    });
}

async fn network(plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    let c = &*deps.collector;
    let ping_all = async {
        if plan.contains(Metric::Ping) {
            Some(join_all(deps.ping_hosts.iter().map(|host| c.fetch_ping(host))).await)
        } else {
            None
        }
    };
    let (interfaces, wifi, pings) = tokio::join!(
        when(plan.contains(Metric::Interfaces), c.fetch_network_interfaces()),
        when(plan.contains(Metric::Wifi), c.fetch_wifi_networks()),
        ping_all,
    );
    note_gaps(
        "network",
        &[(Domain::NetworkInfo, plan.contains(Metric::Interfaces), interfaces.is_some())],
    );

    commit(deps, "network", generation, |snap, _| {
        if let Some(interfaces) = &interfaces {
            snap.network_info.local_ip = derived::local_ip(interfaces);
        }
        if let Some(signal) = wifi.as_deref().and_then(derived::wifi_signal) {
            snap.network_info.wifi_signal = signal;
        }
        if let Some(pings) = &pings {
            let rtt = |i: usize| pings.get(i).copied().flatten().map_or(0, |ms| ms.round() as u64);
            snap.network_info.ping.gateway = rtt(0);
            snap.network_info.ping.google = rtt(1);
        }
    });
}

async fn system(plan: &FetchPlan, generation: u64, deps: &SchedulerDeps) {
    let c = &*deps.collector;
    let (title, volume) = tokio::join!(
        when(plan.contains(Metric::ActiveWindow), c.fetch_active_window()),
        when(plan.contains(Metric::AudioVolume), c.fetch_audio_volume()),
    );

    commit(deps, "system", generation, |snap, _| {
        if let Some(title) = title {
            snap.system.active_window = if title.is_empty() {
                NetworkInfo::NOT_AVAILABLE.into()
            } else {
                title
            };
        }
        if let Some(volume) = volume {
            snap.system.audio_volume = volume.min(100);
        }
    });
}

/// One-shot fill at the start of a run: static inventory, battery, memory
/// layout and cache, interfaces, then the public IP lookup if no earlier run
/// resolved it.
pub(super) async fn prime(generation: u64, deps: Arc<SchedulerDeps>) {
    let c = &*deps.collector;
    let (layout, fs, battery, os, uuid, modules, cache, interfaces) = tokio::join!(
        c.fetch_disk_layout(),
        c.fetch_fs_size(),
        c.fetch_battery(),
        c.fetch_os_info(),
        c.fetch_uuid(),
        c.fetch_memory_layout(),
        c.fetch_cpu_cache(),
        c.fetch_network_interfaces(),
    );

    let h = deps.heuristics;
    let committed = commit(&deps, "prime", generation, |snap, _| {
        if let Some(layout) = layout {
            snap.storage.layout = layout;
        }
        if let Some(fs) = fs {
            snap.storage.fs = fs;
        }
        if let Some(battery) = &battery {
            apply_battery(&h, snap, battery);
        }
        if let Some(os) = os {
            snap.os = os;
        }
        if let Some(uuid) = uuid {
            snap.os.uuid = uuid;
        }
        if let Some(modules) = modules {
            apply_memory_layout(snap, modules);
        }
        if let Some(cache) = &cache {
            snap.cpu.cache = derived::cache_kb(cache);
        }
        if let Some(interfaces) = &interfaces {
            snap.network_info.local_ip = derived::local_ip(interfaces);
        }
    });
    if !committed {
        return;
    }
    // Resolved once per process; later runs only retry after a failed lookup.
    let known = deps.store.read().network_info.public_ip.clone();
    if known != NetworkInfo::PUBLIC_IP_PENDING && known != NetworkInfo::PUBLIC_IP_UNAVAILABLE {
        tracing::debug!(public_ip = %known, "Public IP already known; skipping lookup");
        return;
    }

    let public_ip = c
        .fetch_public_ip()
        .await
        .unwrap_or_else(|| NetworkInfo::PUBLIC_IP_UNAVAILABLE.into());
    commit(&deps, "prime", generation, |snap, _| {
        snap.network_info.public_ip = public_ip;
    });
}

/// Overlays battery state and recomputes whole-system power from the latest
/// CPU estimate and first GPU.
fn apply_battery(h: &Heuristics, snap: &mut Snapshot, battery: &RawBattery) {
    let system_power = derived::system_power(h, snap.cpu.power, &snap.gpu);
    let prev = std::mem::take(&mut snap.power);
    snap.power = PowerStats {
        has_battery: battery.has_battery,
        is_charging: battery.is_charging.unwrap_or(prev.is_charging),
        ac_connected: battery.ac_connected.unwrap_or(prev.ac_connected),
        percent: battery.percent.unwrap_or(prev.percent),
        time_remaining: battery.time_remaining.unwrap_or(-1),
        system_power,
    };
}

/// Stores the module list and, when it is non-empty, the inferred topology.
fn apply_memory_layout(snap: &mut Snapshot, modules: Vec<MemoryModule>) {
    if let Some(topology) = derived::infer_memory_topology(&modules) {
        snap.mem.max_capacity = topology.max_capacity_gb;
        snap.mem.channels = topology.channels;
    }
    snap.mem.layout = modules;
}
