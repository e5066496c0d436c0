// Linux-specific helpers: /proc and /sys readers for data sysinfo does not expose,
// plus a few desktop tools (dmidecode, xprop, wpctl/pactl) queried by shelling out.
// Every reader returns None (or empty) off Linux, when the file is missing or
// when the tool is absent or fails.

use crate::models::{MemoryModule, WifiNetwork};
use crate::models::raw::{RawBattery, RawCpuCache, RawGpuController};

/// First "model name" from /proc/cpuinfo. Preferred over sysinfo, which can report "cpu0".
pub(super) fn read_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// Rated maximum clock of cpu0 in GHz (cpufreq reports kHz).
pub(super) fn read_cpu_max_freq_ghz() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let khz = read_trimmed("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")?
            .parse::<u64>()
            .ok()
            .filter(|v| *v > 0)?;
        return Some(khz as f64 / 1_000_000.0);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

pub(super) fn read_cpu_governor() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        return read_trimmed("/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor");
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Cache sizes of cpu0 from /sys/devices/system/cpu/cpu0/cache/index*.
pub(super) fn read_cpu_cache() -> Option<RawCpuCache> {
    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir("/sys/devices/system/cpu/cpu0/cache").ok()?;
        let mut cache = RawCpuCache::default();
        let mut found = false;
        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("index"))
            {
                continue;
            }
            let read = |name: &str| read_trimmed(&dir.join(name).to_string_lossy());
            let (Some(level), Some(kind), Some(size)) = (read("level"), read("type"), read("size"))
            else {
                continue;
            };
            let Some(bytes) = parse_cache_size(&size) else {
                continue;
            };
            found = true;
            match (level.as_str(), kind.as_str()) {
                ("1", "Data") => cache.l1d = Some(bytes),
                ("1", "Instruction") => cache.l1i = Some(bytes),
                ("2", _) => cache.l2 = Some(bytes),
                ("3", _) => cache.l3 = Some(bytes),
                _ => {}
            }
        }
        return found.then_some(cache);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// First battery under /sys/class/power_supply. `has_battery = false` when there is none.
pub(super) fn read_battery() -> Option<RawBattery> {
    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir("/sys/class/power_supply").ok()?;
        let mut battery = RawBattery::default();
        let mut ac_online = None;
        for entry in entries.flatten() {
            let dir = entry.path();
            let read = |name: &str| read_trimmed(&dir.join(name).to_string_lossy());
            match read("type").as_deref() {
                Some("Battery") if !battery.has_battery => {
                    battery.has_battery = true;
                    battery.percent = read("capacity").and_then(|v| v.parse().ok());
                    battery.is_charging = read("status").map(|s| s == "Charging");
                }
                Some("Mains") => {
                    ac_online = read("online").map(|v| v == "1");
                }
                _ => {}
            }
        }
        battery.ac_connected = ac_online;
        battery.time_remaining = Some(-1);
        return Some(battery);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

pub(super) fn read_machine_id() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        return read_trimmed("/etc/machine-id").filter(|s| !s.is_empty());
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Interface operstate ("up", "down", ...), or "unknown".
pub(super) fn read_operstate(interface_name: &str) -> String {
    #[cfg(target_os = "linux")]
    {
        if let Some(state) = read_trimmed(&format!("/sys/class/net/{}/operstate", interface_name))
        {
            return state;
        }
    }
    let _ = interface_name;
    "unknown".into()
}

/// Vendor and model of a block device (e.g. "sda", "nvme0n1").
pub(super) fn read_block_identity(device: &str) -> (Option<String>, Option<String>) {
    #[cfg(target_os = "linux")]
    {
        let base = block_base_name(device);
        let vendor = read_trimmed(&format!("/sys/block/{}/device/vendor", base));
        let model = read_trimmed(&format!("/sys/block/{}/device/model", base));
        return (vendor, model);
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = device;
        (None, None)
    }
}

/// Default route gateway from /proc/net/route.
pub(super) fn default_gateway() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/net/route").ok()?;
        return parse_route_gateway(&content);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Associated wireless links from /proc/net/wireless.
pub(super) fn read_wireless() -> Vec<WifiNetwork> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = std::fs::read_to_string("/proc/net/wireless") {
            return parse_wireless(&content);
        }
    }
    vec![]
}

/// DRM cards that expose utilization (amdgpu, i915 with busy_percent).
pub(super) fn read_drm_gpus() -> Vec<RawGpuController> {
    #[cfg(target_os = "linux")]
    {
        let Ok(entries) = std::fs::read_dir("/sys/class/drm") else {
            return vec![];
        };
        let mut out = Vec::new();
        let mut cards: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .is_some_and(|n| n.starts_with("card") && !n.contains('-'))
            })
            .collect();
        cards.sort();
        for card in cards {
            let dev = card.join("device");
            let read = |name: &str| read_trimmed(&dev.join(name).to_string_lossy());
            let Some(busy) = read("gpu_busy_percent").and_then(|v| v.parse::<f64>().ok()) else {
                continue;
            };
            let hwmon = first_hwmon(&dev);
            let hw = |name: &str| {
                hwmon
                    .as_ref()
                    .and_then(|h| read_trimmed(&h.join(name).to_string_lossy()))
                    .and_then(|v| v.parse::<f64>().ok())
            };
            let bytes_to_mb = |v: u64| v / (1024 * 1024);
            out.push(RawGpuController {
                model: read("product_name"),
                vendor: read("vendor").map(|v| pci_vendor_name(&v)),
                vram: read("mem_info_vram_total")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(bytes_to_mb),
                memory_used: read("mem_info_vram_used")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(bytes_to_mb),
                memory_total: read("mem_info_vram_total")
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(bytes_to_mb),
                utilization_gpu: Some(busy),
                // millidegrees
                temperature_gpu: hw("temp1_input").map(|v| v / 1000.0),
                clock_core: None,
                clock_mem: None,
                // microwatts
                power_draw: hw("power1_average").map(|v| v / 1_000_000.0),
                power_limit: hw("power1_cap").map(|v| v / 1_000_000.0),
                fan_speed: hw("pwm1").map(|v| v / 255.0 * 100.0),
            });
        }
        return out;
    }
    #[cfg(not(target_os = "linux"))]
    vec![]
}

/// DIMM slots from `dmidecode -t 17`. Usually needs root; `None` otherwise.
pub(super) fn read_memory_layout() -> Option<Vec<MemoryModule>> {
    #[cfg(target_os = "linux")]
    {
        let output = run_tool("dmidecode", &["-t", "17"])?;
        let modules = parse_dmidecode_memory(&output);
        return (!modules.is_empty()).then_some(modules);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Title of the focused X11 window via xprop; empty when nothing has focus.
pub(super) fn read_active_window() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let root = run_tool("xprop", &["-root", "_NET_ACTIVE_WINDOW"])?;
        let Some(id) = parse_active_window_id(&root) else {
            return Some(String::new());
        };
        let props = run_tool("xprop", &["-id", &id, "_NET_WM_NAME", "WM_NAME"])?;
        return Some(parse_window_title(&props).unwrap_or_default());
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Default sink volume, 0-100. PipeWire first, then PulseAudio.
pub(super) fn read_audio_volume() -> Option<u8> {
    #[cfg(target_os = "linux")]
    {
        if let Some(volume) = run_tool("wpctl", &["get-volume", "@DEFAULT_AUDIO_SINK@"])
            .as_deref()
            .and_then(parse_wpctl_volume)
        {
            return Some(volume);
        }
        return run_tool("pactl", &["get-sink-volume", "@DEFAULT_SINK@"])
            .as_deref()
            .and_then(parse_pactl_volume);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[cfg(target_os = "linux")]
fn first_hwmon(dev: &std::path::Path) -> Option<std::path::PathBuf> {
    let mut dirs: Vec<_> = std::fs::read_dir(dev.join("hwmon"))
        .ok()?
        .flatten()
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs.into_iter().next()
}

#[cfg(target_os = "linux")]
fn read_trimmed(path: &str) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Stdout of a successful run; `None` if the tool is missing or exits non-zero.
#[cfg(target_os = "linux")]
fn run_tool(program: &str, args: &[&str]) -> Option<String> {
    let output = std::process::Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        tracing::trace!(program, status = %output.status, "Tool exited with failure");
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn pci_vendor_name(id: &str) -> String {
    match id {
        "0x1002" => "AMD".into(),
        "0x10de" => "NVIDIA".into(),
        "0x8086" => "Intel".into(),
        other => other.to_string(),
    }
}

/// "32K" / "1024K" / "8M" -> bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_cache_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let (digits, mult) = match s.chars().last()? {
        'K' => (&s[..s.len() - 1], 1024),
        'M' => (&s[..s.len() - 1], 1024 * 1024),
        _ => (s, 1),
    };
    digits.parse::<u64>().ok().map(|v| v * mult)
}

/// Strips a partition suffix: "sda1" -> "sda", "nvme0n1p2" -> "nvme0n1", "/dev/sda1" -> "sda".
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn block_base_name(device: &str) -> String {
    let name = device.rsplit('/').next().unwrap_or(device);
    if (name.starts_with("nvme") || name.starts_with("mmcblk"))
        && let Some(idx) = name.rfind('p')
        && idx > 0
        && name[idx + 1..].chars().all(|c| c.is_ascii_digit())
        && !name[idx + 1..].is_empty()
    {
        return name[..idx].to_string();
    }
    if name.starts_with("nvme") || name.starts_with("mmcblk") {
        return name.to_string();
    }
    name.trim_end_matches(|c: char| c.is_ascii_digit()).to_string()
}

/// Gateway of the default (destination 00000000) route; the field is little-endian hex.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_route_gateway(content: &str) -> Option<String> {
    content.lines().skip(1).find_map(|line| {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < 3 || cols[1] != "00000000" {
            return None;
        }
        let raw = u32::from_str_radix(cols[2], 16).ok()?;
        if raw == 0 {
            return None;
        }
        Some(std::net::Ipv4Addr::from(raw.to_le_bytes()).to_string())
    })
}

/// /proc/net/wireless rows: "wlan0: 0000   54.  -56.  -256 ...". Link quality is out of 70.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_wireless(content: &str) -> Vec<WifiNetwork> {
    content
        .lines()
        .skip(2)
        .filter_map(|line| {
            let (iface, rest) = line.split_once(':')?;
            let link = rest
                .split_whitespace()
                .nth(1)?
                .trim_end_matches('.')
                .parse::<f64>()
                .ok()?;
            Some(WifiNetwork {
                ssid: iface.trim().to_string(),
                quality: (link / 70.0 * 100.0).round().clamp(0.0, 100.0) as u8,
            })
        })
        .collect()
}

/// "Memory Device" records of `dmidecode -t 17`. Empty slots are kept with size 0.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_dmidecode_memory(output: &str) -> Vec<MemoryModule> {
    let mut modules = Vec::new();
    let mut current: Option<MemoryModule> = None;
    let mut configured_speed = None;
    for line in output.lines() {
        if line.trim() == "Memory Device" {
            if let Some(module) = current.take() {
                modules.push(module);
            }
            current = Some(MemoryModule::default());
            configured_speed = None;
            continue;
        }
        let Some(module) = current.as_mut() else {
            continue;
        };
        if line.trim().is_empty() {
            modules.push(std::mem::take(module));
            current = None;
            continue;
        }
        let Some((key, value)) = line.trim().split_once(": ") else {
            continue;
        };
        let value = value.trim();
        match key {
            "Size" => module.size = parse_dmi_size(value),
            "Form Factor" => module.form_factor = value.to_string(),
            "Type" => module.type_ = value.to_string(),
            "Speed" if module.clock_speed == 0 => module.clock_speed = leading_number(value),
            "Configured Memory Speed" | "Configured Clock Speed" => {
                configured_speed = Some(leading_number(value))
            }
            "Manufacturer" => module.manufacturer = value.to_string(),
            "Bank Locator" => module.bank = value.to_string(),
            _ => {}
        }
        if let Some(speed) = configured_speed.filter(|s| *s > 0) {
            module.clock_speed = speed;
        }
    }
    if let Some(module) = current {
        modules.push(module);
    }
    modules
}

/// "16 GB", "8192 MB", "No Module Installed" -> bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_dmi_size(value: &str) -> u64 {
    let mut parts = value.split_whitespace();
    let (Some(n), Some(unit)) = (parts.next(), parts.next()) else {
        return 0;
    };
    let Ok(n) = n.parse::<u64>() else {
        return 0;
    };
    match unit {
        "kB" | "KB" => n * 1024,
        "MB" => n * 1024 * 1024,
        "GB" => n * 1024 * 1024 * 1024,
        "TB" => n * 1024 * 1024 * 1024 * 1024,
        _ => 0,
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn leading_number(value: &str) -> u32 {
    value
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// "_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00007". A zero id means no focus.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_active_window_id(output: &str) -> Option<String> {
    let id = output.split('#').nth(1)?.split([',', '\n']).next()?.trim();
    let hex = id.strip_prefix("0x")?;
    match u64::from_str_radix(hex, 16) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(id.to_string()),
    }
}

/// First quoted value among `_NET_WM_NAME(UTF8_STRING) = "..."` / `WM_NAME(STRING) = "..."`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_window_title(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (_, value) = line.split_once(" = ")?;
        let quoted = value.trim().strip_prefix('"')?.strip_suffix('"')?;
        Some(quoted.replace("\\\"", "\"").replace("\\\\", "\\"))
    })
}

/// "Volume: 0.35" or "Volume: 0.35 [MUTED]" -> 35.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_wpctl_volume(output: &str) -> Option<u8> {
    let level = output
        .trim()
        .strip_prefix("Volume:")?
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()?;
    Some((level * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// First channel percentage of `pactl get-sink-volume`:
/// "Volume: front-left: 22938 /  35% / -27.36 dB,   front-right: ...".
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_pactl_volume(output: &str) -> Option<u8> {
    let percent = output
        .split_whitespace()
        .find_map(|token| token.strip_suffix('%'))?
        .parse::<f64>()
        .ok()?;
    Some(percent.round().clamp(0.0, 100.0) as u8)
}
