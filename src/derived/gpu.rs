// GPU enrichment: default missing clocks/power, estimate hotspot and fan RPM

use super::Heuristics;
use crate::models::raw::RawGraphics;
use crate::models::{GpuController, GpuStats};

pub fn enrich_graphics(h: &Heuristics, raw: &RawGraphics) -> GpuStats {
    let controllers = raw
        .controllers
        .iter()
        .map(|c| {
            let die = c.temperature_gpu;
            GpuController {
                model: c.model.clone().unwrap_or_default(),
                vendor: c.vendor.clone().unwrap_or_default(),
                vram: c.vram.unwrap_or(0),
                memory_used: c.memory_used.unwrap_or(0),
                memory_total: c.memory_total.unwrap_or(0),
                utilization_gpu: c.utilization_gpu.unwrap_or(0.0),
                temperature_gpu: die.unwrap_or(0.0),
                clock_core: c.clock_core.unwrap_or(0.0),
                clock_mem: c.clock_mem.unwrap_or(0.0),
                power_draw: c.power_draw.unwrap_or(0.0),
                power_limit: c.power_limit.unwrap_or(0.0),
                temp_hotspot: die.map(|t| t + h.gpu_hotspot_offset_celsius).unwrap_or(0.0),
                fan_rpm: c
                    .fan_speed
                    .map(|pct| (pct * h.gpu_fan_rpm_per_percent).round().max(0.0) as u64)
                    .unwrap_or(0),
                throttling: die.unwrap_or(0.0) > h.gpu_throttle_celsius,
                load_3d: c.utilization_gpu.unwrap_or(0.0),
                load_video: 0.0,
                load_compute: 0.0,
            }
        })
        .collect();
    GpuStats { controllers }
}
