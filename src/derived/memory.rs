// Memory topology inference from the module layout

use crate::models::MemoryModule;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTopology {
    pub max_capacity_gb: u64,
    pub channels: String,
}

/// Desktop form factors (any "DIMM" marker) are assumed to have 4 slots, others 2.
/// `None` for an empty layout so the previous values are kept.
pub fn infer_memory_topology(layout: &[MemoryModule]) -> Option<MemoryTopology> {
    let first = layout.first()?;
    let slots: u64 = if first.form_factor.contains("DIMM") { 4 } else { 2 };
    let largest = layout.iter().map(|m| m.size).max().unwrap_or(0);
    let max_capacity_gb = ((largest as f64 * slots as f64) / BYTES_PER_GIB).round() as u64;
    let populated = layout.iter().filter(|m| m.size > 0).count();
    Some(MemoryTopology {
        max_capacity_gb,
        channels: channel_label(populated),
    })
}

pub fn channel_label(populated: usize) -> String {
    match populated {
        1 => "Single Channel".into(),
        2 => "Dual Channel".into(),
        4 => "Quad Channel".into(),
        n => format!("{} Channels", n),
    }
}
