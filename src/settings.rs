// User settings: performance preset, per-tier refresh rates and visible tabs.
// Settings are replaced wholesale; `apply` produces a new value from a partial update.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("refreshRates.{tier} must be > 0")]
    ZeroRate { tier: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Low,
    #[default]
    Medium,
    High,
    Realtime,
    /// Rates edited by hand.
    Custom,
}

impl Preset {
    /// Rate-set for a named preset; `None` for `Custom`.
    pub fn rates(self) -> Option<RefreshRates> {
        let (fast, medium, slow, network, system) = match self {
            Preset::Low => (5000, 10000, 20000, 60000, 15000),
            Preset::Medium => (2000, 4000, 12000, 45000, 10000),
            Preset::High => (1000, 2000, 8000, 30000, 5000),
            Preset::Realtime => (500, 1000, 5000, 15000, 2000),
            Preset::Custom => return None,
        };
        Some(RefreshRates {
            fast,
            medium,
            slow,
            network,
            system,
        })
    }
}

/// Per-tier periods in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshRates {
    pub fast: u64,
    pub medium: u64,
    pub slow: u64,
    pub network: u64,
    pub system: u64,
}

impl Default for RefreshRates {
    fn default() -> Self {
        Preset::Medium.rates().unwrap_or(Self {
            fast: 2000,
            medium: 4000,
            slow: 12000,
            network: 45000,
            system: 10000,
        })
    }
}

impl RefreshRates {
    pub const TIERS: [&'static str; 5] = ["fast", "medium", "slow", "network", "system"];

    pub fn get(&self, tier: &str) -> Option<u64> {
        match tier {
            "fast" => Some(self.fast),
            "medium" => Some(self.medium),
            "slow" => Some(self.slow),
            "network" => Some(self.network),
            "system" => Some(self.system),
            _ => None,
        }
    }

    fn slot(&mut self, tier: &str) -> Option<&mut u64> {
        match tier {
            "fast" => Some(&mut self.fast),
            "medium" => Some(&mut self.medium),
            "slow" => Some(&mut self.slow),
            "network" => Some(&mut self.network),
            "system" => Some(&mut self.system),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for tier in Self::TIERS {
            if self.get(tier) == Some(0) {
                return Err(SettingsError::ZeroRate { tier });
            }
        }
        Ok(())
    }
}

/// Presentation tabs. Unknown tags from newer frontends are kept as `Unknown`
/// and never drive any fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Overview,
    Cpu,
    Gpu,
    Memory,
    Network,
    Power,
    Changelog,
    About,
    #[serde(other)]
    Unknown,
}

/// Tabs shown when `showAllTabs` is on.
pub const ALL_DATA_TABS: [Tab; 6] = [
    Tab::Overview,
    Tab::Cpu,
    Tab::Gpu,
    Tab::Memory,
    Tab::Network,
    Tab::Power,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub performance_preset: Preset,
    pub refresh_rates: RefreshRates,
    pub visible_tabs: Vec<Tab>,
    pub show_all_tabs: bool,
    pub startup_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            performance_preset: Preset::Medium,
            refresh_rates: RefreshRates::default(),
            visible_tabs: vec![
                Tab::Overview,
                Tab::Memory,
                Tab::Network,
                Tab::Changelog,
                Tab::About,
            ],
            show_all_tabs: false,
            startup_enabled: true,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub performance_preset: Option<Preset>,
    /// Loosely typed so malformed entries can be coerced instead of failing the request.
    pub refresh_rates: Option<serde_json::Map<String, Value>>,
    pub visible_tabs: Option<Vec<Tab>>,
    pub show_all_tabs: Option<bool>,
    pub startup_enabled: Option<bool>,
}

impl Settings {
    /// Rates the scheduler runs with. Stored rates win; a corrupt stored set
    /// falls back to the preset, then to the medium preset.
    pub fn effective_rates(&self) -> RefreshRates {
        if self.refresh_rates.validate().is_ok() {
            return self.refresh_rates;
        }
        self.performance_preset.rates().unwrap_or_default()
    }

    pub fn effective_tabs(&self) -> Vec<Tab> {
        if self.show_all_tabs {
            ALL_DATA_TABS.to_vec()
        } else {
            self.visible_tabs.clone()
        }
    }

    /// Merges `update` over these settings. Hand-edited rates switch the preset to
    /// `Custom`; a named preset replaces the whole rate-set. Non-numeric or negative
    /// rates keep the previous value, a zero rate is rejected.
    pub fn apply(&self, update: SettingsUpdate) -> Result<Settings, SettingsError> {
        let mut next = self.clone();

        if let Some(rates) = update.refresh_rates {
            let mut edited = false;
            for tier in RefreshRates::TIERS {
                let Some(raw) = rates.get(tier) else {
                    continue;
                };
                let Some(slot) = next.refresh_rates.slot(tier) else {
                    continue;
                };
                match coerce_rate(raw) {
                    Some(0) => return Err(SettingsError::ZeroRate { tier }),
                    Some(ms) => {
                        edited |= *slot != ms;
                        *slot = ms;
                    }
                    None => {
                        tracing::warn!(tier, value = %raw, "Ignoring invalid refresh rate");
                    }
                }
            }
            if edited {
                next.performance_preset = Preset::Custom;
            }
        }

        if let Some(preset) = update.performance_preset {
            next.performance_preset = preset;
            if let Some(rates) = preset.rates() {
                next.refresh_rates = rates;
            }
        }
        if let Some(tabs) = update.visible_tabs {
            next.visible_tabs = tabs;
        }
        if let Some(show_all) = update.show_all_tabs {
            next.show_all_tabs = show_all;
        }
        if let Some(startup) = update.startup_enabled {
            next.startup_enabled = startup;
        }

        next.refresh_rates.validate()?;
        Ok(next)
    }
}

/// Whole milliseconds from a JSON number or numeric string. `None` for anything
/// negative, non-finite or non-numeric.
fn coerce_rate(value: &Value) -> Option<u64> {
    let ms = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some(ms.round() as u64)
}
