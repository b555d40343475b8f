use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional collaborators are active.
///
/// Every field defaults to `false` so that a missing or incomplete config
/// file disables all optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Emit notification events to the configured sink.
    #[serde(default)]
    pub notifications: bool,
    /// Allow documents to be sent to the e-signature provider.
    #[serde(default)]
    pub e_signature: bool,
}

/// Office-level tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfficeSettings {
    /// Directory holding the `<collection>.json` snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Open deadlines with this many days or fewer remaining are urgent.
    #[serde(default = "default_urgent_threshold_days")]
    pub urgent_threshold_days: i64,
    /// Upper bound on a single e-signature request.
    #[serde(default = "default_signature_timeout_secs")]
    pub signature_timeout_secs: u64,
    /// Delay used by the simulated signature provider.
    #[serde(default = "default_signature_delay_ms")]
    pub signature_delay_ms: u64,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_urgent_threshold_days() -> i64 {
    3
}

fn default_signature_timeout_secs() -> u64 {
    30
}

fn default_signature_delay_ms() -> u64 {
    1500
}

impl Default for OfficeSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            urgent_threshold_days: default_urgent_threshold_days(),
            signature_timeout_secs: default_signature_timeout_secs(),
            signature_delay_ms: default_signature_delay_ms(),
        }
    }
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub office: OfficeSettings,
}
