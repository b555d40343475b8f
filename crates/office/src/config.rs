use shared_types::AppConfig;
use std::path::Path;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the working directory.
const CONFIG_PATH: &str = "config.toml";

/// Read and parse a config file. A missing or unparseable file yields the
/// defaults (every feature off).
pub fn read_config(path: impl AsRef<Path>) -> AppConfig {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => {
                tracing::info!(features = ?config.features, "loaded {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("failed to parse {}: {e}; using defaults", path.display());
                AppConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("{} not found ({e}); using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Read `config.toml` and store it in the global `OnceLock`. Safe to call
/// multiple times; only the first call has effect.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| read_config(CONFIG_PATH))
}
