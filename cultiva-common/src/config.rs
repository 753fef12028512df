//! Configuration loading and data folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Resolve the data folder in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_data_folder(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(data_folder) = config.get("data_folder").and_then(|v| v.as_str()) {
                    return PathBuf::from(data_folder);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_data_folder()
}

/// Get default configuration file path for the platform
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/cultiva/config.toml first, then /etc/cultiva/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("cultiva").join("config.toml"));
        let system_config = PathBuf::from("/etc/cultiva/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("cultiva").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default data folder path
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        dirs::data_local_dir()
            .map(|d| d.join("cultiva"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/cultiva"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("cultiva"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/cultiva"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("cultiva"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\cultiva"))
    } else {
        PathBuf::from("./cultiva_data")
    }
}

/// Engine tuning parameters, loaded from the `[engine]` table of the config
/// file. Every field has a compiled default so a missing file or table is
/// not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Freshness window for on-demand analytics recomputation (hours)
    pub analytics_freshness_hours: u64,

    /// Freshness window for scheduler-driven recomputation (hours)
    pub scheduler_freshness_hours: u64,

    /// Historical window loaded for each computation (days)
    pub analytics_window_days: i64,

    /// Cadence of the batch analytics job (hours)
    pub batch_interval_hours: u64,

    /// Concurrent plants per scheduled batch
    pub batch_size: usize,

    /// Recommendation cache time-to-live (minutes)
    pub recommendation_ttl_minutes: u64,

    /// Default confidence threshold for surfaced recommendations
    pub confidence_threshold: f64,

    /// Analytics record retention (days)
    pub retention_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analytics_freshness_hours: 24,
            scheduler_freshness_hours: 6,
            analytics_window_days: 30,
            batch_interval_hours: 6,
            batch_size: 5,
            recommendation_ttl_minutes: 60,
            confidence_threshold: 0.7,
            retention_days: 90,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from the platform config file, falling back
    /// to defaults when the file or the `[engine]` table is absent.
    pub fn load() -> Self {
        let Ok(config_path) = find_config_file() else {
            return Self::default();
        };
        let Ok(toml_content) = std::fs::read_to_string(&config_path) else {
            return Self::default();
        };
        match toml::from_str::<toml::Value>(&toml_content) {
            Ok(value) => value
                .get("engine")
                .cloned()
                .and_then(|t| t.try_into::<EngineConfig>().ok())
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }
}
