use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "ble-central".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

/// Scan session defaults handed to the GAP engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Scan interval in 0.625 ms units.
    #[serde(default = "default_scan_interval")]
    pub interval: u16,
    /// Scan window in 0.625 ms units; must not exceed the interval.
    #[serde(default = "default_scan_window")]
    pub window: u16,
    #[serde(default = "default_false")]
    pub allow_duplicates: bool,
    /// Service UUIDs of interest for discovery filtering; empty accepts all.
    #[serde(default)]
    pub service_uuids: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval: default_scan_interval(),
            window: default_scan_window(),
            allow_duplicates: false,
            service_uuids: Vec::new(),
        }
    }
}

fn default_scan_interval() -> u16 {
    0x0010
}
fn default_scan_window() -> u16 {
    0x0010
}

/// Link parameter defaults for outgoing connection attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Minimum connection interval, units of 1.25 ms.
    #[serde(default = "default_min_interval")]
    pub min_interval: u16,
    /// Maximum connection interval, units of 1.25 ms.
    #[serde(default = "default_max_interval")]
    pub max_interval: u16,
    /// Peripheral latency, in connection events.
    #[serde(default = "default_latency")]
    pub latency: u16,
    /// Supervision timeout, units of 10 ms.
    #[serde(default = "default_supervision_timeout")]
    pub supervision_timeout: u16,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            min_interval: default_min_interval(),
            max_interval: default_max_interval(),
            latency: default_latency(),
            supervision_timeout: default_supervision_timeout(),
        }
    }
}

fn default_min_interval() -> u16 {
    0x0006
}
fn default_max_interval() -> u16 {
    0x000c
}
fn default_latency() -> u16 {
    0x0000
}
fn default_supervision_timeout() -> u16 {
    0x00c8
}

impl From<&ConnectionSettings> for super::models::ConnectionParameters {
    fn from(settings: &ConnectionSettings) -> Self {
        Self {
            min_interval: Some(settings.min_interval),
            max_interval: Some(settings.max_interval),
            latency: Some(settings.latency),
            supervision_timeout: Some(settings.supervision_timeout),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub connection: ConnectionSettings,

    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Builds a service backed by an explicit file path, for embeddings that
    /// manage their own config layout.
    pub fn with_path(settings_path: PathBuf) -> Self {
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();
        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("ble-central");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn path(&self) -> &PathBuf {
        &self.settings_path
    }
}
