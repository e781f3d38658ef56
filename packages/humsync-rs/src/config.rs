use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_EVENT_DURATION_MS: i64 = 5000;
pub const DEFAULT_MIN_DURATION_MS: i64 = 2 * DEFAULT_EVENT_DURATION_MS;
pub const DEFAULT_ALPHA: f64 = 0.98;
/// Calibration constant matching the devices' gravity sensor, not 9.81
pub const DEFAULT_GRAVITY: f64 = 13.25;

const CONFIG_DIR_NAME: &str = "humsync";
const CONFIG_FILE_NAME: &str = "config.json";

/// Settings shared by every pipeline stage. Built once and passed down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width D of one event window
    pub event_duration_ms: i64,
    /// Streams shorter than this are not segmented
    pub min_duration_ms: i64,
    /// Complementary filter coefficient
    pub alpha: f64,
    /// Gravity calibration constant G
    pub gravity: f64,
    /// Case-insensitive allow-list of activity folder names; `None` means all
    pub activities: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            event_duration_ms: DEFAULT_EVENT_DURATION_MS,
            min_duration_ms: DEFAULT_MIN_DURATION_MS,
            alpha: DEFAULT_ALPHA,
            gravity: DEFAULT_GRAVITY,
            activities: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Explicit file if given, else the per-user file if it exists, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_duration_ms <= 0 {
            return Err(SyncError::InvalidConfig(format!(
                "event_duration_ms must be positive, got {}",
                self.event_duration_ms
            )));
        }
        if self.min_duration_ms < 0 {
            return Err(SyncError::InvalidConfig(format!(
                "min_duration_ms must not be negative, got {}",
                self.min_duration_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(SyncError::InvalidConfig(format!(
                "alpha must be within [0, 1], got {}",
                self.alpha
            )));
        }
        if !self.gravity.is_finite() {
            return Err(SyncError::InvalidConfig(format!(
                "gravity must be finite, got {}",
                self.gravity
            )));
        }
        Ok(())
    }

    /// Whether an activity folder passes the allow-list.
    pub fn accepts_activity(&self, activity: &str) -> bool {
        match &self.activities {
            None => true,
            Some(list) => list.iter().any(|a| a.eq_ignore_ascii_case(activity)),
        }
    }
}

/// `<config dir>/humsync/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
