//! TOML-based application configuration.
//!
//! Stores the user-facing engine knobs at
//! `~/.config/studyloop/config.toml`. Missing keys fall back to their
//! defaults, so an empty or partial file is always valid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::config::{UserGoalConfig, BASE_DAILY_LOAD, BASE_REVISION_INTENSITY};
use crate::error::ConfigError;

/// Knobs exposed in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_daily_load")]
    pub preferred_daily_load: usize,
    #[serde(default = "default_revision_intensity")]
    pub revision_intensity: f64,
    #[serde(default = "default_true")]
    pub streak_protection: bool,
    #[serde(default = "default_true")]
    pub forecast_enabled: bool,
    #[serde(default = "default_true")]
    pub allow_auto_adjustment: bool,
}

fn default_daily_load() -> usize {
    BASE_DAILY_LOAD
}

fn default_revision_intensity() -> f64 {
    BASE_REVISION_INTENSITY
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preferred_daily_load: default_daily_load(),
            revision_intensity: default_revision_intensity(),
            streak_protection: true,
            forecast_enabled: true,
            allow_auto_adjustment: true,
        }
    }
}

impl AppConfig {
    /// Load the config file, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = data_dir()?.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Write the config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = data_dir()?.join("config.toml");
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Seed a fresh engine config from these knobs.
    pub fn to_goal_config(&self, now: DateTime<Utc>) -> UserGoalConfig {
        let mut config = UserGoalConfig::new(now);
        config.preferred_daily_load = self.preferred_daily_load;
        config.revision_intensity = self.revision_intensity;
        config.streak_protection = self.streak_protection;
        config.forecast_enabled = self.forecast_enabled;
        config.allow_auto_adjustment = self.allow_auto_adjustment;
        config
    }
}
