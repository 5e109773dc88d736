//! Persistence layer.
//!
//! Two files under the app's config directory: a TOML file for the
//! user-facing knobs and a SQLite database holding the whole engine state
//! as one versioned JSON blob under a single namespaced key.

mod config;
mod state;

pub use config::AppConfig;
pub use state::{StateStore, STATE_KEY, STATE_VERSION};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/studyloop[-dev]/` based on STUDYLOOP_ENV.
///
/// Set STUDYLOOP_ENV=dev to use a separate development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYLOOP_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studyloop-dev")
    } else {
        base_dir.join("studyloop")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
