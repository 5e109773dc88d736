//! User-tunable engine knobs.
//!
//! A single [`UserGoalConfig`] instance lives in the engine state. The
//! mode controller rewrites the derived knobs when the operating mode
//! changes; the user can also set the mode directly, which is honored for
//! two days before automatic control resumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mode::EngineMode;

/// Base daily load before mode multipliers.
pub const BASE_DAILY_LOAD: usize = 5;

/// Base share of a day given to revision before mode multipliers.
pub const BASE_REVISION_INTENSITY: f64 = 0.4;

/// Tunable knobs for the goal engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGoalConfig {
    pub mode: EngineMode,
    /// Allow the mode controller and restructure engine to adjust plans
    pub allow_auto_adjustment: bool,
    pub forecast_enabled: bool,
    /// Share of each day's load given to revision (0.0-1.0)
    pub revision_intensity: f64,
    /// Target number of actions per day
    pub preferred_daily_load: usize,
    /// Keep streaks alive by planning at least one action per day
    pub streak_protection: bool,
    /// Highest difficulty the generator may pick (1-5)
    pub max_difficulty: u8,
    pub updated_at: DateTime<Utc>,
    /// True when the current mode was set by the user rather than the
    /// controller; governs the two-day honor window
    pub mode_set_by_user: bool,
}

impl UserGoalConfig {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            mode: EngineMode::Normal,
            allow_auto_adjustment: true,
            forecast_enabled: true,
            revision_intensity: BASE_REVISION_INTENSITY,
            preferred_daily_load: BASE_DAILY_LOAD,
            streak_protection: true,
            max_difficulty: 5,
            updated_at: now,
            mode_set_by_user: false,
        }
    }

    /// Whether a user-set mode is still inside its honor window.
    pub fn user_mode_active(&self, now: DateTime<Utc>) -> bool {
        self.mode_set_by_user && (now - self.updated_at).num_days() < 2
    }

    /// Record an explicit user mode change.
    pub fn set_mode_by_user(&mut self, mode: EngineMode, now: DateTime<Utc>) {
        self.mode = mode;
        self.mode_set_by_user = true;
        self.updated_at = now;
    }

    /// Validate knob ranges before accepting external input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.revision_intensity) {
            return Err(ValidationError::OutOfRange {
                field: "revision_intensity",
                value: self.revision_intensity,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.preferred_daily_load > 20 {
            return Err(ValidationError::OutOfRange {
                field: "preferred_daily_load",
                value: self.preferred_daily_load as f64,
                min: 0.0,
                max: 20.0,
            });
        }
        if !(1..=5).contains(&self.max_difficulty) {
            return Err(ValidationError::OutOfRange {
                field: "max_difficulty",
                value: self.max_difficulty as f64,
                min: 1.0,
                max: 5.0,
            });
        }
        Ok(())
    }
}
