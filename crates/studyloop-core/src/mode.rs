//! Operating mode state machine.
//!
//! Maps rolling metrics and recent history into one of five modes, each
//! with deterministic load/revision/difficulty settings derived from the
//! base config. An explicit user mode change is honored for two days
//! before automatic control resumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::config::{UserGoalConfig, BASE_DAILY_LOAD, BASE_REVISION_INTENSITY};
use crate::history::GoalHistoryLog;
use crate::metrics::{recent_completion_ratio, GoalEngineMetrics};

/// Engine-wide operating profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineMode {
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "boost")]
    Boost,
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "lowLoad")]
    LowLoad,
    #[serde(rename = "recovery")]
    Recovery,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineMode::Normal => "normal",
            EngineMode::Boost => "boost",
            EngineMode::Light => "light",
            EngineMode::LowLoad => "lowLoad",
            EngineMode::Recovery => "recovery",
        };
        write!(f, "{name}")
    }
}

/// Derived knob values for a mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSettings {
    pub preferred_daily_load: usize,
    pub revision_intensity: f64,
    pub max_difficulty: u8,
}

impl EngineMode {
    /// Settings derived from the base config for this mode.
    ///
    /// Recovery pins the revision share at 0.5 instead of scaling the
    /// base; lowLoad and recovery restrict the pool to easy items.
    pub fn settings(self) -> ModeSettings {
        let (load_factor, revision) = match self {
            EngineMode::Normal => (1.0, BASE_REVISION_INTENSITY),
            EngineMode::Boost => (1.5, BASE_REVISION_INTENSITY * 0.8),
            EngineMode::Light => (0.7, BASE_REVISION_INTENSITY * 1.2),
            EngineMode::LowLoad => (0.5, BASE_REVISION_INTENSITY * 1.5),
            EngineMode::Recovery => (0.3, 0.5),
        };
        ModeSettings {
            preferred_daily_load: ((BASE_DAILY_LOAD as f64 * load_factor).round() as usize).max(1),
            revision_intensity: revision.min(1.0),
            max_difficulty: match self {
                EngineMode::LowLoad | EngineMode::Recovery => 2,
                _ => 5,
            },
        }
    }
}

/// Decide the operating mode from metrics and recent history.
///
/// Pure function of its inputs: repeated calls with the same arguments
/// return the same mode.
pub fn determine_optimal_mode(
    metrics: &GoalEngineMetrics,
    history: &[GoalHistoryLog],
    config: &UserGoalConfig,
    now: DateTime<Utc>,
) -> EngineMode {
    if config.user_mode_active(now) {
        return config.mode;
    }

    let has_streak = metrics.consistency_streak > 3;
    let poor_completion = metrics.avg_completion_rate < 0.5;
    let good_completion = metrics.avg_completion_rate > 0.8;
    let recent_rate = recent_completion_ratio(history, 3);

    if !has_streak && poor_completion {
        EngineMode::Recovery
    } else if has_streak && recent_rate < 0.4 {
        EngineMode::LowLoad
    } else if has_streak && recent_rate > 0.9 {
        EngineMode::Boost
    } else if has_streak && good_completion {
        EngineMode::Normal
    } else {
        EngineMode::Light
    }
}

/// Apply a mode to the config, rewriting derived knobs and stamping
/// `updated_at`. Returns true when the mode actually changed.
pub fn apply_mode(config: &mut UserGoalConfig, mode: EngineMode, now: DateTime<Utc>) -> bool {
    let settings = mode.settings();
    let changed = config.mode != mode;
    if changed {
        info!(from = %config.mode, to = %mode, "engine mode transition");
    }
    config.mode = mode;
    config.preferred_daily_load = settings.preferred_daily_load;
    config.revision_intensity = settings.revision_intensity;
    config.max_difficulty = settings.max_difficulty;
    config.mode_set_by_user = false;
    config.updated_at = now;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, Domain};
    use crate::history::ActionLogEntry;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn metrics(streak: u32, avg_rate: f64) -> GoalEngineMetrics {
        GoalEngineMetrics {
            consistency_streak: streak,
            avg_completion_rate: avg_rate,
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn recent_history(ratio_per_day: &[(usize, usize)]) -> Vec<GoalHistoryLog> {
        ratio_per_day
            .iter()
            .enumerate()
            .map(|(i, (done, total))| {
                let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() - Duration::days(i as i64);
                let actions = (0..*total)
                    .map(|n| ActionLogEntry {
                        id: format!("{date}-{n}"),
                        domain: Domain::Dsa,
                        kind: ActionKind::Learn,
                        title: String::new(),
                        topic_title: None,
                        difficulty_level: 3,
                        is_completed: n < *done,
                        started_at: None,
                        completed_at: None,
                        scheduled_start: None,
                        scheduled_end: None,
                        was_rescheduled: false,
                    })
                    .collect();
                GoalHistoryLog {
                    date,
                    actions,
                    hourly_stats: Vec::new(),
                    mood: None,
                }
            })
            .collect()
    }

    #[test]
    fn test_no_streak_poor_completion_recovers() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let mode = determine_optimal_mode(&metrics(0, 0.2), &[], &config, now());
        assert_eq!(mode, EngineMode::Recovery);
    }

    #[test]
    fn test_streak_with_weak_recent_days_goes_low_load() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let history = recent_history(&[(0, 4), (1, 4), (1, 4)]);
        let mode = determine_optimal_mode(&metrics(5, 0.6), &history, &config, now());
        assert_eq!(mode, EngineMode::LowLoad);
    }

    #[test]
    fn test_streak_with_perfect_recent_days_boosts() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let history = recent_history(&[(4, 4), (4, 4), (4, 4)]);
        let mode = determine_optimal_mode(&metrics(5, 0.85), &history, &config, now());
        assert_eq!(mode, EngineMode::Boost);
    }

    #[test]
    fn test_streak_with_good_overall_rate_stays_normal() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let history = recent_history(&[(3, 4), (3, 4), (3, 4)]);
        let mode = determine_optimal_mode(&metrics(5, 0.85), &history, &config, now());
        assert_eq!(mode, EngineMode::Normal);
    }

    #[test]
    fn test_middling_signals_default_to_light() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let mode = determine_optimal_mode(&metrics(1, 0.6), &[], &config, now());
        assert_eq!(mode, EngineMode::Light);
    }

    #[test]
    fn test_user_mode_honored_within_two_days() {
        let mut config = UserGoalConfig::new(now() - Duration::days(10));
        config.set_mode_by_user(EngineMode::Boost, now() - Duration::days(1));
        let mode = determine_optimal_mode(&metrics(0, 0.1), &[], &config, now());
        assert_eq!(mode, EngineMode::Boost);
    }

    #[test]
    fn test_mode_decision_is_deterministic() {
        let config = UserGoalConfig::new(now() - Duration::days(10));
        let history = recent_history(&[(2, 4), (2, 4)]);
        let m = metrics(4, 0.7);
        let first = determine_optimal_mode(&m, &history, &config, now());
        let second = determine_optimal_mode(&m, &history, &config, now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_settings_multipliers() {
        assert_eq!(
            EngineMode::Boost.settings(),
            ModeSettings {
                preferred_daily_load: 8,
                revision_intensity: BASE_REVISION_INTENSITY * 0.8,
                max_difficulty: 5
            }
        );
        let recovery = EngineMode::Recovery.settings();
        assert_eq!(recovery.preferred_daily_load, 2);
        assert_eq!(recovery.revision_intensity, 0.5);
        assert_eq!(recovery.max_difficulty, 2);
    }

    #[test]
    fn test_apply_mode_stamps_config() {
        let mut config = UserGoalConfig::new(now() - Duration::days(10));
        assert!(apply_mode(&mut config, EngineMode::LowLoad, now()));
        assert_eq!(config.mode, EngineMode::LowLoad);
        assert_eq!(config.preferred_daily_load, 3);
        assert_eq!(config.max_difficulty, 2);
        assert_eq!(config.updated_at, now());
        assert!(!config.mode_set_by_user);
        assert!(!apply_mode(&mut config, EngineMode::LowLoad, now()));
    }
}
