//! Rolling performance metrics.
//!
//! Recomputed wholesale from history each cycle. The streak walk looks
//! back at most 30 days; today itself never breaks a streak (the user may
//! simply not have studied yet).

use chrono::{Duration, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::history::{GoalHistoryLog, HistorySlice};
use crate::mode::EngineMode;

/// Days the streak walk looks back.
const STREAK_WINDOW_DAYS: i64 = 30;

/// Coarse buckets for preferred study times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "morning")]
    Morning,
    #[serde(rename = "evening")]
    Evening,
    #[serde(rename = "night")]
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        if hour < 12 {
            TimeOfDay::Morning
        } else if hour < 18 {
            TimeOfDay::Evening
        } else {
            TimeOfDay::Night
        }
    }
}

/// Rolling performance snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalEngineMetrics {
    pub total_goals_generated: u64,
    /// Completed / scheduled over all history (0.0-1.0)
    pub avg_completion_rate: f64,
    pub consistency_streak: u32,
    pub max_streak: u32,
    pub current_mode: EngineMode,
    pub skipped_rate: f64,
    /// Fraction of completions that started ahead of schedule
    pub early_completion_rate: f64,
    pub avg_time_per_task_minutes: f64,
    /// Top-2 most frequent start buckets
    pub preferred_times_of_day: Vec<TimeOfDay>,
}

impl Default for GoalEngineMetrics {
    fn default() -> Self {
        Self {
            total_goals_generated: 0,
            avg_completion_rate: 0.0,
            consistency_streak: 0,
            max_streak: 0,
            current_mode: EngineMode::Normal,
            skipped_rate: 0.0,
            early_completion_rate: 0.0,
            avg_time_per_task_minutes: 0.0,
            preferred_times_of_day: Vec::new(),
        }
    }
}

/// Recompute metrics from history.
pub fn compute_metrics(
    history: &[GoalHistoryLog],
    today: NaiveDate,
    total_goals_generated: u64,
    current_mode: EngineMode,
) -> GoalEngineMetrics {
    let (consistency_streak, max_streak) = streaks(history, today);
    let (avg_completion_rate, skipped_rate) = completion_rates(history);

    let completed: Vec<_> = history
        .iter()
        .flat_map(|log| log.actions.iter())
        .filter(|a| a.is_completed)
        .collect();

    let early_completion_rate = if completed.is_empty() {
        0.0
    } else {
        completed.iter().filter(|a| a.started_early()).count() as f64 / completed.len() as f64
    };

    let durations: Vec<i64> = completed.iter().filter_map(|a| a.duration_minutes()).collect();
    let avg_time_per_task_minutes = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<i64>() as f64 / durations.len() as f64
    };

    GoalEngineMetrics {
        total_goals_generated,
        avg_completion_rate,
        consistency_streak,
        max_streak,
        current_mode,
        skipped_rate,
        early_completion_rate,
        avg_time_per_task_minutes,
        preferred_times_of_day: preferred_times(history),
    }
}

/// Current and maximum streak inside the 30-day window.
fn streaks(history: &[GoalHistoryLog], today: NaiveDate) -> (u32, u32) {
    let active = history.active_days();

    let mut current = 0u32;
    for offset in 0..STREAK_WINDOW_DAYS {
        let date = today - Duration::days(offset);
        if active.contains(&date) {
            current += 1;
        } else if offset == 0 {
            // An empty today keeps yesterday's run alive.
            continue;
        } else {
            break;
        }
    }

    let mut max = 0u32;
    let mut run = 0u32;
    for offset in (0..STREAK_WINDOW_DAYS).rev() {
        let date = today - Duration::days(offset);
        if active.contains(&date) {
            run += 1;
            max = max.max(run);
        } else {
            run = 0;
        }
    }

    (current, max.max(current))
}

fn completion_rates(history: &[GoalHistoryLog]) -> (f64, f64) {
    let mut scheduled = 0usize;
    let mut completed = 0usize;
    for log in history {
        scheduled += log.actions.len();
        completed += log.completed_count();
    }
    if scheduled == 0 {
        return (0.0, 0.0);
    }
    let rate = completed as f64 / scheduled as f64;
    (rate, 1.0 - rate)
}

fn preferred_times(history: &[GoalHistoryLog]) -> Vec<TimeOfDay> {
    let mut counts: HashMap<TimeOfDay, usize> = HashMap::new();
    for log in history {
        for action in &log.actions {
            if let Some(started) = action.started_at {
                *counts.entry(TimeOfDay::from_hour(started.hour())).or_default() += 1;
            }
        }
    }
    let mut ranked: Vec<(TimeOfDay, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(2).map(|(bucket, _)| bucket).collect()
}

/// Mean completion ratio over the most recent `days` logged dates.
pub fn recent_completion_ratio(history: &[GoalHistoryLog], days: usize) -> f64 {
    let mut logs: Vec<&GoalHistoryLog> = history.iter().collect();
    logs.sort_by_key(|log| std::cmp::Reverse(log.date));
    logs.truncate(days);
    if logs.is_empty() {
        return 0.0;
    }
    let sum: f64 = logs
        .iter()
        .map(|log| {
            if log.actions.is_empty() {
                0.0
            } else {
                log.completed_count() as f64 / log.actions.len() as f64
            }
        })
        .sum();
    sum / logs.len() as f64
}
