//! Study history logs.
//!
//! One [`GoalHistoryLog`] exists per planned date. Action entries are
//! mutated in place as start/completion/reschedule events arrive; hourly
//! snapshots are append-only. Everything downstream (metrics, patterns,
//! spaced repetition, forecasts, digests) is derived from these logs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::{ActionKind, Domain};
use crate::goal::DailyGoal;

/// Timing record for one action on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: String,
    pub domain: Domain,
    pub kind: ActionKind,
    pub title: String,
    pub topic_title: Option<String>,
    pub difficulty_level: u8,
    pub is_completed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub was_rescheduled: bool,
}

impl ActionLogEntry {
    /// Minutes between start and completion, when both are recorded.
    pub fn duration_minutes(&self) -> Option<i64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_minutes()),
            _ => None,
        }
    }

    /// Whether the action started ahead of its scheduled start.
    pub fn started_early(&self) -> bool {
        matches!(
            (self.started_at, self.scheduled_start),
            (Some(actual), Some(planned)) if actual < planned
        )
    }
}

/// Periodic snapshot of plan-vs-actual deviation within a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySnapshot {
    pub recorded_at: DateTime<Utc>,
    pub total_actions: usize,
    pub completed: usize,
    pub remaining: usize,
    /// Actions started before their scheduled start
    pub started_early: usize,
    /// Actions started after their scheduled start
    pub started_late: usize,
    /// Actions started with no schedule at all
    pub unscheduled_starts: usize,
    /// Actions the user explicitly rescheduled
    pub rescheduled: usize,
}

/// Self-reported mood for a study day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "great")]
    Great,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "okay")]
    Okay,
    #[serde(rename = "tired")]
    Tired,
    #[serde(rename = "stressed")]
    Stressed,
}

/// The full record of a date's actions with timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalHistoryLog {
    pub date: NaiveDate,
    pub actions: Vec<ActionLogEntry>,
    pub hourly_stats: Vec<HourlySnapshot>,
    /// Optional self-reported mood for the day
    pub mood: Option<Mood>,
}

impl GoalHistoryLog {
    /// Seed a log from a freshly generated goal.
    pub fn from_goal(goal: &DailyGoal) -> Self {
        let actions = goal
            .all_actions()
            .map(|a| ActionLogEntry {
                id: a.id.clone(),
                domain: a.domain,
                kind: a.kind,
                title: a.title.clone(),
                topic_title: a.topic_title.clone(),
                difficulty_level: a.difficulty_level,
                is_completed: a.is_completed,
                started_at: None,
                completed_at: None,
                scheduled_start: None,
                scheduled_end: None,
                was_rescheduled: false,
            })
            .collect();
        Self {
            date: goal.date,
            actions,
            hourly_stats: Vec::new(),
            mood: None,
        }
    }

    pub fn find_action(&self, action_id: &str) -> Option<&ActionLogEntry> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    pub fn find_action_mut(&mut self, action_id: &str) -> Option<&mut ActionLogEntry> {
        self.actions.iter_mut().find(|a| a.id == action_id)
    }

    pub fn completed_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_completed).count()
    }

    pub fn has_any_completion(&self) -> bool {
        self.actions.iter().any(|a| a.is_completed)
    }
}

/// Query helpers over a full history slice, ordered or not.
pub trait HistorySlice {
    fn log_for(&self, date: NaiveDate) -> Option<&GoalHistoryLog>;

    /// Dates with at least one completed action.
    fn active_days(&self) -> HashSet<NaiveDate>;

    /// Every id completed anywhere in history.
    fn completed_ids(&self) -> HashSet<String>;
}

impl HistorySlice for [GoalHistoryLog] {
    fn log_for(&self, date: NaiveDate) -> Option<&GoalHistoryLog> {
        self.iter().find(|log| log.date == date)
    }

    fn active_days(&self) -> HashSet<NaiveDate> {
        self.iter()
            .filter(|log| log.has_any_completion())
            .map(|log| log.date)
            .collect()
    }

    fn completed_ids(&self) -> HashSet<String> {
        self.iter()
            .flat_map(|log| log.actions.iter())
            .filter(|a| a.is_completed)
            .map(|a| a.id.clone())
            .collect()
    }
}
