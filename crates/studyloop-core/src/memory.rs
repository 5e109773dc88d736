//! Learned long-term user traits.
//!
//! Traits are recomputed wholesale from history on every refresh; nothing
//! in here is incremental. Thresholds below need a minimum sample count
//! before a trait can flip on, so a single unusual day does not rewrite
//! the user profile.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog::{ActionKind, Domain};
use crate::goal::PlannedAction;
use crate::history::GoalHistoryLog;

/// Minimum observations before a trait may activate.
const MIN_TRAIT_SAMPLES: usize = 3;

/// Behavioral traits mined from history.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UserTraits {
    pub prefers_revision_in_morning: bool,
    pub gives_up_on_hard_tasks: bool,
    pub skips_weekend: bool,
    pub finishes_strong_end_of_week: bool,
}

/// Per-domain observed completion summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningPattern {
    pub domain: Domain,
    pub observed_actions: usize,
    pub completion_rate: f64,
}

/// Learned long-term state, refreshed from history each cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalMemory {
    pub user_traits: UserTraits,
    pub learning_patterns: Vec<LearningPattern>,
    /// Learning actions left incomplete on the most recent elapsed day;
    /// seeds the next generation's carry-over
    pub last_day_uncompleted: Vec<PlannedAction>,
}

/// Recompute traits and learning patterns from history.
///
/// `last_day_uncompleted` is owned by the orchestrator and preserved
/// across refreshes.
pub fn refresh_memory(history: &[GoalHistoryLog], previous: &GoalMemory) -> GoalMemory {
    GoalMemory {
        user_traits: mine_traits(history),
        learning_patterns: mine_learning_patterns(history),
        last_day_uncompleted: previous.last_day_uncompleted.clone(),
    }
}

fn mine_traits(history: &[GoalHistoryLog]) -> UserTraits {
    UserTraits {
        prefers_revision_in_morning: prefers_revision_in_morning(history),
        gives_up_on_hard_tasks: gives_up_on_hard_tasks(history),
        skips_weekend: skips_weekend(history),
        finishes_strong_end_of_week: finishes_strong_end_of_week(history),
    }
}

fn prefers_revision_in_morning(history: &[GoalHistoryLog]) -> bool {
    let starts: Vec<u32> = history
        .iter()
        .flat_map(|log| log.actions.iter())
        .filter(|a| a.kind == ActionKind::Revise && a.is_completed)
        .filter_map(|a| a.started_at.map(|t| t.hour()))
        .collect();
    if starts.len() < MIN_TRAIT_SAMPLES {
        return false;
    }
    let morning = starts.iter().filter(|h| **h < 12).count();
    morning as f64 / starts.len() as f64 > 0.5
}

fn gives_up_on_hard_tasks(history: &[GoalHistoryLog]) -> bool {
    let mut hard = (0usize, 0usize); // (completed, total)
    let mut easy = (0usize, 0usize);
    for action in history.iter().flat_map(|log| log.actions.iter()) {
        let slot = if action.difficulty_level >= 4 {
            &mut hard
        } else if action.difficulty_level <= 2 {
            &mut easy
        } else {
            continue;
        };
        slot.1 += 1;
        if action.is_completed {
            slot.0 += 1;
        }
    }
    if hard.1 < MIN_TRAIT_SAMPLES || easy.1 < MIN_TRAIT_SAMPLES {
        return false;
    }
    let hard_rate = hard.0 as f64 / hard.1 as f64;
    let easy_rate = easy.0 as f64 / easy.1 as f64;
    easy_rate - hard_rate > 0.2
}

fn skips_weekend(history: &[GoalHistoryLog]) -> bool {
    let weekend_logs: Vec<&GoalHistoryLog> = history
        .iter()
        .filter(|log| is_weekend(log.date.weekday()))
        .collect();
    if weekend_logs.len() < 2 {
        return false;
    }
    let idle = weekend_logs.iter().filter(|log| !log.has_any_completion()).count();
    idle as f64 / weekend_logs.len() as f64 >= 0.6
}

fn finishes_strong_end_of_week(history: &[GoalHistoryLog]) -> bool {
    let mut late_week = (0usize, 0usize);
    let mut early_week = (0usize, 0usize);
    for log in history {
        let slot = match log.date.weekday() {
            Weekday::Fri | Weekday::Sat | Weekday::Sun => &mut late_week,
            _ => &mut early_week,
        };
        slot.1 += log.actions.len();
        slot.0 += log.completed_count();
    }
    if late_week.1 < MIN_TRAIT_SAMPLES || early_week.1 < MIN_TRAIT_SAMPLES {
        return false;
    }
    let late_rate = late_week.0 as f64 / late_week.1 as f64;
    let early_rate = early_week.0 as f64 / early_week.1 as f64;
    late_rate - early_rate > 0.15
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

fn mine_learning_patterns(history: &[GoalHistoryLog]) -> Vec<LearningPattern> {
    Domain::ALL
        .iter()
        .filter_map(|domain| {
            let actions: Vec<_> = history
                .iter()
                .flat_map(|log| log.actions.iter())
                .filter(|a| a.domain == *domain)
                .collect();
            if actions.is_empty() {
                return None;
            }
            let completed = actions.iter().filter(|a| a.is_completed).count();
            Some(LearningPattern {
                domain: *domain,
                observed_actions: actions.len(),
                completion_rate: completed as f64 / actions.len() as f64,
            })
        })
        .collect()
}
