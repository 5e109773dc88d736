//! Adaptive re-planning of future days.
//!
//! Runs after a completion event. Classifies today's performance, rolls
//! incomplete actions into tomorrow, and re-shapes not-yet-started future
//! days: difficulty ordering follows the performance direction, and an
//! underperforming day shrinks the load of days beyond tomorrow. Growth is
//! out of scope here since it would require pulling fresh content.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::goal::{DailyGoal, PlannedAction};

/// How today went, relative to its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPerformance {
    /// Everything done, with a non-trivial plan (>= 3 actions)
    Overperforming,
    /// Less than half done
    Underperforming,
    Average,
}

/// What a restructure pass changed.
#[derive(Debug, Clone)]
pub struct RestructureOutcome {
    pub performance: DayPerformance,
    /// -1 easier first, +1 harder first, 0 keep ordering
    pub difficulty_adjustment: i8,
    /// Signed slot delta applied to days beyond tomorrow
    pub load_adjustment: i32,
    /// Ids rolled into tomorrow
    pub carried_ids: Vec<String>,
}

/// Engine that restructures future days after completion events.
pub struct RestructureEngine;

impl RestructureEngine {
    /// Classify a day from its completion ratio.
    pub fn classify(goal: &DailyGoal) -> DayPerformance {
        if goal.total_planned_actions >= 3 && goal.percent_completed >= 100.0 {
            DayPerformance::Overperforming
        } else if goal.percent_completed < 50.0 {
            DayPerformance::Underperforming
        } else {
            DayPerformance::Average
        }
    }

    /// Restructure all days after `today_index`.
    ///
    /// Safe to call repeatedly within a day: carry-over is only injected
    /// into `today_index + 1` and deduplicated by id.
    pub fn restructure(goals: &mut [DailyGoal], today_index: usize) -> Option<RestructureOutcome> {
        let today = goals.get(today_index)?;
        let performance = Self::classify(today);

        let (difficulty_adjustment, load_sign): (i8, i32) = match performance {
            DayPerformance::Overperforming => (1, 1),
            DayPerformance::Underperforming => (-1, -1),
            DayPerformance::Average => (0, 0),
        };

        // Up to 20% of today's total, rounded up, capped at 2 slots.
        let magnitude = ((today.total_planned_actions as f64 * 0.2).ceil() as i32).min(2);
        let load_adjustment = load_sign * magnitude;

        let incomplete = today.incomplete_learning();
        let carried_ids = Self::roll_into_tomorrow(goals, today_index, incomplete, load_adjustment);

        for (offset, goal) in goals.iter_mut().enumerate().skip(today_index + 1) {
            // Only days nobody has started on may be reshaped.
            if goal.total_completed > 0 {
                continue;
            }
            Self::sort_by_difficulty(&mut goal.planned_learning, difficulty_adjustment);
            if load_adjustment < 0 && offset > today_index + 1 {
                let target = goal
                    .planned_learning
                    .len()
                    .saturating_sub(load_adjustment.unsigned_abs() as usize);
                Self::shrink_learning(goal, target);
            }
            goal.recompute_totals();
        }

        debug!(
            ?performance,
            difficulty_adjustment,
            load_adjustment,
            carried = carried_ids.len(),
            "restructured future days"
        );

        Some(RestructureOutcome {
            performance,
            difficulty_adjustment,
            load_adjustment,
            carried_ids,
        })
    }

    /// Prepend today's incomplete learning to tomorrow, deduplicated.
    /// When load is being cut, tomorrow is trimmed back to its
    /// pre-adjustment length so the roll-in never grows it.
    fn roll_into_tomorrow(
        goals: &mut [DailyGoal],
        today_index: usize,
        incomplete: Vec<PlannedAction>,
        load_adjustment: i32,
    ) -> Vec<String> {
        let Some(tomorrow) = goals.get_mut(today_index + 1) else {
            return Vec::new();
        };
        if tomorrow.total_completed > 0 {
            return Vec::new();
        }

        let before_len = tomorrow.planned_learning.len();
        let mut carried_ids = Vec::new();
        let mut rolled: Vec<PlannedAction> = Vec::new();
        for action in incomplete {
            // The carry tag doubles as a roll marker: an id tagged on a
            // previous pass is never rolled again, even if a load cut
            // trimmed it out of the plan.
            if tomorrow.carried_from_yesterday.contains(&action.id)
                || tomorrow.all_actions().any(|a| a.id == action.id)
            {
                continue;
            }
            carried_ids.push(action.id.clone());
            rolled.push(PlannedAction {
                is_completed: false,
                scheduled_start: None,
                ..action
            });
        }
        if !rolled.is_empty() {
            rolled.append(&mut tomorrow.planned_learning);
            tomorrow.planned_learning = rolled;
            tomorrow.carried_from_yesterday.extend(carried_ids.iter().cloned());
            if load_adjustment < 0 {
                Self::shrink_learning_to(tomorrow, before_len);
            }
        }
        tomorrow.recompute_totals();
        carried_ids
    }

    fn sort_by_difficulty(actions: &mut [PlannedAction], direction: i8) {
        match direction {
            1 => actions.sort_by(|a, b| b.difficulty_level.cmp(&a.difficulty_level)),
            -1 => actions.sort_by(|a, b| a.difficulty_level.cmp(&b.difficulty_level)),
            _ => {}
        }
    }

    fn shrink_learning(goal: &mut DailyGoal, target: usize) {
        Self::shrink_learning_to(goal, target);
    }

    /// Drop trailing learning actions down to `target`, never touching
    /// completed ones.
    fn shrink_learning_to(goal: &mut DailyGoal, target: usize) {
        while goal.planned_learning.len() > target {
            let Some(pos) = goal.planned_learning.iter().rposition(|a| !a.is_completed) else {
                break;
            };
            goal.planned_learning.remove(pos);
        }
    }
}
