//! Rolling 7-day goal generation.
//!
//! Builds one [`DailyGoal`] per day over a fixed horizon, mixing carried
//! items, due revisions, and fresh content. A global used-id set keeps an
//! item from being planned twice in one batch; the carry-over pool drains
//! forward day by day until placed or the horizon ends.

use chrono::{Datelike, Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::HashSet;
use tracing::debug;

use crate::catalog::ContentPool;
use crate::config::UserGoalConfig;
use crate::goal::{DailyGoal, GoalStatus, PlannedAction};
use crate::history::{GoalHistoryLog, HistorySlice};
use crate::revision::select_items_for_revision;

/// Fixed planning horizon in days.
pub const HORIZON_DAYS: usize = 7;

/// Result of one generation pass.
#[derive(Debug, Clone)]
pub struct GeneratedWeek {
    pub goals: Vec<DailyGoal>,
    /// Carry-over items that did not fit anywhere in the horizon
    pub leftover_carry: Vec<PlannedAction>,
}

/// Generator for a week of daily goals.
pub struct GoalGenerator {
    daily_load: usize,
    revision_ratio: f64,
    max_difficulty: u8,
}

impl GoalGenerator {
    pub fn from_config(config: &UserGoalConfig) -> Self {
        let mut daily_load = config.preferred_daily_load;
        if config.streak_protection {
            daily_load = daily_load.max(1);
        }
        Self {
            daily_load,
            revision_ratio: config.revision_intensity,
            max_difficulty: config.max_difficulty,
        }
    }

    /// Generate goals for `HORIZON_DAYS` consecutive days.
    ///
    /// `external_carry` merges the memory seed with any caller-supplied
    /// carry list; ids completed anywhere in history are dropped from it.
    /// `already_planned` seeds the global used-id set so a rolling
    /// horizon never re-plans an id that is still live on an existing
    /// day. An empty content pool skips generation entirely and produces
    /// zero goals.
    pub fn generate_week(
        &self,
        pool: &ContentPool,
        start_date: NaiveDate,
        external_carry: &[PlannedAction],
        history: &[GoalHistoryLog],
        already_planned: &HashSet<String>,
    ) -> GeneratedWeek {
        if pool.is_empty() {
            debug!("content pool empty, skipping generation");
            return GeneratedWeek {
                goals: Vec::new(),
                leftover_carry: Vec::new(),
            };
        }

        let completed_ids = history.completed_ids();

        // Merge carry sources by id, drop anything already completed.
        let mut carry_pool: Vec<PlannedAction> = Vec::new();
        let mut carry_seen: HashSet<String> = HashSet::new();
        for action in external_carry {
            if completed_ids.contains(&action.id) || !carry_seen.insert(action.id.clone()) {
                continue;
            }
            carry_pool.push(action.clone());
        }

        let mut global_used: HashSet<String> = already_planned.clone();
        let mut goals = Vec::with_capacity(HORIZON_DAYS);

        for offset in 0..HORIZON_DAYS {
            let date = start_date + Duration::days(offset as i64);
            let goal = self.build_day(
                pool,
                date,
                &mut carry_pool,
                &mut global_used,
                &completed_ids,
                history,
            );
            goals.push(goal);
        }

        GeneratedWeek {
            goals,
            leftover_carry: carry_pool,
        }
    }

    fn build_day(
        &self,
        pool: &ContentPool,
        date: NaiveDate,
        carry_pool: &mut Vec<PlannedAction>,
        global_used: &mut HashSet<String>,
        completed_ids: &HashSet<String>,
        history: &[GoalHistoryLog],
    ) -> DailyGoal {
        let revision_limit = (self.daily_load as f64 * self.revision_ratio).floor() as usize;
        let learn_limit = self.daily_load - revision_limit;

        let mut day_used: HashSet<String> = HashSet::new();
        let mut goal = DailyGoal::new(date);

        // Carried items take learning slots first.
        let mut remaining_carry = Vec::new();
        for action in carry_pool.drain(..) {
            if goal.planned_learning.len() < learn_limit && !global_used.contains(&action.id) {
                global_used.insert(action.id.clone());
                day_used.insert(action.id.clone());
                goal.carried_from_yesterday.push(action.id.clone());
                goal.planned_learning.push(PlannedAction {
                    is_completed: false,
                    scheduled_start: None,
                    ..action
                });
            } else {
                remaining_carry.push(action);
            }
        }
        *carry_pool = remaining_carry;

        // Due revisions, excluding everything used anywhere in the batch.
        let mut exclude = global_used.clone();
        exclude.extend(day_used.iter().cloned());
        goal.planned_revision = select_items_for_revision(history, revision_limit, &exclude, date);
        for action in &goal.planned_revision {
            global_used.insert(action.id.clone());
            day_used.insert(action.id.clone());
        }

        // Fresh content fills what is left, shuffled to avoid positional
        // bias. Completed items only come back through revision.
        if goal.planned_learning.len() < learn_limit {
            let mut blocked = global_used.clone();
            blocked.extend(completed_ids.iter().cloned());
            let mut fresh = pool.available(&blocked, self.max_difficulty);
            let mut rng = Pcg64Mcg::seed_from_u64(date.num_days_from_ce() as u64);
            fresh.shuffle(&mut rng);
            for item in fresh {
                if goal.planned_learning.len() >= learn_limit {
                    break;
                }
                if !day_used.insert(item.id.clone()) {
                    continue;
                }
                global_used.insert(item.id.clone());
                goal.planned_learning.push(PlannedAction::learn(&item));
            }
        }

        goal.status = GoalStatus::Pending;
        goal.recompute_totals();
        debug!(
            date = %date,
            learning = goal.planned_learning.len(),
            revision = goal.planned_revision.len(),
            carried = goal.carried_from_yesterday.len(),
            "generated daily goal"
        );
        goal
    }
}
