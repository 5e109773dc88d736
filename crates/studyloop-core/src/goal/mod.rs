//! Daily goal types and the generation/restructure engines.

mod generator;
mod restructure;

pub use generator::{GeneratedWeek, GoalGenerator, HORIZON_DAYS};
pub use restructure::{DayPerformance, RestructureEngine, RestructureOutcome};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ActionKind, Domain, LearnableItem};

/// Lifecycle of a daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    /// Created but no action completed yet
    Pending,
    /// At least one action completed
    InProgress,
    /// Every planned action completed
    Completed,
    /// The day elapsed with incomplete actions
    Missed,
}

/// An item scheduled for a specific day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    /// Same id as the underlying content item
    pub id: String,
    pub domain: Domain,
    pub title: String,
    pub topic_title: Option<String>,
    /// Difficulty on a 1-5 scale, carried from the item
    pub difficulty_level: u8,
    /// Kind the item had when it first entered a plan
    pub original_kind: ActionKind,
    pub kind: ActionKind,
    pub is_completed: bool,
    pub scheduled_start: Option<DateTime<Utc>>,
}

impl PlannedAction {
    /// Build a learning action from a content item.
    pub fn learn(item: &LearnableItem) -> Self {
        Self {
            id: item.id.clone(),
            domain: item.domain,
            title: item.title.clone(),
            topic_title: item.topic_title.clone(),
            difficulty_level: item.difficulty_level,
            original_kind: ActionKind::Learn,
            kind: ActionKind::Learn,
            is_completed: false,
            scheduled_start: None,
        }
    }

    /// Convert this action into a revision of the same item.
    pub fn as_revision(&self) -> Self {
        Self {
            kind: ActionKind::Revise,
            is_completed: false,
            scheduled_start: None,
            ..self.clone()
        }
    }
}

/// One calendar day's plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGoal {
    pub date: NaiveDate,
    pub planned_learning: Vec<PlannedAction>,
    pub planned_revision: Vec<PlannedAction>,
    pub completed_action_ids: Vec<String>,
    pub total_planned_actions: usize,
    pub total_completed: usize,
    pub percent_completed: f64,
    pub status: GoalStatus,
    /// Ids of learning actions that rolled over from the previous day
    pub carried_from_yesterday: Vec<String>,
}

impl DailyGoal {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            planned_learning: Vec::new(),
            planned_revision: Vec::new(),
            completed_action_ids: Vec::new(),
            total_planned_actions: 0,
            total_completed: 0,
            percent_completed: 0.0,
            status: GoalStatus::Pending,
            carried_from_yesterday: Vec::new(),
        }
    }

    /// All planned actions, learning first.
    pub fn all_actions(&self) -> impl Iterator<Item = &PlannedAction> {
        self.planned_learning.iter().chain(self.planned_revision.iter())
    }

    /// Look up a planned action by id.
    pub fn find_action(&self, action_id: &str) -> Option<&PlannedAction> {
        self.all_actions().find(|a| a.id == action_id)
    }

    /// Look up a planned action mutably by id.
    pub fn find_action_mut(&mut self, action_id: &str) -> Option<&mut PlannedAction> {
        self.planned_learning
            .iter_mut()
            .chain(self.planned_revision.iter_mut())
            .find(|a| a.id == action_id)
    }

    /// Learning actions not yet completed.
    pub fn incomplete_learning(&self) -> Vec<PlannedAction> {
        self.planned_learning
            .iter()
            .filter(|a| !a.is_completed)
            .cloned()
            .collect()
    }

    /// Recompute `total_planned_actions`, `total_completed`,
    /// `percent_completed`, and `status` from the action lists.
    ///
    /// Invariant: `total_planned_actions == planned_learning.len() +
    /// planned_revision.len()` and `percent_completed` is 0 when nothing
    /// is planned.
    pub fn recompute_totals(&mut self) {
        self.total_planned_actions = self.planned_learning.len() + self.planned_revision.len();
        self.total_completed = self
            .completed_action_ids
            .iter()
            .filter(|id| self.find_action(id).is_some())
            .count();
        self.percent_completed = if self.total_planned_actions == 0 {
            0.0
        } else {
            self.total_completed as f64 / self.total_planned_actions as f64 * 100.0
        };
        self.status = if self.total_planned_actions > 0
            && self.total_completed == self.total_planned_actions
        {
            GoalStatus::Completed
        } else if self.total_completed > 0 {
            GoalStatus::InProgress
        } else {
            self.status
        };
    }

    /// Mark an action completed. Unknown ids and repeat calls are
    /// silent no-ops.
    pub fn mark_completed(&mut self, action_id: &str) -> bool {
        if self.completed_action_ids.iter().any(|id| id == action_id) {
            return false;
        }
        let Some(action) = self.find_action_mut(action_id) else {
            return false;
        };
        action.is_completed = true;
        self.completed_action_ids.push(action_id.to_string());
        self.recompute_totals();
        true
    }
}
