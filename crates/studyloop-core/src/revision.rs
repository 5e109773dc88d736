//! Spaced-repetition selector.
//!
//! Picks revision candidates from history using fixed review intervals.
//! An item becomes due when its days-since-completion lands within one day
//! of any interval; due items are ranked by how close they are to aging
//! out of the 30-day window, everything else falls back to oldest-first.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use crate::catalog::ActionKind;
use crate::goal::PlannedAction;
use crate::history::{ActionLogEntry, GoalHistoryLog};

/// Review intervals in days.
pub const REVISION_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

/// Tolerance around each interval, in days.
const INTERVAL_TOLERANCE: i64 = 1;

/// A revision candidate with its recency.
#[derive(Debug, Clone)]
struct Candidate {
    entry: ActionLogEntry,
    days_since: i64,
}

impl Candidate {
    fn is_due(&self) -> bool {
        REVISION_INTERVALS
            .iter()
            .any(|interval| (self.days_since - interval).abs() <= INTERVAL_TOLERANCE)
    }

    /// Ranking key for due items; smaller means closer to aging out.
    fn priority(&self) -> i64 {
        30 - self.days_since
    }
}

/// Select up to `limit` revision candidates from history.
///
/// Only the most recent completion of each item counts. Excluded ids are
/// never returned. Output actions are always `Revise` and not completed,
/// regardless of the historical state they were derived from.
pub fn select_items_for_revision(
    history: &[GoalHistoryLog],
    limit: usize,
    exclude: &HashSet<String>,
    today: NaiveDate,
) -> Vec<PlannedAction> {
    if limit == 0 {
        return Vec::new();
    }

    // Most recent completion per item id.
    let mut latest: HashMap<String, (NaiveDate, ActionLogEntry)> = HashMap::new();
    for log in history {
        for entry in log.actions.iter().filter(|a| a.is_completed) {
            let completed_on = entry
                .completed_at
                .map(|t| t.date_naive())
                .unwrap_or(log.date);
            match latest.get(&entry.id) {
                Some((existing, _)) if *existing >= completed_on => {}
                _ => {
                    latest.insert(entry.id.clone(), (completed_on, entry.clone()));
                }
            }
        }
    }

    let mut candidates: Vec<Candidate> = latest
        .into_iter()
        .filter(|(id, _)| !exclude.contains(id))
        .filter_map(|(_, (completed_on, entry))| {
            let days_since = (today - completed_on).num_days();
            (days_since >= 0).then_some(Candidate { entry, days_since })
        })
        .collect();

    let (mut due, mut rest): (Vec<_>, Vec<_>) =
        candidates.drain(..).partition(Candidate::is_due);
    due.sort_by_key(Candidate::priority);
    rest.sort_by_key(|c| std::cmp::Reverse(c.days_since));

    due.into_iter()
        .chain(rest)
        .take(limit)
        .map(|c| PlannedAction {
            id: c.entry.id,
            domain: c.entry.domain,
            title: c.entry.title,
            topic_title: c.entry.topic_title,
            difficulty_level: c.entry.difficulty_level,
            original_kind: c.entry.kind,
            kind: ActionKind::Revise,
            is_completed: false,
            scheduled_start: None,
        })
        .collect()
}
