//! Periodic plan-vs-actual snapshots.
//!
//! Each invocation appends exactly one [`HourlySnapshot`] to a date's
//! log. Prior snapshots are never rewritten, so the series records how the
//! day's deviation counters evolved over time.

use chrono::{DateTime, Utc};

use crate::history::{GoalHistoryLog, HourlySnapshot};

/// Append one snapshot of the day's current state and return it.
pub fn record_hourly_snapshot(log: &mut GoalHistoryLog, now: DateTime<Utc>) -> HourlySnapshot {
    let total_actions = log.actions.len();
    let completed = log.completed_count();

    let mut started_early = 0usize;
    let mut started_late = 0usize;
    let mut unscheduled_starts = 0usize;
    let mut rescheduled = 0usize;

    for action in &log.actions {
        if action.was_rescheduled {
            rescheduled += 1;
        }
        let Some(started) = action.started_at else {
            continue;
        };
        match action.scheduled_start {
            Some(planned) if started < planned => started_early += 1,
            Some(_) => started_late += 1,
            None => unscheduled_starts += 1,
        }
    }

    let snapshot = HourlySnapshot {
        recorded_at: now,
        total_actions,
        completed,
        remaining: total_actions - completed,
        started_early,
        started_late,
        unscheduled_starts,
        rescheduled,
    };
    log.hourly_stats.push(snapshot.clone());
    snapshot
}
