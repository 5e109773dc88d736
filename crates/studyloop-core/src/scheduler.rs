//! Time-of-day assignment for a day's planned actions.
//!
//! Walks a cursor through three fixed day blocks, placing revision and
//! learning actions according to learned traits and mined time patterns.
//! If the cursor overruns the evening block it wraps back to the morning
//! block of the same day; there is no overnight rollover, so a heavily
//! overloaded day double-books rather than spilling into tomorrow.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ActionKind;
use crate::goal::PlannedAction;
use crate::memory::GoalMemory;
use crate::patterns::{pattern_for, TimePatternMemory};

/// Minutes of buffer between consecutive slots.
const INTER_TASK_BUFFER_MINUTES: i64 = 5;

/// Base duration for a learning action without pattern data.
const BASE_LEARN_MINUTES: f64 = 30.0;

/// Base duration for a revision action without pattern data.
const BASE_REVISE_MINUTES: f64 = 20.0;

/// Success rate a window needs before the cursor will jump to it.
const PULL_FORWARD_SUCCESS_RATE: f64 = 0.7;

/// How a slot's start time was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotOrigin {
    /// Placed at the rolling cursor inside a default day block
    DefaultBlock,
    /// Cursor was pulled forward to a learned high-success window
    PatternWindow,
}

/// One scheduled action with its time assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub id: String,
    pub action_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub expected_duration_minutes: i64,
    pub generated_by: SlotOrigin,
    pub was_attempted: bool,
}

/// Time-of-day assignment for one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPlan {
    pub date: NaiveDate,
    pub slots: Vec<ScheduledSlot>,
}

impl ScheduledPlan {
    pub fn slot_for(&self, action_id: &str) -> Option<&ScheduledSlot> {
        self.slots.iter().find(|s| s.action_id == action_id)
    }

    pub fn slot_for_mut(&mut self, action_id: &str) -> Option<&mut ScheduledSlot> {
        self.slots.iter_mut().find(|s| s.action_id == action_id)
    }
}

/// A contiguous block of schedulable time within the day.
#[derive(Debug, Clone, Copy)]
struct DayBlock {
    start: NaiveTime,
    end: NaiveTime,
}

/// Scheduler that assigns start/end times to a day's actions.
pub struct DailyScheduler;

impl DailyScheduler {
    /// Default blocks: morning, afternoon, evening. The morning block
    /// starts late on weekends for users who skip them.
    fn day_blocks(date: NaiveDate, skips_weekend: bool) -> Vec<DayBlock> {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let morning_start = if weekend && skips_weekend {
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        } else {
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        };
        vec![
            DayBlock {
                start: morning_start,
                end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            },
            DayBlock {
                start: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            },
            DayBlock {
                start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            },
        ]
    }

    /// Assign start/end times to `actions` for `date`.
    pub fn schedule(
        date: NaiveDate,
        actions: &[PlannedAction],
        patterns: &[TimePatternMemory],
        memory: &GoalMemory,
    ) -> ScheduledPlan {
        let traits = memory.user_traits;
        let blocks = Self::day_blocks(date, traits.skips_weekend);

        let mut learning: Vec<&PlannedAction> =
            actions.iter().filter(|a| a.kind == ActionKind::Learn).collect();
        let mut revision: Vec<&PlannedAction> =
            actions.iter().filter(|a| a.kind == ActionKind::Revise).collect();

        if traits.gives_up_on_hard_tasks {
            learning.sort_by_key(|a| a.difficulty_level);
        } else {
            learning.sort_by_key(|a| std::cmp::Reverse(a.difficulty_level));
        }
        revision.sort_by_key(|a| a.difficulty_level);

        let ordered: Vec<&PlannedAction> = if traits.prefers_revision_in_morning {
            revision.into_iter().chain(learning).collect()
        } else {
            learning.into_iter().chain(revision).collect()
        };

        let mut cursor = at_time(date, blocks[0].start);
        let mut slots = Vec::with_capacity(ordered.len());

        for action in ordered {
            cursor = Self::clamp_to_blocks(cursor, date, &blocks);

            let pattern = pattern_for(patterns, action.domain, action.kind);
            let mut origin = SlotOrigin::DefaultBlock;

            // Jump ahead to a proven window when one lies later today.
            if let Some(window) = pattern.and_then(|p| p.best_window()) {
                if window.success_rate >= PULL_FORWARD_SUCCESS_RATE {
                    let window_start = at_time(
                        date,
                        NaiveTime::from_hms_opt(window.start_hour, 0, 0).unwrap(),
                    );
                    if window_start > cursor {
                        cursor = window_start;
                        origin = SlotOrigin::PatternWindow;
                    }
                }
            }

            let duration = Self::expected_duration(action, pattern, cursor.hour());
            let end = cursor + Duration::minutes(duration);
            slots.push(ScheduledSlot {
                id: Uuid::new_v4().to_string(),
                action_id: action.id.clone(),
                start_time: cursor,
                end_time: end,
                expected_duration_minutes: duration,
                generated_by: origin,
                was_attempted: false,
            });
            cursor = end + Duration::minutes(INTER_TASK_BUFFER_MINUTES);
        }

        ScheduledPlan { date, slots }
    }

    /// Expected minutes for an action: the pattern window covering the
    /// cursor hour wins, otherwise a difficulty-scaled base estimate.
    fn expected_duration(
        action: &PlannedAction,
        pattern: Option<&TimePatternMemory>,
        cursor_hour: u32,
    ) -> i64 {
        if let Some(window) = pattern.and_then(|p| p.window_for_hour(cursor_hour)) {
            return (window.average_duration_minutes.round() as i64).max(5);
        }
        let (base, spread) = match action.kind {
            ActionKind::Learn => (BASE_LEARN_MINUTES, 0.3),
            ActionKind::Revise => (BASE_REVISE_MINUTES, 0.5),
        };
        // Difficulty 3 is the midpoint; 1 and 5 hit the full +-spread.
        let factor = 1.0 + (action.difficulty_level as f64 - 3.0) / 2.0 * spread;
        (base * factor).round() as i64
    }

    /// Snap the cursor into the nearest valid block. Past the evening
    /// block it wraps to the morning block of the same date.
    fn clamp_to_blocks(
        cursor: DateTime<Utc>,
        date: NaiveDate,
        blocks: &[DayBlock],
    ) -> DateTime<Utc> {
        let time = cursor.time();
        for block in blocks {
            if time < block.start {
                return at_time(date, block.start);
            }
            if time < block.end {
                return cursor;
            }
        }
        at_time(date, blocks[0].start)
    }
}

fn at_time(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}
