//! Time-pattern mining.
//!
//! Mines historical start/completion timestamps into per-domain,
//! per-action-kind success-rate windows. Hours are bucketed into 2-hour
//! windows; a window only exists once it has at least one observation, so
//! a missing `(domain, kind)` entry means "no pattern data".

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::{ActionKind, Domain};
use crate::history::GoalHistoryLog;

/// Width of an analysis window in hours.
const WINDOW_HOURS: u32 = 2;

/// Fallback duration when a window has usages but no completed samples.
pub const DEFAULT_DURATION_MINUTES: f64 = 30.0;

/// Aggregated statistics for one 2-hour window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindowStat {
    /// Window start hour (0, 2, 4, ... 22)
    pub start_hour: u32,
    /// Window end hour (exclusive)
    pub end_hour: u32,
    pub average_duration_minutes: f64,
    /// Completions / usages for this window
    pub success_rate: f64,
    pub usage_count: u64,
}

/// Mined windows for one `(domain, action kind)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimePatternMemory {
    pub kind: ActionKind,
    pub domain: Domain,
    pub time_windows: Vec<TimeWindowStat>,
}

impl TimePatternMemory {
    /// The window covering `hour`, if it was ever observed.
    pub fn window_for_hour(&self, hour: u32) -> Option<&TimeWindowStat> {
        self.time_windows
            .iter()
            .find(|w| w.start_hour <= hour && hour < w.end_hour)
    }

    /// The observed window with the highest success rate.
    pub fn best_window(&self) -> Option<&TimeWindowStat> {
        self.time_windows
            .iter()
            .max_by(|a, b| a.success_rate.total_cmp(&b.success_rate))
    }
}

#[derive(Default)]
struct WindowAccumulator {
    usages: u64,
    completions: u64,
    total_duration_minutes: i64,
}

/// Recompute all time patterns from history.
///
/// Only actions with a recorded start time contribute. Output order is
/// stable: domains in declaration order, learn before revise, windows by
/// start hour.
pub fn analyze_time_patterns(history: &[GoalHistoryLog]) -> Vec<TimePatternMemory> {
    let mut buckets: HashMap<(Domain, ActionKind, u32), WindowAccumulator> = HashMap::new();

    for log in history {
        for action in &log.actions {
            let Some(started_at) = action.started_at else {
                continue;
            };
            let window_start = (started_at.hour() / WINDOW_HOURS) * WINDOW_HOURS;
            let acc = buckets
                .entry((action.domain, action.kind, window_start))
                .or_default();
            acc.usages += 1;
            if action.is_completed {
                acc.completions += 1;
                if let Some(minutes) = action.duration_minutes() {
                    acc.total_duration_minutes += minutes;
                }
            }
        }
    }

    let mut patterns = Vec::new();
    for domain in Domain::ALL {
        for kind in [ActionKind::Learn, ActionKind::Revise] {
            let mut windows: Vec<TimeWindowStat> = buckets
                .iter()
                .filter(|((d, k, _), _)| *d == domain && *k == kind)
                .map(|((_, _, start), acc)| TimeWindowStat {
                    start_hour: *start,
                    end_hour: start + WINDOW_HOURS,
                    average_duration_minutes: if acc.completions > 0 {
                        acc.total_duration_minutes as f64 / acc.completions as f64
                    } else {
                        DEFAULT_DURATION_MINUTES
                    },
                    success_rate: acc.completions as f64 / acc.usages as f64,
                    usage_count: acc.usages,
                })
                .collect();
            if windows.is_empty() {
                continue;
            }
            windows.sort_by_key(|w| w.start_hour);
            patterns.push(TimePatternMemory {
                kind,
                domain,
                time_windows: windows,
            });
        }
    }
    patterns
}

/// Find the pattern entry for a `(domain, kind)` pair.
pub fn pattern_for<'a>(
    patterns: &'a [TimePatternMemory],
    domain: Domain,
    kind: ActionKind,
) -> Option<&'a TimePatternMemory> {
    patterns.iter().find(|p| p.domain == domain && p.kind == kind)
}
