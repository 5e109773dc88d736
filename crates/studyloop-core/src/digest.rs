//! Period summaries of study history.
//!
//! A digest aggregates one timeframe window (today, the last 7 days, or
//! the last month) into counts, a per-domain completion ranking, the most
//! studied topic, and an optional mood tally.

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::catalog::Domain;
use crate::history::{GoalHistoryLog, Mood};

/// Share of a day's actions that must complete for the day to count.
const MISSED_DAY_THRESHOLD: f64 = 0.7;

/// Reporting window for a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
}

impl Timeframe {
    /// First date included in the window ending at `today`.
    fn window_start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Timeframe::Daily => today,
            Timeframe::Weekly => today - Duration::days(6),
            Timeframe::Monthly => today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today - Duration::days(30)),
        }
    }
}

/// Action counts over the window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestTotals {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    /// Completions that had no scheduled slot: extra, unplanned work
    pub bonus: usize,
}

/// Dominant mood across the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodTally {
    pub dominant: Mood,
    pub days: usize,
    pub days_reported: usize,
}

/// Summary report for one timeframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDigest {
    pub timeframe: Timeframe,
    pub totals: DigestTotals,
    /// Domain with the highest completion percentage
    pub top_domain: Option<Domain>,
    /// Domain with the lowest completion percentage, among observed ones
    pub weak_domain: Option<Domain>,
    pub most_studied_topic: Option<String>,
    pub mood_summary: Option<MoodTally>,
    /// Days where under 70% of scheduled actions completed
    pub missed_days: usize,
}

/// Aggregate history inside the timeframe window into a digest.
pub fn generate_digest(
    history: &[GoalHistoryLog],
    timeframe: Timeframe,
    today: NaiveDate,
) -> GoalDigest {
    let start = timeframe.window_start(today);
    let window: Vec<&GoalHistoryLog> = history
        .iter()
        .filter(|log| log.date >= start && log.date <= today)
        .collect();

    let mut totals = DigestTotals::default();
    let mut domain_counts: HashMap<Domain, (usize, usize)> = HashMap::new();
    let mut topic_counts: HashMap<&str, usize> = HashMap::new();
    let mut missed_days = 0usize;

    for log in &window {
        if !log.actions.is_empty()
            && (log.completed_count() as f64) < MISSED_DAY_THRESHOLD * log.actions.len() as f64
        {
            missed_days += 1;
        }
        for action in &log.actions {
            totals.total += 1;
            let counts = domain_counts.entry(action.domain).or_default();
            counts.1 += 1;
            if action.is_completed {
                totals.completed += 1;
                counts.0 += 1;
                if action.scheduled_start.is_none() {
                    totals.bonus += 1;
                }
                if let Some(topic) = &action.topic_title {
                    *topic_counts.entry(topic.as_str()).or_default() += 1;
                }
            }
        }
    }
    totals.skipped = totals.total - totals.completed;

    let mut ranking: Vec<(Domain, f64)> = domain_counts
        .into_iter()
        .map(|(domain, (done, total))| (domain, done as f64 / total as f64))
        .collect();
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));

    let most_studied_topic = topic_counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(topic, _)| topic.to_string());

    GoalDigest {
        timeframe,
        totals,
        top_domain: ranking.first().map(|(d, _)| *d),
        weak_domain: ranking.last().map(|(d, _)| *d),
        most_studied_topic,
        mood_summary: tally_moods(&window),
        missed_days,
    }
}

fn tally_moods(window: &[&GoalHistoryLog]) -> Option<MoodTally> {
    let moods: Vec<Mood> = window.iter().filter_map(|log| log.mood).collect();
    if moods.is_empty() {
        return None;
    }
    let mut counts: HashMap<Mood, usize> = HashMap::new();
    for mood in &moods {
        *counts.entry(*mood).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(dominant, days)| MoodTally {
            dominant,
            days,
            days_reported: moods.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionKind;
    use crate::history::ActionLogEntry;
    use chrono::{TimeZone, Utc};

    fn action(domain: Domain, topic: Option<&str>, completed: bool) -> ActionLogEntry {
        ActionLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            domain,
            kind: ActionKind::Learn,
            title: String::new(),
            topic_title: topic.map(|t| t.to_string()),
            difficulty_level: 3,
            is_completed: completed,
            started_at: None,
            completed_at: None,
            scheduled_start: None,
            scheduled_end: None,
            was_rescheduled: false,
        }
    }

    fn log_on(date: NaiveDate, actions: Vec<ActionLogEntry>) -> GoalHistoryLog {
        GoalHistoryLog {
            date,
            actions,
            hourly_stats: Vec::new(),
            mood: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_daily_window_excludes_yesterday() {
        let history = vec![
            log_on(today(), vec![action(Domain::Dsa, None, true)]),
            log_on(today() - Duration::days(1), vec![action(Domain::Dsa, None, true)]),
        ];
        let digest = generate_digest(&history, Timeframe::Daily, today());
        assert_eq!(digest.totals.total, 1);
    }

    #[test]
    fn test_weekly_window_spans_seven_days() {
        let history: Vec<GoalHistoryLog> = (0..10)
            .map(|i| {
                log_on(
                    today() - Duration::days(i),
                    vec![action(Domain::Dsa, None, true)],
                )
            })
            .collect();
        let digest = generate_digest(&history, Timeframe::Weekly, today());
        assert_eq!(digest.totals.total, 7);
    }

    #[test]
    fn test_totals_and_skip_counts() {
        let history = vec![log_on(
            today(),
            vec![
                action(Domain::Dsa, None, true),
                action(Domain::Dsa, None, false),
                action(Domain::Core, None, false),
            ],
        )];
        let digest = generate_digest(&history, Timeframe::Daily, today());
        assert_eq!(digest.totals.completed, 1);
        assert_eq!(digest.totals.skipped, 2);
        // 1 of 3 completed is under the 70% threshold.
        assert_eq!(digest.missed_days, 1);
    }

    #[test]
    fn test_domain_ranking() {
        let history = vec![log_on(
            today(),
            vec![
                action(Domain::Dsa, None, true),
                action(Domain::Dsa, None, true),
                action(Domain::Core, None, true),
                action(Domain::Core, None, false),
            ],
        )];
        let digest = generate_digest(&history, Timeframe::Daily, today());
        assert_eq!(digest.top_domain, Some(Domain::Dsa));
        assert_eq!(digest.weak_domain, Some(Domain::Core));
    }

    #[test]
    fn test_most_studied_topic() {
        let history = vec![log_on(
            today(),
            vec![
                action(Domain::Dsa, Some("Graphs"), true),
                action(Domain::Dsa, Some("Graphs"), true),
                action(Domain::Dsa, Some("Heaps"), true),
                action(Domain::Dsa, Some("Trees"), false),
            ],
        )];
        let digest = generate_digest(&history, Timeframe::Daily, today());
        assert_eq!(digest.most_studied_topic.as_deref(), Some("Graphs"));
    }

    #[test]
    fn test_bonus_counts_unscheduled_completions() {
        let mut scheduled = action(Domain::Dsa, None, true);
        scheduled.scheduled_start = Some(Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap());
        let history = vec![log_on(
            today(),
            vec![scheduled, action(Domain::Dsa, None, true)],
        )];
        let digest = generate_digest(&history, Timeframe::Daily, today());
        assert_eq!(digest.totals.bonus, 1);
    }

    #[test]
    fn test_mood_tally() {
        let mut a = log_on(today(), vec![action(Domain::Dsa, None, true)]);
        a.mood = Some(Mood::Good);
        let mut b = log_on(today() - Duration::days(1), vec![action(Domain::Dsa, None, true)]);
        b.mood = Some(Mood::Good);
        let mut c = log_on(today() - Duration::days(2), vec![action(Domain::Dsa, None, true)]);
        c.mood = Some(Mood::Tired);
        let digest = generate_digest(&[a, b, c], Timeframe::Weekly, today());
        let tally = digest.mood_summary.unwrap();
        assert_eq!(tally.dominant, Mood::Good);
        assert_eq!(tally.days, 2);
        assert_eq!(tally.days_reported, 3);
    }

    #[test]
    fn test_empty_window_is_all_none() {
        let digest = generate_digest(&[], Timeframe::Monthly, today());
        assert_eq!(digest.totals.total, 0);
        assert!(digest.top_domain.is_none());
        assert!(digest.most_studied_topic.is_none());
        assert!(digest.mood_summary.is_none());
    }
}
