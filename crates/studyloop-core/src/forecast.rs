//! Per-domain completion forecasting.
//!
//! Projects how many calendar days remain until each domain's pool is
//! exhausted, from observed velocity over the last 30 days. Velocity gets
//! a learning-curve boost once a domain is warmed up and a small streak
//! multiplier; the active-day ratio then converts active-day ETAs into
//! calendar-day ETAs.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{ContentPool, Domain};
use crate::history::{GoalHistoryLog, HistorySlice};

/// ETA reported when a domain has no measurable velocity.
pub const ETA_SENTINEL_DAYS: u32 = 999;

/// Window for velocity measurement, in days.
const VELOCITY_WINDOW_DAYS: i64 = 30;

/// Window for the active-day ratio, in days.
const ACTIVE_RATIO_WINDOW_DAYS: i64 = 14;

/// Forecast for a single domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainForecast {
    pub domain: Domain,
    pub total_items: usize,
    pub completed_items: usize,
    pub remaining_items: usize,
    pub velocity_per_active_day: f64,
    /// Projected calendar days to finish the domain
    pub eta_days: u32,
}

/// Inputs the forecast was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastBasis {
    pub avg_daily_load: f64,
    pub streak: u32,
    pub missed_days: usize,
    pub total_items: usize,
    pub completed_items: usize,
}

/// ETA projection across all domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalForecast {
    pub domains: Vec<DomainForecast>,
    pub based_on: ForecastBasis,
    pub generated_at: DateTime<Utc>,
}

/// Compute the forecast from history and the current pool.
pub fn compute_forecast(
    history: &[GoalHistoryLog],
    pool: &ContentPool,
    streak: u32,
    now: DateTime<Utc>,
) -> GoalForecast {
    let today = now.date_naive();
    let window_start = today - Duration::days(VELOCITY_WINDOW_DAYS);
    let recent: Vec<&GoalHistoryLog> = history
        .iter()
        .filter(|log| log.date > window_start && log.date <= today)
        .collect();

    let active_days = recent.iter().filter(|log| log.has_any_completion()).count();
    let ratio = active_ratio(history, today);
    let completed_ids = history.completed_ids();

    let domains = Domain::ALL
        .iter()
        .map(|domain| {
            forecast_domain(*domain, &recent, pool, &completed_ids, active_days, streak, ratio)
        })
        .collect();

    let total_completed_recent: usize = recent.iter().map(|log| log.completed_count()).sum();
    let missed_days = recent
        .iter()
        .filter(|log| {
            !log.actions.is_empty()
                && (log.completed_count() as f64) < 0.7 * log.actions.len() as f64
        })
        .count();

    GoalForecast {
        domains,
        based_on: ForecastBasis {
            avg_daily_load: if active_days == 0 {
                0.0
            } else {
                total_completed_recent as f64 / active_days as f64
            },
            streak,
            missed_days,
            total_items: pool.len(),
            completed_items: completed_ids.len(),
        },
        generated_at: now,
    }
}

fn forecast_domain(
    domain: Domain,
    recent: &[&GoalHistoryLog],
    pool: &ContentPool,
    completed_ids: &std::collections::HashSet<String>,
    active_days: usize,
    streak: u32,
    active_ratio: f64,
) -> DomainForecast {
    let total_items = pool.domain_items(domain).count();
    let completed_items = pool
        .domain_items(domain)
        .filter(|i| completed_ids.contains(&i.id))
        .count();
    let remaining_items = total_items - completed_items;

    let completed_recent: usize = recent
        .iter()
        .flat_map(|log| log.actions.iter())
        .filter(|a| a.domain == domain && a.is_completed)
        .count();

    let mut velocity = if active_days == 0 {
        0.0
    } else {
        completed_recent as f64 / active_days as f64
    };

    // Completion accelerates once a domain is warmed up.
    let progress_percent = if total_items == 0 {
        0.0
    } else {
        completed_items as f64 / total_items as f64 * 100.0
    };
    if progress_percent > 30.0 {
        velocity *= 1.0 + progress_percent / 200.0;
    }
    velocity *= 1.0 + (streak as f64 / 50.0).min(0.2);

    let eta_days = if remaining_items == 0 {
        0
    } else if velocity <= 0.0 {
        ETA_SENTINEL_DAYS
    } else {
        let active_eta = (remaining_items as f64 / velocity).ceil();
        let calendar_eta = if active_ratio >= 1.0 {
            active_eta
        } else if active_ratio <= 0.0 {
            active_eta * 7.0
        } else {
            active_eta / active_ratio
        };
        (calendar_eta.ceil() as u32).min(ETA_SENTINEL_DAYS)
    };

    DomainForecast {
        domain,
        total_items,
        completed_items,
        remaining_items,
        velocity_per_active_day: velocity,
        eta_days,
    }
}

/// Fraction of the last 14 days with at least one completion.
fn active_ratio(history: &[GoalHistoryLog], today: NaiveDate) -> f64 {
    let active = history.active_days();
    let hits = (0..ACTIVE_RATIO_WINDOW_DAYS)
        .filter(|offset| active.contains(&(today - Duration::days(*offset))))
        .count();
    hits as f64 / ACTIVE_RATIO_WINDOW_DAYS as f64
}
