//! Injected time source.
//!
//! Every component that needs "now" receives it from the orchestrator,
//! which reads it from a [`Clock`]. Tests substitute [`FixedClock`] to get
//! deterministic schedules, streaks, and spaced-repetition windows.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
