//! # Studyloop Core Library
//!
//! This library provides the goal engine behind Studyloop, a personal
//! study tracker. The engine plans a rolling 7-day mix of new learning
//! and spaced-repetition review, assigns time-of-day slots from mined
//! behavioral patterns, adapts an operating mode to recent performance,
//! and reports forecasts and digests. The CLI binary and any GUI shell
//! are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Goal Engine**: [`GoalEngine`] owns the whole state tree and an
//!   injected [`Clock`]; one sync cycle runs generation, scheduling,
//!   metrics, mode control, restructuring, forecasting, and digests in a
//!   fixed order
//! - **Storage**: SQLite-backed single-blob state persistence and a TOML
//!   config file
//! - **History**: append-friendly per-date logs every derived component
//!   (metrics, patterns, revision selection, forecasts) is computed from
//!
//! ## Key Components
//!
//! - [`GoalEngine`]: orchestrator and mutation surface
//! - [`GoalGenerator`]: rolling 7-day goal generation
//! - [`DailyScheduler`]: time-of-day slot assignment
//! - [`StateStore`]: engine state persistence

pub mod analytics;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod digest;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod goal;
pub mod history;
pub mod memory;
pub mod metrics;
pub mod mode;
pub mod patterns;
pub mod revision;
pub mod scheduler;
pub mod storage;

pub use catalog::{ActionKind, ContentPool, Domain, LearnableItem};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::UserGoalConfig;
pub use digest::{GoalDigest, Timeframe};
pub use engine::{CycleOutcome, EngineState, GoalEngine, SkipReason, StatusText, WidgetPayload};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use forecast::GoalForecast;
pub use goal::{DailyGoal, GoalGenerator, GoalStatus, PlannedAction};
pub use history::{ActionLogEntry, GoalHistoryLog, Mood};
pub use memory::{GoalMemory, UserTraits};
pub use metrics::GoalEngineMetrics;
pub use mode::EngineMode;
pub use scheduler::{DailyScheduler, ScheduledPlan};
pub use storage::{AppConfig, StateStore};
