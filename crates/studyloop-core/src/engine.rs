//! The goal engine and its sync orchestrator.
//!
//! [`GoalEngine`] owns the whole engine state tree and an injected clock.
//! One sync cycle runs generate, schedule, metrics, mode, restructure,
//! forecast, digest, and an hourly snapshot in order; user mutations run
//! synchronously and re-evaluate metrics, mode, and restructuring inline.
//! Triggers are idempotent: a cycle inside the minimum interval, or with
//! no content, is a no-op.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info, warn};

use crate::analytics::record_hourly_snapshot;
use crate::catalog::ContentPool;
use crate::clock::Clock;
use crate::config::UserGoalConfig;
use crate::digest::{generate_digest, GoalDigest, Timeframe};
use crate::error::CoreError;
use crate::forecast::{compute_forecast, GoalForecast};
use crate::goal::{
    DailyGoal, DayPerformance, GoalGenerator, GoalStatus, PlannedAction, RestructureEngine,
    HORIZON_DAYS,
};
use crate::history::{GoalHistoryLog, HistorySlice, Mood};
use crate::memory::{refresh_memory, GoalMemory};
use crate::metrics::{compute_metrics, GoalEngineMetrics};
use crate::mode::{apply_mode, determine_optimal_mode, EngineMode};
use crate::patterns::{analyze_time_patterns, TimePatternMemory};
use crate::revision::select_items_for_revision;
use crate::scheduler::{DailyScheduler, ScheduledPlan};

/// Minimum minutes between effective sync cycles.
const MIN_CYCLE_INTERVAL_MINUTES: i64 = 60;

/// Days of completion counts exposed to the widget.
const WIDGET_WINDOW_DAYS: usize = 30;

/// The entire engine state, serialized as one tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineState {
    pub daily_goals: Vec<DailyGoal>,
    pub history: Vec<GoalHistoryLog>,
    pub metrics: GoalEngineMetrics,
    pub memory: GoalMemory,
    pub scheduled_plans: Vec<ScheduledPlan>,
    pub time_patterns: Vec<TimePatternMemory>,
    pub config: UserGoalConfig,
    pub forecast: Option<GoalForecast>,
    pub digest: Option<GoalDigest>,
    pub total_goals_generated: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

impl EngineState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            daily_goals: Vec::new(),
            history: Vec::new(),
            metrics: GoalEngineMetrics::default(),
            memory: GoalMemory::default(),
            scheduled_plans: Vec::new(),
            time_patterns: Vec::new(),
            config: UserGoalConfig::new(now),
            forecast: None,
            digest: None,
            total_goals_generated: 0,
            last_cycle_at: None,
        }
    }

    fn goal_for(&self, date: NaiveDate) -> Option<&DailyGoal> {
        self.daily_goals.iter().find(|g| g.date == date)
    }

    fn goal_index(&self, date: NaiveDate) -> Option<usize> {
        self.daily_goals.iter().position(|g| g.date == date)
    }

    fn log_index(&self, date: NaiveDate) -> Option<usize> {
        self.history.iter().position(|l| l.date == date)
    }

    fn plan_for_mut(&mut self, date: NaiveDate) -> Option<&mut ScheduledPlan> {
        self.scheduled_plans.iter_mut().find(|p| p.date == date)
    }
}

/// Why a cycle did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Less than the minimum interval since the previous cycle
    TooSoon,
    /// The content pool was empty
    NoContent,
}

/// What one sync cycle did.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    Completed {
        generated_days: usize,
        scheduled_today: bool,
        mode: EngineMode,
        restructured: Option<DayPerformance>,
    },
}

/// Trend direction for the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusText {
    Increasing,
    Steady,
    Slowing,
}

impl fmt::Display for StatusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusText::Increasing => write!(f, "Increasing"),
            StatusText::Steady => write!(f, "Steady"),
            StatusText::Slowing => write!(f, "Slowing"),
        }
    }
}

/// Payload for the home-screen widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetPayload {
    /// Comma-joined daily completion counts, oldest first
    pub chart_data: String,
    pub status_text: StatusText,
    pub display_percentage: f64,
}

/// The goal engine: state tree plus injected clock.
pub struct GoalEngine {
    state: EngineState,
    clock: Box<dyn Clock>,
}

impl GoalEngine {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            state: EngineState::new(now),
            clock,
        }
    }

    /// Rehydrate from previously persisted state.
    pub fn with_state(state: EngineState, clock: Box<dyn Clock>) -> Self {
        Self { state, clock }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Replace the engine config wholesale, e.g. when seeding a fresh
    /// engine from the config file.
    pub fn replace_config(&mut self, config: UserGoalConfig) {
        self.state.config = config;
    }

    pub fn into_state(self) -> EngineState {
        self.state
    }

    // === Sync cycle ===

    /// Run one full sync cycle against the current content pool.
    ///
    /// Steps run in a fixed order; a failure aborts the remaining steps
    /// but leaves earlier steps' writes intact. The next periodic trigger
    /// is the retry mechanism.
    pub fn run_sync_cycle(&mut self, pool: &ContentPool) -> Result<CycleOutcome, CoreError> {
        let now = self.clock.now();
        let today = now.date_naive();

        if let Some(last) = self.state.last_cycle_at {
            if (now - last).num_minutes() < MIN_CYCLE_INTERVAL_MINUTES {
                debug!("sync cycle skipped: ran recently");
                return Ok(CycleOutcome::Skipped(SkipReason::TooSoon));
            }
        }
        if pool.is_empty() {
            debug!("sync cycle skipped: no content");
            return Ok(CycleOutcome::Skipped(SkipReason::NoContent));
        }

        info!(%today, "sync cycle start");

        self.absorb_elapsed_days(today);
        self.state.memory = refresh_memory(&self.state.history, &self.state.memory);
        self.state.time_patterns = analyze_time_patterns(&self.state.history);

        let generated_days = self.generate_missing_days(pool, today);
        self.ensure_log(today);
        let scheduled_today = self.schedule_day(today);
        self.recompute_metrics(today);

        // A user-set mode keeps its two-day honor window; applying even
        // an identical mode would clear the flag early.
        if self.state.config.allow_auto_adjustment && !self.state.config.user_mode_active(now) {
            let mode = determine_optimal_mode(
                &self.state.metrics,
                &self.state.history,
                &self.state.config,
                now,
            );
            apply_mode(&mut self.state.config, mode, now);
        }
        self.state.metrics.current_mode = self.state.config.mode;

        // Restructuring only reacts to real progress; an untouched day
        // must not spill its whole plan forward every cycle.
        let restructured = match self.state.goal_index(today) {
            Some(index) if self.state.daily_goals[index].total_completed > 0 => {
                RestructureEngine::restructure(&mut self.state.daily_goals, index)
                    .map(|outcome| outcome.performance)
            }
            _ => None,
        };

        if self.state.config.forecast_enabled {
            self.state.forecast = Some(compute_forecast(
                &self.state.history,
                pool,
                self.state.metrics.consistency_streak,
                now,
            ));
        }
        self.state.digest = Some(generate_digest(&self.state.history, Timeframe::Weekly, today));

        if let Some(index) = self.state.log_index(today) {
            record_hourly_snapshot(&mut self.state.history[index], now);
        }

        self.state.last_cycle_at = Some(now);
        info!(generated_days, scheduled_today, "sync cycle complete");

        Ok(CycleOutcome::Completed {
            generated_days,
            scheduled_today,
            mode: self.state.config.mode,
            restructured,
        })
    }

    /// Finalize elapsed days, roll yesterday's unfinished learning into
    /// an already-generated today, and rebuild the carry-over seed for
    /// generation. Recomputed wholesale, so repeat invocations are
    /// harmless.
    fn absorb_elapsed_days(&mut self, today: NaiveDate) {
        for goal in &mut self.state.daily_goals {
            if goal.date < today && goal.status != GoalStatus::Completed {
                goal.status = GoalStatus::Missed;
            }
        }
        let yesterday = today - Duration::days(1);
        let incomplete = self
            .state
            .goal_for(yesterday)
            .map(|goal| goal.incomplete_learning())
            .unwrap_or_default();

        // The carry tag doubles as a roll marker, so repeating this on
        // every trigger never duplicates an item.
        if let Some(index) = self.state.goal_index(today) {
            let today_goal = &mut self.state.daily_goals[index];
            let mut rolled: Vec<PlannedAction> = Vec::new();
            for action in &incomplete {
                if today_goal.carried_from_yesterday.contains(&action.id)
                    || today_goal.all_actions().any(|a| a.id == action.id)
                {
                    continue;
                }
                today_goal.carried_from_yesterday.push(action.id.clone());
                rolled.push(PlannedAction {
                    is_completed: false,
                    scheduled_start: None,
                    ..action.clone()
                });
            }
            if !rolled.is_empty() {
                rolled.append(&mut today_goal.planned_learning);
                today_goal.planned_learning = rolled;
                today_goal.recompute_totals();
            }
        }

        // Whatever is still unplanned in the live horizon seeds the next
        // generation pass.
        let live: HashSet<String> = self
            .state
            .daily_goals
            .iter()
            .filter(|g| g.date >= today)
            .flat_map(|g| g.all_actions().map(|a| a.id.clone()))
            .collect();
        self.state.memory.last_day_uncompleted = incomplete
            .into_iter()
            .filter(|a| !live.contains(&a.id))
            .collect();
    }

    /// Generate goals for dates inside the horizon that have none yet.
    fn generate_missing_days(&mut self, pool: &ContentPool, today: NaiveDate) -> usize {
        let horizon: Vec<NaiveDate> = (0..HORIZON_DAYS as i64)
            .map(|offset| today + Duration::days(offset))
            .collect();
        let Some(first_missing) = horizon
            .iter()
            .copied()
            .find(|date| self.state.goal_for(*date).is_none())
        else {
            return 0;
        };

        // Ids planned on days that have not elapsed stay off-limits.
        let already_planned: HashSet<String> = self
            .state
            .daily_goals
            .iter()
            .filter(|g| g.date >= today)
            .flat_map(|g| g.all_actions().map(|a| a.id.clone()))
            .collect();

        let generator = GoalGenerator::from_config(&self.state.config);
        let week = generator.generate_week(
            pool,
            first_missing,
            &self.state.memory.last_day_uncompleted,
            &self.state.history,
            &already_planned,
        );

        let mut generated = 0usize;
        let last_horizon_date = today + Duration::days(HORIZON_DAYS as i64 - 1);
        for goal in week.goals {
            if goal.date > last_horizon_date || self.state.goal_for(goal.date).is_some() {
                continue;
            }
            self.state.daily_goals.push(goal);
            self.state.total_goals_generated += 1;
            generated += 1;
        }
        self.state.daily_goals.sort_by_key(|g| g.date);

        if generated > 0 {
            self.state.memory.last_day_uncompleted = week.leftover_carry;
        }
        generated
    }

    /// Materialize the history log for a date once the date is live, and
    /// keep it in step with actions restructuring rolled in later.
    /// History is only ever extended, never rewritten.
    fn ensure_log(&mut self, date: NaiveDate) {
        let Some(goal_index) = self.state.goal_index(date) else {
            return;
        };
        match self.state.log_index(date) {
            None => {
                let log = GoalHistoryLog::from_goal(&self.state.daily_goals[goal_index]);
                self.state.history.push(log);
                self.state.history.sort_by_key(|l| l.date);
            }
            Some(index) => {
                let fresh: Vec<PlannedAction> = {
                    let goal = &self.state.daily_goals[goal_index];
                    let log = &self.state.history[index];
                    goal.all_actions()
                        .filter(|a| log.find_action(&a.id).is_none())
                        .cloned()
                        .collect()
                };
                if fresh.is_empty() {
                    return;
                }
                let mut stub = DailyGoal::new(date);
                stub.planned_learning = fresh;
                let seeded = GoalHistoryLog::from_goal(&stub);
                self.state.history[index].actions.extend(seeded.actions);
            }
        }
    }

    /// Build today's time plan once, stamping slot times into the goal
    /// and its history log. An existing plan is left alone so user
    /// reschedules survive later cycles.
    fn schedule_day(&mut self, date: NaiveDate) -> bool {
        if self.state.scheduled_plans.iter().any(|p| p.date == date) {
            return false;
        }
        let Some(goal_index) = self.state.goal_index(date) else {
            return false;
        };

        let actions: Vec<_> = self.state.daily_goals[goal_index]
            .all_actions()
            .cloned()
            .collect();
        let plan = DailyScheduler::schedule(
            date,
            &actions,
            &self.state.time_patterns,
            &self.state.memory,
        );

        let goal = &mut self.state.daily_goals[goal_index];
        for slot in &plan.slots {
            if let Some(action) = goal.find_action_mut(&slot.action_id) {
                action.scheduled_start = Some(slot.start_time);
            }
        }
        if let Some(log_index) = self.state.log_index(date) {
            let log = &mut self.state.history[log_index];
            for slot in &plan.slots {
                if let Some(entry) = log.find_action_mut(&slot.action_id) {
                    entry.scheduled_start = Some(slot.start_time);
                    entry.scheduled_end = Some(slot.end_time);
                }
            }
        }
        self.state.scheduled_plans.push(plan);
        self.state.scheduled_plans.sort_by_key(|p| p.date);
        true
    }

    fn recompute_metrics(&mut self, today: NaiveDate) {
        self.state.metrics = compute_metrics(
            &self.state.history,
            today,
            self.state.total_goals_generated,
            self.state.config.mode,
        );
    }

    // === User mutations ===

    /// Mark an action completed. Unknown date/id pairs and repeat calls
    /// are silent no-ops; a real completion re-runs metrics, mode, and
    /// restructuring inline.
    pub fn mark_action_completed(&mut self, date: NaiveDate, action_id: &str) {
        let now = self.clock.now();
        let Some(goal_index) = self.state.goal_index(date) else {
            warn!(%date, action_id, "completion for unknown goal date ignored");
            return;
        };
        self.ensure_log(date);
        if !self.state.daily_goals[goal_index].mark_completed(action_id) {
            return;
        }
        if let Some(log_index) = self.state.log_index(date) {
            if let Some(entry) = self.state.history[log_index].find_action_mut(action_id) {
                entry.is_completed = true;
                entry.completed_at = Some(now);
                if entry.started_at.is_none() {
                    entry.started_at = Some(now);
                }
            }
        }
        if let Some(plan) = self.state.plan_for_mut(date) {
            if let Some(slot) = plan.slot_for_mut(action_id) {
                slot.was_attempted = true;
            }
        }
        debug!(%date, action_id, "action completed");
        self.reevaluate_after_mutation(date, now);
    }

    /// Record that an action was started.
    pub fn mark_action_started(&mut self, date: NaiveDate, action_id: &str) {
        let now = self.clock.now();
        self.ensure_log(date);
        let Some(log_index) = self.state.log_index(date) else {
            return;
        };
        let Some(entry) = self.state.history[log_index].find_action_mut(action_id) else {
            return;
        };
        if entry.started_at.is_none() {
            entry.started_at = Some(now);
        }
        if let Some(plan) = self.state.plan_for_mut(date) {
            if let Some(slot) = plan.slot_for_mut(action_id) {
                slot.was_attempted = true;
            }
        }
    }

    /// Move an action's slot to a new start time, keeping its expected
    /// duration. No plan or no slot means no change.
    pub fn reschedule_action(
        &mut self,
        date: NaiveDate,
        action_id: &str,
        new_start: DateTime<Utc>,
    ) {
        let Some(plan) = self.state.plan_for_mut(date) else {
            return;
        };
        let Some(slot) = plan.slot_for_mut(action_id) else {
            return;
        };
        let duration = slot.expected_duration_minutes;
        slot.start_time = new_start;
        slot.end_time = new_start + Duration::minutes(duration);

        if let Some(goal_index) = self.state.goal_index(date) {
            if let Some(action) = self.state.daily_goals[goal_index].find_action_mut(action_id) {
                action.scheduled_start = Some(new_start);
            }
        }
        if let Some(log_index) = self.state.log_index(date) {
            if let Some(entry) = self.state.history[log_index].find_action_mut(action_id) {
                entry.scheduled_start = Some(new_start);
                entry.scheduled_end = Some(new_start + Duration::minutes(duration));
                entry.was_rescheduled = true;
            }
        }
        debug!(%date, action_id, %new_start, "action rescheduled");
    }

    /// Record the day's mood, used by digests.
    pub fn record_mood(&mut self, date: NaiveDate, mood: Mood) {
        if let Some(index) = self.state.log_index(date) {
            self.state.history[index].mood = Some(mood);
        }
    }

    /// Set the operating mode explicitly; honored for two days.
    pub fn set_mode(&mut self, mode: EngineMode) {
        let now = self.clock.now();
        self.state.config.set_mode_by_user(mode, now);
        self.state.metrics.current_mode = mode;
    }

    fn reevaluate_after_mutation(&mut self, date: NaiveDate, now: DateTime<Utc>) {
        self.recompute_metrics(now.date_naive());
        if self.state.config.allow_auto_adjustment {
            if !self.state.config.user_mode_active(now) {
                let mode = determine_optimal_mode(
                    &self.state.metrics,
                    &self.state.history,
                    &self.state.config,
                    now,
                );
                apply_mode(&mut self.state.config, mode, now);
            }
            self.state.metrics.current_mode = self.state.config.mode;
            if let Some(index) = self.state.goal_index(date) {
                RestructureEngine::restructure(&mut self.state.daily_goals, index);
            }
        }
    }

    // === Read-only accessors ===

    pub fn today_goal(&self) -> Option<&DailyGoal> {
        self.state.goal_for(self.clock.today())
    }

    pub fn today_plan(&self) -> Option<&ScheduledPlan> {
        let today = self.clock.today();
        self.state.scheduled_plans.iter().find(|p| p.date == today)
    }

    pub fn metrics(&self) -> &GoalEngineMetrics {
        &self.state.metrics
    }

    pub fn forecast(&self) -> Option<&GoalForecast> {
        self.state.forecast.as_ref()
    }

    pub fn digest(&self) -> Option<&GoalDigest> {
        self.state.digest.as_ref()
    }

    /// Digest for an arbitrary timeframe, computed on demand.
    pub fn digest_for(&self, timeframe: Timeframe) -> GoalDigest {
        generate_digest(&self.state.history, timeframe, self.clock.today())
    }

    /// Derived payload for the home-screen widget.
    pub fn widget_payload(&self, pool: &ContentPool) -> WidgetPayload {
        let today = self.clock.today();
        let mut logs: Vec<&GoalHistoryLog> = self
            .state
            .history
            .iter()
            .filter(|l| l.date <= today)
            .collect();
        logs.sort_by_key(|l| l.date);
        let recent = logs.len().saturating_sub(WIDGET_WINDOW_DAYS);
        let chart_data = logs[recent..]
            .iter()
            .map(|l| l.completed_count().to_string())
            .collect::<Vec<_>>()
            .join(",");

        let count_on = |date: NaiveDate| -> f64 {
            self.state
                .history
                .log_for(date)
                .map(|l| l.completed_count() as f64)
                .unwrap_or(0.0)
        };
        let last3: f64 = (0..3).map(|i| count_on(today - Duration::days(i))).sum::<f64>() / 3.0;
        let prior3: f64 =
            (3..6).map(|i| count_on(today - Duration::days(i))).sum::<f64>() / 3.0;
        let status_text = if last3 > prior3 + 0.1 {
            StatusText::Increasing
        } else if last3 + 0.1 < prior3 {
            StatusText::Slowing
        } else {
            StatusText::Steady
        };

        let completed_unique = self.state.history.completed_ids().len();
        let denominator = pool.len().max(completed_unique);
        let display_percentage = if denominator == 0 {
            0.0
        } else {
            completed_unique as f64 / denominator as f64 * 100.0
        };

        WidgetPayload {
            chart_data,
            status_text,
            display_percentage,
        }
    }

    /// Revision candidates for an ad-hoc review session.
    pub fn revision_queue(&self, limit: usize) -> Vec<PlannedAction> {
        let today = self.clock.today();
        let exclude = self
            .today_goal()
            .map(|g| g.all_actions().map(|a| a.id.clone()).collect())
            .unwrap_or_default();
        select_items_for_revision(&self.state.history, limit, &exclude, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Domain, LearnableItem};
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn pool(n: usize) -> ContentPool {
        ContentPool::new(
            (0..n)
                .map(|i| {
                    LearnableItem::new(format!("item-{i}"), Domain::Dsa, format!("Item {i}"))
                        .with_difficulty((i % 5) as u8 + 1)
                        .with_topic("t1", "Graphs")
                })
                .collect(),
        )
    }

    fn engine_at(day: u32, hour: u32) -> GoalEngine {
        GoalEngine::new(Box::new(FixedClock(at(day, hour))))
    }

    fn advance(engine: GoalEngine, day: u32, hour: u32) -> GoalEngine {
        GoalEngine::with_state(engine.into_state(), Box::new(FixedClock(at(day, hour))))
    }

    #[test]
    fn test_cold_start_empty_pool_is_noop() {
        let mut engine = engine_at(10, 9);
        let outcome = engine.run_sync_cycle(&ContentPool::default()).unwrap();
        assert!(matches!(outcome, CycleOutcome::Skipped(SkipReason::NoContent)));
        assert!(engine.state().daily_goals.is_empty());
    }

    #[test]
    fn test_first_cycle_generates_week_and_schedules_today() {
        let mut engine = engine_at(10, 9);
        let outcome = engine.run_sync_cycle(&pool(60)).unwrap();
        match outcome {
            CycleOutcome::Completed {
                generated_days,
                scheduled_today,
                ..
            } => {
                assert_eq!(generated_days, HORIZON_DAYS);
                assert!(scheduled_today);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(engine.state().daily_goals.len(), HORIZON_DAYS);
        // Only the live day has a history log; future logs materialize
        // when their date arrives.
        assert_eq!(engine.state().history.len(), 1);
        assert!(engine.today_goal().is_some());
        assert!(engine.today_plan().is_some());
        // Scheduled starts were stamped into today's goal.
        assert!(engine
            .today_goal()
            .unwrap()
            .all_actions()
            .all(|a| a.scheduled_start.is_some()));
    }

    #[test]
    fn test_rapid_retrigger_is_skipped() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let mut engine = advance(engine, 10, 9);
        let outcome = engine.run_sync_cycle(&pool(60)).unwrap();
        assert!(matches!(outcome, CycleOutcome::Skipped(SkipReason::TooSoon)));
    }

    #[test]
    fn test_next_day_generates_only_missing_date() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let mut engine = advance(engine, 11, 9);
        let outcome = engine.run_sync_cycle(&pool(60)).unwrap();
        match outcome {
            CycleOutcome::Completed { generated_days, .. } => assert_eq!(generated_days, 1),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(engine.state().daily_goals.len(), HORIZON_DAYS + 1);
    }

    #[test]
    fn test_no_duplicate_ids_across_rolling_horizon() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(200)).unwrap();
        let mut engine = advance(engine, 11, 9);
        engine.run_sync_cycle(&pool(200)).unwrap();

        let today = at(11, 9).date_naive();
        let mut seen = std::collections::HashSet::new();
        for goal in engine.state().daily_goals.iter().filter(|g| g.date >= today) {
            for action in goal.all_actions() {
                assert!(
                    seen.insert(action.id.clone()),
                    "id {} planned twice in live horizon",
                    action.id
                );
            }
        }
    }

    #[test]
    fn test_completion_is_idempotent() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let id = engine.today_goal().unwrap().planned_learning[0].id.clone();

        engine.mark_action_completed(date, &id);
        let after_first = engine.today_goal().unwrap().clone();
        engine.mark_action_completed(date, &id);
        let after_second = engine.today_goal().unwrap();

        assert_eq!(after_first.completed_action_ids, after_second.completed_action_ids);
        assert_eq!(after_first.total_completed, after_second.total_completed);
        assert_eq!(after_first.percent_completed, after_second.percent_completed);
    }

    #[test]
    fn test_completion_of_unknown_id_is_noop() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let before = engine.today_goal().unwrap().clone();
        engine.mark_action_completed(date, "nonexistent");
        assert_eq!(engine.today_goal().unwrap().total_completed, before.total_completed);
    }

    #[test]
    fn test_completion_stamps_history() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let id = engine.today_goal().unwrap().planned_learning[0].id.clone();
        engine.mark_action_completed(date, &id);

        let log = engine.state().history.log_for(date).unwrap();
        let entry = log.find_action(&id).unwrap();
        assert!(entry.is_completed);
        assert!(entry.completed_at.is_some());
        assert!(entry.started_at.is_some());
    }

    #[test]
    fn test_reschedule_updates_slot_and_history() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let id = engine.today_goal().unwrap().planned_learning[0].id.clone();

        let new_start = at(10, 20);
        engine.reschedule_action(date, &id, new_start);

        let slot = engine.today_plan().unwrap().slot_for(&id).unwrap();
        assert_eq!(slot.start_time, new_start);
        let entry = engine.state().history.log_for(date).unwrap().find_action(&id).unwrap();
        assert!(entry.was_rescheduled);
        assert_eq!(entry.scheduled_start, Some(new_start));
    }

    #[test]
    fn test_carry_over_seed_from_yesterday() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let unfinished: Vec<String> = engine
            .today_goal()
            .unwrap()
            .planned_learning
            .iter()
            .map(|a| a.id.clone())
            .collect();

        // Next day: yesterday's learning went unfinished.
        let mut engine = advance(engine, 11, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        assert_eq!(
            engine
                .state()
                .goal_for(date)
                .map(|g| g.status),
            Some(GoalStatus::Missed)
        );
        assert!(!unfinished.is_empty());
        assert_eq!(
            engine.state().memory.last_day_uncompleted.len(),
            0,
            "seed is consumed by generation"
        );
    }

    #[test]
    fn test_widget_payload_percentage() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(10)).unwrap();
        let date = at(10, 9).date_naive();
        let ids: Vec<String> = engine
            .today_goal()
            .unwrap()
            .all_actions()
            .map(|a| a.id.clone())
            .collect();
        for id in &ids {
            engine.mark_action_completed(date, id);
        }
        let payload = engine.widget_payload(&pool(10));
        assert!((payload.display_percentage - ids.len() as f64 * 10.0).abs() < 1e-9);
        assert!(!payload.chart_data.is_empty());
        assert_eq!(payload.status_text, StatusText::Increasing);
    }

    #[test]
    fn test_hourly_snapshot_appended_per_cycle() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        let first = engine.state().history.log_for(date).unwrap().hourly_stats.len();
        assert_eq!(first, 1);

        let mut engine = advance(engine, 10, 11);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let second = engine.state().history.log_for(date).unwrap().hourly_stats.len();
        assert_eq!(second, 2);
    }

    #[test]
    fn test_user_mode_respected_by_cycle() {
        let mut engine = engine_at(10, 9);
        engine.set_mode(EngineMode::Boost);
        engine.run_sync_cycle(&pool(60)).unwrap();
        assert_eq!(engine.state().config.mode, EngineMode::Boost);
    }

    #[test]
    fn test_forecast_and_digest_present_after_cycle() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        assert!(engine.forecast().is_some());
        assert!(engine.digest().is_some());
    }

    #[test]
    fn test_record_mood_flows_into_digest() {
        let mut engine = engine_at(10, 9);
        engine.run_sync_cycle(&pool(60)).unwrap();
        let date = at(10, 9).date_naive();
        engine.record_mood(date, Mood::Tired);
        let digest = engine.digest_for(Timeframe::Daily);
        assert_eq!(digest.mood_summary.unwrap().dominant, Mood::Tired);
    }
}
