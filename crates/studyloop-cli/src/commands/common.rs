//! Shared helpers for CLI commands.

use chrono::NaiveDate;
use studyloop_core::storage::data_dir;
use studyloop_core::{
    AppConfig, ContentPool, GoalEngine, LearnableItem, StateStore, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load the engine from the state store, seeding a fresh one from the
/// config file on first run.
pub fn load_engine() -> Result<GoalEngine, Box<dyn std::error::Error>> {
    let store = StateStore::open()?;
    let engine = match store.load()? {
        Some(state) => GoalEngine::with_state(state, Box::new(SystemClock)),
        None => {
            let app_config = AppConfig::load()?;
            let mut engine = GoalEngine::new(Box::new(SystemClock));
            let now = chrono::Utc::now();
            let seeded = app_config.to_goal_config(now);
            seeded.validate()?;
            engine.replace_config(seeded);
            engine
        }
    };
    Ok(engine)
}

/// Persist the engine state back to the store.
pub fn save_engine(engine: &GoalEngine) -> CliResult {
    let mut store = StateStore::open()?;
    store.save(engine.state())?;
    Ok(())
}

/// Load the content pool imported via `pool import`.
pub fn load_pool() -> Result<ContentPool, Box<dyn std::error::Error>> {
    let path = data_dir()?.join("pool.json");
    if !path.exists() {
        return Ok(ContentPool::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let items: Vec<LearnableItem> = serde_json::from_str(&raw)?;
    Ok(ContentPool::new(items))
}

/// Parse a YYYY-MM-DD date, defaulting to today.
pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
        None => Ok(chrono::Utc::now().date_naive()),
    }
}
