use studyloop_core::CycleOutcome;

use super::common::{load_engine, load_pool, save_engine, CliResult};

pub fn run() -> CliResult {
    let mut engine = load_engine()?;
    let pool = load_pool()?;

    match engine.run_sync_cycle(&pool)? {
        CycleOutcome::Skipped(reason) => {
            println!("sync skipped: {reason:?}");
        }
        CycleOutcome::Completed {
            generated_days,
            scheduled_today,
            mode,
            restructured,
        } => {
            println!("sync complete: {generated_days} day(s) generated, mode {mode}");
            if scheduled_today {
                println!("today's plan scheduled");
            }
            if let Some(performance) = restructured {
                println!("future days restructured ({performance:?})");
            }
        }
    }
    save_engine(&engine)
}
