use clap::Subcommand;

use super::common::{load_engine, load_pool, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Rolling engine metrics
    Metrics,
    /// Widget payload (chart data, trend, completion percentage)
    Widget,
    /// Mined time patterns
    Patterns,
}

pub fn run(action: StatsAction) -> CliResult {
    let engine = load_engine()?;
    match action {
        StatsAction::Metrics => {
            println!("{}", serde_json::to_string_pretty(engine.metrics())?);
        }
        StatsAction::Widget => {
            let pool = load_pool()?;
            let payload = engine.widget_payload(&pool);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        StatsAction::Patterns => {
            println!(
                "{}",
                serde_json::to_string_pretty(&engine.state().time_patterns)?
            );
        }
    }
    Ok(())
}
