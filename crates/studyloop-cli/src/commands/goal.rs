use clap::Subcommand;

use super::common::{load_engine, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Today's goal
    Today,
    /// All live daily goals
    Week,
    /// Today's scheduled plan
    Plan,
}

pub fn run(action: GoalAction) -> CliResult {
    let engine = load_engine()?;
    match action {
        GoalAction::Today => match engine.today_goal() {
            Some(goal) => println!("{}", serde_json::to_string_pretty(goal)?),
            None => println!("no goal for today; run `studyloop-cli sync` first"),
        },
        GoalAction::Week => {
            println!(
                "{}",
                serde_json::to_string_pretty(&engine.state().daily_goals)?
            );
        }
        GoalAction::Plan => match engine.today_plan() {
            Some(plan) => println!("{}", serde_json::to_string_pretty(plan)?),
            None => println!("no plan for today"),
        },
    }
    Ok(())
}
