use clap::Subcommand;
use studyloop_core::Timeframe;

use super::common::{load_engine, CliResult};

#[derive(Subcommand)]
pub enum DigestAction {
    /// Today only
    Daily,
    /// Last 7 days
    Weekly,
    /// Last month
    Monthly,
}

pub fn run(action: DigestAction) -> CliResult {
    let engine = load_engine()?;
    let timeframe = match action {
        DigestAction::Daily => Timeframe::Daily,
        DigestAction::Weekly => Timeframe::Weekly,
        DigestAction::Monthly => Timeframe::Monthly,
    };
    let digest = engine.digest_for(timeframe);
    println!("{}", serde_json::to_string_pretty(&digest)?);
    Ok(())
}
