use super::common::{load_engine, CliResult};

pub fn run() -> CliResult {
    let engine = load_engine()?;
    match engine.forecast() {
        Some(forecast) => println!("{}", serde_json::to_string_pretty(forecast)?),
        None => println!("no forecast yet; run `studyloop-cli sync` first"),
    }
    Ok(())
}
