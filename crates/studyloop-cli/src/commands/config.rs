use clap::Subcommand;
use studyloop_core::{AppConfig, EngineMode};

use super::common::{load_engine, save_engine, CliResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the current engine config
    Show,
    /// Write a default config file
    Init,
    /// Set the operating mode explicitly (honored for two days)
    SetMode {
        #[arg(value_parser = parse_mode)]
        mode: EngineMode,
    },
}

fn parse_mode(raw: &str) -> Result<EngineMode, String> {
    match raw {
        "normal" => Ok(EngineMode::Normal),
        "boost" => Ok(EngineMode::Boost),
        "light" => Ok(EngineMode::Light),
        "lowLoad" => Ok(EngineMode::LowLoad),
        "recovery" => Ok(EngineMode::Recovery),
        other => Err(format!(
            "unknown mode '{other}' (expected normal|boost|light|lowLoad|recovery)"
        )),
    }
}

pub fn run(action: ConfigAction) -> CliResult {
    match action {
        ConfigAction::Show => {
            let engine = load_engine()?;
            println!("{}", serde_json::to_string_pretty(&engine.state().config)?);
        }
        ConfigAction::Init => {
            let config = AppConfig::default();
            config.save()?;
            println!("default config written");
        }
        ConfigAction::SetMode { mode } => {
            let mut engine = load_engine()?;
            engine.set_mode(mode);
            save_engine(&engine)?;
            println!("mode set to {mode}");
        }
    }
    Ok(())
}
