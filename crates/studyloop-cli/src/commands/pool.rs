use clap::Subcommand;
use studyloop_core::storage::data_dir;
use studyloop_core::LearnableItem;

use super::common::{load_pool, CliResult};

#[derive(Subcommand)]
pub enum PoolAction {
    /// Import a JSON file of learnable items
    Import { path: String },
    /// Show the current pool
    Show,
}

pub fn run(action: PoolAction) -> CliResult {
    match action {
        PoolAction::Import { path } => {
            let raw = std::fs::read_to_string(&path)?;
            // Validate before copying into the data directory.
            let items: Vec<LearnableItem> = serde_json::from_str(&raw)?;
            let target = data_dir()?.join("pool.json");
            std::fs::write(&target, raw)?;
            println!("imported {} item(s) to {}", items.len(), target.display());
        }
        PoolAction::Show => {
            let pool = load_pool()?;
            println!("{}", serde_json::to_string_pretty(pool.items())?);
        }
    }
    Ok(())
}
