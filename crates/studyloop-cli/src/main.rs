use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyloop-cli", version, about = "Studyloop CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync cycle against the current content pool
    Sync,
    /// Daily goals
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Action lifecycle events
    Action {
        #[command(subcommand)]
        action: commands::action::ActionAction,
    },
    /// Engine metrics and widget payload
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Completion forecasts
    Forecast,
    /// Period digests
    Digest {
        #[command(subcommand)]
        action: commands::digest::DigestAction,
    },
    /// Content pool management
    Pool {
        #[command(subcommand)]
        action: commands::pool::PoolAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Sync => commands::sync::run(),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Action { action } => commands::action::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Forecast => commands::forecast::run(),
        Commands::Digest { action } => commands::digest::run(action),
        Commands::Pool { action } => commands::pool::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
