use chrono::{NaiveTime, TimeZone};
use clap::Subcommand;
use studyloop_core::Mood;

use super::common::{load_engine, parse_date, save_engine, CliResult};

#[derive(Subcommand)]
pub enum ActionAction {
    /// Mark an action completed
    Complete {
        action_id: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark an action started
    Start {
        action_id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Move an action's slot to a new start time (HH:MM)
    Reschedule {
        action_id: String,
        time: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Record today's mood
    Mood {
        #[arg(value_parser = parse_mood)]
        mood: Mood,
    },
}

fn parse_mood(raw: &str) -> Result<Mood, String> {
    match raw {
        "great" => Ok(Mood::Great),
        "good" => Ok(Mood::Good),
        "okay" => Ok(Mood::Okay),
        "tired" => Ok(Mood::Tired),
        "stressed" => Ok(Mood::Stressed),
        other => Err(format!(
            "unknown mood '{other}' (expected great|good|okay|tired|stressed)"
        )),
    }
}

pub fn run(action: ActionAction) -> CliResult {
    let mut engine = load_engine()?;
    match action {
        ActionAction::Complete { action_id, date } => {
            let date = parse_date(date.as_deref())?;
            engine.mark_action_completed(date, &action_id);
            println!("completed {action_id} on {date}");
        }
        ActionAction::Start { action_id, date } => {
            let date = parse_date(date.as_deref())?;
            engine.mark_action_started(date, &action_id);
            println!("started {action_id} on {date}");
        }
        ActionAction::Reschedule {
            action_id,
            time,
            date,
        } => {
            let date = parse_date(date.as_deref())?;
            let time = NaiveTime::parse_from_str(&time, "%H:%M")?;
            let new_start = chrono::Utc.from_utc_datetime(&date.and_time(time));
            engine.reschedule_action(date, &action_id, new_start);
            println!("rescheduled {action_id} to {time}");
        }
        ActionAction::Mood { mood } => {
            let date = parse_date(None)?;
            engine.record_mood(date, mood);
            println!("mood recorded for {date}");
        }
    }
    save_engine(&engine)
}
