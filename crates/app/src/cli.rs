use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use services::DEFAULT_RECENT_LIMIT;
use workout_core::model::{DEFAULT_REST_SECONDS, WeightRecordDraft, WeightRecordId};

use crate::db_url::DEFAULT_DB_URL;

#[derive(Parser)]
#[command(name = "workout", version, about = "Weekly workout plan and progress tracker")]
pub struct Cli {
    /// SQLite database URL or path
    #[arg(long, global = true, env = "WORKOUT_DB_URL", default_value = DEFAULT_DB_URL)]
    pub db: String,

    /// Sign in with this e-mail; without it nothing is saved
    #[arg(long, global = true, env = "WORKOUT_USER")]
    pub user: Option<String>,

    /// Rest started after a non-final set (0 disables)
    #[arg(long, global = true, env = "WORKOUT_REST_SECONDS", default_value_t = DEFAULT_REST_SECONDS)]
    pub rest_seconds: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the week's plan with progress
    Show,

    /// Show overall completion
    Progress,

    /// Record one finished set (numbers start at 1)
    CompleteSet { day: usize, exercise: usize },

    /// Mark an exercise done or not done (numbers start at 1)
    Toggle { day: usize, exercise: usize },

    /// Clear all progress for the week
    Reset,

    /// Replace the plan with a JSON plan document
    Import { file: PathBuf },

    /// Write the plan as a JSON document
    Export {
        /// Output file; `-` prints to stdout. Defaults to workout-week-N.json
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a rest countdown in the foreground
    Timer {
        #[arg(default_value_t = DEFAULT_REST_SECONDS)]
        seconds: u32,
    },

    /// Track lifted weights
    #[command(subcommand)]
    Weight(WeightCommand),
}

#[derive(Subcommand)]
pub enum WeightCommand {
    /// Log a lift
    Add(WeightArgs),

    /// List logged lifts, newest first
    List {
        /// Only this exercise
        exercise: Option<String>,

        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Show progress per exercise
    Progress {
        /// Only this exercise
        exercise: Option<String>,
    },

    /// Replace a logged lift
    Update {
        id: WeightRecordId,

        #[command(flatten)]
        record: WeightArgs,
    },

    /// Delete a logged lift
    Delete { id: WeightRecordId },
}

#[derive(Args)]
pub struct WeightArgs {
    pub exercise: String,

    pub weight: f64,

    #[arg(short, long, default_value_t = 1)]
    pub reps: u32,

    #[arg(short, long, default_value_t = 1)]
    pub sets: u32,

    /// Defaults to today (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    #[arg(short, long)]
    pub notes: Option<String>,
}

impl WeightArgs {
    pub fn into_draft(self, today: NaiveDate) -> WeightRecordDraft {
        WeightRecordDraft {
            exercise_name: self.exercise,
            weight: self.weight,
            reps: self.reps,
            sets: self.sets,
            date: self.date.unwrap_or(today),
            notes: self.notes,
        }
    }
}
