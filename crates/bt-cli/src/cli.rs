//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};

use bt_core::{DiaperType, MAX_TREND_WEEKS};

/// Baby tracker.
///
/// Logs feedings, diaper changes and sleep, and summarises them into daily
/// totals, weekly trends and a monthly supply forecast.
#[derive(Debug, Parser)]
#[command(name = "bt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a feeding.
    Feed {
        /// Amount of formula in milliliters (1-500).
        #[arg(allow_negative_numbers = true)]
        amount_ml: i64,

        /// When the feeding happened (default: now).
        #[arg(long)]
        at: Option<String>,

        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Log a diaper change.
    Diaper {
        /// Diaper type: wet, dirty or both.
        diaper_type: DiaperType,

        /// When the change happened (default: now).
        #[arg(long)]
        at: Option<String>,

        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Log sleep, or drive the sleep timer.
    #[command(subcommand)]
    Sleep(SleepAction),

    /// Show today's totals and the most recent events.
    Today {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show events grouped by day.
    Timeline {
        /// Show every day instead of only today.
        #[arg(long, conflicts_with_all = ["yesterday", "date"])]
        all: bool,

        /// Show yesterday.
        #[arg(long, conflicts_with = "date")]
        yesterday: bool,

        /// Show a specific day (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show weekly trends and the monthly supply forecast.
    Report {
        /// Number of weeks in the trend (default from config).
        #[arg(
            long,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_TREND_WEEKS as u64)
        )]
        weeks: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export every event as a JSON array.
    Export {
        /// Output file, or `-` for stdout (default: baby-tracker-data-<date>.json).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import events from a JSON array, skipping ids already stored.
    Import {
        /// Input file, or `-` for stdin.
        input: PathBuf,
    },

    /// Show database and sleep timer status.
    Status,
}

/// Sleep subcommands.
#[derive(Debug, Subcommand)]
pub enum SleepAction {
    /// Log a finished sleep period.
    Log {
        /// When the sleep started (default: one hour before the end).
        #[arg(long)]
        start: Option<String>,

        /// When the sleep ended (default: now).
        #[arg(long)]
        end: Option<String>,

        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Start the sleep timer.
    Start {
        /// When the sleep started (default: now).
        #[arg(long)]
        at: Option<String>,
    },

    /// Stop the sleep timer and log the sleep.
    Stop {
        /// When the sleep ended (default: now).
        #[arg(long)]
        at: Option<String>,

        /// Free-text notes (default: "Quick logged with timer").
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show whether the sleep timer is running.
    Status,
}
