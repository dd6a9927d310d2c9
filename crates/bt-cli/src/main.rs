use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::{export, import, log, report, sleep, status, timeline, today};
use bt_cli::sleep_timer::SleepTimer;
use bt_cli::{Cli, Commands, Config, SleepAction};
use bt_core::{SystemClock, Tracker};
use bt_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    Ok((db, config))
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let timer = SleepTimer::new(&config.sleep_timer_path);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let tz = Local;

    match command {
        Commands::Feed {
            amount_ml,
            at,
            notes,
        } => {
            let mut tracker = tracker(&mut db, &config);
            log::feed(
                &mut out,
                &mut tracker,
                &tz,
                *amount_ml,
                at.as_deref(),
                notes.as_deref(),
            )?;
        }
        Commands::Diaper {
            diaper_type,
            at,
            notes,
        } => {
            let mut tracker = tracker(&mut db, &config);
            log::diaper(
                &mut out,
                &mut tracker,
                &tz,
                *diaper_type,
                at.as_deref(),
                notes.as_deref(),
            )?;
        }
        Commands::Sleep(action) => {
            let mut tracker = tracker(&mut db, &config);
            match action {
                SleepAction::Log { start, end, notes } => {
                    sleep::log(
                        &mut out,
                        &mut tracker,
                        &tz,
                        start.as_deref(),
                        end.as_deref(),
                        notes.as_deref(),
                    )?;
                }
                SleepAction::Start { at } => {
                    sleep::start(&mut out, &timer, &SystemClock, &tz, at.as_deref())?;
                }
                SleepAction::Stop { at, notes } => {
                    sleep::stop(
                        &mut out,
                        &mut tracker,
                        &timer,
                        &tz,
                        at.as_deref(),
                        notes.as_deref(),
                    )?;
                }
                SleepAction::Status => sleep::status(&mut out, &timer, &SystemClock, &tz)?,
            }
        }
        Commands::Today { json } => {
            today::run(&mut out, &tracker(&mut db, &config), &tz, *json)?;
        }
        Commands::Timeline {
            all,
            yesterday,
            date,
        } => {
            let selection = match (all, yesterday, date) {
                (true, _, _) => timeline::Selection::All,
                (_, true, _) => timeline::Selection::Yesterday,
                (_, _, Some(date)) => timeline::Selection::Date(*date),
                _ => timeline::Selection::Today,
            };
            timeline::run(&mut out, &tracker(&mut db, &config), &tz, selection)?;
        }
        Commands::Report { weeks, json } => {
            report::run(&mut out, &tracker(&mut db, &config), &tz, *weeks, *json)?;
        }
        Commands::Export { output } => {
            export::run(&mut out, &tracker(&mut db, &config), &tz, output.as_deref())?;
        }
        Commands::Import { input } => {
            let inserted = import::run(&mut db, input)?;
            writeln!(out, "Imported {inserted} new events")?;
        }
        Commands::Status => status::run(&mut out, &db, &config, &tz)?,
    }

    Ok(())
}

/// Builds a tracker over the opened database and the system clock.
fn tracker<'a>(db: &'a mut Database, config: &Config) -> Tracker<&'a mut Database, SystemClock> {
    Tracker::new(db, SystemClock, config.analytics.clone())
}
