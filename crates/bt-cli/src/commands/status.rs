//! Status command for showing stored records by kind and the sleep timer.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use bt_db::Database;

use super::util::format_date_time;
use crate::Config;
use crate::sleep_timer::{SleepTimer, TimerState};

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    tz: &Tz,
) -> Result<()> {
    let kinds = db.last_event_times_by_kind()?;

    writeln!(writer, "Baby tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    match SleepTimer::new(&config.sleep_timer_path).state()? {
        TimerState::NoActiveSleep => writeln!(writer, "Sleep timer: idle")?,
        TimerState::SleepInProgress { started_at } => writeln!(
            writer,
            "Sleep timer: running since {}",
            format_date_time(started_at, tz)
        )?,
    }

    if kinds.is_empty() {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Records: {}", db.event_count()?)?;
    for kind in kinds {
        let last = DateTime::parse_from_rfc3339(&kind.last_event)
            .with_context(|| format!("invalid stored timestamp: {}", kind.last_event))?
            .with_timezone(&Utc);
        writeln!(
            writer,
            "- {}: {} (last {})",
            kind.kind,
            kind.count,
            format_date_time(last, tz)
        )?;
    }

    Ok(())
}
