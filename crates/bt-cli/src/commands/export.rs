//! Implementation of the `bt export` command.
//!
//! Writes the whole event log as one pretty-printed JSON array in the
//! portable format, which `bt import` reads back.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone};

use bt_core::{Clock, Event, EventStore, Tracker};

/// Default export file name for `today`.
pub fn default_file_name(today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("baby-tracker-data-{}.json", today.format("%Y-%m-%d")))
}

/// Serializes `events` as a JSON array followed by a newline.
pub fn write_events<W: Write>(mut writer: W, events: &[Event]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, events).context("failed to serialize events")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Run the export command.
///
/// `output` of `-` writes to `stdout`; otherwise the array goes to the file
/// (default name when `None`) and a summary line goes to `stdout`.
pub fn run<W, S, C, Tz>(
    stdout: &mut W,
    tracker: &Tracker<S, C>,
    tz: &Tz,
    output: Option<&Path>,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let events = tracker.events()?;

    if output == Some(Path::new("-")) {
        return write_events(stdout, &events);
    }

    let path = output.map_or_else(
        || default_file_name(tracker.clock().now().with_timezone(tz).date_naive()),
        Path::to_path_buf,
    );
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    write_events(BufWriter::new(file), &events)?;

    tracing::debug!(path = %path.display(), count = events.len(), "events exported");
    writeln!(stdout, "Exported {} events to {}", events.len(), path.display())?;
    Ok(())
}
