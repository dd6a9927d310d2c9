//! Import command for loading an exported JSON array into the local `SQLite` store.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use bt_core::Event;
use bt_db::Database;

/// Imports events from `input` (`-` for stdin), returning how many were new.
pub fn run(db: &mut Database, input: &Path) -> Result<usize> {
    let events = if input == Path::new("-") {
        parse_events(io::stdin().lock())?
    } else {
        let file =
            File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
        parse_events(BufReader::new(file))
            .with_context(|| format!("failed to import {}", input.display()))?
    };

    let inserted = db.insert_events(&events)?;
    tracing::debug!(total = events.len(), inserted, "import finished");
    Ok(inserted)
}

/// Parses a JSON array of events in the portable format.
fn parse_events<R: Read>(reader: R) -> Result<Vec<Event>> {
    let events: Vec<Event> =
        serde_json::from_reader(reader).context("expected a JSON array of events")?;
    let inverted = events.iter().filter(|e| e.is_inverted_sleep()).count();
    if inverted > 0 {
        tracing::warn!(inverted, "imported sleep events end before they start");
    }
    Ok(events)
}
