//! Feed and diaper commands.

use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;

use bt_core::{Clock, DiaperType, Event, EventKind, EventStore, NewEvent, Tracker};

use super::util::{event_detail, format_time, parse_optional};

/// Logs a feeding of `amount_ml` at `at` (default now).
pub fn feed<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    tz: &Tz,
    amount_ml: i64,
    at: Option<&str>,
    notes: Option<&str>,
) -> Result<Event>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let at = parse_optional(at, tracker.clock().now())?;
    record(writer, tracker, tz, with_notes(NewEvent::feeding(amount_ml).at(at), notes))
}

/// Logs a diaper change at `at` (default now).
pub fn diaper<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    tz: &Tz,
    diaper_type: DiaperType,
    at: Option<&str>,
    notes: Option<&str>,
) -> Result<Event>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let at = parse_optional(at, tracker.clock().now())?;
    record(writer, tracker, tz, with_notes(NewEvent::diaper(diaper_type).at(at), notes))
}

pub(super) fn with_notes(new_event: NewEvent, notes: Option<&str>) -> NewEvent {
    match notes {
        Some(notes) => new_event.notes(notes),
        None => new_event,
    }
}

/// Validates and stores the event, then prints a one-line confirmation.
pub(super) fn record<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    tz: &Tz,
    new_event: NewEvent,
) -> Result<Event>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let event = tracker.log(new_event)?;
    writeln!(writer, "{}", confirmation(&event, tz))?;
    Ok(event)
}

fn confirmation<Tz: TimeZone>(event: &Event, tz: &Tz) -> String {
    let detail = event_detail(event, tz);
    match event.kind {
        EventKind::Sleep { .. } => format!("Logged sleep: {detail}"),
        EventKind::Feeding { .. } | EventKind::Diaper { .. } => format!(
            "Logged {}: {detail} at {}",
            event.kind.as_str(),
            format_time(event.timestamp, tz)
        ),
    }
}
