//! Sleep logging and the sleep timer.

use std::io::Write;

use anyhow::Result;
use chrono::{Duration, TimeZone};

use bt_core::{Clock, Event, EventStore, NewEvent, Tracker};

use super::log::{record, with_notes};
use super::util::{format_hours, format_time, parse_datetime, parse_optional};
use crate::sleep_timer::{SleepTimer, TimerState};

/// Note attached to sleeps logged through the timer when none is given.
pub const TIMER_NOTE: &str = "Quick logged with timer";

/// Logs a finished sleep from `start` (default one hour before `end`) to
/// `end` (default now).
pub fn log<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    tz: &Tz,
    start: Option<&str>,
    end: Option<&str>,
    notes: Option<&str>,
) -> Result<Event>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let now = tracker.clock().now();
    let end = parse_optional(end, now)?;
    let start = match start {
        Some(start) => parse_datetime(start, now)?,
        None => end - Duration::hours(1),
    };
    record(writer, tracker, tz, with_notes(NewEvent::sleep(start, end), notes))
}

/// Starts the timer at `at` (default now).
pub fn start<W: Write, Tz: TimeZone>(
    writer: &mut W,
    timer: &SleepTimer,
    clock: &impl Clock,
    tz: &Tz,
    at: Option<&str>,
) -> Result<()> {
    let started_at = parse_optional(at, clock.now())?;
    timer.start(started_at)?;
    writeln!(
        writer,
        "Sleep timer started at {}",
        format_time(started_at, tz)
    )?;
    Ok(())
}

/// Stops the timer and logs the sleep it measured.
///
/// The timer is only cleared once the event has been stored.
pub fn stop<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    timer: &SleepTimer,
    tz: &Tz,
    at: Option<&str>,
    notes: Option<&str>,
) -> Result<Event>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let started_at = timer.require_running()?;
    let ended_at = parse_optional(at, tracker.clock().now())?;
    let new_event = NewEvent::sleep(started_at, ended_at).notes(notes.unwrap_or(TIMER_NOTE));

    let event = record(writer, tracker, tz, new_event)?;
    timer.clear()?;
    Ok(event)
}

/// Prints whether a sleep is being timed, and for how long.
pub fn status<W: Write, Tz: TimeZone>(
    writer: &mut W,
    timer: &SleepTimer,
    clock: &impl Clock,
    tz: &Tz,
) -> Result<()> {
    match timer.state()? {
        TimerState::NoActiveSleep => writeln!(writer, "No sleep in progress.")?,
        TimerState::SleepInProgress { started_at } => {
            let elapsed = clock.now() - started_at;
            #[expect(
                clippy::cast_precision_loss,
                reason = "elapsed seconds fit comfortably in f64 precision"
            )]
            let hours = elapsed.num_seconds().max(0) as f64 / 3600.0;
            writeln!(
                writer,
                "Sleep in progress since {} ({})",
                format_time(started_at, tz),
                format_hours(hours)
            )?;
        }
    }
    Ok(())
}
