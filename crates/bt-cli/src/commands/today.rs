//! Today command: daily totals plus the latest events.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::TimeZone;

use bt_core::{Clock, Dashboard, Event, EventStore, Tracker};

use super::util::{event_detail, format_hours, format_time, kind_label};

pub fn run<W, S, C, Tz>(writer: &mut W, tracker: &Tracker<S, C>, tz: &Tz, json: bool) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let dashboard = tracker.dashboard(tz)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&dashboard)?)?;
    } else {
        write!(writer, "{}", format_dashboard(&dashboard, tz))?;
    }
    Ok(())
}

/// Formats the dashboard for the terminal.
pub fn format_dashboard<Tz: TimeZone>(dashboard: &Dashboard, tz: &Tz) -> String {
    let mut out = String::new();
    let totals = &dashboard.today.totals;

    let _ = writeln!(out, "TODAY: {}", dashboard.today.date.format("%A, %B %-d"));
    let _ = writeln!(
        out,
        "Feedings: {} ({}ml)",
        totals.feeding_count, totals.total_formula_ml
    );
    let _ = writeln!(out, "Diapers:  {}", totals.diaper_count);
    let _ = writeln!(out, "Sleep:    {}", format_hours(totals.sleep_hours));
    let _ = writeln!(out);

    if dashboard.recent.is_empty() {
        let _ = writeln!(out, "No events recorded yet.");
        let _ = writeln!(out, "Run 'bt feed 120' to log your first feeding.");
        return out;
    }

    let _ = writeln!(out, "RECENT");
    for event in &dashboard.recent {
        let _ = writeln!(out, "{}", recent_line(event, tz));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total records: {}", dashboard.total_records);
    out
}

fn recent_line<Tz: TimeZone>(event: &Event, tz: &Tz) -> String {
    let day = event.timestamp.with_timezone(tz).naive_local().format("%b %-d");
    let mut line = format!(
        "- {day}, {}: {} {}",
        format_time(event.timestamp, tz),
        kind_label(&event.kind),
        event_detail(event, tz)
    );
    if let Some(notes) = &event.notes {
        let _ = write!(line, " ({notes})");
    }
    line
}
