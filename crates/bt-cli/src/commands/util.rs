//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use bt_core::{Event, EventKind};

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Wall-clock formats accepted for local times, as typed into a form.
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a datetime string as ISO 8601, local wall-clock time, or relative time.
///
/// Supports:
/// - "now"
/// - ISO 8601: "2025-01-29T10:30:00Z"
/// - Local: "2025-01-29T10:30", "2025-01-29 10:30"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_utc(naive);
        }
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2025-01-29T10:30:00Z), local time (e.g., 2025-01-29T10:30) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Resolves a local wall-clock time. Picks the earlier instant when a DST
/// fall-back makes it ambiguous.
fn local_to_utc(naive: NaiveDateTime) -> anyhow::Result<DateTime<Utc>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => anyhow::bail!("{naive} does not exist in the local time zone"),
    }
}

/// Parses an optional time argument, defaulting to `now`.
pub fn parse_optional(s: Option<&str>, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    s.map_or(Ok(now), |s| parse_datetime(s, now))
}

/// Formats fractional hours with one decimal, e.g. "1.5h".
pub fn format_hours(hours: f64) -> String {
    format!("{hours:.1}h")
}

/// Formats an integer with thousands separators, e.g. "6,000".
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a clock time in `tz`, e.g. "9:05 PM".
pub fn format_time<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String {
    at.with_timezone(tz)
        .naive_local()
        .format("%-I:%M %p")
        .to_string()
}

/// Formats a date and clock time in `tz`, e.g. "Jan 29, 2025 9:05 PM".
pub fn format_date_time<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> String {
    at.with_timezone(tz)
        .naive_local()
        .format("%b %-d, %Y %-I:%M %p")
        .to_string()
}

/// Short kind-specific detail for an event: amount, diaper type or duration.
pub fn event_detail<Tz: TimeZone>(event: &Event, tz: &Tz) -> String {
    match event.kind {
        EventKind::Feeding { amount_ml } => {
            amount_ml.map_or_else(|| "?ml".to_string(), |ml| format!("{ml}ml"))
        }
        EventKind::Diaper { diaper_type } => diaper_type.to_string(),
        EventKind::Sleep {
            sleep_start,
            sleep_end,
        } => format!(
            "{} ({} - {})",
            format_hours(event.sleep_hours()),
            format_time(sleep_start, tz),
            format_time(sleep_end, tz)
        ),
    }
}

/// Capitalized kind name for display, e.g. "Feeding".
pub const fn kind_label(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Feeding { .. } => "Feeding",
        EventKind::Diaper { .. } => "Diaper",
        EventKind::Sleep { .. } => "Sleep",
    }
}
