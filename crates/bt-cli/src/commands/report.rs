//! Report command for weekly trends and the monthly supply forecast.
//!
//! This module implements `bt report` with human-readable and JSON output.
//! All numbers come from one snapshot of the event log taken at
//! `generated_at`.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use bt_core::{Clock, EventStore, MonthlyProjection, Rollup, Tracker, WeekStats};

use super::util::{format_hours, format_thousands};

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub timezone: String,
    pub window_days: u32,
    pub horizon_days: u32,
    pub weeks: Vec<WeekStats>,
    pub projection: MonthlyProjection,
}

impl ReportData {
    fn is_empty(&self) -> bool {
        self.weeks.iter().all(|w| w.totals == Rollup::default())
            && self.projection == MonthlyProjection::default()
    }
}

// ========== Formatting Helpers ==========

/// Formats a week range, e.g. "Jan 26 - Feb 1".
pub fn week_label(week: &WeekStats) -> String {
    format!(
        "{} - {}",
        week.week_start.format("%b %-d"),
        week.week_end.format("%b %-d")
    )
}

/// Formats an amount of money with two decimals, e.g. "$31.25".
pub fn format_cost(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Report Generation ==========

/// Generates report data from the tracker as of its clock's now.
pub fn generate_report_data<S, C, Tz>(
    tracker: &Tracker<S, C>,
    week_count: Option<usize>,
    tz: &Tz,
    timezone: String,
) -> Result<ReportData>
where
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let report = tracker.report(week_count, tz)?;
    let config = tracker.config();

    Ok(ReportData {
        generated_at: report.reference,
        timezone,
        window_days: config.projection_window_days.get(),
        horizon_days: config.projection_horizon_days,
        weeks: report.weeks,
        projection: report.projection,
    })
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    // Header
    if let Some(current) = data.weeks.last() {
        let _ = writeln!(
            output,
            "BABY REPORT: Week of {}",
            current.week_start.format("%b %-d, %Y")
        );
    } else {
        let _ = writeln!(output, "BABY REPORT");
    }

    if data.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "No events recorded in the last {} weeks.",
            data.weeks.len()
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "Hint: Run 'bt feed 120' to log your first feeding.");
        return output;
    }

    // WEEKLY TRENDS section, bars scaled to the busiest feeding week
    let max_formula = data
        .weeks
        .iter()
        .map(|w| w.totals.total_formula_ml)
        .max()
        .unwrap_or(0);

    let _ = writeln!(output);
    let _ = writeln!(output, "WEEKLY TRENDS");
    let _ = writeln!(output, "─────────────");
    for week in &data.weeks {
        let totals = &week.totals;
        let _ = writeln!(
            output,
            "{:<16} {}",
            week_label(week),
            progress_bar(totals.total_formula_ml, max_formula)
        );
        let _ = writeln!(
            output,
            "  Feedings: {} ({}ml, avg {}ml)",
            totals.feeding_count,
            format_thousands(totals.total_formula_ml),
            week.avg_feeding_amount
        );
        let _ = writeln!(output, "  Diapers:  {}", totals.diaper_count);
        let _ = writeln!(output, "  Sleep:    {}", format_hours(totals.sleep_hours));
    }

    // MONTHLY PLANNING section
    let projection = &data.projection;
    let _ = writeln!(output);
    let _ = writeln!(output, "MONTHLY PLANNING");
    let _ = writeln!(output, "────────────────");
    let _ = writeln!(output, "Diapers:        {}", format_thousands(projection.diapers));
    let _ = writeln!(
        output,
        "Formula:        {}ml ({} units)",
        format_thousands(projection.formula_ml),
        projection.formula_units
    );
    let _ = writeln!(
        output,
        "Estimated cost: {}",
        format_cost(projection.estimated_cost)
    );
    let _ = writeln!(
        output,
        "  Diapers:      {}",
        format_cost(projection.diaper_cost)
    );
    let _ = writeln!(
        output,
        "  Formula:      {}",
        format_cost(projection.formula_cost)
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Based on the last {} days of usage, projected over {} days.",
        data.window_days, data.horizon_days
    );
    let _ = writeln!(output, "Actual costs vary by brand and location.");

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: String,
    pub timezone: &'a str,
    pub weeks: Vec<JsonWeek<'a>>,
    pub projection: JsonProjection<'a>,
}

#[derive(Debug, Serialize)]
pub struct JsonWeek<'a> {
    pub label: String,
    #[serde(flatten)]
    pub stats: &'a WeekStats,
}

#[derive(Debug, Serialize)]
pub struct JsonProjection<'a> {
    pub window_days: u32,
    pub horizon_days: u32,
    #[serde(flatten)]
    pub totals: &'a MonthlyProjection,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: &data.timezone,
        weeks: data
            .weeks
            .iter()
            .map(|stats| JsonWeek {
                label: week_label(stats),
                stats,
            })
            .collect(),
        projection: JsonProjection {
            window_days: data.window_days,
            horizon_days: data.horizon_days,
            totals: &data.projection,
        },
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W, S, C, Tz>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    tz: &Tz,
    week_count: Option<usize>,
    json: bool,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    let data = generate_report_data(tracker, week_count, tz, timezone)?;

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}
