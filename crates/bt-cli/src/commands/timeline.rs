//! Timeline command: events grouped by local day, newest first.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Days, NaiveDate, TimeZone};

use bt_core::{Clock, Event, EventStore, Tracker};

use super::util::{event_detail, format_time, kind_label};

/// Which days to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Today,
    Yesterday,
    Date(NaiveDate),
    All,
}

pub fn run<W, S, C, Tz>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    tz: &Tz,
    selection: Selection,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
{
    let timeline = tracker.timeline(tz)?;
    let today = tracker.clock().now().with_timezone(tz).date_naive();

    let day = match selection {
        Selection::All => {
            if timeline.is_empty() {
                writeln!(writer, "No events recorded yet.")?;
            }
            for (i, group) in timeline.days().iter().enumerate() {
                if i > 0 {
                    writeln!(writer)?;
                }
                write!(writer, "{}", format_day(group.date, today, &group.events, tz))?;
            }
            return Ok(());
        }
        Selection::Today => today,
        Selection::Yesterday => today - Days::new(1),
        Selection::Date(date) => date,
    };

    let events = timeline.day(day);
    if events.is_empty() {
        writeln!(writer, "No events for {}.", day_label(day, today))?;
    } else {
        write!(writer, "{}", format_day(day, today, events, tz))?;
    }
    Ok(())
}

/// "Today", "Yesterday", or the full date.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%A, %B %-d, %Y").to_string()
    }
}

fn format_day<Tz: TimeZone>(date: NaiveDate, today: NaiveDate, events: &[Event], tz: &Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", day_label(date, today));
    for event in events {
        let _ = write!(
            out,
            "  {:>8}  {:<7}  {}",
            format_time(event.timestamp, tz),
            kind_label(&event.kind),
            event_detail(event, tz)
        );
        if let Some(notes) = &event.notes {
            let _ = write!(out, "  {notes}");
        }
        let _ = writeln!(out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::{AnalyticsConfig, DiaperType, FixedClock, MemoryStore, NewEvent};
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, 20, 0, 0).unwrap()
    }

    fn tracker() -> Tracker<MemoryStore, FixedClock> {
        let mut tracker = Tracker::new(
            MemoryStore::new(),
            FixedClock(now()),
            AnalyticsConfig::default(),
        );
        tracker
            .log(NewEvent::feeding(120).at(now() - Duration::hours(11)))
            .unwrap();
        tracker
            .log(
                NewEvent::diaper(DiaperType::Dirty)
                    .at(now() - Duration::minutes(45))
                    .notes("blowout"),
            )
            .unwrap();
        tracker
            .log(NewEvent::feeding(90).at(now() - Duration::days(1)))
            .unwrap();
        tracker
            .log(NewEvent::diaper(DiaperType::Wet).at(now() - Duration::days(3)))
            .unwrap();
        tracker
    }

    fn render(selection: Selection) -> String {
        let mut output = Vec::new();
        run(&mut output, &tracker(), &Utc, selection).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn labels_relative_days() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 29).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2025, 1, 28).unwrap(), today),
            "Yesterday"
        );
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2025, 1, 26).unwrap(), today),
            "Sunday, January 26, 2025"
        );
    }

    #[test]
    fn today_shows_newest_first() {
        assert_eq!(
            render(Selection::Today),
            "Today\n\
             \x20  7:15 PM  Diaper   dirty  blowout\n\
             \x20  9:00 AM  Feeding  120ml\n"
        );
    }

    #[test]
    fn yesterday_and_specific_dates() {
        assert_eq!(
            render(Selection::Yesterday),
            "Yesterday\n\x20  8:00 PM  Feeding  90ml\n"
        );
        assert_eq!(
            render(Selection::Date(NaiveDate::from_ymd_opt(2025, 1, 27).unwrap())),
            "No events for Monday, January 27, 2025.\n"
        );
    }

    #[test]
    fn all_lists_every_day() {
        let output = render(Selection::All);
        let headers: Vec<&str> = output
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with(' '))
            .collect();

        assert_eq!(
            headers,
            vec!["Today", "Yesterday", "Sunday, January 26, 2025"]
        );
    }
}
