//! Day-by-day grouping of the event log.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use crate::event::Event;

/// Events that happened on one calendar day, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

/// The event log partitioned by day, most recent day first.
///
/// Days without events have no group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    days: Vec<DayGroup>,
}

impl Timeline {
    /// All day groups, newest first.
    pub fn days(&self) -> &[DayGroup] {
        &self.days
    }

    /// Every event across all days, newest first.
    pub fn all(&self) -> impl Iterator<Item = &Event> {
        self.days.iter().flat_map(|group| group.events.iter())
    }

    /// Events for one day; empty when nothing was logged that day.
    pub fn day(&self, date: NaiveDate) -> &[Event] {
        self.days
            .iter()
            .find(|group| group.date == date)
            .map(|group| group.events.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Newest first, ties broken by ID so the order never depends on input order.
fn newest_first(a: &Event, b: &Event) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}

/// Groups events by the calendar day of their timestamp in `tz`.
pub fn grouped_timeline<Tz: TimeZone>(events: &[Event], tz: &Tz) -> Timeline {
    let mut by_date: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        by_date
            .entry(event.local_date(tz))
            .or_default()
            .push(event.clone());
    }

    let days = by_date
        .into_iter()
        .rev()
        .map(|(date, mut events)| {
            events.sort_by(newest_first);
            DayGroup { date, events }
        })
        .collect();

    Timeline { days }
}

/// The `limit` most recent events.
pub fn recent(events: &[Event], limit: usize) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by(|a, b| newest_first(a, b));
    sorted.truncate(limit);
    sorted
}
