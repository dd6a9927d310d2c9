//! Ties the event store, the clock and the analytics engine together.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::analytics::{
    DailySnapshot, MonthlyProjection, WeekStats, daily_snapshot, monthly_projection, weekly_trend,
};
use crate::clock::Clock;
use crate::config::AnalyticsConfig;
use crate::event::{Event, NewEvent};
use crate::store::{EventStore, StoreError};
use crate::timeline::{Timeline, grouped_timeline, recent};
use crate::types::ValidationError;

/// Number of events shown in the dashboard's recent list.
pub const RECENT_LIMIT: usize = 5;

/// Errors from tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Today's overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: DailySnapshot,
    pub total_records: usize,
    pub recent: Vec<Event>,
}

/// Trend and projection computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub reference: DateTime<Utc>,
    pub weeks: Vec<WeekStats>,
    pub projection: MonthlyProjection,
}

/// Logging and reporting over an injected store and clock.
///
/// Every read loads the full event log and runs the pure aggregation
/// functions against it; nothing is cached between calls.
#[derive(Debug)]
pub struct Tracker<S, C> {
    store: S,
    clock: C,
    config: AnalyticsConfig,
}

impl<S: EventStore, C: Clock> Tracker<S, C> {
    pub const fn new(store: S, clock: C, config: AnalyticsConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and records a new event.
    ///
    /// Nothing is appended when validation fails.
    pub fn log(&mut self, new_event: NewEvent) -> Result<Event, TrackerError> {
        let event = new_event.build(&self.clock)?;
        self.store.append(&event)?;
        tracing::debug!(id = %event.id, kind = event.kind.as_str(), "event logged");
        Ok(event)
    }

    /// Loads a snapshot of every stored event.
    pub fn events(&self) -> Result<Vec<Event>, TrackerError> {
        Ok(self.store.load_all()?)
    }

    /// Today's totals plus the most recent events.
    pub fn dashboard<Tz: TimeZone>(&self, tz: &Tz) -> Result<Dashboard, TrackerError> {
        let events = self.events()?;
        let today = self.clock.now().with_timezone(tz).date_naive();
        Ok(Dashboard {
            today: daily_snapshot(&events, today, tz),
            total_records: events.len(),
            recent: recent(&events, RECENT_LIMIT).into_iter().cloned().collect(),
        })
    }

    /// The event log grouped by day.
    pub fn timeline<Tz: TimeZone>(&self, tz: &Tz) -> Result<Timeline, TrackerError> {
        let events = self.events()?;
        Ok(grouped_timeline(&events, tz))
    }

    /// Weekly trend over `week_count` weeks (the configured count when
    /// `None`) and the monthly projection, both as of now.
    pub fn report<Tz: TimeZone>(
        &self,
        week_count: Option<usize>,
        tz: &Tz,
    ) -> Result<Report, TrackerError> {
        let events = self.events()?;
        let reference = self.clock.now();
        let week_count = week_count.unwrap_or(self.config.trend_weeks);
        Ok(Report {
            reference,
            weeks: weekly_trend(&events, reference, week_count, &self.config, tz),
            projection: monthly_projection(&events, reference, &self.config),
        })
    }
}
