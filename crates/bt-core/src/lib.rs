//! Core domain logic for the baby tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: validated feeding, diaper and sleep records
//! - Analytics: daily totals, weekly trends and monthly supply projections
//! - Capabilities: the event store and clock the tracker is given

mod analytics;
mod clock;
mod config;
pub mod event;
mod store;
mod timeline;
mod tracker;
pub mod types;

pub use analytics::{
    DailySnapshot, MonthlyProjection, Rollup, WeekStats, daily_snapshot, monthly_projection,
    start_of_week, weekly_trend,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalyticsConfig, MAX_TREND_WEEKS};
pub use event::{Event, EventKind, NewEvent, Payload};
pub use store::{EventStore, MemoryStore, StoreError};
pub use timeline::{DayGroup, Timeline, grouped_timeline, recent};
pub use tracker::{Dashboard, RECENT_LIMIT, Report, Tracker, TrackerError};
pub use types::{DiaperType, EventId, FEEDING_ML_RANGE, ValidationError};
