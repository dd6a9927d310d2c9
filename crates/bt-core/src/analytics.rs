//! Aggregation over a snapshot of events.
//!
//! Every function here is pure: the same events and reference instant always
//! produce the same result, and empty input produces the zero value rather
//! than an error.
//!
//! # Calendar attribution
//!
//! Events belong to the calendar day of their `timestamp` in the caller's
//! time zone. A sleep that crosses midnight counts entirely towards the day
//! it started; its duration is never split.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::event::{Event, EventKind};

/// Totals over a set of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rollup {
    pub feeding_count: usize,
    /// Sum of feeding amounts; feedings without an amount add nothing.
    pub total_formula_ml: u64,
    pub diaper_count: usize,
    /// Unrounded sum of clamped sleep durations.
    pub sleep_hours: f64,
}

impl Rollup {
    fn add(&mut self, event: &Event) {
        match event.kind {
            EventKind::Feeding { amount_ml } => {
                self.feeding_count += 1;
                self.total_formula_ml += u64::from(amount_ml.unwrap_or(0));
            }
            EventKind::Diaper { .. } => self.diaper_count += 1,
            EventKind::Sleep { .. } => {
                if event.is_inverted_sleep() {
                    tracing::warn!(
                        event_id = %event.id,
                        "sleep ends before it starts; counting zero hours"
                    );
                }
                self.sleep_hours += event.sleep_hours();
            }
        }
    }

    /// Mean feeding amount rounded half up, or 0 without feedings.
    pub fn avg_feeding_amount(&self) -> u64 {
        let count = self.feeding_count as u64;
        if count == 0 {
            return 0;
        }
        (2 * self.total_formula_ml + count) / (2 * count)
    }
}

impl<'a> FromIterator<&'a Event> for Rollup {
    fn from_iter<I: IntoIterator<Item = &'a Event>>(iter: I) -> Self {
        let mut rollup = Self::default();
        for event in iter {
            rollup.add(event);
        }
        rollup
    }
}

/// Totals for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub totals: Rollup,
}

/// Totals for one calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekStats {
    /// First day of the week.
    pub week_start: NaiveDate,
    /// Last day of the week (inclusive).
    pub week_end: NaiveDate,
    #[serde(flatten)]
    pub totals: Rollup,
    pub avg_feeding_amount: u64,
}

/// Supply and cost estimate extrapolated from recent usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyProjection {
    pub diapers: u64,
    pub formula_ml: u64,
    /// Formula units (cans) needed to cover `formula_ml`.
    pub formula_units: u64,
    pub diaper_cost: f64,
    pub formula_cost: f64,
    pub estimated_cost: f64,
}

/// Computes totals for the events falling on `day`.
pub fn daily_snapshot<Tz: TimeZone>(events: &[Event], day: NaiveDate, tz: &Tz) -> DailySnapshot {
    let totals = events.iter().filter(|e| e.local_date(tz) == day).collect();
    DailySnapshot { date: day, totals }
}

/// First day of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// Computes per-week totals for the `week_count` calendar weeks ending with
/// the week that contains `reference`.
///
/// Weeks are returned oldest first and are contiguous. Callers keep
/// `week_count` within [`MAX_TREND_WEEKS`](crate::MAX_TREND_WEEKS); longer
/// spans would run past the start of the representable calendar.
pub fn weekly_trend<Tz: TimeZone>(
    events: &[Event],
    reference: DateTime<Utc>,
    week_count: usize,
    config: &AnalyticsConfig,
    tz: &Tz,
) -> Vec<WeekStats> {
    let today = reference.with_timezone(tz).date_naive();
    let current = start_of_week(today, config.week_start);

    let mut weeks: Vec<WeekStats> = std::iter::successors(Some(current), |start| {
        start.checked_sub_signed(Duration::weeks(1))
    })
    .take(week_count)
    .map(|week_start| {
        let week_end = week_start + Duration::days(6);
        let totals: Rollup = events
            .iter()
            .filter(|e| (week_start..=week_end).contains(&e.local_date(tz)))
            .collect();
        WeekStats {
            week_start,
            week_end,
            totals,
            avg_feeding_amount: totals.avg_feeding_amount(),
        }
    })
    .collect();

    // Computed newest first; reported oldest first.
    weeks.reverse();
    weeks
}

/// Projects supply needs over the configured horizon from the usage rate in
/// the trailing window `[reference - window, reference]`.
///
/// Physical quantities are rounded up so the estimate never under-provisions.
#[allow(clippy::cast_precision_loss)]
pub fn monthly_projection(
    events: &[Event],
    reference: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> MonthlyProjection {
    let window_days = u64::from(config.projection_window_days.get());
    let horizon_days = u64::from(config.projection_horizon_days);
    // A window reaching past the calendar start covers all history.
    let window_start = reference
        .checked_sub_signed(Duration::days(i64::from(config.projection_window_days.get())))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let totals: Rollup = events
        .iter()
        .filter(|e| e.timestamp >= window_start && e.timestamp <= reference)
        .collect();

    if totals == Rollup::default() {
        tracing::debug!(%window_start, %reference, "no events in projection window");
    }

    // ceil(count / window * horizon), kept exact in integers.
    let diapers = (totals.diaper_count as u64)
        .saturating_mul(horizon_days)
        .div_ceil(window_days);
    let formula_ml = totals
        .total_formula_ml
        .saturating_mul(horizon_days)
        .div_ceil(window_days);
    let formula_units = formula_ml.div_ceil(u64::from(config.formula_unit_size_ml.get()));

    let diaper_cost = diapers as f64 * config.diaper_unit_cost;
    let formula_cost = formula_units as f64 * config.formula_unit_cost;

    MonthlyProjection {
        diapers,
        formula_ml,
        formula_units,
        diaper_cost,
        formula_cost,
        estimated_cost: diaper_cost + formula_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    use crate::types::{DiaperType, EventId};

    fn ts(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).expect("valid test date")
    }

    fn feeding(at: DateTime<Utc>, amount_ml: Option<u32>) -> Event {
        Event {
            id: EventId::generate(),
            timestamp: at,
            kind: EventKind::Feeding { amount_ml },
            notes: None,
        }
    }

    fn diaper(at: DateTime<Utc>) -> Event {
        Event {
            id: EventId::generate(),
            timestamp: at,
            kind: EventKind::Diaper {
                diaper_type: DiaperType::Wet,
            },
            notes: None,
        }
    }

    fn sleep(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: EventId::generate(),
            timestamp: start,
            kind: EventKind::Sleep {
                sleep_start: start,
                sleep_end: end,
            },
            notes: None,
        }
    }

    // ========== Daily Snapshot ==========

    #[test]
    fn daily_snapshot_counts_feedings_and_diapers() {
        let events = vec![feeding(ts(29, 9, 0), Some(120)), diaper(ts(29, 10, 0))];

        let snapshot = daily_snapshot(&events, date(29), &Utc);

        assert_eq!(snapshot.date, date(29));
        assert_eq!(
            snapshot.totals,
            Rollup {
                feeding_count: 1,
                total_formula_ml: 120,
                diaper_count: 1,
                sleep_hours: 0.0,
            }
        );
    }

    #[test]
    fn sleep_across_midnight_counts_on_start_day() {
        let events = vec![sleep(ts(28, 22, 0), ts(29, 2, 0))];

        let day1 = daily_snapshot(&events, date(28), &Utc);
        let day2 = daily_snapshot(&events, date(29), &Utc);

        assert!((day1.totals.sleep_hours - 4.0).abs() < f64::EPSILON);
        assert!(day2.totals.sleep_hours.abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_sleep_contributes_nothing() {
        let events = vec![
            sleep(ts(29, 14, 0), ts(29, 13, 0)),
            sleep(ts(29, 15, 0), ts(29, 15, 30)),
        ];

        let snapshot = daily_snapshot(&events, date(29), &Utc);
        assert!((snapshot.totals.sleep_hours - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_amount_counts_as_zero_ml() {
        let events = vec![feeding(ts(29, 9, 0), None), feeding(ts(29, 12, 0), Some(90))];

        let snapshot = daily_snapshot(&events, date(29), &Utc);
        assert_eq!(snapshot.totals.feeding_count, 2);
        assert_eq!(snapshot.totals.total_formula_ml, 90);
    }

    #[test]
    fn day_membership_uses_the_given_zone() {
        // 02:00 UTC on the 29th is still the evening of the 28th in UTC-5.
        let events = vec![feeding(ts(29, 2, 0), Some(100))];
        let eastern = FixedOffset::west_opt(5 * 3600).expect("valid offset");

        assert_eq!(daily_snapshot(&events, date(28), &eastern).totals.feeding_count, 1);
        assert_eq!(daily_snapshot(&events, date(29), &eastern).totals.feeding_count, 0);
        assert_eq!(daily_snapshot(&events, date(29), &Utc).totals.feeding_count, 1);
    }

    #[test]
    fn daily_snapshot_of_nothing_is_zero() {
        let snapshot = daily_snapshot(&[], date(29), &Utc);
        assert_eq!(snapshot.totals, Rollup::default());
    }

    #[test]
    fn aggregation_is_repeatable() {
        let events = vec![
            feeding(ts(29, 9, 0), Some(120)),
            sleep(ts(29, 13, 0), ts(29, 14, 0)),
            diaper(ts(29, 15, 0)),
        ];
        let config = AnalyticsConfig::default();

        assert_eq!(
            daily_snapshot(&events, date(29), &Utc),
            daily_snapshot(&events, date(29), &Utc)
        );
        assert_eq!(
            weekly_trend(&events, ts(29, 20, 0), 4, &config, &Utc),
            weekly_trend(&events, ts(29, 20, 0), 4, &config, &Utc)
        );
        assert_eq!(
            monthly_projection(&events, ts(29, 20, 0), &config),
            monthly_projection(&events, ts(29, 20, 0), &config)
        );
    }

    // ========== Weekly Trend ==========

    #[test]
    fn start_of_week_honours_convention() {
        // Jan 29, 2025 is a Wednesday
        assert_eq!(start_of_week(date(29), Weekday::Sun), date(26));
        assert_eq!(start_of_week(date(29), Weekday::Mon), date(27));
        assert_eq!(start_of_week(date(26), Weekday::Sun), date(26));
        assert_eq!(start_of_week(date(26), Weekday::Mon), date(20));
    }

    #[test]
    fn weekly_trend_is_oldest_first_and_contiguous() {
        let config = AnalyticsConfig::default();
        let weeks = weekly_trend(&[], ts(29, 12, 0), 4, &config, &Utc);

        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[0].week_start, date(5));
        assert_eq!(weeks[3].week_start, date(26));
        assert_eq!(weeks[3].week_end, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        for pair in weeks.windows(2) {
            assert_eq!(pair[0].week_end + Duration::days(1), pair[1].week_start);
        }
        for week in &weeks {
            assert_eq!(week.week_end - week.week_start, Duration::days(6));
            assert_eq!(week.totals, Rollup::default());
            assert_eq!(week.avg_feeding_amount, 0);
        }
    }

    #[test]
    fn weekly_trend_buckets_events_by_week() {
        let config = AnalyticsConfig::default();
        let events = vec![
            // Week of Jan 26
            feeding(ts(26, 0, 0), Some(100)),
            feeding(ts(29, 9, 0), Some(125)),
            diaper(ts(29, 10, 0)),
            sleep(ts(29, 13, 0), ts(29, 15, 0)),
            // Week of Jan 19, last instant of Saturday
            feeding(ts(25, 23, 59), Some(90)),
            // Before the trend span
            feeding(ts(4, 12, 0), Some(500)),
        ];

        let weeks = weekly_trend(&events, ts(29, 20, 0), 4, &config, &Utc);

        let current = &weeks[3];
        assert_eq!(current.totals.feeding_count, 2);
        assert_eq!(current.totals.total_formula_ml, 225);
        assert_eq!(current.totals.diaper_count, 1);
        assert!((current.totals.sleep_hours - 2.0).abs() < f64::EPSILON);
        assert_eq!(current.avg_feeding_amount, 113);

        let previous = &weeks[2];
        assert_eq!(previous.week_start, date(19));
        assert_eq!(previous.totals.feeding_count, 1);
        assert_eq!(previous.avg_feeding_amount, 90);

        let total_feedings: usize = weeks.iter().map(|w| w.totals.feeding_count).sum();
        assert_eq!(total_feedings, 3);
    }

    #[test]
    fn weekly_trend_length_follows_week_count() {
        let config = AnalyticsConfig::default();
        assert!(weekly_trend(&[], ts(29, 12, 0), 0, &config, &Utc).is_empty());
        assert_eq!(weekly_trend(&[], ts(29, 12, 0), 12, &config, &Utc).len(), 12);
    }

    #[test]
    fn weekly_trend_fills_the_longest_allowed_span() {
        let config = AnalyticsConfig::default();
        let weeks = weekly_trend(&[], ts(29, 12, 0), crate::MAX_TREND_WEEKS, &config, &Utc);

        assert_eq!(weeks.len(), crate::MAX_TREND_WEEKS);
        assert_eq!(weeks[crate::MAX_TREND_WEEKS - 1].week_start, date(26));
        for pair in weeks.windows(2) {
            assert_eq!(pair[0].week_end + Duration::days(1), pair[1].week_start);
        }
    }

    #[test]
    fn avg_feeding_amount_rounds_half_up() {
        let rollup = Rollup {
            feeding_count: 2,
            total_formula_ml: 245,
            ..Rollup::default()
        };
        assert_eq!(rollup.avg_feeding_amount(), 123);

        let rollup = Rollup {
            feeding_count: 3,
            total_formula_ml: 361,
            ..Rollup::default()
        };
        assert_eq!(rollup.avg_feeding_amount(), 120);
    }

    // ========== Monthly Projection ==========

    #[test]
    fn projection_from_a_typical_week() {
        let config = AnalyticsConfig::default();
        let reference = ts(29, 20, 0);
        // 14 diapers and 1400 ml spread over the last 7 days
        let mut events = Vec::new();
        for day in 23..=29 {
            events.push(diaper(ts(day, 8, 0)));
            events.push(diaper(ts(day, 16, 0)));
            events.push(feeding(ts(day, 9, 0), Some(200)));
        }

        let projection = monthly_projection(&events, reference, &config);

        assert_eq!(projection.diapers, 60);
        assert_eq!(projection.formula_ml, 6000);
        assert_eq!(projection.formula_units, 8);
        assert!((projection.diaper_cost - 15.0).abs() < f64::EPSILON);
        assert!((projection.formula_cost - 120.0).abs() < f64::EPSILON);
        assert!((projection.estimated_cost - 135.0).abs() < f64::EPSILON);
    }

    #[test]
    fn projection_rounds_quantities_up() {
        let config = AnalyticsConfig::default();
        let events = vec![diaper(ts(29, 8, 0)), feeding(ts(29, 9, 0), Some(100))];

        let projection = monthly_projection(&events, ts(29, 20, 0), &config);

        // 1/7 * 30 = 4.29, 100/7 * 30 = 428.6
        assert_eq!(projection.diapers, 5);
        assert_eq!(projection.formula_ml, 429);
        assert_eq!(projection.formula_units, 1);
    }

    #[test]
    fn projection_ignores_events_outside_window() {
        let config = AnalyticsConfig::default();
        let reference = ts(29, 20, 0);
        let events = vec![
            diaper(ts(22, 19, 59)),
            diaper(ts(29, 20, 1)),
            diaper(ts(22, 20, 0)),
            diaper(reference),
        ];

        let projection = monthly_projection(&events, reference, &config);
        // Only the two boundary events count: 2/7 * 30 = 8.57
        assert_eq!(projection.diapers, 9);
    }

    #[test]
    fn projection_of_empty_window_is_zero() {
        let config = AnalyticsConfig::default();
        let events = vec![feeding(ts(1, 9, 0), Some(200))];

        let projection = monthly_projection(&events, ts(29, 20, 0), &config);
        assert_eq!(projection, MonthlyProjection::default());
    }

    #[test]
    fn projection_uses_configured_prices_and_sizes() {
        let config = AnalyticsConfig {
            formula_unit_size_ml: std::num::NonZeroU32::new(400).unwrap(),
            diaper_unit_cost: 0.5,
            formula_unit_cost: 10.0,
            ..AnalyticsConfig::default()
        };
        let mut events = Vec::new();
        for day in 23..=29 {
            events.push(diaper(ts(day, 8, 0)));
            events.push(feeding(ts(day, 9, 0), Some(100)));
        }

        let projection = monthly_projection(&events, ts(29, 20, 0), &config);

        assert_eq!(projection.diapers, 30);
        assert_eq!(projection.formula_ml, 3000);
        assert_eq!(projection.formula_units, 8);
        assert!((projection.estimated_cost - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn projection_window_longer_than_the_calendar_covers_all_history() {
        let config = AnalyticsConfig {
            projection_window_days: std::num::NonZeroU32::MAX,
            ..AnalyticsConfig::default()
        };
        let reference = ts(29, 20, 0);
        let events = vec![diaper(ts(1, 8, 0)), diaper(reference)];

        let projection = monthly_projection(&events, reference, &config);

        // 2 diapers over ~4.3 billion days still rounds up to one.
        assert_eq!(projection.diapers, 1);
        assert_eq!(projection.formula_ml, 0);
        assert_eq!(
            monthly_projection(&[], reference, &config),
            MonthlyProjection::default()
        );
    }

    // ========== Empty Input ==========

    #[test]
    fn every_aggregate_has_a_zero_value() {
        let config = AnalyticsConfig::default();
        let reference = ts(29, 20, 0);

        assert_eq!(daily_snapshot(&[], date(29), &Utc).totals, Rollup::default());
        assert!(
            weekly_trend(&[], reference, 4, &config, &Utc)
                .iter()
                .all(|w| w.totals == Rollup::default() && w.avg_feeding_amount == 0)
        );
        assert_eq!(
            monthly_projection(&[], reference, &config),
            MonthlyProjection::default()
        );
    }
}
