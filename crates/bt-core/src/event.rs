//! Care events: feedings, diaper changes and sleep periods.
//!
//! The serde representation is a flat record keyed by `type`, matching the
//! tracker's portable export format:
//!
//! ```json
//! {"id":"…","type":"feeding","timestamp":"2025-01-29T09:00:00Z","amount":120}
//! {"id":"…","type":"diaper","timestamp":"…","diaperType":"wet","notes":"…"}
//! {"id":"…","type":"sleep","timestamp":"…","sleepStart":"…","sleepEnd":"…"}
//! ```

use chrono::{DateTime, Duration, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::types::{DiaperType, EventId, ValidationError, feeding_amount};

/// One immutable care record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier, used for display keys only.
    pub id: EventId,
    /// When the event is considered to have occurred. For sleep this is the
    /// start of the sleep period.
    pub timestamp: DateTime<Utc>,
    /// What happened, with the kind-specific details.
    #[serde(flatten)]
    pub kind: EventKind,
    /// Free-text annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The kind of care event and its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A bottle feeding.
    Feeding {
        /// Formula amount. Records written by older front ends may lack it.
        #[serde(rename = "amount", default, skip_serializing_if = "Option::is_none")]
        amount_ml: Option<u32>,
    },
    /// A diaper change.
    Diaper {
        #[serde(rename = "diaperType")]
        diaper_type: DiaperType,
    },
    /// A finished sleep period. `sleep_end` may precede `sleep_start` when
    /// entered by mistake; durations clamp to zero.
    Sleep {
        #[serde(rename = "sleepStart")]
        sleep_start: DateTime<Utc>,
        #[serde(rename = "sleepEnd")]
        sleep_end: DateTime<Utc>,
    },
}

impl EventKind {
    /// The `type` tag of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Feeding { .. } => "feeding",
            Self::Diaper { .. } => "diaper",
            Self::Sleep { .. } => "sleep",
        }
    }
}

impl Event {
    /// Formula amount for feedings; `None` for other kinds or a missing amount.
    pub const fn amount_ml(&self) -> Option<u32> {
        match self.kind {
            EventKind::Feeding { amount_ml } => amount_ml,
            EventKind::Diaper { .. } | EventKind::Sleep { .. } => None,
        }
    }

    /// Length of a sleep period, clamped at zero. `None` for other kinds.
    pub fn sleep_duration(&self) -> Option<Duration> {
        match self.kind {
            EventKind::Sleep {
                sleep_start,
                sleep_end,
            } => Some((sleep_end - sleep_start).max(Duration::zero())),
            EventKind::Feeding { .. } | EventKind::Diaper { .. } => None,
        }
    }

    /// Sleep length in fractional hours; zero for other kinds.
    #[allow(clippy::cast_precision_loss)]
    pub fn sleep_hours(&self) -> f64 {
        self.sleep_duration()
            .map_or(0.0, |d| d.num_milliseconds() as f64 / 3_600_000.0)
    }

    /// Whether the record is a sleep whose end precedes its start.
    pub fn is_inverted_sleep(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Sleep { sleep_start, sleep_end } if sleep_end < sleep_start
        )
    }

    /// Calendar day of the timestamp in the given zone.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }
}

/// Raw kind-specific input for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Feeding {
        amount_ml: i64,
    },
    Diaper {
        diaper_type: DiaperType,
    },
    Sleep {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Unvalidated input for a new event.
///
/// `at` is the explicit occurrence time; `None` means "now". Sleep events
/// ignore it and use their start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub payload: Payload,
    pub at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewEvent {
    pub const fn new(payload: Payload) -> Self {
        Self {
            payload,
            at: None,
            notes: None,
        }
    }

    pub const fn feeding(amount_ml: i64) -> Self {
        Self::new(Payload::Feeding { amount_ml })
    }

    pub const fn diaper(diaper_type: DiaperType) -> Self {
        Self::new(Payload::Diaper { diaper_type })
    }

    pub const fn sleep(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(Payload::Sleep { start, end })
    }

    #[must_use]
    pub const fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validates the input and produces an event with a fresh ID.
    ///
    /// Timestamps are truncated to millisecond precision.
    pub fn build<C: Clock + ?Sized>(self, clock: &C) -> Result<Event, ValidationError> {
        let occurred_at = || self.at.unwrap_or_else(|| clock.now()).trunc_subsecs(3);

        let (timestamp, kind) = match self.payload {
            Payload::Feeding { amount_ml } => (
                occurred_at(),
                EventKind::Feeding {
                    amount_ml: Some(feeding_amount(amount_ml)?),
                },
            ),
            Payload::Diaper { diaper_type } => (occurred_at(), EventKind::Diaper { diaper_type }),
            Payload::Sleep { start, end } => {
                let sleep_start = start.trunc_subsecs(3);
                let sleep_end = end.trunc_subsecs(3);
                if sleep_end < sleep_start {
                    tracing::warn!(
                        %sleep_start,
                        %sleep_end,
                        "sleep ends before it starts; its duration will count as zero"
                    );
                }
                (
                    sleep_start,
                    EventKind::Sleep {
                        sleep_start,
                        sleep_end,
                    },
                )
            }
        };

        Ok(Event {
            id: EventId::generate(),
            timestamp,
            kind,
            notes: normalize_notes(self.notes),
        })
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clock::FixedClock;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 29, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    #[test]
    fn feeding_uses_clock_when_no_time_given() {
        let clock = FixedClock(at(9, 0));
        let event = NewEvent::feeding(120).build(&clock).unwrap();

        assert_eq!(event.timestamp, at(9, 0));
        assert_eq!(event.amount_ml(), Some(120));
        assert_eq!(event.kind.as_str(), "feeding");
        assert!(!event.id.as_str().is_empty());
    }

    #[test]
    fn explicit_time_wins_over_clock() {
        let clock = FixedClock(at(12, 0));
        let event = NewEvent::diaper(DiaperType::Dirty)
            .at(at(7, 30))
            .build(&clock)
            .unwrap();

        assert_eq!(event.timestamp, at(7, 30));
        assert_eq!(
            event.kind,
            EventKind::Diaper {
                diaper_type: DiaperType::Dirty
            }
        );
    }

    #[test]
    fn feeding_amount_out_of_range_is_rejected() {
        let clock = FixedClock(at(9, 0));
        assert_eq!(
            NewEvent::feeding(0).build(&clock),
            Err(ValidationError::AmountOutOfRange { value: 0 })
        );
        assert_eq!(
            NewEvent::feeding(750).build(&clock),
            Err(ValidationError::AmountOutOfRange { value: 750 })
        );
    }

    #[test]
    fn sleep_timestamp_is_its_start() {
        let clock = FixedClock(at(23, 0));
        let event = NewEvent::sleep(at(13, 0), at(14, 30))
            .at(at(20, 0))
            .build(&clock)
            .unwrap();

        assert_eq!(event.timestamp, at(13, 0));
        assert_eq!(event.sleep_duration(), Some(Duration::minutes(90)));
        assert!((event.sleep_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_sleep_is_accepted_and_clamped() {
        let clock = FixedClock(at(23, 0));
        let event = NewEvent::sleep(at(14, 0), at(13, 0)).build(&clock).unwrap();

        assert!(event.is_inverted_sleep());
        assert_eq!(event.sleep_duration(), Some(Duration::zero()));
        assert!(event.sleep_hours().abs() < f64::EPSILON);
    }

    #[test]
    fn notes_are_trimmed_and_blank_dropped() {
        let clock = FixedClock(at(9, 0));
        let event = NewEvent::feeding(90)
            .notes("  fussy before  ")
            .build(&clock)
            .unwrap();
        assert_eq!(event.notes.as_deref(), Some("fussy before"));

        let event = NewEvent::feeding(90).notes("   ").build(&clock).unwrap();
        assert_eq!(event.notes, None);
    }

    #[test]
    fn timestamps_are_truncated_to_millis() {
        let precise = at(9, 0) + Duration::nanoseconds(123_456_789);
        let clock = FixedClock(precise);
        let event = NewEvent::feeding(60).build(&clock).unwrap();
        assert_eq!(event.timestamp, at(9, 0) + Duration::milliseconds(123));
    }

    #[test]
    fn serializes_to_flat_portable_record() {
        let event = Event {
            id: EventId::new("evt-1").unwrap(),
            timestamp: at(9, 0),
            kind: EventKind::Feeding {
                amount_ml: Some(120),
            },
            notes: Some("Quick logged".to_string()),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "evt-1",
                "timestamp": "2025-01-29T09:00:00Z",
                "type": "feeding",
                "amount": 120,
                "notes": "Quick logged",
            })
        );
    }

    #[test]
    fn sleep_record_carries_both_ends() {
        let event = Event {
            id: EventId::new("evt-2").unwrap(),
            timestamp: at(13, 0),
            kind: EventKind::Sleep {
                sleep_start: at(13, 0),
                sleep_end: at(14, 30),
            },
            notes: None,
        };

        insta::assert_json_snapshot!(event, @r#"
        {
          "id": "evt-2",
          "timestamp": "2025-01-29T13:00:00Z",
          "type": "sleep",
          "sleepStart": "2025-01-29T13:00:00Z",
          "sleepEnd": "2025-01-29T14:30:00Z"
        }
        "#);
    }

    #[test]
    fn parses_records_from_older_exports() {
        let json = r#"[
            {"id":"1738141200000","type":"feeding","timestamp":"2025-01-29T09:00:00.000Z","amount":null},
            {"id":"1738144800000","type":"diaper","timestamp":"2025-01-29T10:00:00.000Z","diaperType":"both","notes":"Quick logged"},
            {"id":"1738170000000","type":"sleep","timestamp":"2025-01-29T17:00:00.000Z","sleepStart":"2025-01-29T17:00:00.000Z","sleepEnd":"2025-01-29T18:15:00.000Z"}
        ]"#;

        let events: Vec<Event> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].amount_ml(), None);
        assert_eq!(
            events[1].kind,
            EventKind::Diaper {
                diaper_type: DiaperType::Both
            }
        );
        assert_eq!(events[2].sleep_duration(), Some(Duration::minutes(75)));
    }

    #[test]
    fn rejects_unknown_kinds() {
        let json = r#"{"id":"1","type":"bath","timestamp":"2025-01-29T09:00:00Z"}"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn serde_roundtrip_preserves_value() {
        let clock = FixedClock(at(22, 0));
        let events = vec![
            NewEvent::feeding(150).build(&clock).unwrap(),
            NewEvent::diaper(DiaperType::Wet).notes("rash").build(&clock).unwrap(),
            NewEvent::sleep(at(20, 0), at(21, 45)).build(&clock).unwrap(),
        ];

        let json = serde_json::to_string(&events).unwrap();
        let parsed: Vec<Event> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, events);
    }
}
