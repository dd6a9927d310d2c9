//! Storage layer for the baby tracker.
//!
//! Provides persistence for care events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. The tracker is a single
//! local agent, so one connection per process is the expected setup.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with fixed nanosecond
//! precision (e.g., `2025-01-29T09:00:00.000000000Z`). This keeps stored
//! values lossless and makes lexicographic order match chronological order.
//!
//! ## Event Payload Storage
//!
//! The `type` column stores the event kind (`feeding`, `diaper`, `sleep`) and
//! the `data` column stores the kind-specific fields as JSON in the portable
//! export shape (e.g., `{"type":"feeding","amount":120}`). A row whose `data`
//! does not decode, or decodes to a different kind than `type`, is reported
//! as corrupt rather than skipped.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use bt_core::{Event, EventId, EventKind, EventStore, StoreError};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an event timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to encode or decode event payload JSON.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlite(source) => Self::Unavailable(Box::new(source)),
            DbError::TimestampParse {
                event_id,
                timestamp,
                ..
            } => Self::Corrupt {
                id: event_id,
                message: format!("invalid timestamp {timestamp}"),
            },
            DbError::InvalidEventData { event_id, message } => Self::Corrupt {
                id: event_id,
                message,
            },
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Record count and latest timestamp for one event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: String,
    pub count: i64,
    pub last_event: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Events table: one immutable care record per row
            -- timestamp: RFC 3339 with nanoseconds (e.g., '2025-01-29T09:00:00.000000000Z')
            -- type: event kind ('feeding', 'diaper', 'sleep')
            -- data: JSON payload with kind-specific fields
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                type TEXT NOT NULL,
                data TEXT NOT NULL,
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_type ON events(type);
            ",
        )?;
        Ok(())
    }

    /// Appends one event. Fails if an event with the same ID exists.
    pub fn append_event(&mut self, event: &Event) -> Result<(), DbError> {
        let data = encode_kind(event)?;
        self.conn.execute(
            "INSERT INTO events (id, timestamp, type, data, notes) VALUES (?, ?, ?, ?, ?)",
            params![
                event.id.as_str(),
                format_timestamp(event.timestamp),
                event.kind.as_str(),
                data,
                event.notes,
            ],
        )?;
        Ok(())
    }

    /// Inserts a batch of events, ignoring duplicates by ID.
    ///
    /// Returns the number of events actually inserted.
    pub fn insert_events(&mut self, events: &[Event]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO events (id, timestamp, type, data, notes)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    event.id.as_str(),
                    format_timestamp(event.timestamp),
                    event.kind.as_str(),
                    encode_kind(event)?,
                    event.notes,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(
            inserted,
            skipped = events.len() - inserted,
            "event batch stored"
        );
        Ok(inserted)
    }

    /// Lists all events ordered by timestamp then ID.
    pub fn list_events(&self) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, timestamp, type, data, notes
            FROM events
            ORDER BY timestamp ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(EventRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                kind: row.get(2)?,
                data: row.get(3)?,
                notes: row.get(4)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// Counts stored events.
    pub fn event_count(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Lists record count and last event timestamp per kind, most recent first.
    pub fn last_event_times_by_kind(&self) -> Result<Vec<KindSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT type, COUNT(*) AS total, MAX(timestamp) AS last_event
            FROM events
            GROUP BY type
            ORDER BY last_event DESC, type ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(KindSummary {
                kind: row.get(0)?,
                count: row.get(1)?,
                last_event: row.get(2)?,
            })
        })?;
        let mut kinds = Vec::new();
        for row in rows {
            kinds.push(row?);
        }
        Ok(kinds)
    }
}

impl EventStore for Database {
    fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.list_events()?)
    }

    fn append(&mut self, event: &Event) -> Result<(), StoreError> {
        Ok(self.append_event(event)?)
    }
}

#[derive(Debug)]
struct EventRow {
    id: String,
    timestamp: String,
    kind: String,
    data: String,
    notes: Option<String>,
}

impl EventRow {
    fn into_event(self) -> Result<Event, DbError> {
        let timestamp = parse_timestamp(&self.timestamp, &self.id)?;
        let kind: EventKind =
            serde_json::from_str(&self.data).map_err(|e| DbError::InvalidEventData {
                event_id: self.id.clone(),
                message: e.to_string(),
            })?;
        if kind.as_str() != self.kind {
            return Err(DbError::InvalidEventData {
                event_id: self.id,
                message: format!(
                    "payload is a {} but the row type is {}",
                    kind.as_str(),
                    self.kind
                ),
            });
        }
        let id = EventId::new(self.id).map_err(|e| DbError::InvalidEventData {
            event_id: String::new(),
            message: e.to_string(),
        })?;
        Ok(Event {
            id,
            timestamp,
            kind,
            notes: self.notes,
        })
    }
}

fn encode_kind(event: &Event) -> Result<String, DbError> {
    serde_json::to_string(&event.kind).map_err(|e| DbError::InvalidEventData {
        event_id: event.id.to_string(),
        message: e.to_string(),
    })
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
