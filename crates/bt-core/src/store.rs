//! The persistence capability the tracker is given.

use thiserror::Error;

use crate::event::Event;

/// Errors surfaced by an [`EventStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage could not be read or written.
    #[error("event store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A stored record could not be decoded.
    #[error("corrupt event {id}: {message}")]
    Corrupt { id: String, message: String },
}

/// Durable append-only storage for events.
///
/// Implementations must make appends visible to later `load_all` calls from
/// the same process, and must fail rather than return a partial or empty
/// result when stored data is unreadable.
pub trait EventStore {
    /// Returns every stored event, in no particular order.
    fn load_all(&self) -> Result<Vec<Event>, StoreError>;

    /// Records one event.
    fn append(&mut self, event: &Event) -> Result<(), StoreError>;
}

/// A store that keeps events in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
}

impl MemoryStore {
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.clone())
    }

    fn append(&mut self, event: &Event) -> Result<(), StoreError> {
        self.events.push(event.clone());
        Ok(())
    }
}

impl<S: EventStore + ?Sized> EventStore for &mut S {
    fn load_all(&self) -> Result<Vec<Event>, StoreError> {
        (**self).load_all()
    }

    fn append(&mut self, event: &Event) -> Result<(), StoreError> {
        (**self).append(event)
    }
}
