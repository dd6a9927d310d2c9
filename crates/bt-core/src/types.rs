//! Core type definitions with validation.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Accepted feeding amounts in millilitres.
pub const FEEDING_ML_RANGE: RangeInclusive<i64> = 1..=500;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The feeding amount was outside the accepted range.
    #[error("feeding amount must be between 1 and 500 ml, got {value}")]
    AmountOutOfRange { value: i64 },

    /// A configured value exceeded its upper bound.
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// Invalid diaper type value.
    #[error("invalid diaper type: {value} (expected wet, dirty or both)")]
    InvalidDiaperType { value: String },
}

/// Checks a feeding amount against [`FEEDING_ML_RANGE`].
pub fn feeding_amount(value: i64) -> Result<u32, ValidationError> {
    if !FEEDING_ML_RANGE.contains(&value) {
        return Err(ValidationError::AmountOutOfRange { value });
    }
    u32::try_from(value).map_err(|_| ValidationError::AmountOutOfRange { value })
}

/// What a changed diaper contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaperType {
    Wet,
    Dirty,
    Both,
}

impl DiaperType {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wet => "wet",
            Self::Dirty => "dirty",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for DiaperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DiaperType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wet" => Ok(Self::Wet),
            "dirty" => Ok(Self::Dirty),
            "both" => Ok(Self::Both),
            _ => Err(ValidationError::InvalidDiaperType {
                value: s.to_string(),
            }),
        }
    }
}

/// A validated event identifier.
///
/// Event IDs must be non-empty strings. New events get a UUID; imported
/// records keep whatever ID they were exported with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "event ID" });
        }
        Ok(Self(id))
    }

    /// Generates a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
