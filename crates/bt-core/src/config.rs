//! Tunables for the analytics engine.

use std::num::NonZeroU32;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Longest weekly trend that can be requested (ten years).
pub const MAX_TREND_WEEKS: usize = 520;

/// Configuration consumed by trend and projection computations.
///
/// Unit sizes and prices vary by brand and locale, so none of them are
/// baked into the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// First day of a calendar week.
    /// Default: Sunday.
    pub week_start: Weekday,

    /// Number of weeks in the trend report, at most [`MAX_TREND_WEEKS`].
    /// Default: 4.
    pub trend_weeks: usize,

    /// Formula per purchasable unit (can/tub).
    /// Default: 800 ml.
    pub formula_unit_size_ml: NonZeroU32,

    /// Price of one diaper.
    /// Default: 0.25.
    pub diaper_unit_cost: f64,

    /// Price of one formula unit.
    /// Default: 15.
    pub formula_unit_cost: f64,

    /// Days of history the projection rate is measured over.
    /// Default: 7.
    pub projection_window_days: NonZeroU32,

    /// Days the projection extrapolates to.
    /// Default: 30.
    pub projection_horizon_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            trend_weeks: 4,
            formula_unit_size_ml: NonZeroU32::new(800).unwrap_or(NonZeroU32::MIN),
            diaper_unit_cost: 0.25,
            formula_unit_cost: 15.0,
            projection_window_days: NonZeroU32::new(7).unwrap_or(NonZeroU32::MIN),
            projection_horizon_days: 30,
        }
    }
}

impl AnalyticsConfig {
    /// Checks bounds serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trend_weeks > MAX_TREND_WEEKS {
            return Err(ValidationError::TooLarge {
                field: "trend_weeks",
                value: self.trend_weeks as u64,
                max: MAX_TREND_WEEKS as u64,
            });
        }
        Ok(())
    }
}
