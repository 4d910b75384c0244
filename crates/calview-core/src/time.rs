//! Display-side parsing of event times.
//!
//! Event boundaries are stored as the provider's raw strings. This module
//! turns them into something printable without converting between
//! timezones: a timestamp with an offset is shown in that offset's wall-clock
//! time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Naive timestamp layouts accepted after RFC 3339 fails.
const NAIVE_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A parsed event boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A wall-clock timestamp.
    DateTime(NaiveDateTime),
    /// A date with no time of day (all-day event).
    AllDay(NaiveDate),
}

impl EventTime {
    /// Parses a provider time string.
    ///
    /// Accepts RFC 3339 (`2024-03-20T10:00:00-07:00`), naive timestamps
    /// (`2024-03-20T10:00:00`, `2024-03-20T10:00`) and bare dates
    /// (`2024-03-20`).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::DateTime(dt.naive_local()));
        }

        for layout in NAIVE_LAYOUTS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, layout) {
                return Some(Self::DateTime(dt));
            }
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(Self::AllDay)
    }

    /// Returns `true` if this is an all-day date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date(),
            Self::AllDay(date) => *date,
        }
    }
}
