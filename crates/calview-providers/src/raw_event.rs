//! Raw records as the provider sends them.
//!
//! Every field is optional: the provider's JSON is trusted for its shape,
//! never for the presence of a field. Defaults are applied later, in
//! [`crate::normalize`], where each substitution is explicit.
//!
//! The records deserialize directly from Google's camelCase JSON.

use serde::{Deserialize, Serialize};

/// A start or end boundary of a raw event.
///
/// Timed events carry `date_time`; all-day events carry `date`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEventTime {
    /// RFC 3339 timestamp for timed events.
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` date for all-day events.
    pub date: Option<String>,
    /// IANA timezone name.
    pub time_zone: Option<String>,
}

impl RawEventTime {
    /// Creates a timed boundary.
    pub fn from_datetime(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Self::default()
        }
    }

    /// Creates an all-day boundary.
    pub fn from_date(date: impl Into<String>) -> Self {
        Self {
            date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Builder method to set the timezone.
    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    /// Returns true if only the all-day date is present.
    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }
}

/// The creator of a raw event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCreator {
    /// Creator's email address.
    pub email: Option<String>,
    /// Creator's display name.
    pub display_name: Option<String>,
}

impl RawCreator {
    /// Creates a creator with only an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            display_name: None,
        }
    }

    /// Builder method to set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// A raw calendar event from the events endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    /// Provider-unique identifier.
    pub id: Option<String>,
    /// Event title.
    pub summary: Option<String>,
    /// Event description (may contain HTML).
    pub description: Option<String>,
    /// Event location.
    pub location: Option<String>,
    /// When the event starts.
    pub start: Option<RawEventTime>,
    /// When the event ends.
    pub end: Option<RawEventTime>,
    /// Who created the event.
    pub creator: Option<RawCreator>,
}

impl RawEvent {
    /// Creates a raw event with an id and both boundaries.
    pub fn new(id: impl Into<String>, start: RawEventTime, end: RawEventTime) -> Self {
        Self {
            id: Some(id.into()),
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the creator.
    pub fn with_creator(mut self, creator: RawCreator) -> Self {
        self.creator = Some(creator);
        self
    }
}

/// A raw profile from the user-info endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUserInfo {
    /// Primary email address.
    pub email: Option<String>,
    /// Full display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub picture: Option<String>,
}

/// One page of the events endpoint's response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEventPage {
    /// Events on this page, in provider order.
    pub items: Vec<RawEvent>,
    /// Set when more pages exist.
    pub next_page_token: Option<String>,
    /// The calendar's default timezone.
    pub time_zone: Option<String>,
}
