//! User and event types.
//!
//! This module provides the schema-stable shapes the rest of the workspace
//! works with once provider data has been normalized:
//! - [`User`]: the signed-in account's profile
//! - [`CalendarEvent`]: a single upcoming event
//! - [`TimeSpec`]: an event boundary as the provider wrote it
//! - [`Creator`]: who created the event
//!
//! Field names serialize in camelCase so the JSON output reads like the
//! provider's own schema (`dateTime`, `timeZone`, `displayName`).

use serde::{Deserialize, Serialize};

use crate::time::EventTime;

/// The signed-in user's profile.
///
/// Replaced wholesale on every login and dropped on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Primary email address.
    pub email: String,
    /// Full display name.
    pub name: String,
    /// URL of the profile picture.
    pub picture: String,
}

impl User {
    /// Creates a new user profile.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        picture: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            picture: picture.into(),
        }
    }
}

/// One boundary (start or end) of an event.
///
/// `date_time` holds either an RFC 3339 timestamp or, for all-day events, a
/// bare `YYYY-MM-DD` date. It is kept verbatim: no parsing or timezone
/// conversion happens on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpec {
    /// Timestamp or all-day date, exactly as the provider sent it.
    pub date_time: String,
    /// IANA timezone name.
    pub time_zone: String,
}

impl TimeSpec {
    /// Timezone used when the provider does not send one.
    pub const DEFAULT_TIME_ZONE: &'static str = "UTC";

    /// Creates a time spec with an explicit timezone.
    pub fn new(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: date_time.into(),
            time_zone: time_zone.into(),
        }
    }

    /// Creates a time spec in the default timezone.
    pub fn utc(date_time: impl Into<String>) -> Self {
        Self::new(date_time, Self::DEFAULT_TIME_ZONE)
    }

    /// Parses the stored value for display purposes.
    ///
    /// Returns `None` when the provider sent something that is neither a
    /// timestamp nor a date.
    pub fn parsed(&self) -> Option<EventTime> {
        EventTime::parse(&self.date_time)
    }

    /// Returns true if the value is a bare date (all-day event).
    pub fn is_all_day(&self) -> bool {
        self.parsed().is_some_and(|t| t.is_all_day())
    }
}

/// The account that created an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Creator's email address.
    pub email: String,
    /// Creator's display name; equal to `email` when the provider has none.
    pub display_name: String,
}

impl Creator {
    /// Creates a creator with an explicit display name.
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Creates a creator whose display name is the email address.
    pub fn from_email(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            display_name: email.clone(),
            email,
        }
    }
}

/// A normalized calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    /// Provider-unique event identifier.
    pub id: String,
    /// Event title.
    pub summary: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the event starts.
    pub start: TimeSpec,
    /// When the event ends.
    pub end: TimeSpec,
    /// Where the event takes place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Who created the event.
    pub creator: Creator,
}

impl CalendarEvent {
    /// Creates an event with the required fields.
    pub fn new(
        id: impl Into<String>,
        summary: impl Into<String>,
        start: TimeSpec,
        end: TimeSpec,
        creator: Creator,
    ) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
            description: None,
            start,
            end,
            location: None,
            creator,
        }
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

    /// Returns true if the event starts on a bare date.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> CalendarEvent {
        CalendarEvent::new(
            "evt-1",
            "Team Weekly Sync",
            TimeSpec::utc("2024-03-20T10:00:00"),
            TimeSpec::utc("2024-03-20T11:00:00"),
            Creator::new("lead@example.com", "Team Lead"),
        )
    }

    #[test]
    fn time_spec_defaults_to_utc() {
        let spec = TimeSpec::utc("2024-03-20T10:00:00");
        assert_eq!(spec.time_zone, "UTC");
        assert!(!spec.is_all_day());
    }

    #[test]
    fn time_spec_detects_all_day() {
        assert!(TimeSpec::utc("2024-03-20").is_all_day());
        assert!(!TimeSpec::utc("not a date").is_all_day());
    }

    #[test]
    fn creator_from_email_copies_display_name() {
        let creator = Creator::from_email("someone@example.com");
        assert_eq!(creator.display_name, "someone@example.com");
    }

    #[test]
    fn event_builder() {
        let event = sample_event()
            .with_description("Weekly sync")
            .with_location("Room 101");

        assert_eq!(event.description.as_deref(), Some("Weekly sync"));
        assert_eq!(event.location.as_deref(), Some("Room 101"));
        assert!(!event.is_all_day());
    }

    #[test]
    fn event_serializes_camel_case() {
        let json = serde_json::to_value(sample_event()).unwrap();

        assert_eq!(json["start"]["dateTime"], "2024-03-20T10:00:00");
        assert_eq!(json["start"]["timeZone"], "UTC");
        assert_eq!(json["creator"]["displayName"], "Team Lead");
        assert!(json.get("description").is_none());
        assert!(json.get("location").is_none());
    }
}
