//! Raw record to core type conversion.
//!
//! The normalization rules:
//! 1. A boundary's `dateTime` falls back to its all-day `date`.
//! 2. A missing `timeZone` becomes `"UTC"`.
//! 3. A missing creator display name becomes the creator's email.
//! 4. `description` and `location` pass through unchanged.
//!
//! Dates are not validated. A malformed upstream value ends up verbatim in
//! the normalized event. Fields the provider should always send but did not
//! (id, summary, creator email, a boundary with neither `dateTime` nor
//! `date`) are replaced with an empty string and reported at `warn` level;
//! the event itself is kept.

use calview_core::{CalendarEvent, Creator, TimeSpec, User};
use tracing::warn;

use crate::raw_event::{RawCreator, RawEvent, RawEventTime, RawUserInfo};

/// Converts a [`RawEvent`] to a [`CalendarEvent`].
pub fn normalize_event(raw: &RawEvent) -> CalendarEvent {
    let id = raw.id.clone().unwrap_or_else(|| {
        warn!("event without id");
        String::new()
    });

    let start = convert_time(raw.start.as_ref(), &id, "start");
    let end = convert_time(raw.end.as_ref(), &id, "end");
    let creator = convert_creator(raw.creator.as_ref(), &id);

    let summary = raw.summary.clone().unwrap_or_else(|| {
        warn!(event = %id, "event without summary");
        String::new()
    });

    CalendarEvent {
        id,
        summary,
        description: raw.description.clone(),
        start,
        end,
        location: raw.location.clone(),
        creator,
    }
}

/// Converts a batch of raw events, preserving order.
pub fn normalize_events(raw_events: &[RawEvent]) -> Vec<CalendarEvent> {
    raw_events.iter().map(normalize_event).collect()
}

/// Converts a [`RawUserInfo`] to a [`User`], copying fields verbatim.
pub fn normalize_user(raw: &RawUserInfo) -> User {
    let field = |value: &Option<String>, name: &str| {
        value.clone().unwrap_or_else(|| {
            warn!(field = name, "user info without field");
            String::new()
        })
    };

    User {
        email: field(&raw.email, "email"),
        name: field(&raw.name, "name"),
        picture: field(&raw.picture, "picture"),
    }
}

fn convert_time(raw: Option<&RawEventTime>, event_id: &str, which: &str) -> TimeSpec {
    let Some(raw) = raw else {
        warn!(event = %event_id, boundary = which, "event without time");
        return TimeSpec::utc(String::new());
    };

    let date_time = raw
        .date_time
        .clone()
        .or_else(|| raw.date.clone())
        .unwrap_or_else(|| {
            warn!(event = %event_id, boundary = which, "time has neither dateTime nor date");
            String::new()
        });

    let time_zone = raw
        .time_zone
        .clone()
        .unwrap_or_else(|| TimeSpec::DEFAULT_TIME_ZONE.to_string());

    TimeSpec::new(date_time, time_zone)
}

fn convert_creator(raw: Option<&RawCreator>, event_id: &str) -> Creator {
    let email = raw.and_then(|c| c.email.clone()).unwrap_or_else(|| {
        warn!(event = %event_id, "event without creator email");
        String::new()
    });

    match raw.and_then(|c| c.display_name.clone()) {
        Some(display_name) => Creator::new(email, display_name),
        None => Creator::from_email(email),
    }
}
