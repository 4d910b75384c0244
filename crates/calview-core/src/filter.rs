//! Client-side date filter.
//!
//! The filter is a literal prefix match on the raw `start.dateTime` string.
//! It is not calendar-aware: `"2024-03-2"` matches both the 2nd and the
//! 20th–29th of March, and no timezone shifting is applied.

use crate::event::CalendarEvent;

/// Returns true if the event's start begins with `prefix`.
///
/// An empty prefix matches everything.
pub fn matches_date_prefix(event: &CalendarEvent, prefix: &str) -> bool {
    event.start.date_time.starts_with(prefix)
}

/// Returns the events whose start begins with `prefix`, in their original
/// order.
pub fn filter_by_date<'a>(events: &'a [CalendarEvent], prefix: &str) -> Vec<&'a CalendarEvent> {
    if prefix.is_empty() {
        return events.iter().collect();
    }

    events
        .iter()
        .filter(|event| matches_date_prefix(event, prefix))
        .collect()
}
