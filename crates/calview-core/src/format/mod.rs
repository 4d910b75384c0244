//! Output formatting for the session page.
//!
//! The page mirrors what a browser front-end would draw:
//! - a header with the signed-in user
//! - an error banner when the last login failed
//! - either the welcome text (signed out), a loading line, or the filtered
//!   event table (signed in)
//!
//! Two output formats are supported: a human-readable TTY layout and a
//! machine-readable JSON document.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::event::{CalendarEvent, TimeSpec, User};
use crate::filter::filter_by_date;
use crate::session::Session;
use crate::time::EventTime;

const TABLE_HEADERS: [&str; 4] = ["Event", "Time", "Location", "Organizer"];
const COLUMN_GAP: &str = "  ";

/// The output format for the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// 12-hour clock (e.g., "Wed, Mar 20, 10:00 AM").
    #[default]
    #[serde(rename = "12h")]
    H12,
    /// 24-hour clock (e.g., "Wed, Mar 20, 10:00").
    #[serde(rename = "24h")]
    H24,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Clock style for event times.
    pub time_format: TimeFormat,
    /// Text shown when the filtered list is empty.
    pub no_events_text: String,
    /// Maximum description length in the table (truncated with ellipsis).
    pub max_description_length: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::H12,
            no_events_text: "No events found for the selected date.".to_string(),
            max_description_length: Some(60),
        }
    }
}

/// JSON document describing the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// The signed-in user, if any.
    pub user: Option<User>,
    /// Events that passed the date filter.
    pub events: Vec<CalendarEvent>,
    /// Number of events in `events`.
    pub count: usize,
    /// The active date filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Whether fetches are still in flight.
    pub loading: bool,
    /// The user-visible error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Renders sessions and events.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a new formatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Renders the whole page for a session in the requested format.
    pub fn render(&self, session: &Session, filter: &str, format: OutputFormat) -> String {
        match format {
            OutputFormat::Tty => self.format_page(session, filter),
            OutputFormat::Json => {
                let output = self.format_json(session, filter);
                // Serializing plain owned data cannot fail.
                serde_json::to_string_pretty(&output).unwrap_or_default()
            }
        }
    }

    /// Renders the TTY page.
    pub fn format_page(&self, session: &Session, filter: &str) -> String {
        let mut sections = vec![self.format_header(session.user())];

        if let Some(error) = session.error() {
            sections.push(format!("! {}", error));
        }

        if session.is_loading() {
            sections.push("Loading your calendar...".to_string());
        } else if session.is_signed_in() {
            let mut body = String::from(
                "Your Calendar Events\n\
                 A list of all your upcoming calendar events and meetings.",
            );
            if !filter.is_empty() {
                body.push_str(&format!("\nFilter: {}", filter));
            }
            sections.push(body);
            sections.push(self.format_event_list(&filter_by_date(session.events(), filter)));
        } else {
            sections.push(Self::format_welcome());
        }

        sections.join("\n\n")
    }

    /// Renders the page header.
    pub fn format_header(&self, user: Option<&User>) -> String {
        match user {
            Some(user) => format!("Calendar Events | {} <{}>", user.name, user.email),
            None => "Calendar Events".to_string(),
        }
    }

    /// Renders the signed-out call to action.
    pub fn format_welcome() -> String {
        "Welcome to Your Calendar\n\
         Sign in with your Google account to view and manage your calendar events."
            .to_string()
    }

    /// Renders the event table, or the empty-list text.
    pub fn format_event_list(&self, events: &[&CalendarEvent]) -> String {
        if events.is_empty() {
            return self.options.no_events_text.clone();
        }

        let rows: Vec<[Vec<String>; 4]> = events.iter().map(|e| self.event_cells(e)).collect();

        let mut widths = TABLE_HEADERS.map(|h| h.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                for line in cell {
                    *width = (*width).max(line.chars().count());
                }
            }
        }

        let mut lines = Vec::with_capacity(rows.len() * 2 + 2);
        lines.push(join_columns(&TABLE_HEADERS.map(String::from), &widths));
        lines.push(join_columns(&widths.map(|w| "-".repeat(w)), &widths));

        for row in &rows {
            let height = row.iter().map(Vec::len).max().unwrap_or(1);
            for i in 0..height {
                let line: [String; 4] =
                    std::array::from_fn(|col| row[col].get(i).cloned().unwrap_or_default());
                lines.push(join_columns(&line, &widths));
            }
        }

        lines.join("\n")
    }

    /// Formats an event boundary for display.
    ///
    /// Values the provider sent in an unrecognised shape are shown verbatim.
    pub fn format_time_spec(&self, spec: &TimeSpec) -> String {
        match spec.parsed() {
            Some(EventTime::DateTime(dt)) => match self.options.time_format {
                TimeFormat::H12 => dt.format("%a, %b %-d, %-I:%M %p").to_string(),
                TimeFormat::H24 => dt.format("%a, %b %-d, %H:%M").to_string(),
            },
            Some(EventTime::AllDay(date)) => date.format("%a, %b %-d").to_string(),
            None => spec.date_time.clone(),
        }
    }

    /// Builds the JSON document for a session.
    pub fn format_json(&self, session: &Session, filter: &str) -> JsonOutput {
        let events: Vec<CalendarEvent> = filter_by_date(session.events(), filter)
            .into_iter()
            .cloned()
            .collect();

        JsonOutput {
            user: session.user().cloned(),
            count: events.len(),
            events,
            filter: (!filter.is_empty()).then(|| filter.to_string()),
            loading: session.is_loading(),
            error: session.error().map(String::from),
        }
    }

    fn event_cells(&self, event: &CalendarEvent) -> [Vec<String>; 4] {
        let mut title = vec![single_line(&event.summary)];
        if let Some(description) = event.description.as_deref() {
            let description = single_line(description);
            if !description.is_empty() {
                let shown = match self.options.max_description_length {
                    Some(max) => ellipsis(&description, max).into_owned(),
                    None => description,
                };
                title.push(shown);
            }
        }

        let location = event
            .location
            .as_deref()
            .map(single_line)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "-".to_string());

        let organizer = vec![
            event.creator.display_name.clone(),
            event.creator.email.clone(),
        ];

        [
            title,
            vec![self.format_time_spec(&event.start)],
            vec![location],
            organizer,
        ]
    }
}

fn join_columns(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', pad));
    }
    line.trim_end().to_string()
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Creator;
    use crate::session::{FETCH_FAILED, SessionAction};

    fn weekly_sync() -> CalendarEvent {
        CalendarEvent::new(
            "1",
            "Team Weekly Sync",
            TimeSpec::utc("2024-03-20T10:00:00"),
            TimeSpec::utc("2024-03-20T11:00:00"),
            Creator::new("lead@example.com", "Team Lead"),
        )
        .with_description("Weekly team sync")
        .with_location("Virtual Meeting Room")
    }

    fn holiday() -> CalendarEvent {
        CalendarEvent::new(
            "2",
            "Holiday",
            TimeSpec::utc("2024-03-22"),
            TimeSpec::utc("2024-03-23"),
            Creator::from_email("hr@example.com"),
        )
    }

    fn user() -> User {
        User::new("user@example.com", "John Doe", "https://example.com/me.png")
    }

    fn signed_in(events: Vec<CalendarEvent>) -> Session {
        let mut session = Session::new();
        session.apply(SessionAction::LoginStarted);
        let generation = session.generation();
        session.apply(SessionAction::ProfileLoaded {
            generation,
            user: user(),
        });
        session.apply(SessionAction::EventsLoaded { generation, events });
        session
    }

    mod ellipsis_tests {
        use super::*;

        #[test]
        fn short_string_unchanged() {
            assert_eq!(ellipsis("hello", 10), "hello");
        }

        #[test]
        fn long_string_truncated() {
            assert_eq!(ellipsis("hello world", 8), "hello...");
        }

        #[test]
        fn zero_length() {
            assert_eq!(ellipsis("hello", 0), "");
        }
    }

    mod time_tests {
        use super::*;

        #[test]
        fn twelve_hour_clock() {
            let formatter = OutputFormatter::with_defaults();
            let spec = TimeSpec::utc("2024-03-20T14:05:00");
            assert_eq!(formatter.format_time_spec(&spec), "Wed, Mar 20, 2:05 PM");
        }

        #[test]
        fn twenty_four_hour_clock() {
            let formatter = OutputFormatter::new(FormatOptions {
                time_format: TimeFormat::H24,
                ..Default::default()
            });
            let spec = TimeSpec::utc("2024-03-20T14:05:00");
            assert_eq!(formatter.format_time_spec(&spec), "Wed, Mar 20, 14:05");
        }

        #[test]
        fn offset_is_not_converted() {
            let formatter = OutputFormatter::with_defaults();
            let spec = TimeSpec::new("2024-03-20T10:00:00-07:00", "America/Los_Angeles");
            assert_eq!(formatter.format_time_spec(&spec), "Wed, Mar 20, 10:00 AM");
        }

        #[test]
        fn all_day_shows_date_only() {
            let formatter = OutputFormatter::with_defaults();
            assert_eq!(
                formatter.format_time_spec(&TimeSpec::utc("2024-03-22")),
                "Fri, Mar 22"
            );
        }

        #[test]
        fn malformed_value_passes_through() {
            let formatter = OutputFormatter::with_defaults();
            assert_eq!(
                formatter.format_time_spec(&TimeSpec::utc("sometime soon")),
                "sometime soon"
            );
        }
    }

    mod table_tests {
        use super::*;

        #[test]
        fn empty_list_shows_no_events_text() {
            let formatter = OutputFormatter::with_defaults();
            assert_eq!(
                formatter.format_event_list(&[]),
                "No events found for the selected date."
            );
        }

        #[test]
        fn table_has_header_separator_and_rows() {
            let formatter = OutputFormatter::with_defaults();
            let sync = weekly_sync();
            let off = holiday();
            let table = formatter.format_event_list(&[&sync, &off]);
            let lines: Vec<&str> = table.lines().collect();

            assert_eq!(lines.len(), 6);
            assert!(lines[0].starts_with("Event "));
            assert!(lines[0].ends_with("Organizer"));
            assert!(lines[1].chars().all(|c| c == '-' || c == ' '));

            assert!(lines[2].starts_with("Team Weekly Sync"));
            assert!(lines[2].contains("Wed, Mar 20, 10:00 AM"));
            assert!(lines[2].contains("Virtual Meeting Room"));
            assert!(lines[2].ends_with("Team Lead"));

            assert!(lines[3].starts_with("Weekly team sync"));
            assert!(lines[3].ends_with("lead@example.com"));

            assert!(lines[4].starts_with("Holiday"));
            assert!(lines[4].contains("Fri, Mar 22"));
            assert!(lines[4].contains(" - "));
            assert!(lines[4].ends_with("hr@example.com"));
        }

        #[test]
        fn organizer_email_is_always_listed() {
            let formatter = OutputFormatter::with_defaults();
            let off = holiday();
            let table = formatter.format_event_list(&[&off]);
            let lines: Vec<&str> = table.lines().collect();

            assert_eq!(lines.len(), 4);
            assert!(lines[2].ends_with("hr@example.com"));
            assert!(lines[3].trim_start().starts_with("hr@example.com"));
        }

        #[test]
        fn columns_are_aligned() {
            let formatter = OutputFormatter::with_defaults();
            let sync = weekly_sync();
            let off = holiday();
            let table = formatter.format_event_list(&[&sync, &off]);
            let lines: Vec<&str> = table.lines().collect();

            let time_col = lines[0].find("Time").unwrap();
            assert_eq!(lines[2].find("Wed,").unwrap(), time_col);
            assert_eq!(lines[4].find("Fri,").unwrap(), time_col);
        }

        #[test]
        fn long_description_is_truncated() {
            let formatter = OutputFormatter::new(FormatOptions {
                max_description_length: Some(10),
                ..Default::default()
            });
            let event = weekly_sync().with_description("A very long description\nspanning lines");
            let table = formatter.format_event_list(&[&event]);
            assert!(table.lines().nth(3).unwrap().starts_with("A very ..."));
        }
    }

    mod page_tests {
        use super::*;

        #[test]
        fn signed_out_page() {
            let formatter = OutputFormatter::with_defaults();
            let output = formatter.format_page(&Session::new(), "");
            insta::assert_snapshot!(output, @r"
            Calendar Events

            Welcome to Your Calendar
            Sign in with your Google account to view and manage your calendar events.
            ");
        }

        #[test]
        fn failed_login_page_shows_banner() {
            let formatter = OutputFormatter::with_defaults();
            let mut session = Session::new();
            session.apply(SessionAction::LoginStarted);
            let generation = session.generation();
            session.apply(SessionAction::FetchFailed { generation });

            let output = formatter.format_page(&session, "");
            assert!(output.contains(&format!("! {}", FETCH_FAILED)));
            assert!(output.contains("Welcome to Your Calendar"));
        }

        #[test]
        fn loading_page() {
            let formatter = OutputFormatter::with_defaults();
            let mut session = Session::new();
            session.apply(SessionAction::LoginStarted);

            let output = formatter.format_page(&session, "");
            assert!(output.contains("Loading your calendar..."));
            assert!(!output.contains("Welcome"));
        }

        #[test]
        fn signed_in_page_applies_filter() {
            let formatter = OutputFormatter::with_defaults();
            let session = signed_in(vec![weekly_sync(), holiday()]);

            let output = formatter.format_page(&session, "2024-03-22");
            assert!(output.starts_with("Calendar Events | John Doe <user@example.com>"));
            assert!(output.contains("Filter: 2024-03-22"));
            assert!(output.contains("Holiday"));
            assert!(!output.contains("Team Weekly Sync"));
        }

        #[test]
        fn signed_in_page_with_no_matches() {
            let formatter = OutputFormatter::with_defaults();
            let session = signed_in(vec![weekly_sync()]);

            let output = formatter.format_page(&session, "2030");
            assert!(output.ends_with("No events found for the selected date."));
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn json_output_counts_filtered_events() {
            let formatter = OutputFormatter::with_defaults();
            let session = signed_in(vec![weekly_sync(), holiday()]);

            let output = formatter.format_json(&session, "2024-03-20");
            assert_eq!(output.count, 1);
            assert_eq!(output.events[0].id, "1");
            assert_eq!(output.filter.as_deref(), Some("2024-03-20"));
            assert_eq!(output.user, Some(user()));
            assert!(!output.loading);
        }

        #[test]
        fn json_render_omits_empty_filter_and_error() {
            let formatter = OutputFormatter::with_defaults();
            let rendered = formatter.render(&Session::new(), "", OutputFormat::Json);
            let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

            assert!(value["user"].is_null());
            assert_eq!(value["count"], 0);
            assert!(value.get("filter").is_none());
            assert!(value.get("error").is_none());
        }
    }
}
