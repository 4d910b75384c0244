//! Core types: users, events, date filter, session state, formatting

pub mod event;
pub mod filter;
pub mod format;
pub mod session;
pub mod time;
pub mod tracing;

pub use event::{CalendarEvent, Creator, TimeSpec, User};
pub use filter::{filter_by_date, matches_date_prefix};
pub use format::{FormatOptions, JsonOutput, OutputFormat, OutputFormatter, TimeFormat, ellipsis};
pub use session::{
    FETCH_FAILED, Generation, SIGN_IN_FAILED, Session, SessionAction, SessionState, Transition,
};
pub use time::EventTime;
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
