//! In-memory session state.
//!
//! A [`Session`] holds everything the front-end shows: the signed-in user,
//! the fetched events, the loading flag and the last error. It changes only
//! through [`Session::apply`], a reducer over [`SessionAction`]s.
//!
//! # States
//!
//! ```text
//!                LoginStarted
//!   SignedOut ─────────────────▶ Authenticating ──EventsLoaded──▶ SignedIn
//!      ▲                            │     ▲                          │
//!      │        FetchFailed /       │     └──ProfileLoaded──┘        │
//!      └──────── AuthFailed ────────┘                                │
//!      └──────────────────────────── LoggedOut ──────────────────────┘
//! ```
//!
//! # Stale responses
//!
//! Every login attempt gets a new [`Generation`]. Fetch results carry the
//! generation they were issued under; once the session has moved on
//! (logout, a new login, an authorization failure) those results are
//! dropped instead of being written into the fresh state.

use std::fmt;

use tracing::debug;

use crate::event::{CalendarEvent, User};

/// Message shown when the authorization capability fails.
pub const SIGN_IN_FAILED: &str = "Failed to sign in with Google";

/// Message shown when either the profile or the calendar fetch fails.
pub const FETCH_FAILED: &str = "Failed to fetch user data or calendar events";

/// Identifies one login attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where the session is in the login lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody is signed in.
    #[default]
    SignedOut,
    /// A token was obtained and the fetches are in flight.
    Authenticating {
        /// Set once the profile fetch has completed.
        user: Option<User>,
    },
    /// Both fetches completed.
    SignedIn {
        /// The signed-in user.
        user: User,
        /// Upcoming events in provider order.
        events: Vec<CalendarEvent>,
    },
}

impl SessionState {
    /// Short lowercase name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedOut => "signed_out",
            Self::Authenticating { .. } => "authenticating",
            Self::SignedIn { .. } => "signed_in",
        }
    }
}

/// An input to the session reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// The authorization capability yielded a token; fetching begins.
    LoginStarted,
    /// The authorization capability failed.
    AuthFailed,
    /// The profile fetch for `generation` completed.
    ProfileLoaded {
        /// Login attempt the result belongs to.
        generation: Generation,
        /// The fetched profile.
        user: User,
    },
    /// The calendar fetch for `generation` completed.
    EventsLoaded {
        /// Login attempt the result belongs to.
        generation: Generation,
        /// The normalized events, in provider order.
        events: Vec<CalendarEvent>,
    },
    /// The profile or calendar fetch for `generation` failed.
    FetchFailed {
        /// Login attempt the failure belongs to.
        generation: Generation,
    },
    /// The user signed out.
    LoggedOut,
}

/// What [`Session::apply`] did with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state changed.
    Applied,
    /// The action belonged to an older login attempt and was dropped.
    Stale,
    /// The action does not apply in the current state and was dropped.
    Ignored,
}

/// The front-end's whole in-memory state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    error: Option<String>,
    generation: Generation,
}

impl Session {
    /// Creates an empty, signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the signed-in (or partially signed-in) user.
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::SignedOut => None,
            SessionState::Authenticating { user } => user.as_ref(),
            SessionState::SignedIn { user, .. } => Some(user),
        }
    }

    /// Returns the fetched events; empty unless signed in.
    pub fn events(&self) -> &[CalendarEvent] {
        match &self.state {
            SessionState::SignedIn { events, .. } => events,
            _ => &[],
        }
    }

    /// Returns true while fetches are in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Authenticating { .. })
    }

    /// Returns true once both fetches have completed.
    pub fn is_signed_in(&self) -> bool {
        matches!(self.state, SessionState::SignedIn { .. })
    }

    /// Returns the user-visible error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the current login attempt.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Applies an action and reports what happened.
    pub fn apply(&mut self, action: SessionAction) -> Transition {
        let from = self.state.name();
        let transition = self.reduce(action);
        debug!(
            from,
            to = self.state.name(),
            generation = %self.generation,
            ?transition,
            "session transition"
        );
        transition
    }

    fn reduce(&mut self, action: SessionAction) -> Transition {
        match action {
            SessionAction::LoginStarted => {
                self.generation = self.generation.next();
                self.error = None;
                self.state = SessionState::Authenticating { user: None };
                Transition::Applied
            }
            SessionAction::AuthFailed => {
                self.error = Some(SIGN_IN_FAILED.to_string());
                if self.is_loading() {
                    self.generation = self.generation.next();
                    self.state = SessionState::SignedOut;
                }
                Transition::Applied
            }
            SessionAction::ProfileLoaded { generation, user } => {
                if generation != self.generation {
                    return Transition::Stale;
                }
                match &mut self.state {
                    SessionState::Authenticating { user: slot } => {
                        *slot = Some(user);
                        Transition::Applied
                    }
                    _ => Transition::Ignored,
                }
            }
            SessionAction::EventsLoaded { generation, events } => {
                if generation != self.generation {
                    return Transition::Stale;
                }
                match &mut self.state {
                    SessionState::Authenticating { user } => match user.take() {
                        Some(user) => {
                            self.state = SessionState::SignedIn { user, events };
                            Transition::Applied
                        }
                        None => Transition::Ignored,
                    },
                    _ => Transition::Ignored,
                }
            }
            SessionAction::FetchFailed { generation } => {
                if generation != self.generation {
                    return Transition::Stale;
                }
                if !self.is_loading() {
                    return Transition::Ignored;
                }
                self.error = Some(FETCH_FAILED.to_string());
                self.state = SessionState::SignedOut;
                Transition::Applied
            }
            SessionAction::LoggedOut => {
                self.generation = self.generation.next();
                self.error = None;
                self.state = SessionState::SignedOut;
                Transition::Applied
            }
        }
    }
}
