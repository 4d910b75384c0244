//! Authorization and account provider traits.
//!
//! A login needs two capabilities:
//! - an [`Authorizer`], which yields a bearer [`AccessToken`] (an interactive
//!   consent flow, or a token the user already holds), and
//! - an [`AccountProvider`], which uses that token to read the user's profile
//!   and upcoming events.
//!
//! Both traits return [`BoxFuture`]s so they stay object-safe and can be held
//! as `Box<dyn ...>` by the front-end.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawUserInfo};

/// A boxed future for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An OAuth bearer token.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a token, rejecting empty or whitespace-only input.
    pub fn new(token: impl Into<String>) -> ProviderResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ProviderError::authentication("access token is empty"));
        }
        Ok(Self(token))
    }

    /// Returns the raw token, for the `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Obtains a bearer token for the account.
pub trait Authorizer: Send + Sync {
    /// Runs the authorization flow.
    ///
    /// # Errors
    ///
    /// Returns an error when the user denies consent, the flow times out, or
    /// the token exchange fails.
    fn authorize(&self) -> BoxFuture<'_, ProviderResult<AccessToken>>;
}

/// An [`Authorizer`] that hands out a token obtained elsewhere.
#[derive(Debug, Clone)]
pub struct StaticTokenAuthorizer {
    token: String,
}

impl StaticTokenAuthorizer {
    /// Creates an authorizer for the given token.
    ///
    /// The token is validated on [`Authorizer::authorize`], so an empty token
    /// surfaces as an authorization failure rather than a construction error.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn authorize(&self) -> BoxFuture<'_, ProviderResult<AccessToken>> {
        let result = AccessToken::new(self.token.clone()).map_err(|e| e.with_provider("static"));
        Box::pin(async move { result })
    }
}

/// Options for fetching events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Calendar to read (`primary` for the user's main calendar).
    pub calendar_id: String,
    /// Lower bound on event start time.
    pub time_min: Option<DateTime<Utc>>,
    /// Expand recurring events into single instances.
    pub single_events: bool,
    /// Sort by start time (requires `single_events`).
    pub order_by_start_time: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            calendar_id: "primary".to_string(),
            time_min: None,
            single_events: false,
            order_by_start_time: false,
        }
    }
}

impl FetchOptions {
    /// Upcoming single instances from now, ordered by start time.
    pub fn upcoming() -> Self {
        Self::upcoming_from(Utc::now())
    }

    /// Upcoming single instances from `now`, ordered by start time.
    pub fn upcoming_from(now: DateTime<Utc>) -> Self {
        Self {
            time_min: Some(now),
            single_events: true,
            order_by_start_time: true,
            ..Self::default()
        }
    }

    /// Builder method to set the calendar.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }
}

/// Read access to an account's profile and calendar.
///
/// Implementations return raw records; normalization is the caller's job
/// (see [`crate::normalize`]).
pub trait AccountProvider: Send + Sync {
    /// Returns the provider name (e.g. "google").
    fn name(&self) -> &str;

    /// Fetches the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport failures, non-success statuses or
    /// an unparseable body.
    fn fetch_profile<'a>(&'a self, token: &'a AccessToken)
    -> BoxFuture<'a, ProviderResult<RawUserInfo>>;

    /// Fetches events, in provider order.
    ///
    /// # Errors
    ///
    /// Same as [`AccountProvider::fetch_profile`].
    fn fetch_events<'a>(
        &'a self,
        token: &'a AccessToken,
        options: FetchOptions,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>>;
}

/// A provider that always returns an error.
///
/// Stands in when the real provider could not be built, so the front-end can
/// still run and report the failure through the normal login flow.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name)
    }
}

impl AccountProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_profile<'a>(
        &'a self,
        _token: &'a AccessToken,
    ) -> BoxFuture<'a, ProviderResult<RawUserInfo>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn fetch_events<'a>(
        &'a self,
        _token: &'a AccessToken,
        _options: FetchOptions,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}
