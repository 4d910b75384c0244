//! The login flow.
//!
//! Authorization first, then the profile fetch, then the calendar fetch,
//! strictly one after the other. Every outcome is fed to the session as a
//! [`SessionAction`]; results carry the [`Generation`] of the login that
//! issued them, so a logout or a newer login makes them stale.

use calview_core::{Generation, Session, SessionAction};
use calview_providers::{
    AccessToken, AccountProvider, Authorizer, FetchError, FetchOptions, normalize_events,
    normalize_user,
};
use tracing::{info, warn};

/// Obtains a token and moves the session into `Authenticating`.
///
/// On failure the session receives [`SessionAction::AuthFailed`].
pub async fn authorize(
    session: &mut Session,
    authorizer: &dyn Authorizer,
) -> Result<AccessToken, FetchError> {
    match authorizer.authorize().await {
        Ok(token) => {
            session.apply(SessionAction::LoginStarted);
            info!(generation = %session.generation(), "signed in, loading account");
            Ok(token)
        }
        Err(e) => {
            warn!(error = %e, "authorization failed");
            session.apply(SessionAction::AuthFailed);
            Err(FetchError::Auth(e))
        }
    }
}

/// Fetches the profile, then the upcoming events of `calendar_id`, emitting
/// an action for each result.
///
/// The calendar is never requested when the profile fetch fails. Its lower
/// bound is taken when the calendar request is issued.
pub async fn fetch_account(
    provider: &dyn AccountProvider,
    token: &AccessToken,
    calendar_id: &str,
    generation: Generation,
    mut emit: impl FnMut(SessionAction),
) -> Result<(), FetchError> {
    let raw_user = match provider.fetch_profile(token).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, %generation, "profile fetch failed");
            emit(SessionAction::FetchFailed { generation });
            return Err(FetchError::Profile(e));
        }
    };
    emit(SessionAction::ProfileLoaded {
        generation,
        user: normalize_user(&raw_user),
    });

    let options = FetchOptions::upcoming().with_calendar_id(calendar_id);
    let raw_events = match provider.fetch_events(token, options).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, %generation, "calendar fetch failed");
            emit(SessionAction::FetchFailed { generation });
            return Err(FetchError::Calendar(e));
        }
    };
    let events = normalize_events(&raw_events);
    info!(count = events.len(), %generation, "calendar loaded");
    emit(SessionAction::EventsLoaded { generation, events });

    Ok(())
}

/// Runs the whole flow against `session`.
pub async fn run_login(
    session: &mut Session,
    authorizer: &dyn Authorizer,
    provider: &dyn AccountProvider,
    calendar_id: &str,
) -> Result<(), FetchError> {
    let token = authorize(session, authorizer).await?;
    let generation = session.generation();
    fetch_account(provider, &token, calendar_id, generation, |action| {
        session.apply(action);
    })
    .await
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory providers for exercising the flow.

    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use calview_providers::{
        BoxFuture, ProviderError, ProviderResult, RawCreator, RawEvent, RawEventTime,
        RawUserInfo,
    };

    use super::*;

    /// Records calls and returns canned results.
    #[derive(Default)]
    pub struct FakeProvider {
        pub profile_error: Option<u16>,
        pub events_error: Option<u16>,
        pub events: Vec<RawEvent>,
        pub calls: Mutex<Vec<&'static str>>,
        /// Options of each events request and when it was issued.
        pub requests: Mutex<Vec<(FetchOptions, DateTime<Utc>)>>,
    }

    impl FakeProvider {
        pub fn with_events(events: Vec<RawEvent>) -> Self {
            Self {
                events,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        pub fn requests(&self) -> Vec<(FetchOptions, DateTime<Utc>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AccountProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn fetch_profile<'a>(
            &'a self,
            _token: &'a AccessToken,
        ) -> BoxFuture<'a, ProviderResult<RawUserInfo>> {
            self.calls.lock().unwrap().push("profile");
            let result = match self.profile_error {
                Some(status) => Err(ProviderError::from_status(status, "")),
                None => Ok(RawUserInfo {
                    email: Some("user@example.com".to_string()),
                    name: Some("John Doe".to_string()),
                    picture: Some("https://example.com/p.png".to_string()),
                }),
            };
            Box::pin(async move { result })
        }

        fn fetch_events<'a>(
            &'a self,
            _token: &'a AccessToken,
            options: FetchOptions,
        ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
            self.calls.lock().unwrap().push("events");
            self.requests.lock().unwrap().push((options, Utc::now()));
            let result = match self.events_error {
                Some(status) => Err(ProviderError::from_status(status, "")),
                None => Ok(self.events.clone()),
            };
            Box::pin(async move { result })
        }
    }

    pub fn raw_event(id: &str, start: &str) -> RawEvent {
        RawEvent::new(
            id,
            RawEventTime::from_datetime(start),
            RawEventTime::from_datetime(start),
        )
        .with_summary(format!("Event {}", id))
        .with_creator(RawCreator::new("lead@example.com"))
    }
}
