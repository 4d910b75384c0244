//! Authorization and account data providers.
//!
//! - [`Authorizer`] - yields a bearer [`AccessToken`]
//! - [`AccountProvider`] - reads the profile and events with that token
//! - [`RawEvent`], [`RawUserInfo`] - loosely typed provider records
//! - [`normalize_event`], [`normalize_user`] - raw records to core types
//! - [`ProviderError`], [`FetchError`] - error types
//!
//! ```text
//!  Authorizer ──► AccessToken ──► AccountProvider
//!                                   │          │
//!                          fetch_profile   fetch_events
//!                                   │          │
//!                           RawUserInfo    Vec<RawEvent>
//!                                   │          │
//!                      normalize_user     normalize_events
//!                                   ▼          ▼
//!                                 User   Vec<CalendarEvent>
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod normalize;
pub mod provider;
pub mod raw_event;

pub use error::{FetchError, ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{normalize_event, normalize_events, normalize_user};
pub use provider::{
    AccessToken, AccountProvider, Authorizer, BoxFuture, ErrorProvider, FetchOptions,
    StaticTokenAuthorizer,
};
pub use raw_event::{RawCreator, RawEvent, RawEventPage, RawEventTime, RawUserInfo};
