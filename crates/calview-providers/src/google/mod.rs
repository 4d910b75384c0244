//! Google account provider.
//!
//! - [`OAuthClient`]: installed-app OAuth 2.0 with PKCE and a loopback
//!   redirect, implementing [`crate::Authorizer`]
//! - [`GoogleProvider`]: user-info and Calendar API v3 reads, implementing
//!   [`crate::AccountProvider`]
//!
//! ```ignore
//! use calview_providers::google::{GoogleConfig, GoogleProvider, OAuthClient, OAuthCredentials};
//!
//! let config = GoogleConfig::new(OAuthCredentials::new("id.apps.googleusercontent.com"));
//! let authorizer = OAuthClient::new(&config)?;
//! let provider = GoogleProvider::new(config)?;
//! ```

mod client;
mod config;
mod oauth;
mod provider;

pub use client::GoogleApiClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{Callback, OAuthClient, PkceFlow, parse_callback};
pub use provider::GoogleProvider;
