//! [`AccountProvider`] for Google accounts.

use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::{AccessToken, AccountProvider, BoxFuture, FetchOptions};
use crate::raw_event::{RawEvent, RawUserInfo};

use super::client::GoogleApiClient;
use super::config::GoogleConfig;

/// Reads a Google account's profile and calendar.
#[derive(Debug)]
pub struct GoogleProvider {
    client: GoogleApiClient,
}

impl GoogleProvider {
    /// Provider name used in errors and logs.
    pub const NAME: &'static str = "google";

    /// Creates a provider.
    ///
    /// Credentials are not needed here; the token comes from an
    /// [`crate::Authorizer`].
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;
        let client = GoogleApiClient::new(&config)?;
        Ok(Self { client })
    }
}

impl AccountProvider for GoogleProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn fetch_profile<'a>(
        &'a self,
        token: &'a AccessToken,
    ) -> BoxFuture<'a, ProviderResult<RawUserInfo>> {
        Box::pin(async move {
            debug!("fetching user info");
            self.client
                .fetch_user_info(token)
                .await
                .map_err(|e| e.with_provider(Self::NAME))
        })
    }

    fn fetch_events<'a>(
        &'a self,
        token: &'a AccessToken,
        options: FetchOptions,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
        Box::pin(async move {
            debug!(calendar = %options.calendar_id, "fetching events");
            let page = self
                .client
                .list_events(token, &options)
                .await
                .map_err(|e| e.with_provider(Self::NAME))?;
            Ok(page.items)
        })
    }
}
