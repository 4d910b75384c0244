//! Google HTTP API client.
//!
//! Low-level access to the two endpoints a login needs: the OpenID user-info
//! endpoint and the Calendar API v3 events list. Responses are returned as
//! raw records; nothing here retries.

use chrono::SecondsFormat;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AccessToken, FetchOptions};
use crate::raw_event::{RawEventPage, RawUserInfo};

use super::config::GoogleConfig;

/// Google API client.
#[derive(Debug, Clone)]
pub struct GoogleApiClient {
    http_client: reqwest::Client,
    api_base: Url,
    userinfo_url: Url,
}

impl GoogleApiClient {
    /// Creates a client from the provider configuration.
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            api_base: config.api_base_url()?,
            userinfo_url: config.userinfo_endpoint()?,
        })
    }

    /// Fetches the signed-in user's profile.
    pub async fn fetch_user_info(&self, token: &AccessToken) -> ProviderResult<RawUserInfo> {
        let request = self
            .http_client
            .get(self.userinfo_url.clone())
            .bearer_auth(token.secret());
        self.send_json(request).await
    }

    /// Fetches the first page of events for `options.calendar_id`.
    pub async fn list_events(
        &self,
        token: &AccessToken,
        options: &FetchOptions,
    ) -> ProviderResult<RawEventPage> {
        let url = self.events_url(&options.calendar_id)?;

        let mut request = self.http_client.get(url).bearer_auth(token.secret());
        if options.order_by_start_time {
            request = request.query(&[("orderBy", "startTime")]);
        }
        if options.single_events {
            request = request.query(&[("singleEvents", "true")]);
        }
        if let Some(time_min) = options.time_min {
            request = request.query(&[(
                "timeMin",
                time_min.to_rfc3339_opts(SecondsFormat::Millis, true),
            )]);
        }

        let page: RawEventPage = self.send_json(request).await?;
        debug!(
            calendar = %options.calendar_id,
            count = page.items.len(),
            "fetched events page"
        );
        if let Some(token) = &page.next_page_token {
            debug!(next_page_token = %token, "more events available, only the first page is read");
        }
        Ok(page)
    }

    fn events_url(&self, calendar_id: &str) -> ProviderResult<Url> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base.as_str().trim_end_matches('/'),
            urlencoding::encode(calendar_id)
        );
        Url::parse(&url).map_err(|e| {
            ProviderError::configuration(format!("invalid events URL '{}': {}", url, e))
                .with_source(e)
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> ProviderResult<T> {
        let response = request.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                format!("connection failed: {}", e)
            } else {
                format!("request failed: {}", e)
            };
            ProviderError::network(message).with_source(e)
        })?;

        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "google response");

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
                .with_source(e)
        })
    }
}
