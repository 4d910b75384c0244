//! Google provider configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials.
///
/// Installed-app clients using PKCE may omit the secret; Google still issues
/// one for "Desktop app" clients and expects it on the token exchange.
#[derive(Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret, if the client type has one.
    pub client_secret: Option<String>,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Google's downloadable credentials JSON, nested or flat.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<FileCredentials>,
    web: Option<FileCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileCredentials {
    client_id: String,
    client_secret: Option<String>,
}

impl OAuthCredentials {
    /// Creates credentials with only a client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
        }
    }

    /// Builder method to set the client secret.
    pub fn with_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// The client id baked in at build time through `CALVIEW_GOOGLE_CLIENT_ID`.
    pub fn from_build_env() -> Option<Self> {
        option_env!("CALVIEW_GOOGLE_CLIENT_ID")
            .filter(|id| !id.trim().is_empty())
            .map(Self::new)
    }

    /// Parses the JSON downloaded from the Cloud Console.
    ///
    /// Accepts `{"installed": {...}}`, `{"web": {...}}` or a flat
    /// `{"client_id": ..., "client_secret": ...}`.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
                .with_source(e)
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self {
                client_id: creds.client_id,
                client_secret: creds.client_secret,
            });
        }

        match file.client_id {
            Some(client_id) => Ok(Self {
                client_id,
                client_secret: file.client_secret,
            }),
            None => Err(ProviderError::configuration(
                "credentials JSON has no 'installed'/'web' section and no 'client_id'",
            )),
        }
    }

    /// Checks that the client id looks like a Google OAuth client id.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err(ProviderError::configuration(
                "client_id should end with .apps.googleusercontent.com",
            ));
        }
        if self.client_secret.as_deref().is_some_and(|s| s.is_empty()) {
            return Err(ProviderError::configuration("client_secret is set but empty"));
        }
        Ok(())
    }
}

/// Configuration for the Google provider and its OAuth flow.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth credentials, required only for the interactive flow.
    pub credentials: Option<OAuthCredentials>,
    /// Calendar to read.
    pub calendar_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Ports tried, in order, for the loopback redirect server.
    pub loopback_port_range: (u16, u16),
    /// OAuth scopes to request.
    pub scopes: Vec<String>,
    /// Calendar API v3 base URL.
    pub api_base: String,
    /// User-info endpoint.
    pub userinfo_url: String,
    /// User agent for API requests.
    pub user_agent: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            loopback_port_range: (8080, 8090),
            scopes: Self::DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            userinfo_url: Self::DEFAULT_USERINFO_URL.to_string(),
            user_agent: format!("calview/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// The user's main calendar.
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";

    /// Calendar API v3 base URL.
    pub const DEFAULT_API_BASE: &'static str = "https://www.googleapis.com/calendar/v3";

    /// OpenID user-info endpoint.
    pub const DEFAULT_USERINFO_URL: &'static str = "https://www.googleapis.com/oauth2/v3/userinfo";

    /// Read-only calendar access, basic profile and email.
    pub const DEFAULT_SCOPES: [&'static str; 3] = [
        "https://www.googleapis.com/auth/calendar.readonly",
        "https://www.googleapis.com/auth/userinfo.profile",
        "https://www.googleapis.com/auth/userinfo.email",
    ];

    /// Creates a configuration for the interactive OAuth flow.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::default()
        }
    }

    /// Sets the calendar to read.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the loopback port range for OAuth.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Points the Calendar API at another base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Points the user-info request at another URL.
    pub fn with_userinfo_url(mut self, userinfo_url: impl Into<String>) -> Self {
        self.userinfo_url = userinfo_url.into();
        self
    }

    /// Parsed Calendar API base URL.
    pub fn api_base_url(&self) -> ProviderResult<Url> {
        parse_url("api_base", &self.api_base)
    }

    /// Parsed user-info URL.
    pub fn userinfo_endpoint(&self) -> ProviderResult<Url> {
        parse_url("userinfo_url", &self.userinfo_url)
    }

    /// Validates the configuration.
    ///
    /// Credentials are checked only when present; a static token does not
    /// need them.
    pub fn validate(&self) -> ProviderResult<()> {
        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }
        if self.calendar_id.trim().is_empty() {
            return Err(ProviderError::configuration("calendar_id must not be empty"));
        }
        if self.scopes.is_empty() {
            return Err(ProviderError::configuration(
                "at least one OAuth scope is required",
            ));
        }
        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err(ProviderError::configuration("invalid loopback port range"));
        }
        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("timeout must be positive"));
        }
        self.api_base_url()?;
        self.userinfo_endpoint()?;
        Ok(())
    }
}

fn parse_url(field: &str, value: &str) -> ProviderResult<Url> {
    let url = Url::parse(value).map_err(|e| {
        ProviderError::configuration(format!("invalid {} '{}': {}", field, value, e))
            .with_source(e)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProviderError::configuration(format!(
            "{} must be http(s), got '{}'",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT_ID: &str = "123.apps.googleusercontent.com";

    #[test]
    fn defaults_match_google_endpoints() {
        let config = GoogleConfig::default();
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.scopes.len(), 3);
        assert!(config.scopes[0].ends_with("calendar.readonly"));
        assert_eq!(
            config.userinfo_endpoint().unwrap().as_str(),
            "https://www.googleapis.com/oauth2/v3/userinfo"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn credentials_from_installed_json() {
        let json = r#"{"installed":{"client_id":"123.apps.googleusercontent.com","client_secret":"s3cret","project_id":"p"}}"#;
        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, CLIENT_ID);
        assert_eq!(creds.client_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn credentials_from_flat_json_without_secret() {
        let json = r#"{"client_id":"123.apps.googleusercontent.com"}"#;
        let creds = OAuthCredentials::from_json(json).unwrap();
        assert!(creds.client_secret.is_none());
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn credentials_json_without_client_id_fails() {
        assert!(OAuthCredentials::from_json(r#"{"foo":1}"#).is_err());
        assert!(OAuthCredentials::from_json("not json").is_err());
    }

    #[test]
    fn credentials_validation() {
        assert!(OAuthCredentials::new("").validate().is_err());
        assert!(OAuthCredentials::new("bogus").validate().is_err());
        assert!(OAuthCredentials::new(CLIENT_ID).with_secret("").validate().is_err());
        assert!(OAuthCredentials::new(CLIENT_ID).with_secret("x").validate().is_ok());
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = OAuthCredentials::new(CLIENT_ID).with_secret("hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn rejects_bad_urls_and_ranges() {
        let config = GoogleConfig::default().with_api_base("not a url");
        assert!(config.validate().is_err());

        let config = GoogleConfig::default().with_userinfo_url("ftp://example.com/me");
        assert!(config.validate().is_err());

        let config = GoogleConfig::default().with_loopback_port_range(9000, 8000);
        assert!(config.validate().is_err());

        let config = GoogleConfig::default().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validates_present_credentials() {
        let config = GoogleConfig::new(OAuthCredentials::new("bogus"));
        assert!(config.validate().is_err());
    }
}
