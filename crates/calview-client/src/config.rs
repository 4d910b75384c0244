//! Client configuration.
//!
//! All settings live in a single `config.toml`, by default at
//! `~/.config/calview/config.toml`:
//!
//! ```toml
//! [google]
//! client_id = "env::CALVIEW_CLIENT_ID"
//! client_secret = "pass::google/calview"
//! calendar_id = "primary"
//! timeout = 30
//!
//! [display]
//! time_format = "24h"
//! ```
//!
//! `client_id` and `client_secret` support secret references (see
//! [`crate::secret`]). Without a configured `client_id`, the id baked in at
//! build time through `CALVIEW_GOOGLE_CLIENT_ID` is used.

use std::path::{Path, PathBuf};
use std::time::Duration;

use calview_core::{FormatOptions, TimeFormat};
use calview_providers::google::{GoogleConfig, OAuthCredentials};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Configuration for the calview client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Google account settings.
    pub google: GoogleSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parses a TOML document.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calview")
            .join("config.toml")
    }
}

/// Google account settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth client secret (supports `pass::` and `env::` prefixes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Calendar to read.
    pub calendar_id: String,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Ports tried for the OAuth loopback redirect.
    pub loopback_port_range: (u16, u16),

    /// Calendar API base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// User-info endpoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userinfo_url: Option<String>,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            calendar_id: GoogleConfig::DEFAULT_CALENDAR_ID.to_string(),
            timeout: GoogleConfig::DEFAULT_TIMEOUT_SECS,
            loopback_port_range: (8080, 8090),
            api_base: None,
            userinfo_url: None,
        }
    }
}

impl GoogleSettings {
    /// Resolves the OAuth credentials.
    ///
    /// Returns `None` when neither the config nor the build carries a client
    /// id; the interactive flow is then unavailable but a static token still
    /// works.
    pub fn resolve_credentials(&self) -> ClientResult<Option<OAuthCredentials>> {
        let Some(raw_id) = self.client_id.as_deref() else {
            if self.client_secret.is_some() {
                return Err(ClientError::Config(
                    "[google] client_secret is set without client_id".to_string(),
                ));
            }
            return Ok(OAuthCredentials::from_build_env());
        };

        let mut credentials = OAuthCredentials::new(secret::resolve(raw_id)?);
        if let Some(raw_secret) = self.client_secret.as_deref() {
            credentials = credentials.with_secret(secret::resolve(raw_secret)?);
        }
        Ok(Some(credentials))
    }

    /// Builds and validates the provider configuration.
    pub fn to_provider_config(&self) -> ClientResult<GoogleConfig> {
        let mut config = GoogleConfig {
            credentials: self.resolve_credentials()?,
            ..GoogleConfig::default()
        }
        .with_calendar_id(&self.calendar_id)
        .with_timeout(Duration::from_secs(self.timeout))
        .with_loopback_port_range(self.loopback_port_range.0, self.loopback_port_range.1);

        if let Some(api_base) = &self.api_base {
            config = config.with_api_base(api_base);
        }
        if let Some(userinfo_url) = &self.userinfo_url {
            config = config.with_userinfo_url(userinfo_url);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// `12h` or `24h`.
    pub time_format: TimeFormat,

    /// Text shown when no event matches the filter.
    pub no_events_text: String,

    /// Maximum description length in the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_description_length: Option<usize>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let defaults = FormatOptions::default();
        Self {
            time_format: defaults.time_format,
            no_events_text: defaults.no_events_text,
            max_description_length: defaults.max_description_length,
        }
    }
}

impl DisplaySettings {
    /// Converts to formatter options.
    pub fn to_format_options(&self) -> FormatOptions {
        FormatOptions {
            time_format: self.time_format,
            no_events_text: self.no_events_text.clone(),
            max_description_length: self.max_description_length,
        }
    }
}
