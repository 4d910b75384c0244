//! Subcommand implementations.

pub mod config;
pub mod events;
pub mod session;

use calview_core::OutputFormatter;
use calview_providers::google::{GoogleConfig, GoogleProvider, OAuthClient};
use calview_providers::{AccountProvider, Authorizer, ErrorProvider, StaticTokenAuthorizer};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// What every command needs: the loaded config and the global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Loaded configuration.
    pub config: ClientConfig,
    /// Static token from `--token` / `CALVIEW_ACCESS_TOKEN`.
    pub token: Option<String>,
}

impl Context {
    /// Creates a context.
    pub fn new(config: ClientConfig, token: Option<String>) -> Self {
        Self { config, token }
    }

    /// Resolved Google provider configuration.
    pub fn google_config(&self) -> ClientResult<GoogleConfig> {
        self.config.google.to_provider_config()
    }

    /// The static token if one was given, otherwise the browser flow.
    pub fn authorizer(&self, google: &GoogleConfig) -> ClientResult<Box<dyn Authorizer>> {
        if let Some(token) = &self.token {
            debug!("using static access token");
            return Ok(Box::new(StaticTokenAuthorizer::new(token.clone())));
        }
        Ok(Box::new(OAuthClient::new(google)?))
    }

    /// The Google provider, or a stand-in that fails every fetch.
    pub fn provider(&self, google: GoogleConfig) -> Box<dyn AccountProvider> {
        match GoogleProvider::new(google) {
            Ok(provider) => Box::new(provider),
            Err(e) => {
                warn!(error = %e, "Google provider unavailable");
                Box::new(ErrorProvider::new(GoogleProvider::NAME, e))
            }
        }
    }

    /// Formatter configured from `[display]`.
    pub fn formatter(&self) -> OutputFormatter {
        OutputFormatter::new(self.config.display.to_format_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_wins_over_oauth() {
        let ctx = Context::new(ClientConfig::default(), Some("ya29.abc".to_string()));
        let google = ctx.google_config().unwrap();
        let token = ctx.authorizer(&google).unwrap().authorize().await.unwrap();
        assert_eq!(token.secret(), "ya29.abc");
    }

    #[test]
    fn oauth_needs_client_id() {
        let ctx = Context::default();
        let mut google = ctx.google_config().unwrap();
        google.credentials = None;
        assert!(ctx.authorizer(&google).is_err());
    }

    #[test]
    fn provider_is_google() {
        let ctx = Context::default();
        let provider = ctx.provider(GoogleConfig::default());
        assert_eq!(provider.name(), "google");
    }
}
