//! Client error types.

use std::fmt;

use calview_core::TracingError;
use calview_providers::{FetchError, ProviderError};

use crate::secret::SecretError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// A secret reference could not be resolved.
    Secret(SecretError),
    /// Provider could not be set up.
    Provider(ProviderError),
    /// The login flow failed.
    Login(FetchError),
    /// IO error.
    Io(std::io::Error),
    /// Logging could not be initialized.
    Tracing(TracingError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Secret(err) => write!(f, "secret error: {}", err),
            Self::Provider(err) => write!(f, "provider error: {}", err),
            // Only the collapsed message; the detail is in the logs.
            Self::Login(err) => f.write_str(err.user_message()),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Tracing(err) => write!(f, "logging error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Secret(err) => Some(err),
            Self::Provider(err) => Some(err),
            Self::Login(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Tracing(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SecretError> for ClientError {
    fn from(err: SecretError) -> Self {
        Self::Secret(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<FetchError> for ClientError {
    fn from(err: FetchError) -> Self {
        Self::Login(err)
    }
}

impl From<TracingError> for ClientError {
    fn from(err: TracingError) -> Self {
        Self::Tracing(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calview_core::{FETCH_FAILED, SIGN_IN_FAILED};

    #[test]
    fn login_errors_show_only_the_collapsed_message() {
        let err: ClientError =
            FetchError::Profile(ProviderError::from_status(500, "backend exploded")).into();
        assert_eq!(err.to_string(), FETCH_FAILED);

        let err: ClientError = FetchError::Auth(ProviderError::authentication("denied")).into();
        assert_eq!(err.to_string(), SIGN_IN_FAILED);
    }

    #[test]
    fn config_error_display() {
        let err = ClientError::Config("bad timeout".to_string());
        assert_eq!(err.to_string(), "configuration error: bad timeout");
    }
}
