//! Secret references in configuration values.
//!
//! - `pass::path/in/store` runs `pass show path/in/store` and uses the first line
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - anything else is plain text

use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Errors from resolving a secret reference.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The environment variable is unset or not unicode.
    #[error("environment variable `{0}` is not set")]
    EnvNotSet(String),

    /// `pass` could not be started.
    #[error("failed to run `pass show {path}`: {source}")]
    PassSpawn {
        /// Store path.
        path: String,
        /// Spawn error.
        #[source]
        source: std::io::Error,
    },

    /// `pass` exited with an error.
    #[error("`pass show {path}` failed ({status}): {stderr}")]
    PassFailed {
        /// Store path.
        path: String,
        /// Exit status.
        status: String,
        /// Trimmed stderr.
        stderr: String,
    },

    /// `pass` printed nothing.
    #[error("`pass show {0}` produced no output")]
    PassEmpty(String),
}

/// A parsed configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// Used as-is.
    Plain(&'a str),
    /// Read from the environment.
    Env(&'a str),
    /// Read from the `pass` password store.
    Pass(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Classifies a configuration value by its prefix.
    pub fn parse(value: &'a str) -> Self {
        if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else {
            Self::Plain(value)
        }
    }

    /// Returns the secret's value.
    pub fn resolve(self) -> Result<String, SecretError> {
        match self {
            Self::Plain(value) => Ok(value.to_string()),
            Self::Env(var) => {
                debug!(var, "resolving secret from environment");
                std::env::var(var).map_err(|_| SecretError::EnvNotSet(var.to_string()))
            }
            Self::Pass(path) => resolve_pass(path),
        }
    }
}

/// Resolves a value that may contain a secret reference prefix.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    SecretRef::parse(value).resolve()
}

fn resolve_pass(path: &str) -> Result<String, SecretError> {
    debug!(path, "resolving secret from pass");
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|source| SecretError::PassSpawn {
            path: path.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            path: path.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::PassEmpty(path.to_string()))
}
