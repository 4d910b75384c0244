//! Configuration commands.

use std::io::Write;
use std::path::Path;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Dump the current configuration.
///
/// Secret references are printed unresolved.
pub fn dump<W: Write>(config: &ClientConfig, source: &Path, out: &mut W) -> ClientResult<()> {
    writeln!(out, "# config.toml ({})", source.display())?;
    writeln!(out, "{}", config.to_toml()?)?;
    Ok(())
}

/// Validate the configuration, resolving secret references.
pub fn validate<W: Write>(config: &ClientConfig, out: &mut W) -> ClientResult<()> {
    let google = config.google.to_provider_config()?;
    match &google.credentials {
        Some(credentials) => writeln!(
            out,
            "Google client id: {} ({})",
            credentials.client_id,
            if credentials.client_secret.is_some() {
                "with secret"
            } else {
                "no secret"
            }
        )?,
        None => writeln!(
            out,
            "No Google client id configured; only --token sign-in is available."
        )?,
    }
    writeln!(out, "Configuration is valid.")?;
    Ok(())
}

/// Show the configuration file path.
pub fn path<W: Write>(source: &Path, out: &mut W) -> ClientResult<()> {
    writeln!(out, "config: {}", source.display())?;
    Ok(())
}
