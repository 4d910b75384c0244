//! CLI: sign-in, event list, interactive session
//!
//! This crate provides the `calview` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod login;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
