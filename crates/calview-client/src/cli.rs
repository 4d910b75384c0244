//! Command-line interface definition.

use std::path::PathBuf;

use calview_core::OutputFormat;
use clap::{Args, Parser, Subcommand};

/// calview - your upcoming Google Calendar events in the terminal
#[derive(Debug, Parser)]
#[command(name = "calview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALVIEW_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Use this OAuth access token instead of the browser sign-in
    #[arg(long, env = "CALVIEW_ACCESS_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(flatten)]
    pub view: ViewArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// How to show the event list.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Only show events whose start begins with this prefix (e.g. 2024-03-20)
    #[arg(long, short, default_value = "")]
    pub date: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl ViewArgs {
    /// Returns the output format based on the flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Tty
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and list upcoming events (the default)
    Events(ViewArgs),

    /// Interactive session: login, logout, filter, show
    Session,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
