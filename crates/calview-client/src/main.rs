//! calview CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calview_client::cli::{Cli, Command, ConfigAction, ViewArgs};
use calview_client::commands::{self, Context};
use calview_client::config::ClientConfig;
use calview_client::error::{ClientError, ClientResult};
use calview_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(TracingConfig::for_cli(cli.debug)) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // The page already shows the error banner.
        Err(ClientError::Login(_)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };
    let ctx = Context::new(config, cli.token);

    match cli.command {
        Some(Command::Events(view)) => commands::events::run(&ctx, &view).await,
        Some(Command::Session) => commands::session::run(&ctx).await,
        Some(Command::Config { action }) => {
            let mut stdout = std::io::stdout().lock();
            match action {
                ConfigAction::Dump => commands::config::dump(&ctx.config, &config_path, &mut stdout),
                ConfigAction::Validate => commands::config::validate(&ctx.config, &mut stdout),
                ConfigAction::Path => commands::config::path(&config_path, &mut stdout),
            }
        }
        None => {
            let view: ViewArgs = cli.view;
            commands::events::run(&ctx, &view).await
        }
    }
}
