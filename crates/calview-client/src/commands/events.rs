//! One-shot sign-in and event list.

use std::io::Write;

use calview_core::{OutputFormatter, Session};
use calview_providers::{AccountProvider, Authorizer};

use super::Context;
use crate::cli::ViewArgs;
use crate::error::ClientResult;
use crate::login;

/// Signs in, loads the calendar and prints the page.
pub async fn run(ctx: &Context, view: &ViewArgs) -> ClientResult<()> {
    let google = ctx.google_config()?;
    let authorizer = ctx.authorizer(&google)?;
    let calendar_id = google.calendar_id.clone();
    let provider = ctx.provider(google);

    let mut stdout = std::io::stdout().lock();
    show(
        authorizer.as_ref(),
        provider.as_ref(),
        &calendar_id,
        &ctx.formatter(),
        view,
        &mut stdout,
    )
    .await
}

/// Runs the login flow and writes the resulting page.
///
/// The page is written even when the login fails; it then shows the error
/// banner and the sign-in text.
pub async fn show<W: Write>(
    authorizer: &dyn Authorizer,
    provider: &dyn AccountProvider,
    calendar_id: &str,
    formatter: &OutputFormatter,
    view: &ViewArgs,
    out: &mut W,
) -> ClientResult<()> {
    let mut session = Session::new();
    let result = login::run_login(&mut session, authorizer, provider, calendar_id).await;

    writeln!(
        out,
        "{}",
        formatter.render(&session, &view.date, view.output_format())
    )?;
    result?;
    Ok(())
}
