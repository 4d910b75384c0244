//! Interactive session.
//!
//! Reads one command per line and redraws the page after each state change.
//! A login's fetches run alongside the input loop, so `logout` (or another
//! `login`) can be typed while they are in flight; their late results are
//! then dropped by the session's generation check.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use calview_core::{OutputFormatter, Session, SessionAction};
use calview_providers::{AccountProvider, Authorizer, FetchError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use super::Context;
use crate::error::ClientResult;
use crate::login;

const HELP: &str = "\
Commands:
  login            sign in with Google and load upcoming events
  logout           sign out and clear everything
  filter <PREFIX>  only show events starting with PREFIX (no PREFIX clears)
  show             redraw the page
  whoami           show the signed-in user
  help             show this help
  quit             exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start a login.
    Login,
    /// Sign out.
    Logout,
    /// Set the date filter; empty clears it.
    Filter(String),
    /// Redraw the page.
    Show,
    /// Print the signed-in user.
    WhoAmI,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

impl SessionCommand {
    /// Parses a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "login" | "signin" => Self::Login,
            "logout" | "signout" => Self::Logout,
            "filter" | "date" => Self::Filter(rest.to_string()),
            "show" | "ls" => Self::Show,
            "whoami" => Self::WhoAmI,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Some(Err(format!("unknown command '{}', try 'help'", other))),
        };
        Some(Ok(command))
    }
}

/// Everything the loop needs besides its input and output.
pub struct SessionContext<'a> {
    /// Yields the bearer token on `login`.
    pub authorizer: &'a dyn Authorizer,
    /// Reads the profile and events.
    pub provider: &'a dyn AccountProvider,
    /// Calendar to read.
    pub calendar_id: String,
    /// Page renderer.
    pub formatter: &'a OutputFormatter,
}

type PendingFetch<'a> = Pin<Box<dyn Future<Output = Result<(), FetchError>> + 'a>>;

/// Runs the interactive session on stdin/stdout.
pub async fn run(ctx: &Context) -> ClientResult<()> {
    let google = ctx.google_config()?;
    let authorizer = ctx.authorizer(&google)?;
    let calendar_id = google.calendar_id.clone();
    let provider = ctx.provider(google);
    let formatter = ctx.formatter();

    let session_ctx = SessionContext {
        authorizer: authorizer.as_ref(),
        provider: provider.as_ref(),
        calendar_id,
        formatter: &formatter,
    };

    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(input, &mut stdout, &session_ctx).await?;
    Ok(())
}

/// Drives the session until `quit` or end of input, returning its final
/// state.
///
/// At end of input a login still in flight is allowed to finish.
pub async fn run_session<R, W>(
    input: R,
    out: &mut W,
    ctx: &SessionContext<'_>,
) -> ClientResult<Session>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut session = Session::new();
    let mut filter = String::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionAction>();
    let mut pending: Option<PendingFetch<'_>> = None;
    let mut input_open = true;

    writeln!(out, "{}\n\nType 'help' for commands.", ctx.formatter.format_page(&session, &filter))?;

    loop {
        if !input_open && pending.is_none() {
            break;
        }

        tokio::select! {
            biased;

            Some(action) = rx.recv() => {
                session.apply(action);
            }

            result = wait_pending(&mut pending), if pending.is_some() => {
                pending = None;
                while let Ok(action) = rx.try_recv() {
                    session.apply(action);
                }
                if let Err(e) = result {
                    debug!(error = %e, "login finished with error");
                }
                writeln!(out, "{}", ctx.formatter.format_page(&session, &filter))?;
            }

            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                let command = match SessionCommand::parse(&line) {
                    None => continue,
                    Some(Err(message)) => {
                        writeln!(out, "{}", message)?;
                        continue;
                    }
                    Some(Ok(command)) => command,
                };
                debug!(?command, "session command");

                match command {
                    SessionCommand::Login => {
                        // A new login supersedes one still in flight.
                        pending = None;
                        if let Ok(token) = login::authorize(&mut session, ctx.authorizer).await {
                            let generation = session.generation();
                            let provider = ctx.provider;
                            let calendar_id = ctx.calendar_id.as_str();
                            let tx = tx.clone();
                            pending = Some(Box::pin(async move {
                                login::fetch_account(provider, &token, calendar_id, generation, |a| {
                                    let _ = tx.send(a);
                                })
                                .await
                            }));
                        }
                        writeln!(out, "{}", ctx.formatter.format_page(&session, &filter))?;
                    }
                    SessionCommand::Logout => {
                        session.apply(SessionAction::LoggedOut);
                        writeln!(out, "{}", ctx.formatter.format_page(&session, &filter))?;
                    }
                    SessionCommand::Filter(prefix) => {
                        filter = prefix;
                        writeln!(out, "{}", ctx.formatter.format_page(&session, &filter))?;
                    }
                    SessionCommand::Show => {
                        writeln!(out, "{}", ctx.formatter.format_page(&session, &filter))?;
                    }
                    SessionCommand::WhoAmI => match session.user() {
                        Some(user) => writeln!(out, "{} <{}>", user.name, user.email)?,
                        None => writeln!(out, "Not signed in.")?,
                    },
                    SessionCommand::Help => writeln!(out, "{}", HELP)?,
                    SessionCommand::Quit => break,
                }
            }
        }
    }

    Ok(session)
}

async fn wait_pending(pending: &mut Option<PendingFetch<'_>>) -> Result<(), FetchError> {
    match pending {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::testing::{FakeProvider, raw_event};
    use calview_core::{FETCH_FAILED, SessionState};
    use calview_providers::{
        AccessToken, BoxFuture, FetchOptions, ProviderResult, RawEvent, RawUserInfo,
        StaticTokenAuthorizer,
    };

    async fn drive(input: &str, provider: &dyn AccountProvider) -> (Session, String) {
        let authorizer = StaticTokenAuthorizer::new("t");
        let formatter = OutputFormatter::with_defaults();
        let ctx = SessionContext {
            authorizer: &authorizer,
            provider,
            calendar_id: "primary".to_string(),
            formatter: &formatter,
        };
        let mut out = Vec::new();
        let session = run_session(input.as_bytes(), &mut out, &ctx).await.unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    fn provider() -> FakeProvider {
        FakeProvider::with_events(vec![
            raw_event("a", "2024-03-20T10:00:00Z"),
            raw_event("b", "2024-03-21T14:00:00Z"),
        ])
    }

    /// Profile loads, events never arrive.
    struct HangingProvider;

    impl AccountProvider for HangingProvider {
        fn name(&self) -> &str {
            "hanging"
        }

        fn fetch_profile<'a>(
            &'a self,
            _token: &'a AccessToken,
        ) -> BoxFuture<'a, ProviderResult<RawUserInfo>> {
            Box::pin(async {
                Ok(RawUserInfo {
                    email: Some("late@example.com".to_string()),
                    ..RawUserInfo::default()
                })
            })
        }

        fn fetch_events<'a>(
            &'a self,
            _token: &'a AccessToken,
            _options: FetchOptions,
        ) -> BoxFuture<'a, ProviderResult<Vec<RawEvent>>> {
            Box::pin(std::future::pending())
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(SessionCommand::parse("  "), None);
        assert_eq!(SessionCommand::parse("LOGIN"), Some(Ok(SessionCommand::Login)));
        assert_eq!(
            SessionCommand::parse("filter 2024-03-20 "),
            Some(Ok(SessionCommand::Filter("2024-03-20".to_string())))
        );
        assert_eq!(
            SessionCommand::parse("filter"),
            Some(Ok(SessionCommand::Filter(String::new())))
        );
        assert_eq!(SessionCommand::parse("q"), Some(Ok(SessionCommand::Quit)));
        assert!(matches!(SessionCommand::parse("dance"), Some(Err(_))));
    }

    #[tokio::test]
    async fn login_then_filter() {
        let (session, out) = drive("login\nfilter 2024-03-21\nquit\n", &provider()).await;

        assert!(session.is_signed_in());
        assert_eq!(session.events().len(), 2);
        let last_page = out.rsplit("Calendar Events |").next().unwrap();
        assert!(last_page.contains("Filter: 2024-03-21"));
        assert!(last_page.contains("Event b"));
        assert!(!last_page.contains("Event a"));
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let (session, out) = drive("login\nlogout\nwhoami\n", &provider()).await;

        assert_eq!(*session.state(), SessionState::SignedOut);
        assert!(session.error().is_none());
        assert!(out.trim_end().ends_with("Not signed in."));
    }

    #[tokio::test]
    async fn failed_fetch_shows_error_banner() {
        let provider = FakeProvider {
            events_error: Some(500),
            ..FakeProvider::default()
        };
        let (session, out) = drive("login\n", &provider).await;

        assert_eq!(session.error(), Some(FETCH_FAILED));
        assert!(out.contains(&format!("! {}", FETCH_FAILED)));
    }

    #[tokio::test]
    async fn logout_while_loading_drops_late_results() {
        let (session, out) = drive("login\nlogout\nquit\n", &HangingProvider).await;

        assert_eq!(*session.state(), SessionState::SignedOut);
        assert!(session.user().is_none());
        assert!(out.contains("Loading your calendar..."));
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let (_, out) = drive("frobnicate\nhelp\nquit\n", &provider()).await;
        assert!(out.contains("unknown command 'frobnicate'"));
        assert!(out.contains("Commands:"));
    }

    #[tokio::test]
    async fn whoami_after_login() {
        let (_, out) = drive("login\nwhoami\n", &provider()).await;
        assert!(out.contains("John Doe <user@example.com>"));
    }
}
