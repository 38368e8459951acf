//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, resolving defaults that
//! depend on more than one argument such as the session backend.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{session, ARG_DSN, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .filter(|dsn| !dsn.trim().is_empty());

    let session_opts = session::Options::parse(matches, dsn.is_some())?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_secret: session_opts.secret,
        session_ttl_seconds: session_opts.ttl_seconds,
        session_backend: session_opts.backend,
        secure_cookie: session_opts.secure_cookie,
    }))
}
