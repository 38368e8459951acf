use anyhow::{anyhow, Result};
use clap::{builder::PossibleValuesParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::{ExposeSecret, SecretString};

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL: &str = "session-ttl";
pub const ARG_SESSION_STORE: &str = "session-store";
pub const ARG_SECURE_COOKIE: &str = "secure-cookie";

/// Where session bindings live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Postgres,
}

impl SessionBackend {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "memory" => Ok(Self::Memory),
            "postgres" => Ok(Self::Postgres),
            other => Err(anyhow!("unknown session store: {other}")),
        }
    }
}

#[derive(Debug)]
pub struct Options {
    pub secret: SecretString,
    pub ttl_seconds: u64,
    pub backend: SessionBackend,
    pub secure_cookie: bool,
}

impl Options {
    /// Parse session arguments from matches. Without an explicit store the
    /// backend follows the presence of a DSN.
    ///
    /// # Errors
    /// Returns an error if the secret is missing or blank, the TTL is zero or
    /// the Postgres store is requested without a DSN.
    pub fn parse(matches: &ArgMatches, has_dsn: bool) -> Result<Self> {
        let secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .map(SecretString::from)
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SESSION_SECRET}"))?;

        if secret.expose_secret().trim().is_empty() {
            return Err(anyhow!("--{ARG_SESSION_SECRET} must not be empty"));
        }

        let ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL)
            .copied()
            .unwrap_or(43_200);

        if ttl_seconds == 0 {
            return Err(anyhow!("--{ARG_SESSION_TTL} must be greater than zero"));
        }

        let backend = match matches.get_one::<String>(ARG_SESSION_STORE) {
            Some(name) => SessionBackend::from_name(name)?,
            None if has_dsn => SessionBackend::Postgres,
            None => SessionBackend::Memory,
        };

        if backend == SessionBackend::Postgres && !has_dsn {
            return Err(anyhow!(
                "--{ARG_SESSION_STORE}=postgres requires --dsn"
            ));
        }

        Ok(Self {
            secret,
            ttl_seconds,
            backend,
            secure_cookie: matches.get_flag(ARG_SECURE_COOKIE),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session cookies")
                .env("AUTHBASICS_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long(ARG_SESSION_TTL)
                .help("Session lifetime in seconds")
                .env("AUTHBASICS_SESSION_TTL")
                .default_value("43200")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_STORE)
                .long(ARG_SESSION_STORE)
                .help("Session store backend (default: postgres when --dsn is set, memory otherwise)")
                .env("AUTHBASICS_SESSION_STORE")
                .value_parser(PossibleValuesParser::new(["memory", "postgres"])),
        )
        .arg(
            Arg::new(ARG_SECURE_COOKIE)
                .long(ARG_SECURE_COOKIE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("AUTHBASICS_SECURE_COOKIE")
                .action(ArgAction::SetTrue),
        )
}
