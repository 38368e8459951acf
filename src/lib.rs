//! # Authbasics
//!
//! `authbasics` is a small sign-up / log-in / log-out service. Accounts are
//! stored with an Argon2id password hash and clients hold an opaque session
//! token in a signed cookie.
//!
//! ## Layout
//!
//! - [`accounts`]: the credential store (username, password hash) and the
//!   password hashing primitives.
//! - [`sessions`]: session token minting, cookie signing and the session store.
//! - [`auth`]: the authentication service tying both together (`register`,
//!   `verify`, `create_session`, `resolve_session`, `destroy_session`).
//! - [`api`]: the axum router, HTML pages and the `CurrentUser` extractor.
//! - [`cli`]: clap command, telemetry setup and the server action.
//! - [`storage`]: store error type and schema bootstrap for Postgres.
//!
//! ## Username enumeration
//!
//! A failed log-in never says which field was wrong. Unknown usernames still
//! pay for one Argon2 verification so both paths take comparable time.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod cli;
pub mod sessions;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
