use crate::{
    accounts::{CredentialStore, MemoryCredentialStore, PgCredentialStore},
    api::{self, CookieConfig},
    auth::AuthService,
    cli::{commands::session::SessionBackend, telemetry},
    sessions::{MemorySessionStore, PgSessionStore, SessionStore},
    storage,
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::{debug, info};

pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub session_secret: SecretString,
    pub session_ttl_seconds: u64,
    pub session_backend: SessionBackend,
    pub secure_cookie: bool,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("dsn", &self.dsn.as_ref().map(|_| "***"))
            .field("session_secret", &"***")
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("session_backend", &self.session_backend)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

async fn connect(dsn: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    storage::apply_schema(&pool)
        .await
        .context("Failed to apply database schema")?;

    Ok(pool)
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let pool = match &args.dsn {
        Some(dsn) => Some(connect(dsn).await?),
        None => None,
    };

    let accounts: Arc<dyn CredentialStore> = match &pool {
        Some(pool) => Arc::new(PgCredentialStore::new(pool.clone())),
        None => {
            info!("No DSN configured, accounts are kept in memory");
            Arc::new(MemoryCredentialStore::new())
        }
    };

    let sessions: Arc<dyn SessionStore> = match (args.session_backend, &pool) {
        (SessionBackend::Postgres, Some(pool)) => Arc::new(PgSessionStore::new(pool.clone())),
        (SessionBackend::Postgres, None) => {
            return Err(anyhow!("postgres session store requires a DSN"));
        }
        (SessionBackend::Memory, _) => Arc::new(MemorySessionStore::new()),
    };

    let ttl = Duration::from_secs(args.session_ttl_seconds);
    let service = AuthService::new(accounts, sessions).with_session_ttl(ttl);
    let cookies = CookieConfig::new(args.session_secret, ttl).with_secure(args.secure_cookie);

    let result = api::new(args.port, service, cookies).await;

    telemetry::shutdown_tracer();

    result
}
