use crate::{
    accounts::{crypto, Account, CredentialStore},
    auth::error::AuthError,
    sessions::{SessionId, SessionStore},
};
use std::{fmt, sync::Arc, time::Duration};
use tokio::task;
use tracing::{debug, error, info, instrument};

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Who is making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(Account),
    Anonymous,
}

impl Identity {
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Authenticated(account) => Some(account),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Credential verification and session lifecycle on top of the two stores.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    session_ttl: Duration,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(accounts: Arc<dyn CredentialStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            accounts,
            sessions,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Create an account with an Argon2id hash of `raw_password`.
    ///
    /// # Errors
    /// `ValidationFailure` for empty input, `DuplicateUsername` when taken,
    /// `StoreUnavailable` when the credential store fails.
    #[instrument(skip(self, raw_password))]
    pub async fn register(&self, username: &str, raw_password: &str) -> Result<Account, AuthError> {
        if username.is_empty() {
            return Err(AuthError::ValidationFailure("username is required"));
        }
        if raw_password.is_empty() {
            return Err(AuthError::ValidationFailure("password is required"));
        }

        let password = raw_password.to_string();
        let password_hash = task::spawn_blocking(move || crypto::hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))??;

        let account = self.accounts.create(username, &password_hash).await?;

        info!(account_id = %account.id, "Account registered");

        Ok(account)
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown username or a wrong password alike.
    #[instrument(skip(self, raw_password))]
    pub async fn verify(&self, username: &str, raw_password: &str) -> Result<Account, AuthError> {
        if username.is_empty() || raw_password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let account = self.accounts.find_by_username(username).await?;
        let password = raw_password.to_string();

        let Some(account) = account else {
            // Pay for a verification anyway so a miss is not faster than a mismatch.
            task::spawn_blocking(move || crypto::verify_dummy(&password))
                .await
                .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?;
            debug!("Unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let stored = account.password_hash.clone();
        let matches = task::spawn_blocking(move || crypto::verify_password(&password, &stored))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| {
                error!(account_id = %account.id, "Stored password hash is unreadable: {e}");
                AuthError::from(e)
            })?;

        if matches {
            Ok(account)
        } else {
            debug!("Password mismatch");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Bind a fresh session id to `account`.
    ///
    /// # Errors
    /// `StoreUnavailable` when the session store fails.
    #[instrument(skip(self, account), fields(account_id = %account.id))]
    pub async fn create_session(&self, account: &Account) -> Result<SessionId, AuthError> {
        let session_id = SessionId::generate()?;
        self.sessions
            .insert(&session_id.digest(), account.id, self.session_ttl)
            .await?;
        debug!("Session created");
        Ok(session_id)
    }

    /// Resolve a presented session id; absence is `Anonymous`, not an error.
    ///
    /// # Errors
    /// `StoreUnavailable` when either store fails.
    #[instrument(skip_all)]
    pub async fn resolve_session(&self, session_id: &SessionId) -> Result<Identity, AuthError> {
        let digest = session_id.digest();
        let Some(account_id) = self.sessions.lookup(&digest).await? else {
            return Ok(Identity::Anonymous);
        };

        match self.accounts.find_by_id(account_id).await? {
            Some(account) => Ok(Identity::Authenticated(account)),
            None => {
                debug!(%account_id, "Session points to a missing account");
                self.sessions.delete(&digest).await?;
                Ok(Identity::Anonymous)
            }
        }
    }

    /// Remove a session binding. Idempotent.
    ///
    /// # Errors
    /// `StoreUnavailable` when the session store fails.
    #[instrument(skip_all)]
    pub async fn destroy_session(&self, session_id: &SessionId) -> Result<(), AuthError> {
        self.sessions.delete(&session_id.digest()).await?;
        debug!("Session destroyed");
        Ok(())
    }

    /// Register and immediately log in.
    ///
    /// The account is committed before the session is opened, so a session
    /// store failure still returns the account with no session; the caller
    /// has to log in separately.
    ///
    /// # Errors
    /// Any error from [`Self::register`].
    pub async fn sign_up(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<(Account, Option<SessionId>), AuthError> {
        let account = self.register(username, raw_password).await?;
        match self.create_session(&account).await {
            Ok(session_id) => Ok((account, Some(session_id))),
            Err(err) => {
                error!(account_id = %account.id, "Account created but session failed: {err}");
                Ok((account, None))
            }
        }
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// Any error from [`Self::verify`] or [`Self::create_session`].
    pub async fn log_in(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<(Account, SessionId), AuthError> {
        let account = self.verify(username, raw_password).await?;
        let session_id = self.create_session(&account).await?;
        Ok((account, session_id))
    }

    /// Liveness of the credential store.
    ///
    /// # Errors
    /// `StoreUnavailable` when the credential store cannot be reached.
    pub async fn ping(&self) -> Result<(), AuthError> {
        self.accounts.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        accounts::MemoryCredentialStore, sessions::MemorySessionStore, storage::StoreError,
    };
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use uuid::Uuid;

    fn service() -> (AuthService, Arc<MemoryCredentialStore>, Arc<MemorySessionStore>) {
        let accounts = Arc::new(MemoryCredentialStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let service = AuthService::new(accounts.clone(), sessions.clone());
        (service, accounts, sessions)
    }

    #[tokio::test]
    async fn register_then_verify_returns_account() -> Result<()> {
        let (service, _, _) = service();
        let registered = service.register("alice", "Secr3t!").await?;
        let verified = service.verify("alice", "Secr3t!").await?;
        assert_eq!(verified.username, "alice");
        assert_eq!(verified.id, registered.id);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() -> Result<()> {
        let (service, _, _) = service();
        service.register("alice", "Secr3t!").await?;

        let wrong = service.verify("alice", "wrong").await;
        let unknown = service.verify("mallory", "Secr3t!").await;

        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn verify_with_empty_input_is_invalid_credentials() {
        let (service, _, _) = service();
        assert!(matches!(
            service.verify("", "x").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.verify("alice", "").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let (service, accounts, _) = service();
        assert!(matches!(
            service.register("", "Secr3t!").await,
            Err(AuthError::ValidationFailure(_))
        ));
        assert!(matches!(
            service.register("alice", "").await,
            Err(AuthError::ValidationFailure(_))
        ));
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_register_keeps_one_account() -> Result<()> {
        let (service, accounts, _) = service();
        service.register("alice", "Secr3t!").await?;
        let second = service.register("alice", "Other1!").await;
        assert!(matches!(second, Err(AuthError::DuplicateUsername)));
        assert_eq!(accounts.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_password_and_salted() -> Result<()> {
        let (service, _, _) = service();
        let alice = service.register("alice", "same-password").await?;
        let bob = service.register("bob", "same-password").await?;
        assert_ne!(alice.password_hash, "same-password");
        assert_ne!(bob.password_hash, "same-password");
        assert_ne!(alice.password_hash, bob.password_hash);
        Ok(())
    }

    #[tokio::test]
    async fn session_round_trip_and_destroy() -> Result<()> {
        let (service, _, sessions) = service();
        let account = service.register("alice", "Secr3t!").await?;
        let session_id = service.create_session(&account).await?;

        let identity = service.resolve_session(&session_id).await?;
        assert_eq!(identity, Identity::Authenticated(account));

        service.destroy_session(&session_id).await?;
        assert_eq!(
            service.resolve_session(&session_id).await?,
            Identity::Anonymous
        );
        assert!(sessions.is_empty().await);

        // Destroying again is fine.
        service.destroy_session(&session_id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_session_is_anonymous() -> Result<()> {
        let (service, _, _) = service();
        let session_id = SessionId::generate()?;
        assert_eq!(
            service.resolve_session(&session_id).await?,
            Identity::Anonymous
        );
        Ok(())
    }

    #[tokio::test]
    async fn expired_session_is_anonymous() -> Result<()> {
        let (service, _, _) = service();
        let service = service.with_session_ttl(Duration::ZERO);
        let account = service.register("alice", "Secr3t!").await?;
        let session_id = service.create_session(&account).await?;
        assert_eq!(
            service.resolve_session(&session_id).await?,
            Identity::Anonymous
        );
        Ok(())
    }

    #[tokio::test]
    async fn dangling_session_is_anonymous_and_removed() -> Result<()> {
        let (service, _, sessions) = service();
        let session_id = SessionId::generate()?;
        sessions
            .insert(&session_id.digest(), Uuid::new_v4(), Duration::from_secs(60))
            .await?;

        assert_eq!(
            service.resolve_session(&session_id).await?,
            Identity::Anonymous
        );
        assert!(sessions.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn sign_up_and_log_in_open_sessions() -> Result<()> {
        let (service, _, _) = service();
        let (account, first) = service.sign_up("alice", "Secr3t!").await?;
        let first = first.context("sign-up opened no session")?;
        let (same, second) = service.log_in("alice", "Secr3t!").await?;
        assert_eq!(account, same);
        assert_ne!(first, second);
        assert!(service.resolve_session(&first).await?.is_authenticated());
        assert!(service.resolve_session(&second).await?.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn alice_scenario() -> Result<()> {
        let (service, _, _) = service();
        service.register("alice", "Secr3t!").await?;

        let account = service.verify("alice", "Secr3t!").await?;
        assert_eq!(account.username, "alice");

        assert!(matches!(
            service.verify("alice", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.register("alice", "Other1!").await,
            Err(AuthError::DuplicateUsername)
        ));
        Ok(())
    }

    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn find_by_username(&self, _: &str) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_id(&self, _: Uuid) -> Result<Option<Account>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn create(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Account, crate::accounts::CreateError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut).into())
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_unavailable() {
        let service = AuthService::new(Arc::new(DownStore), Arc::new(MemorySessionStore::new()));
        assert!(matches!(
            service.verify("alice", "Secr3t!").await,
            Err(AuthError::StoreUnavailable(_))
        ));
        assert!(matches!(
            service.register("alice", "Secr3t!").await,
            Err(AuthError::StoreUnavailable(_))
        ));
        assert!(matches!(
            service.ping().await,
            Err(AuthError::StoreUnavailable(_))
        ));
    }

    struct DownSessions;

    #[async_trait]
    impl SessionStore for DownSessions {
        async fn insert(&self, _: &[u8], _: Uuid, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn lookup(&self, _: &[u8]) -> Result<Option<Uuid>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn delete(&self, _: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn sign_up_keeps_account_when_session_store_fails() -> Result<()> {
        let accounts = Arc::new(MemoryCredentialStore::new());
        let service = AuthService::new(accounts.clone(), Arc::new(DownSessions));

        let (account, session_id) = service.sign_up("alice", "Secr3t!").await?;
        assert_eq!(account.username, "alice");
        assert!(session_id.is_none());
        assert_eq!(accounts.len().await, 1);

        // The saved account can still log in once sessions recover.
        let verified = service.verify("alice", "Secr3t!").await?;
        assert_eq!(verified.id, account.id);
        Ok(())
    }
}
