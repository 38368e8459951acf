use crate::{accounts::models::Account, storage::StoreError};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Why an account could not be created.
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("invalid account: {0}")]
    ValidationFailure(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persistence for accounts.
///
/// Lookups return `Ok(None)` on a miss. Implementations enforce username
/// uniqueness atomically inside `create`.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Persist a new account with a server-assigned id.
    ///
    /// # Errors
    /// [`CreateError::DuplicateUsername`] if the username is taken,
    /// [`CreateError::ValidationFailure`] for empty fields.
    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, CreateError>;

    /// Cheap liveness probe used by `/health`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing store cannot be reached.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub(crate) fn validate_new_account(username: &str, password_hash: &str) -> Result<(), CreateError> {
    if username.is_empty() {
        return Err(CreateError::ValidationFailure("username is required"));
    }
    if password_hash.is_empty() {
        return Err(CreateError::ValidationFailure("password hash is required"));
    }
    Ok(())
}
