use crate::storage::StoreError;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Bindings from a session digest to an account id.
///
/// Keys are digests from [`super::SessionId::digest`]. Expired bindings must
/// never be returned by `lookup`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    async fn insert(&self, digest: &[u8], account_id: Uuid, ttl: Duration)
        -> Result<(), StoreError>;

    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    async fn lookup(&self, digest: &[u8]) -> Result<Option<Uuid>, StoreError>;

    /// Remove a binding. Deleting an absent binding is not an error.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing store fails.
    async fn delete(&self, digest: &[u8]) -> Result<(), StoreError>;
}
