use crate::{sessions::repo::SessionStore, storage::StoreError};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Binding {
    account_id: Uuid,
    expires_at: Instant,
}

/// Session bindings kept in process memory; lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    bindings: RwLock<HashMap<Vec<u8>, Binding>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored bindings, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.bindings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(
        &self,
        digest: &[u8],
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);

        let mut bindings = self.bindings.write().await;
        bindings.retain(|_, binding| binding.expires_at > now);
        bindings.insert(
            digest.to_vec(),
            Binding {
                account_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn lookup(&self, digest: &[u8]) -> Result<Option<Uuid>, StoreError> {
        let binding = self.bindings.read().await.get(digest).copied();
        match binding {
            Some(binding) if binding.expires_at > Instant::now() => Ok(Some(binding.account_id)),
            Some(_) => {
                self.bindings.write().await.remove(digest);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, digest: &[u8]) -> Result<(), StoreError> {
        self.bindings.write().await.remove(digest);
        Ok(())
    }
}
