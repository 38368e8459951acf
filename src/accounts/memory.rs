use crate::{
    accounts::{
        models::Account,
        repo::{validate_new_account, CreateError, CredentialStore},
    },
    storage::StoreError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local credential store. Accounts live until the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Accounts>,
}

#[derive(Debug, Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    by_username: HashMap<String, Uuid>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.inner.read().await;
        Ok(accounts
            .by_username
            .get(username)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, CreateError> {
        validate_new_account(username, password_hash)?;

        // Check and insert under one write guard so racing creates see each other.
        let mut accounts = self.inner.write().await;
        if accounts.by_username.contains_key(username) {
            return Err(CreateError::DuplicateUsername);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        accounts
            .by_username
            .insert(account.username.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());

        Ok(account)
    }
}
