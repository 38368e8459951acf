use crate::{
    accounts::{
        models::Account,
        repo::{validate_new_account, CreateError, CredentialStore},
    },
    storage::{is_unique_violation, StoreError},
};
use async_trait::async_trait;
use sqlx::{Connection, PgPool};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Credential store backed by the `accounts` table.
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let query = "SELECT id, username, password_hash FROM accounts WHERE username = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let account = sqlx::query_as::<_, Account>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = "SELECT id, username, password_hash FROM accounts WHERE id = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let account = sqlx::query_as::<_, Account>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;
        Ok(account)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, CreateError> {
        validate_new_account(username, password_hash)?;

        // The unique constraint decides races between concurrent sign-ups.
        let query = r"
            INSERT INTO accounts (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        match sqlx::query_as::<_, Account>(query)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
        {
            Ok(account) => Ok(account),
            Err(err) if is_unique_violation(&err) => Err(CreateError::DuplicateUsername),
            Err(err) => Err(CreateError::Store(StoreError::Database(err))),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}
