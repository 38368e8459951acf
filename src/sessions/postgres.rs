use crate::{sessions::repo::SessionStore, storage::StoreError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

/// Session bindings in the `sessions` table; they survive restarts.
#[derive(Clone, Debug)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(
        &self,
        digest: &[u8],
        account_id: Uuid,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let purge = "DELETE FROM sessions WHERE expires_at <= NOW()";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = purge
        );
        let purged = sqlx::query(purge)
            .execute(&self.pool)
            .instrument(span)
            .await?
            .rows_affected();
        if purged > 0 {
            debug!(purged, "Expired sessions removed");
        }

        let ttl_seconds = ttl.as_secs_f64();
        let query = r"
            INSERT INTO sessions (session_hash, account_id, expires_at)
            VALUES ($1, $2, NOW() + ($3::float8 * INTERVAL '1 second'))
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(digest)
            .bind(account_id)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }

    async fn lookup(&self, digest: &[u8]) -> Result<Option<Uuid>, StoreError> {
        let query = r"
            SELECT account_id, expires_at > NOW() AS live
            FROM sessions
            WHERE session_hash = $1
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(digest)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let live: bool = row.try_get("live")?;
        if live {
            return Ok(Some(row.try_get("account_id")?));
        }

        self.delete(digest).await?;
        Ok(None)
    }

    async fn delete(&self, digest: &[u8]) -> Result<(), StoreError> {
        let query = "DELETE FROM sessions WHERE session_hash = $1";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(digest)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}
