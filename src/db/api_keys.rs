//! API key store
//!
//! [`KeyStore`] is the only data-layer contract the gateway depends on.
//! [`PgKeyStore`] implements it over the `api_keys` and `profiles` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::{info, warn};
use uuid::Uuid;

use super::pool::{DbError, DbPool};
use crate::domain::{Credential, EntitlementTier, NewCredential};

/// Persistent store of API key records
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Look up an active key by the digest of its secret
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<Credential>, DbError>;

    /// Persist a newly issued key
    async fn insert(&self, new_key: NewCredential) -> Result<Credential, DbError>;

    /// Record the lifetime request counter and last-used timestamp
    async fn update_usage(
        &self,
        id: Uuid,
        request_count: i64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), DbError>;

    /// Delete a key only if it belongs to `owner_id`. Returns rows removed.
    async fn delete_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<u64, DbError>;

    /// Subscription tier of a key owner, `None` if the owner is unknown
    async fn owner_tier(&self, owner_id: Uuid) -> Result<Option<EntitlementTier>, DbError>;

    /// All keys of an owner, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credential>, DbError>;

    /// Connectivity check for health reporting
    async fn ping(&self) -> Result<(), DbError>;
}

const KEY_COLUMNS: &str = r#"
    id, key_hash, key_prefix, name, owner_id, created_at,
    last_used_at, request_count, rate_limit, is_active
"#;

fn row_to_credential(row: &Row) -> Credential {
    Credential {
        id: row.get("id"),
        key_hash: row.get("key_hash"),
        key_prefix: row.get("key_prefix"),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        last_used_at: row.get("last_used_at"),
        request_count: row.get("request_count"),
        rate_limit: row.get("rate_limit"),
        is_active: row.get("is_active"),
    }
}

/// PostgreSQL-backed key store
#[derive(Clone)]
pub struct PgKeyStore {
    pool: DbPool,
}

impl PgKeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyStore for PgKeyStore {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<Credential>, DbError> {
        let client = self.pool.get().await?;

        let sql = format!(
            "SELECT {} FROM api_keys WHERE key_hash = $1 AND is_active = true",
            KEY_COLUMNS
        );
        let row = client.query_opt(sql.as_str(), &[&key_hash]).await?;

        Ok(row.as_ref().map(row_to_credential))
    }

    async fn insert(&self, new_key: NewCredential) -> Result<Credential, DbError> {
        let client = self.pool.get().await?;

        let sql = format!(
            r#"
            INSERT INTO api_keys (
                key_hash, key_prefix, name, owner_id, rate_limit, is_active, request_count
            ) VALUES ($1, $2, $3, $4, $5, true, 0)
            RETURNING {}
            "#,
            KEY_COLUMNS
        );
        let row = client.query_one(
            sql.as_str(),
            &[
                &new_key.key_hash,
                &new_key.key_prefix,
                &new_key.name,
                &new_key.owner_id,
                &new_key.rate_limit,
            ]
        ).await?;

        let credential = row_to_credential(&row);

        info!(
            key_id = %credential.id,
            key_prefix = %credential.key_prefix,
            owner_id = %credential.owner_id,
            "Inserted API key"
        );

        Ok(credential)
    }

    async fn update_usage(
        &self,
        id: Uuid,
        request_count: i64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let client = self.pool.get().await?;

        client.execute(
            "UPDATE api_keys SET request_count = $2, last_used_at = $3 WHERE id = $1",
            &[&id, &request_count, &last_used_at]
        ).await?;

        Ok(())
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<u64, DbError> {
        let client = self.pool.get().await?;

        let removed = client.execute(
            "DELETE FROM api_keys WHERE id = $1 AND owner_id = $2",
            &[&id, &owner_id]
        ).await?;

        if removed > 0 {
            warn!(key_id = %id, owner_id = %owner_id, "API key deleted");
        }

        Ok(removed)
    }

    async fn owner_tier(&self, owner_id: Uuid) -> Result<Option<EntitlementTier>, DbError> {
        let client = self.pool.get().await?;

        let row = client.query_opt(
            "SELECT subscription_tier FROM profiles WHERE id = $1",
            &[&owner_id]
        ).await?;

        Ok(row.map(|row| {
            let tier: Option<String> = row.get("subscription_tier");
            tier.as_deref()
                .map(EntitlementTier::from_str)
                .unwrap_or(EntitlementTier::Starter)
        }))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credential>, DbError> {
        let client = self.pool.get().await?;

        let sql = format!(
            "SELECT {} FROM api_keys WHERE owner_id = $1 ORDER BY created_at DESC",
            KEY_COLUMNS
        );
        let rows = client.query(sql.as_str(), &[&owner_id]).await?;

        Ok(rows.iter().map(row_to_credential).collect())
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}
