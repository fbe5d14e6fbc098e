//! In-memory key store
//!
//! Used when no database is configured (development mode) and as the test
//! fixture for everything above the store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::api_keys::KeyStore;
use super::pool::DbError;
use crate::domain::{Credential, EntitlementTier, NewCredential};

#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<Uuid, Credential>>,
    owners: RwLock<HashMap<Uuid, EntitlementTier>>,
    /// Tier reported for owners without an explicit entry
    default_tier: Option<EntitlementTier>,
    unavailable: AtomicBool,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every unknown owner as having `tier`
    pub fn with_default_tier(mut self, tier: EntitlementTier) -> Self {
        self.default_tier = Some(tier);
        self
    }

    #[cfg(test)]
    pub fn set_owner_tier(&self, owner_id: Uuid, tier: EntitlementTier) {
        self.owners.write().insert(owner_id, tier);
    }

    /// Make every operation fail as if the backing database were down
    #[cfg(test)]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn get(&self, id: Uuid) -> Option<Credential> {
        self.keys.read().get(&id).cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    fn ensure_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn find_active_by_hash(&self, key_hash: &str) -> Result<Option<Credential>, DbError> {
        self.ensure_available()?;
        Ok(self.keys.read()
            .values()
            .find(|key| key.is_active && key.key_hash == key_hash)
            .cloned())
    }

    async fn insert(&self, new_key: NewCredential) -> Result<Credential, DbError> {
        self.ensure_available()?;
        let credential = Credential {
            id: Uuid::new_v4(),
            key_hash: new_key.key_hash,
            key_prefix: new_key.key_prefix,
            name: new_key.name,
            owner_id: new_key.owner_id,
            created_at: Utc::now(),
            last_used_at: None,
            request_count: 0,
            rate_limit: new_key.rate_limit,
            is_active: true,
        };
        self.keys.write().insert(credential.id, credential.clone());
        Ok(credential)
    }

    async fn update_usage(
        &self,
        id: Uuid,
        request_count: i64,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.ensure_available()?;
        if let Some(key) = self.keys.write().get_mut(&id) {
            key.request_count = request_count;
            key.last_used_at = Some(last_used_at);
        }
        Ok(())
    }

    async fn delete_by_id_and_owner(&self, id: Uuid, owner_id: Uuid) -> Result<u64, DbError> {
        self.ensure_available()?;
        let mut keys = self.keys.write();
        let owned = keys.get(&id).is_some_and(|key| key.owner_id == owner_id);
        if owned {
            keys.remove(&id);
            return Ok(1);
        }
        Ok(0)
    }

    async fn owner_tier(&self, owner_id: Uuid) -> Result<Option<EntitlementTier>, DbError> {
        self.ensure_available()?;
        Ok(self.owners.read().get(&owner_id).copied().or(self.default_tier))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Credential>, DbError> {
        self.ensure_available()?;
        let mut keys: Vec<Credential> = self.keys.read()
            .values()
            .filter(|key| key.owner_id == owner_id)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.ensure_available()
    }
}
