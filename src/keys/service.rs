//! API key service
//!
//! Issuance, revocation and verification of API keys, plus the usage
//! bookkeeping that follows every admitted request.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::hasher::{display_prefix, generate_secret, hash_secret};
use super::limiter::{RateLimitDecision, RateLimiter};
use crate::config::AuthSettings;
use crate::db::KeyStore;
use crate::domain::{Credential, IssuedCredential, NewCredential};
use crate::error::AuthError;

const MAX_NAME_LEN: usize = 100;

/// Token of an `Authorization: Bearer <token>` header value
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    let token = authorization?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

pub struct ApiKeyService {
    store: Arc<dyn KeyStore>,
    limiter: RateLimiter,
    settings: AuthSettings,
}

impl ApiKeyService {
    pub fn new(store: Arc<dyn KeyStore>, limiter: RateLimiter, settings: AuthSettings) -> Self {
        Self { store, limiter, settings }
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Issue a new key for `owner_id`.
    ///
    /// The returned plaintext is the only copy; the store keeps the digest.
    pub async fn issue(&self, name: &str, owner_id: Uuid) -> Result<IssuedCredential, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("name must not be empty".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AuthError::InvalidInput(format!(
                "name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }

        let api_key = generate_secret(&self.settings.key_prefix);
        let new_key = NewCredential {
            key_hash: hash_secret(&api_key),
            key_prefix: display_prefix(&api_key),
            name: name.to_string(),
            owner_id,
            rate_limit: self.settings.default_rate_limit,
        };

        let credential = self.store.insert(new_key).await.map_err(|e| {
            warn!(error = %e, owner_id = %owner_id, "Failed to persist API key");
            AuthError::Persistence(e)
        })?;

        info!(
            key_id = %credential.id,
            key_prefix = %credential.key_prefix,
            owner_id = %owner_id,
            rate_limit = credential.rate_limit,
            "API key issued"
        );

        Ok(IssuedCredential { credential, api_key })
    }

    /// Delete a key owned by `owner_id`.
    ///
    /// A key that is absent or owned by someone else is a successful no-op.
    /// Returns false only when the store fails.
    pub async fn revoke(&self, key_id: Uuid, owner_id: Uuid) -> bool {
        match self.store.delete_by_id_and_owner(key_id, owner_id).await {
            Ok(0) => {
                debug!(key_id = %key_id, owner_id = %owner_id, "No matching API key to revoke");
                true
            }
            Ok(_) => {
                info!(key_id = %key_id, owner_id = %owner_id, "API key revoked");
                true
            }
            Err(e) => {
                warn!(error = %e, key_id = %key_id, "Failed to revoke API key");
                false
            }
        }
    }

    /// Resolve the credential presented in an Authorization header value
    pub async fn verify(&self, authorization: Option<&str>) -> Result<Credential, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingCredential)?;

        // Not one of ours, no need to ask the store
        if !token.starts_with(&self.settings.key_prefix) {
            return Err(AuthError::InvalidCredential);
        }

        let credential = self.store
            .find_active_by_hash(&hash_secret(token))
            .await?
            .filter(|key| key.is_active)
            .ok_or(AuthError::InvalidCredential)?;

        match self.store.owner_tier(credential.owner_id).await? {
            Some(tier) if tier.allows_api_access() => Ok(credential),
            tier => {
                warn!(
                    key_id = %credential.id,
                    key_prefix = %credential.key_prefix,
                    owner_id = %credential.owner_id,
                    tier = ?tier,
                    "API key owner lacks API access entitlement"
                );
                Err(AuthError::InsufficientEntitlement)
            }
        }
    }

    pub async fn check_rate_limit(&self, credential: &Credential) -> RateLimitDecision {
        self.limiter.check(credential).await
    }

    /// Persist the usage counter in the background (fire and forget).
    ///
    /// Failures are logged and never reach the caller.
    pub fn record_usage(&self, credential: &Credential, used_at: DateTime<Utc>) -> JoinHandle<()> {
        let store = self.store.clone();
        let key_id = credential.id;
        let request_count = credential.request_count.saturating_add(1);

        tokio::spawn(async move {
            if let Err(e) = store.update_usage(key_id, request_count, used_at).await {
                warn!(error = %e, key_id = %key_id, "Failed to record API key usage");
            }
        })
    }

    pub async fn list_keys(&self, owner_id: Uuid) -> Result<Vec<Credential>, AuthError> {
        Ok(self.store.list_by_owner(owner_id).await?)
    }
}
