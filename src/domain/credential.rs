//! API key (credential) domain types
//!
//! A credential is stored only as a SHA-256 digest plus a short display prefix.
//! The plaintext secret exists exactly once, inside [`IssuedCredential`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription tier of a key owner, ordered lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementTier {
    Starter,
    Standard,
    Premium,
}

impl EntitlementTier {
    /// The only tier allowed to authenticate with an API key
    pub const TOP: EntitlementTier = EntitlementTier::Premium;

    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementTier::Starter => "starter",
            EntitlementTier::Standard => "standard",
            EntitlementTier::Premium => "premium",
        }
    }

    /// Unknown tier names fall back to the lowest tier
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "standard" => EntitlementTier::Standard,
            "premium" => EntitlementTier::Premium,
            _ => EntitlementTier::Starter,
        }
    }

    pub fn allows_api_access(&self) -> bool {
        *self == Self::TOP
    }
}

impl fmt::Display for EntitlementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored API key record
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: Uuid,
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub request_count: i64,
    /// Maximum admitted requests per trailing hour
    pub rate_limit: i32,
    pub is_active: bool,
}

/// Fields written to the key store at issuance
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub owner_id: Uuid,
    pub rate_limit: i32,
}

/// Result of issuing a key: the stored record plus the plaintext secret.
///
/// This is the only place the plaintext ever lives; `Debug` redacts it.
#[derive(Clone)]
pub struct IssuedCredential {
    pub credential: Credential,
    pub api_key: String,
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("credential", &self.credential)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Key details safe to return over the API (no digest, no secret)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KeyInfo {
    pub id: Uuid,
    pub key_prefix: String,
    pub name: String,
    pub owner_id: Uuid,
    pub rate_limit: i32,
    pub request_count: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&Credential> for KeyInfo {
    fn from(key: &Credential) -> Self {
        Self {
            id: key.id,
            key_prefix: key.key_prefix.clone(),
            name: key.name.clone(),
            owner_id: key.owner_id,
            rate_limit: key.rate_limit,
            request_count: key.request_count,
            is_active: key.is_active,
            created_at: key.created_at,
            last_used_at: key.last_used_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_parsing() {
        assert_eq!(EntitlementTier::from_str("premium"), EntitlementTier::Premium);
        assert_eq!(EntitlementTier::from_str(" Standard "), EntitlementTier::Standard);
        assert_eq!(EntitlementTier::from_str("enterprise"), EntitlementTier::Starter);
        assert_eq!(EntitlementTier::from_str(""), EntitlementTier::Starter);
    }

    #[test]
    fn test_only_top_tier_has_api_access() {
        assert!(EntitlementTier::Premium.allows_api_access());
        assert!(!EntitlementTier::Standard.allows_api_access());
        assert!(!EntitlementTier::Starter.allows_api_access());
        assert!(EntitlementTier::Starter < EntitlementTier::Premium);
    }

    #[test]
    fn test_issued_credential_debug_redacts_secret() {
        let issued = IssuedCredential {
            credential: Credential {
                id: Uuid::new_v4(),
                key_hash: "abc".to_string(),
                key_prefix: "viq_12345678".to_string(),
                name: "ci".to_string(),
                owner_id: Uuid::new_v4(),
                created_at: Utc::now(),
                last_used_at: None,
                request_count: 0,
                rate_limit: 10,
                is_active: true,
            },
            api_key: "viq_secretvalue".to_string(),
        };

        let printed = format!("{:?}", issued);
        assert!(!printed.contains("viq_secretvalue"));
        assert!(printed.contains("<redacted>"));
    }
}
