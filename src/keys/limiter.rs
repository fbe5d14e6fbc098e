//! Sliding-window rate limiter
//!
//! Each credential may be admitted at most `rate_limit` times in any trailing
//! hour. Capacity frees up one entry at a time as old admissions age out;
//! there is no fixed top-of-hour reset.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::window::{rate_window, InMemoryWindowStore, RateWindowStore};
use crate::domain::Credential;

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: i32,
    /// Requests left in the window after this one
    pub remaining: i32,
    /// Earliest time at which a slot frees up
    pub reset_at: DateTime<Utc>,
}

pub struct RateLimiter {
    store: Arc<dyn RateWindowStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateWindowStore>) -> Self {
        Self { store }
    }

    /// Limiter backed by process-local windows
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryWindowStore::new()))
    }

    pub async fn check(&self, credential: &Credential) -> RateLimitDecision {
        self.check_at(credential, Utc::now()).await
    }

    pub async fn check_at(&self, credential: &Credential, now: DateTime<Utc>) -> RateLimitDecision {
        let limit = credential.rate_limit;
        let snapshot = self.store.admit(&credential.key_hash, limit, now).await;

        let count = i32::try_from(snapshot.count).unwrap_or(i32::MAX);
        let reset_at = snapshot.oldest
            .map(|oldest| oldest + rate_window())
            .unwrap_or(now);

        RateLimitDecision {
            allowed: snapshot.admitted,
            limit,
            remaining: limit.saturating_sub(count).max(0),
            reset_at,
        }
    }

    /// Evict idle windows. Returns the number removed.
    pub async fn sweep(&self) -> usize {
        self.store.sweep(Utc::now()).await
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.tracked()
    }
}
