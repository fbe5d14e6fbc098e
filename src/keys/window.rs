//! Rate window storage
//!
//! A rate window is the ordered list of admission timestamps for one key
//! digest, covering the trailing [`rate_window`]. [`RateWindowStore::admit`]
//! prunes, tests and appends as a single step so two concurrent requests can
//! never both take the last free slot.
//!
//! [`InMemoryWindowStore`] is process local. In a multi-instance deployment
//! every instance keeps its own windows; a shared backend can be plugged in
//! by implementing the trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;

const RATE_WINDOW_MINUTES: i64 = 60;

/// Length of the sliding window
pub fn rate_window() -> Duration {
    Duration::minutes(RATE_WINDOW_MINUTES)
}

/// State of a window right after an admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub admitted: bool,
    /// Entries in the window, including the one just appended
    pub count: usize,
    pub oldest: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait RateWindowStore: Send + Sync {
    /// Drop entries outside the window ending at `now`, admit if fewer than
    /// `limit` remain and record `now` when admitted.
    async fn admit(&self, key: &str, limit: i32, now: DateTime<Utc>) -> WindowSnapshot;

    /// Evict windows with no entries left at `now`. Returns windows removed.
    async fn sweep(&self, now: DateTime<Utc>) -> usize;

    /// Number of windows currently tracked
    fn tracked(&self) -> usize;
}

/// Removes entries at or before `now - rate_window()`
fn prune(window: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    let cutoff = now - rate_window();
    while window.front().is_some_and(|t| *t <= cutoff) {
        window.pop_front();
    }
}

#[derive(Default)]
pub struct InMemoryWindowStore {
    windows: DashMap<String, VecDeque<DateTime<Utc>>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateWindowStore for InMemoryWindowStore {
    async fn admit(&self, key: &str, limit: i32, now: DateTime<Utc>) -> WindowSnapshot {
        // The entry guard holds the shard lock for the whole check-and-append
        let mut window = self.windows.entry(key.to_string()).or_default();
        prune(&mut window, now);

        let admitted = limit > 0 && window.len() < limit as usize;
        if admitted {
            // Callers sample the clock before taking the lock; keep the order
            let pos = window.partition_point(|t| *t <= now);
            window.insert(pos, now);
        }

        WindowSnapshot {
            admitted,
            count: window.len(),
            oldest: window.front().copied(),
        }
    }

    async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| {
            prune(window, now);
            !window.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    fn tracked(&self) -> usize {
        self.windows.len()
    }
}
