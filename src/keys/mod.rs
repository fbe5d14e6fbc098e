//! API key issuance, verification and rate limiting

pub mod hasher;
pub mod limiter;
pub mod service;
pub mod window;

pub use limiter::{RateLimitDecision, RateLimiter};
pub use service::ApiKeyService;
pub use window::{InMemoryWindowStore, RateWindowStore};
