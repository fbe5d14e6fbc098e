//! API Middleware Module
//!
//! Provides API key authentication and rate limiting middleware
//! for the VoyagrIQ API.

pub mod auth;
pub mod rate_limit;
pub mod service;

pub use auth::{ApiKeyExt, AuthenticatedKey};
pub use service::ApiGateway;
