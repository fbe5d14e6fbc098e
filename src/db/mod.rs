//! Database module for the API key store
//!
//! Provides connection pool management, the [`KeyStore`] contract and its
//! PostgreSQL and in-memory implementations.

pub mod api_keys;
pub mod memory;
pub mod pool;

pub use api_keys::{KeyStore, PgKeyStore};
pub use memory::InMemoryKeyStore;
pub use pool::{DbError, DbPool};
