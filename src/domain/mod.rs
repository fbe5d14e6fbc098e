//! Domain types for API key authentication

pub mod credential;

pub use credential::{Credential, EntitlementTier, IssuedCredential, KeyInfo, NewCredential};
