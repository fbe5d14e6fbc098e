//! Secret generation and hashing
//!
//! Keys look like `viq_` followed by 64 lowercase hex characters. Only the
//! SHA-256 digest and the first [`DISPLAY_PREFIX_LEN`] characters are stored.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Random bytes per secret (hex encoded to twice as many characters)
const SECRET_BYTES: usize = 32;

/// Characters of the plaintext kept for display in listings and logs
pub const DISPLAY_PREFIX_LEN: usize = 12;

/// Hash an API key using SHA-256, hex encoded
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a new secret: `<prefix><64 hex chars>`
pub fn generate_secret(prefix: &str) -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill(&mut bytes[..]);
    format!("{}{}", prefix, hex::encode(bytes))
}

/// Safe-to-show leading part of a secret
pub fn display_prefix(secret: &str) -> String {
    secret.chars().take(DISPLAY_PREFIX_LEN).collect()
}
