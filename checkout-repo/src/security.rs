//! API key generation and hashing.

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

/// Prefix on every issued admin key.
pub const API_KEY_PREFIX: &str = "sk_";

/// Generates a fresh admin key: the prefix plus 32 random alphanumerics.
pub fn generate_api_key() -> String {
    let raw: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    format!("{}{}", API_KEY_PREFIX, raw)
}

/// Hashes an API key using SHA-256.
pub fn hash_api_key(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    hex::encode(hash)
}
