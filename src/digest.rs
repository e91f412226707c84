//! Content hashing for deterministic keys.

use sha2::{Digest, Sha256};

/// Lowercase hexadecimal SHA-256 of a string (64 characters).
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The first `len` hex characters of the SHA-256 digest.
///
/// `len` is capped at the full digest length.
pub fn short_digest(input: &str, len: usize) -> String {
    let mut digest = sha256_hex(input);
    digest.truncate(len);
    digest
}
