//! # SHA-256 Correlation Hashing
//!
//! One-way digests used as stable equality tokens for sensitive values.
//! Output is lowercase hex so it can be stored and compared as text.

use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Hash data with SHA-256 and hex-encode the digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
