//! # Shared Crypto - Envelope Encryption & Correlation Hashing
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `envelope` | RSA-OAEP(SHA-256) + AES-256-GCM | Provider request/response bodies |
//! | `symmetric` | AES-256-GCM | Bulk payload encryption |
//! | `keys` | RSA PEM (PKCS#1 / PKCS#8) | Key-wrapping key material |
//! | `hashing` | SHA-256 | Non-reversible correlation tokens |
//!
//! ## Security Properties
//!
//! - **Fresh data key per envelope**: sealing the same payload twice never
//!   yields the same bytes
//! - **Authenticated**: any modified byte fails decryption with `CryptoError`
//! - **No key leakage**: key types redact themselves in `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod envelope;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod symmetric;

// Re-exports
pub use envelope::{decrypt, encrypt, Envelope, ENVELOPE_VERSION};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_hex, Hash};
pub use keys::{EnvelopePrivateKey, EnvelopePublicKey, MIN_KEY_BITS};
pub use symmetric::{Nonce, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
