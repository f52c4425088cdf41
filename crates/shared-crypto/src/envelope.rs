//! # Hybrid Envelope Encryption
//!
//! Asymmetric keys cannot seal arbitrary-length payloads, so every envelope
//! pairs a fresh AES-256-GCM data key with an RSA-OAEP (SHA-256) wrap of that
//! key and its nonce under the recipient's public key.
//!
//! ## Wire Layout
//!
//! ```text
//! ┌─────────┬──────────────┬──────────────────────────┬──────────────────────┐
//! │ version │ wrapped_len  │ wrapped (key ‖ nonce)    │ ciphertext ‖ tag     │
//! │ 1 byte  │ u16 BE       │ wrapped_len bytes (RSA)  │ payload + 16 bytes   │
//! └─────────┴──────────────┴──────────────────────────┴──────────────────────┘
//! ```
//!
//! On the wire the layout travels base64-encoded inside `{"encrypted": "..."}`.
//!
//! Sealing is non-deterministic: two envelopes of the same payload for the
//! same key never compare equal.

use crate::keys::{EnvelopePrivateKey, EnvelopePublicKey};
use crate::symmetric::{self, Nonce, SecretKey, KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::CryptoError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 1;

const HEADER_LEN: usize = 1 + 2;

/// A sealed payload. Transient: never logged or persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Envelope {
    wrapped_key: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl Envelope {
    /// The RSA-wrapped data key and nonce.
    pub fn wrapped_key(&self) -> &[u8] {
        &self.wrapped_key
    }

    /// The AES-GCM ciphertext with its trailing tag.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Serialize to the binary wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.wrapped_key.len() + self.ciphertext.len());
        out.push(ENVELOPE_VERSION);
        out.extend_from_slice(&(self.wrapped_key.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.wrapped_key);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the binary wire layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::MalformedEnvelope("truncated header".to_string()));
        }
        if bytes[0] != ENVELOPE_VERSION {
            return Err(CryptoError::UnsupportedVersion(bytes[0]));
        }

        let wrapped_len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
        let body = &bytes[HEADER_LEN..];
        if wrapped_len == 0 || body.len() < wrapped_len + TAG_LEN {
            return Err(CryptoError::MalformedEnvelope(format!(
                "body of {} bytes cannot hold a {}-byte wrapped key and tag",
                body.len(),
                wrapped_len
            )));
        }

        let (wrapped_key, ciphertext) = body.split_at(wrapped_len);
        Ok(Self {
            wrapped_key: wrapped_key.to_vec(),
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Serialize to base64 for JSON transport.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse a base64-encoded envelope.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::MalformedEnvelope(format!("invalid base64: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("wrapped_key_len", &self.wrapped_key.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Seal `plaintext` for the holder of `recipient`'s private key.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if the key wrap or the bulk
/// encryption fails.
pub fn encrypt(plaintext: &[u8], recipient: &EnvelopePublicKey) -> Result<Envelope, CryptoError> {
    let key = SecretKey::generate();
    let (ciphertext, nonce) = symmetric::encrypt(&key, plaintext)?;

    let mut key_material = Zeroizing::new([0u8; KEY_LEN + NONCE_LEN]);
    key_material[..KEY_LEN].copy_from_slice(key.as_bytes());
    key_material[KEY_LEN..].copy_from_slice(nonce.as_bytes());

    let wrapped_key = recipient
        .inner()
        .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), &key_material[..])
        .map_err(|e| CryptoError::EncryptionFailed(format!("key wrap failed: {}", e)))?;

    Ok(Envelope {
        wrapped_key,
        ciphertext,
    })
}

/// Open an envelope with the recipient's private key.
///
/// # Errors
///
/// - `CryptoError::DecryptionFailed` if the key does not match or any byte
///   of the wrapped key, ciphertext or tag was altered
/// - `CryptoError::MalformedEnvelope` if the unwrapped key material has the
///   wrong shape
pub fn decrypt(envelope: &Envelope, private_key: &EnvelopePrivateKey) -> Result<Vec<u8>, CryptoError> {
    let key_material = Zeroizing::new(
        private_key
            .inner()
            .decrypt(Oaep::new::<Sha256>(), &envelope.wrapped_key)
            .map_err(|_| CryptoError::DecryptionFailed("key unwrap failed".to_string()))?,
    );

    if key_material.len() != KEY_LEN + NONCE_LEN {
        return Err(CryptoError::MalformedEnvelope(format!(
            "unwrapped key material is {} bytes, expected {}",
            key_material.len(),
            KEY_LEN + NONCE_LEN
        )));
    }

    let key = SecretKey::from_slice(&key_material[..KEY_LEN])?;
    let nonce = Nonce::from_slice(&key_material[KEY_LEN..])?;

    symmetric::decrypt(&key, &envelope.ciphertext, &nonce)
}
