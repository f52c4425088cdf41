//! # RSA Key Material
//!
//! Key-wrapping keys for envelope encryption. Both PKCS#1 (`RSA PUBLIC KEY`,
//! `RSA PRIVATE KEY`) and PKCS#8/SPKI (`PUBLIC KEY`, `PRIVATE KEY`) PEM
//! encodings are accepted, since providers hand out either.

use crate::CryptoError;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Smallest modulus accepted for key wrapping.
pub const MIN_KEY_BITS: usize = 2048;

/// Public half of a key-wrapping pair.
#[derive(Clone, PartialEq, Eq)]
pub struct EnvelopePublicKey(RsaPublicKey);

impl EnvelopePublicKey {
    /// Parse a PEM-encoded RSA public key.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let pem = normalize_pem(pem);
        let key = RsaPublicKey::from_pkcs1_pem(&pem)
            .or_else(|_| RsaPublicKey::from_public_key_pem(&pem))
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        check_modulus(key.size())
            .map_err(CryptoError::InvalidPublicKey)?;
        Ok(Self(key))
    }

    /// Encode as PKCS#1 PEM.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Modulus length in bytes, which is also the wrapped-key length.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    pub(crate) fn inner(&self) -> &RsaPublicKey {
        &self.0
    }
}

impl std::fmt::Debug for EnvelopePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopePublicKey")
            .field("bits", &(self.size() * 8))
            .finish()
    }
}

/// Private half of a key-wrapping pair. Never printed.
#[derive(Clone)]
pub struct EnvelopePrivateKey(RsaPrivateKey);

impl EnvelopePrivateKey {
    /// Parse a PEM-encoded RSA private key.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let pem = normalize_pem(pem);
        let key = RsaPrivateKey::from_pkcs1_pem(&pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(&pem))
            // The parser's message can quote the offending input.
            .map_err(|_| CryptoError::InvalidPrivateKey("unrecognized PEM encoding".to_string()))?;
        check_modulus(key.size()).map_err(CryptoError::InvalidPrivateKey)?;
        Ok(Self(key))
    }

    /// Generate a fresh key pair.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        check_modulus(bits / 8).map_err(CryptoError::KeyGenerationFailed)?;
        RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map(Self)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))
    }

    /// Derive the matching public key.
    pub fn public_key(&self) -> EnvelopePublicKey {
        EnvelopePublicKey(self.0.to_public_key())
    }

    /// Encode as PKCS#1 PEM.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_pkcs1_pem(LineEnding::LF)
            .map(|pem| (*pem).clone())
            .map_err(|_| CryptoError::InvalidPrivateKey("PEM encoding failed".to_string()))
    }

    /// Modulus length in bytes.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    pub(crate) fn inner(&self) -> &RsaPrivateKey {
        &self.0
    }
}

impl std::fmt::Debug for EnvelopePrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopePrivateKey([REDACTED])")
    }
}

fn check_modulus(size_bytes: usize) -> Result<(), String> {
    if size_bytes * 8 < MIN_KEY_BITS {
        return Err(format!(
            "modulus of {} bits is below the {}-bit minimum",
            size_bytes * 8,
            MIN_KEY_BITS
        ));
    }
    Ok(())
}

/// Environment variables often carry PEM with escaped newlines.
fn normalize_pem(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}
