//! # PII Masking & Correlation Hashing
//!
//! The only sanctioned path from a raw sensitive value to anything that is
//! persisted or logged. Every function here is pure and total.

use crate::domain::entities::{MaskedPanRequest, PanVerificationResult};

/// Character used for redacted positions.
pub const MASK_CHAR: char = '*';

/// Values up to this many characters are masked entirely.
const FULL_MASK_MAX_LEN: usize = 4;

/// Characters kept visible at each end of longer values.
const VISIBLE_EDGE: usize = 2;

/// Redact `value` for display, preserving its length in characters.
///
/// ```
/// use kyc_01_pan_verification::domain::masking::mask;
///
/// assert_eq!(mask("FNMPM6342D"), "FN******2D");
/// assert_eq!(mask("AB"), "**");
/// ```
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();

    if len <= FULL_MASK_MAX_LEN {
        return MASK_CHAR.to_string().repeat(len);
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..VISIBLE_EDGE]);
    masked.extend(std::iter::repeat(MASK_CHAR).take(len - 2 * VISIBLE_EDGE));
    masked.extend(&chars[len - VISIBLE_EDGE..]);
    masked
}

/// SHA-256 of the exact raw value, lowercase hex.
pub fn hash_value(value: &str) -> String {
    shared_crypto::sha256_hex(value.as_bytes())
}

/// Trailing four characters (the whole value when shorter).
pub fn last4(value: &str) -> String {
    let len = value.chars().count();
    value.chars().skip(len.saturating_sub(4)).collect()
}

/// Derive the storable form of a PAN verification request.
pub fn sanitize_pan_request(pan_number: &str) -> MaskedPanRequest {
    MaskedPanRequest {
        pan_last4: last4(pan_number),
        pan_masked: mask(pan_number),
        pan_hash: hash_value(pan_number),
    }
}

/// Mask the PII fields of a provider PAN result.
pub fn sanitize_pan_response(result: PanVerificationResult) -> PanVerificationResult {
    PanVerificationResult {
        pan_number: result.pan_number.as_deref().map(mask),
        full_name: result.full_name.as_deref().map(mask),
        ..result
    }
}
