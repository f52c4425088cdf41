//! Error types for the PAN verification subsystem.

use crate::domain::config::ConfigError;
use crate::domain::entities::{RequestId, RequestStatus};
use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by the verification orchestrator and its adapters.
///
/// No variant carries raw request or response values.
#[derive(Debug, Clone, Error)]
pub enum KycError {
    /// Missing or invalid credentials or keys
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Network failure, timeout, or non-2xx provider status
    #[error("Transport error: {message}")]
    Transport {
        /// Provider HTTP status, absent when no response arrived
        status: Option<u16>,
        /// Generic description, free of URLs and bodies
        message: String,
    },

    /// Envelope could not be built or opened
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Decrypted payload is not the expected structure
    #[error("Response format error: {0}")]
    ResponseFormat(String),

    /// Caller input rejected before any side effect
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request store or audit log rejected a write
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// The verification was dropped before the provider answered
    #[error("Verification cancelled")]
    Cancelled,
}

impl KycError {
    /// Transport failure with an optional provider HTTP status.
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        KycError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Describe a JSON failure by category and position only.
    ///
    /// `serde_json` messages can quote the offending value, which may be PII.
    pub fn response_format(context: &str, err: &serde_json::Error) -> Self {
        let category = match err.classify() {
            serde_json::error::Category::Io => "io",
            serde_json::error::Category::Syntax => "syntax",
            serde_json::error::Category::Data => "data",
            serde_json::error::Category::Eof => "eof",
        };
        KycError::ResponseFormat(format!(
            "{}: invalid JSON ({}) at line {} column {}",
            context,
            category,
            err.line(),
            err.column()
        ))
    }

    /// HTTP status reported by the provider, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            KycError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            KycError::Configuration(_) => "configuration",
            KycError::Transport { .. } => "transport",
            KycError::Crypto(_) => "crypto",
            KycError::ResponseFormat(_) => "response_format",
            KycError::Validation(_) => "validation",
            KycError::Storage(_) => "storage",
            KycError::Cancelled => "cancelled",
        }
    }
}

/// Errors from the request store and audit log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record with this id
    #[error("Request not found: {0}")]
    NotFound(RequestId),

    /// The record is not in a state that allows the write
    #[error("Invalid status transition for {id}: {from:?} -> {to:?}")]
    InvalidTransition {
        /// Record being updated
        id: RequestId,
        /// Current status
        from: RequestStatus,
        /// Requested status
        to: RequestStatus,
    },

    /// The backing store failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}
