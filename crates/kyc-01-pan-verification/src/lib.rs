//! # KYC-01 PAN Verification
//!
//! Encrypted identity verification against an external KYC provider, with a
//! PII-free audit trail.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Verify a Permanent Account Number with the provider while guaranteeing
//! that raw identifiers never reach storage or logs:
//! - Request and response bodies travel inside a hybrid RSA/AES-GCM envelope
//! - Every attempt leaves one request record and one audit log entry
//! - Stored forms are limited to a SHA-256 hash, last four characters, and
//!   a masked display value
//!
//! ## Module Structure
//!
//! ```text
//! kyc-01-pan-verification/
//! ├── domain/          # Entities, masking, provider config, errors
//! ├── ports/           # PanVerificationApi, ProviderTransport, KycStore
//! ├── adapters/        # Encrypted HTTP client, in-memory store, axum routes
//! └── service.rs       # Verification orchestrator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    router, user_from_header, AuthenticatedUser, EncryptedProviderClient, InMemoryKycStore,
    AUTHENTICATED_USER_HEADER, CLIENT_ID_HEADER, PAN_ROUTE,
};
pub use domain::{
    hash_value, last4, mask, sanitize_pan_request, sanitize_pan_response, ApiLogEntry,
    ConfigError, KycError, KycRequestRecord, KycRequestUpdate, MaskedPanRequest, NewApiLogEntry,
    NewKycRequest, PanVerificationResult, ProviderConfig, ProviderResponse, RequestId,
    RequestStatus, RequestType, Secret, StoreError, UserId, VerifyPanRequest, LOG_TYPE,
    PAN_ENDPOINT,
};
pub use ports::{KycStore, MockProviderTransport, MockReply, PanVerificationApi, ProviderTransport};
pub use service::PanVerificationService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
