//! # Inbound Ports
//!
//! API trait defining what the PAN verification subsystem can do.

use crate::domain::{KycError, PanVerificationResult, ProviderResponse, UserId, VerifyPanRequest};
use async_trait::async_trait;

/// PAN verification API - inbound port.
#[async_trait]
pub trait PanVerificationApi: Send + Sync {
    /// Verify a PAN with the provider.
    ///
    /// Exactly one request record and one audit log entry are written for
    /// every call that passes validation. The returned result has its PII
    /// fields masked.
    async fn verify_pan(
        &self,
        user_id: Option<UserId>,
        request: VerifyPanRequest,
    ) -> Result<ProviderResponse<PanVerificationResult>, KycError>;
}
