//! # Domain Entities
//!
//! Persisted request records, audit log entries, and the provider payloads
//! that flow between the orchestrator and the encrypted transport.

use crate::domain::errors::KycError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a request record.
pub type RequestId = Uuid;

/// Opaque identifier of the authenticated caller.
pub type UserId = String;

/// Provider path for PAN verification.
pub const PAN_ENDPOINT: &str = "/api/v1/pan/pan";

/// HTTP method used for every provider call.
pub const PROVIDER_METHOD: &str = "POST";

/// `log_type` tag for audit entries written by this subsystem.
pub const LOG_TYPE: &str = "surepass";

/// Minimum accepted PAN length, in characters.
pub const MIN_PAN_LEN: usize = 5;

// =============================================================================
// Request Records
// =============================================================================

/// Lifecycle state of a request record.
///
/// `Pending` is the only non-terminal state; a record leaves it exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Created, provider call not yet resolved
    Pending,
    /// Provider reported success
    Success,
    /// Provider reported failure, or the call errored
    Failed,
}

impl RequestStatus {
    /// Whether the status is final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Kind of verification a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Permanent Account Number lookup
    Pan,
}

impl RequestType {
    /// Stable tag stored with the record.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Pan => "pan",
        }
    }
}

/// One row per verification attempt.
///
/// Holds only hashed or masked derivatives of the raw input and response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KycRequestRecord {
    /// Assigned by the store
    pub id: RequestId,
    /// Caller that started the attempt, if authenticated
    pub user_id: Option<UserId>,
    /// Kind of verification
    pub request_type: RequestType,
    /// Caller's own correlation reference
    pub request_ref: Option<String>,
    /// Lifecycle state
    pub status: RequestStatus,
    /// SHA-256 hex of the raw identifier
    pub request_hash: String,
    /// Masked request, see [`MaskedPanRequest::to_json`]
    pub request_masked: serde_json::Value,
    /// Provider status code, when a reply or HTTP status was received
    pub response_status_code: Option<u16>,
    /// Provider message code, when a reply was received
    pub response_message_code: Option<String>,
    /// Provider reply with PII fields masked
    pub response_masked: Option<serde_json::Value>,
    /// Failure description for `Failed` records
    pub error_message: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Time of the last write
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a record; the store assigns `id` and
/// timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct NewKycRequest {
    /// Caller that started the attempt
    pub user_id: Option<UserId>,
    /// Kind of verification
    pub request_type: RequestType,
    /// Caller's own correlation reference
    pub request_ref: Option<String>,
    /// SHA-256 hex of the raw identifier
    pub request_hash: String,
    /// Masked request
    pub request_masked: serde_json::Value,
}

/// The single terminal update applied to a pending record.
#[derive(Clone, Debug, PartialEq)]
pub struct KycRequestUpdate {
    /// Terminal status; never `Pending`
    pub status: RequestStatus,
    /// Provider status code
    pub response_status_code: Option<u16>,
    /// Provider message code
    pub response_message_code: Option<String>,
    /// Masked provider reply
    pub response_masked: Option<serde_json::Value>,
    /// Failure description
    pub error_message: Option<String>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Append-only audit record of one outbound provider call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiLogEntry {
    /// Assigned by the store
    pub id: Uuid,
    /// Caller that started the attempt
    pub user_id: Option<UserId>,
    /// Provider path
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Masked request
    pub request_body: serde_json::Value,
    /// Masked reply; absent when none was received
    pub response_body: Option<serde_json::Value>,
    /// Provider status code
    pub status_code: Option<u16>,
    /// Failure description
    pub error_message: Option<String>,
    /// Milliseconds from just before the provider call to the record update
    pub duration_ms: u64,
    /// Source tag, see [`LOG_TYPE`]
    pub log_type: String,
    /// Append time
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when appending a log entry; the store assigns `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewApiLogEntry {
    /// Caller that started the attempt
    pub user_id: Option<UserId>,
    /// Provider path
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Masked request
    pub request_body: serde_json::Value,
    /// Masked reply
    pub response_body: Option<serde_json::Value>,
    /// Provider status code
    pub status_code: Option<u16>,
    /// Failure description
    pub error_message: Option<String>,
    /// Elapsed provider time in milliseconds
    pub duration_ms: u64,
    /// Source tag
    pub log_type: String,
    /// Append time
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// PAN Verification Payloads
// =============================================================================

/// Inbound request to verify a PAN.
#[derive(Clone, Deserialize)]
pub struct VerifyPanRequest {
    /// Raw PAN; never persisted or logged
    pub pan_number: String,
    /// Caller's own correlation reference
    #[serde(default)]
    pub request_ref: Option<String>,
}

impl VerifyPanRequest {
    /// Reject malformed input before anything is persisted.
    pub fn validate(&self) -> Result<(), KycError> {
        if self.pan_number.chars().count() < MIN_PAN_LEN {
            return Err(KycError::Validation(format!(
                "pan_number must be at least {} characters",
                MIN_PAN_LEN
            )));
        }
        Ok(())
    }
}

// The raw PAN must not reach logs through a stray `{:?}`.
impl std::fmt::Debug for VerifyPanRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyPanRequest")
            .field("pan_number", &"[REDACTED]")
            .field("request_ref", &self.request_ref)
            .finish()
    }
}

/// Storable form of a PAN request: correlation tokens only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedPanRequest {
    /// Trailing four characters
    pub pan_last4: String,
    /// Display form, see [`crate::domain::masking::mask`]
    pub pan_masked: String,
    /// SHA-256 hex
    pub pan_hash: String,
}

impl MaskedPanRequest {
    /// JSON object stored in `request_masked` and the log's `request_body`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "pan_last4": self.pan_last4,
            "pan_masked": self.pan_masked,
            "pan_hash": self.pan_hash,
        })
    }
}

/// Provider payload for a PAN lookup. Unknown provider fields are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanVerificationResult {
    /// Provider's id for the lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// PAN as echoed by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
    /// Registered holder name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Holder category, e.g. `person`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// PAN status, e.g. `valid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Decrypted provider reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse<T> {
    /// Provider's verdict
    pub success: bool,
    /// Provider's status code, echoed in the body
    pub status_code: u16,
    /// Provider's machine-readable outcome
    pub message_code: Option<String>,
    /// Lookup payload
    pub data: Option<T>,
}

impl ProviderResponse<serde_json::Value> {
    /// Reinterpret the untyped `data` payload.
    ///
    /// A `null` payload is treated as absent.
    pub fn into_typed<T>(self) -> Result<ProviderResponse<T>, KycError>
    where
        T: serde::de::DeserializeOwned,
    {
        let data = match self.data {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|e| KycError::response_format("provider data", &e))?,
            ),
        };

        Ok(ProviderResponse {
            success: self.success,
            status_code: self.status_code,
            message_code: self.message_code,
            data,
        })
    }
}
