//! # PAN Verification Service
//!
//! Application service layer that implements the `PanVerificationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`PanVerificationApi`)
//! - Uses the outbound ports (`ProviderTransport`, `KycStore`) for the
//!   provider call and the audit trail
//! - Delegates masking and hashing to the domain layer
//!
//! ## Lifecycle
//!
//! ```text
//! validate -> sanitize -> create pending record -> provider call
//!          -> update record (success | failed) -> append log entry
//! ```
//!
//! Once the pending record exists, a `PendingVerification` guard owns the
//! terminal update and the log entry. It is finished explicitly on every
//! return path; if the caller drops the future first, the guard's `Drop`
//! schedules a `Cancelled` outcome on the runtime. Finishing hands the writes
//! to a spawned task, so a caller dropped mid-write cannot cut them short.

use crate::domain::{
    sanitize_pan_request, sanitize_pan_response, KycError, KycRequestUpdate, NewApiLogEntry,
    NewKycRequest, PanVerificationResult, ProviderResponse, RequestId, RequestStatus, RequestType,
    StoreError, UserId, VerifyPanRequest, LOG_TYPE, PAN_ENDPOINT, PROVIDER_METHOD,
};
use crate::ports::inbound::PanVerificationApi;
use crate::ports::outbound::{KycStore, ProviderTransport};
use async_trait::async_trait;
use chrono::Utc;
use kyc_telemetry::subsystem_span;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{error, info, warn, Instrument};

/// PAN Verification Service.
///
/// Cheap to share: both collaborators are held behind `Arc`, and each call
/// is independent of every other.
pub struct PanVerificationService<T, S>
where
    T: ProviderTransport,
    S: KycStore + 'static,
{
    transport: Arc<T>,
    store: Arc<S>,
}

impl<T, S> PanVerificationService<T, S>
where
    T: ProviderTransport,
    S: KycStore + 'static,
{
    /// Create a new verification service.
    pub fn new(transport: Arc<T>, store: Arc<S>) -> Self {
        Self { transport, store }
    }

    async fn execute(
        &self,
        user_id: Option<UserId>,
        request: VerifyPanRequest,
    ) -> Result<ProviderResponse<PanVerificationResult>, KycError> {
        let masked = sanitize_pan_request(&request.pan_number);
        let request_body = masked.to_json();

        let record = match self
            .store
            .create_request(NewKycRequest {
                user_id: user_id.clone(),
                request_type: RequestType::Pan,
                request_ref: request.request_ref.clone(),
                request_hash: masked.pan_hash.clone(),
                request_masked: request_body.clone(),
            })
            .await
        {
            Ok(record) => record,
            Err(err) => {
                error!(error = %err, "[kyc-01] Could not create request record");
                self.log_unrecorded_attempt(user_id, request_body, &err).await;
                return Err(err.into());
            }
        };

        info!(
            request_id = %record.id,
            pan_masked = %masked.pan_masked,
            "[kyc-01] Verifying PAN"
        );

        let guard =
            PendingVerification::start(Arc::clone(&self.store), record.id, user_id, request_body);

        let provider_body = serde_json::json!({ "pan_number": request.pan_number });
        let reply = self.transport.post_json(PAN_ENDPOINT, &provider_body).await;
        let codes = reply.as_ref().ok().map(ReplyCodes::of);
        let result = reply
            .and_then(|response| response.into_typed::<PanVerificationResult>())
            .map(mask_response);

        match result {
            Ok(response) => {
                guard.finish(Outcome::from_response(&response)).await?;
                Ok(response)
            }
            Err(err) => {
                warn!(
                    request_id = %record.id,
                    kind = err.kind(),
                    "[kyc-01] PAN verification failed: {}",
                    err
                );
                if let Err(store_err) = guard.finish(Outcome::from_error(&err, codes)).await {
                    error!(
                        request_id = %record.id,
                        error = %store_err,
                        "[kyc-01] Could not persist failure outcome"
                    );
                }
                Err(err)
            }
        }
    }

    /// The pending record could not be written; keep the audit log whole.
    async fn log_unrecorded_attempt(
        &self,
        user_id: Option<UserId>,
        request_body: serde_json::Value,
        err: &StoreError,
    ) {
        let entry = NewApiLogEntry {
            user_id,
            endpoint: PAN_ENDPOINT.to_string(),
            method: PROVIDER_METHOD.to_string(),
            request_body,
            response_body: None,
            status_code: None,
            error_message: Some(KycError::Storage(err.clone()).to_string()),
            duration_ms: 0,
            log_type: LOG_TYPE.to_string(),
            created_at: Utc::now(),
        };
        if let Err(log_err) = self.store.append_log_entry(entry).await {
            error!(error = %log_err, "[kyc-01] Could not append audit log entry");
        }
    }
}

#[async_trait]
impl<T, S> PanVerificationApi for PanVerificationService<T, S>
where
    T: ProviderTransport,
    S: KycStore + 'static,
{
    async fn verify_pan(
        &self,
        user_id: Option<UserId>,
        request: VerifyPanRequest,
    ) -> Result<ProviderResponse<PanVerificationResult>, KycError> {
        request.validate()?;

        let span = subsystem_span!(
            "verify_pan",
            subsystem = "kyc-01",
            request_type = RequestType::Pan.as_str()
        );
        self.execute(user_id, request).instrument(span).await
    }
}

fn mask_response(
    response: ProviderResponse<PanVerificationResult>,
) -> ProviderResponse<PanVerificationResult> {
    ProviderResponse {
        data: response.data.map(sanitize_pan_response),
        ..response
    }
}

// =============================================================================
// Outcome Persistence
// =============================================================================

/// Status and message code of a reply that arrived but could not be used.
struct ReplyCodes {
    status_code: u16,
    message_code: Option<String>,
}

impl ReplyCodes {
    fn of(response: &ProviderResponse<serde_json::Value>) -> Self {
        Self {
            status_code: response.status_code,
            message_code: response.message_code.clone(),
        }
    }
}

/// Terminal state of one attempt, already in storable form.
struct Outcome {
    update: KycRequestUpdate,
}

impl Outcome {
    /// The provider answered. `success: false` is a failed verification,
    /// not an error.
    fn from_response(response: &ProviderResponse<PanVerificationResult>) -> Self {
        let (status, error_message) = if response.success {
            (RequestStatus::Success, None)
        } else {
            (
                RequestStatus::Failed,
                Some(format!(
                    "provider reported failure: {}",
                    response.message_code.as_deref().unwrap_or("unknown")
                )),
            )
        };

        Self {
            update: KycRequestUpdate {
                status,
                response_status_code: Some(response.status_code),
                response_message_code: response.message_code.clone(),
                response_masked: serde_json::to_value(response).ok(),
                error_message,
            },
        }
    }

    fn from_error(err: &KycError, reply: Option<ReplyCodes>) -> Self {
        let (status_code, message_code) = match reply {
            Some(codes) => (Some(codes.status_code), codes.message_code),
            None => (err.status_code(), None),
        };
        Self {
            update: KycRequestUpdate {
                status: RequestStatus::Failed,
                response_status_code: status_code,
                response_message_code: message_code,
                response_masked: None,
                error_message: Some(err.to_string()),
            },
        }
    }
}

/// Everything needed to close out an attempt, detached from the service so
/// it can outlive the caller's future.
struct Attempt<S: KycStore + 'static> {
    store: Arc<S>,
    request_id: RequestId,
    user_id: Option<UserId>,
    request_body: serde_json::Value,
    started: Instant,
}

impl<S: KycStore + 'static> Attempt<S> {
    /// Update the record, then append the log entry. The log entry is
    /// written even when the update fails.
    async fn finalize(self, outcome: Outcome) -> Result<(), StoreError> {
        let status = outcome.update.status;
        let status_code = outcome.update.response_status_code;
        let response_body = outcome.update.response_masked.clone();
        let error_message = outcome.update.error_message.clone();

        let updated = self
            .store
            .update_request(self.request_id, outcome.update)
            .await;
        let duration_ms = self.started.elapsed().as_millis() as u64;

        let logged = self
            .store
            .append_log_entry(NewApiLogEntry {
                user_id: self.user_id,
                endpoint: PAN_ENDPOINT.to_string(),
                method: PROVIDER_METHOD.to_string(),
                request_body: self.request_body,
                response_body,
                status_code,
                error_message,
                duration_ms,
                log_type: LOG_TYPE.to_string(),
                created_at: Utc::now(),
            })
            .await;

        info!(
            request_id = %self.request_id,
            status = ?status,
            duration_ms,
            "[kyc-01] Verification recorded"
        );

        updated?;
        logged?;
        Ok(())
    }
}

/// Scoped owner of an in-flight attempt's terminal update and log entry.
struct PendingVerification<S: KycStore + 'static> {
    attempt: Option<Attempt<S>>,
}

impl<S: KycStore + 'static> PendingVerification<S> {
    /// Start the clock. Call immediately before the provider call.
    fn start(
        store: Arc<S>,
        request_id: RequestId,
        user_id: Option<UserId>,
        request_body: serde_json::Value,
    ) -> Self {
        Self {
            attempt: Some(Attempt {
                store,
                request_id,
                user_id,
                request_body,
                started: Instant::now(),
            }),
        }
    }

    /// Persist `outcome`. The writes run on their own task and complete
    /// even if the caller stops polling.
    async fn finish(mut self, outcome: Outcome) -> Result<(), StoreError> {
        let Some(attempt) = self.attempt.take() else {
            return Ok(());
        };
        tokio::spawn(attempt.finalize(outcome))
            .await
            .map_err(|e| StoreError::Backend(format!("finalize task failed: {}", e)))?
    }
}

impl<S: KycStore + 'static> Drop for PendingVerification<S> {
    fn drop(&mut self) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };

        warn!(
            request_id = %attempt.request_id,
            "[kyc-01] Verification dropped before completion"
        );
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let request_id = attempt.request_id;
                    if let Err(err) = attempt
                        .finalize(Outcome::from_error(&KycError::Cancelled, None))
                        .await {
                        error!(
                            request_id = %request_id,
                            error = %err,
                            "[kyc-01] Could not persist cancellation"
                        );
                    }
                });
            }
            Err(_) => {
                error!(
                    request_id = %attempt.request_id,
                    "[kyc-01] No runtime to persist cancellation; record left pending"
                );
            }
        }
    }
}
