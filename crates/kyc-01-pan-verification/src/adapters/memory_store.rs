//! In-Memory KYC Store
//!
//! Implements `KycStore` for tests and single-process deployments.

use crate::domain::{
    ApiLogEntry, KycRequestRecord, KycRequestUpdate, NewApiLogEntry, NewKycRequest, RequestId,
    RequestStatus, StoreError,
};
use crate::ports::outbound::KycStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Request records and audit log held in process memory.
#[derive(Default)]
pub struct InMemoryKycStore {
    /// Records by id.
    requests: RwLock<HashMap<RequestId, KycRequestRecord>>,
    /// Audit entries in append order.
    log: RwLock<Vec<ApiLogEntry>>,
}

impl InMemoryKycStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, oldest first.
    pub fn records(&self) -> Vec<KycRequestRecord> {
        let mut records: Vec<_> = self.requests.read().values().cloned().collect();
        records.sort_by_key(|r| r.created_at);
        records
    }

    /// Look up one record.
    pub fn record(&self, id: RequestId) -> Option<KycRequestRecord> {
        self.requests.read().get(&id).cloned()
    }

    /// Records still awaiting a provider outcome.
    ///
    /// Anything here after the owning process restarted was abandoned
    /// mid-flight and can be swept.
    pub fn pending_records(&self) -> Vec<KycRequestRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect()
    }

    /// Audit entries in append order.
    pub fn log_entries(&self) -> Vec<ApiLogEntry> {
        self.log.read().clone()
    }
}

#[async_trait]
impl KycStore for InMemoryKycStore {
    async fn create_request(&self, request: NewKycRequest) -> Result<KycRequestRecord, StoreError> {
        let now = Utc::now();
        let record = KycRequestRecord {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            request_type: request.request_type,
            request_ref: request.request_ref,
            status: RequestStatus::Pending,
            request_hash: request.request_hash,
            request_masked: request.request_masked,
            response_status_code: None,
            response_message_code: None,
            response_masked: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        };

        debug!("[kyc-01] Created request record {}", record.id);
        self.requests.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_request(
        &self,
        id: RequestId,
        update: KycRequestUpdate,
    ) -> Result<KycRequestRecord, StoreError> {
        let mut requests = self.requests.write();
        let record = requests.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if record.status.is_terminal() || !update.status.is_terminal() {
            return Err(StoreError::InvalidTransition {
                id,
                from: record.status,
                to: update.status,
            });
        }

        record.status = update.status;
        record.response_status_code = update.response_status_code;
        record.response_message_code = update.response_message_code;
        record.response_masked = update.response_masked;
        record.error_message = update.error_message;
        record.updated_at = Utc::now();

        debug!("[kyc-01] Request {} -> {:?}", id, record.status);
        Ok(record.clone())
    }

    async fn append_log_entry(&self, entry: NewApiLogEntry) -> Result<ApiLogEntry, StoreError> {
        let entry = ApiLogEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            endpoint: entry.endpoint,
            method: entry.method,
            request_body: entry.request_body,
            response_body: entry.response_body,
            status_code: entry.status_code,
            error_message: entry.error_message,
            duration_ms: entry.duration_ms,
            log_type: entry.log_type,
            created_at: entry.created_at,
        };

        self.log.write().push(entry.clone());
        Ok(entry)
    }
}
