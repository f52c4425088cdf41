//! # Outbound Ports
//!
//! Traits for external dependencies (encrypted provider transport, request
//! store, audit log).

use crate::domain::{
    ApiLogEntry, KycError, KycRequestRecord, KycRequestUpdate, NewApiLogEntry, NewKycRequest,
    ProviderResponse, RequestId, StoreError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Encrypted provider transport - outbound port.
///
/// Implementations seal `body` for the provider, POST it to `path`, and
/// return the opened reply. Plaintext never leaves the implementation except
/// as the returned value.
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// Send one request and decode the reply.
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ProviderResponse<serde_json::Value>, KycError>;
}

/// Request store and audit log - outbound port.
#[async_trait]
pub trait KycStore: Send + Sync {
    /// Persist a new record in `Pending` state.
    async fn create_request(&self, request: NewKycRequest) -> Result<KycRequestRecord, StoreError>;

    /// Move a pending record to its terminal state.
    ///
    /// Fails with `InvalidTransition` if the record is no longer pending.
    async fn update_request(
        &self,
        id: RequestId,
        update: KycRequestUpdate,
    ) -> Result<KycRequestRecord, StoreError>;

    /// Append an audit entry.
    async fn append_log_entry(&self, entry: NewApiLogEntry) -> Result<ApiLogEntry, StoreError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Scripted behaviour for one `post_json` call.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Return this result.
    Respond(Result<ProviderResponse<serde_json::Value>, KycError>),
    /// Wait, then return this result.
    Delayed(Duration, Result<ProviderResponse<serde_json::Value>, KycError>),
    /// Never complete.
    Hang,
}

/// Mock provider transport for testing.
///
/// Replies are consumed in order; an empty queue yields a transport error.
#[derive(Default)]
pub struct MockProviderTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<(String, serde_json::Value)>>,
    calls: AtomicUsize,
}

impl MockProviderTransport {
    /// Create a mock with an empty reply queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn push(&self, reply: MockReply) -> &Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Queue a successful round trip.
    pub fn respond_ok(&self, response: ProviderResponse<serde_json::Value>) -> &Self {
        self.push(MockReply::Respond(Ok(response)))
    }

    /// Queue a failed round trip.
    pub fn respond_err(&self, error: KycError) -> &Self {
        self.push(MockReply::Respond(Err(error)))
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Paths and plaintext bodies received, in call order.
    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ProviderTransport for MockProviderTransport {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ProviderResponse<serde_json::Value>, KycError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push((path.to_string(), body.clone()));

        let reply = self.replies.lock().pop_front();
        match reply {
            Some(MockReply::Respond(result)) => result,
            Some(MockReply::Delayed(delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            Some(MockReply::Hang) => std::future::pending().await,
            None => Err(KycError::transport(None, "Mock failure: no reply queued")),
        }
    }
}
