//! # PAN Verification Flows
//!
//! | Flow | Provider | Expected |
//! |------|----------|----------|
//! | Verified | 200, `success: true` | masked result, `success` record |
//! | Rejected | 200, `success: false` | returned, `failed` record |
//! | Outage | HTTP 502 | `Transport`, `failed` record, generic 500 |
//! | Garbage | sealed non-JSON | `ResponseFormat` |
//! | Wrong key | reply sealed to provider | `Crypto` |
//! | Slow | exceeds client timeout | `Transport` without status |

#[cfg(test)]
mod tests {
    use crate::fake_provider::{
        FakeProvider, ProviderMode, TEST_API_TOKEN, TEST_CLIENT_ID, VERIFIED_NAME,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use kyc_01_pan_verification::{
        EncryptedProviderClient, InMemoryKycStore, KycError, PanVerificationApi,
        PanVerificationService, RequestStatus, VerifyPanRequest, AUTHENTICATED_USER_HEADER,
        PAN_ROUTE,
    };
    use kyc_runtime::{KycRuntime, RuntimeConfig};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const PAN: &str = "FNMPM6342D";

    type LiveService = PanVerificationService<EncryptedProviderClient, InMemoryKycStore>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn wire(provider: &FakeProvider) -> (LiveService, Arc<InMemoryKycStore>) {
        let client = EncryptedProviderClient::new(provider.config()).expect("client");
        let store = Arc::new(InMemoryKycStore::new());
        let service = PanVerificationService::new(Arc::new(client), Arc::clone(&store));
        (service, store)
    }

    fn pan_request() -> VerifyPanRequest {
        VerifyPanRequest {
            pan_number: PAN.to_string(),
            request_ref: Some("onboarding-17".to_string()),
        }
    }

    /// Nothing persisted may contain the raw PAN or the provider's name.
    fn assert_store_is_clean(store: &InMemoryKycStore) {
        let dump = format!(
            "{}{}",
            serde_json::to_string(&store.records()).unwrap(),
            serde_json::to_string(&store.log_entries()).unwrap()
        );
        assert!(!dump.contains(PAN), "raw PAN persisted");
        assert!(!dump.contains(VERIFIED_NAME), "raw name persisted");
    }

    // =============================================================================
    // SERVICE FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_verified_pan_end_to_end() {
        let provider = FakeProvider::start(ProviderMode::Verified).await;
        let (service, store) = wire(&provider);

        let response = service
            .verify_pan(Some("user-1".to_string()), pan_request())
            .await
            .expect("verification succeeds");

        assert!(response.success);
        let data = response.data.expect("data");
        assert_eq!(data.pan_number.as_deref(), Some("FN******2D"));
        assert_eq!(data.full_name.as_deref(), Some("RA*************MA"));
        assert_eq!(data.status.as_deref(), Some("valid"));

        // The provider saw the raw PAN only inside the envelope.
        let received = provider.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].plaintext["pan_number"], PAN);
        assert!(!received[0].encrypted.contains(PAN));
        assert_eq!(received[0].client_id.as_deref(), Some(TEST_CLIENT_ID));
        assert_eq!(
            received[0].authorization,
            Some(format!("Bearer {}", TEST_API_TOKEN))
        );

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequestStatus::Success);
        assert_eq!(records[0].request_ref.as_deref(), Some("onboarding-17"));
        assert_eq!(records[0].response_status_code, Some(200));

        let log = store.log_entries();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].status_code, Some(200));
        assert!(log[0].response_body.is_some());

        assert_store_is_clean(&store);
    }

    #[tokio::test]
    async fn test_rejected_pan_is_returned_and_marked_failed() {
        let provider = FakeProvider::start(ProviderMode::Rejected).await;
        let (service, store) = wire(&provider);

        let response = service.verify_pan(None, pan_request()).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.message_code.as_deref(), Some("invalid_pan"));

        let records = store.records();
        assert_eq!(records[0].status, RequestStatus::Failed);
        assert_eq!(
            records[0].error_message.as_deref(),
            Some("provider reported failure: invalid_pan")
        );
        assert_store_is_clean(&store);
    }

    #[tokio::test]
    async fn test_provider_outage_is_transport_error() {
        let provider = FakeProvider::start(ProviderMode::HttpStatus(502)).await;
        let (service, store) = wire(&provider);

        let err = service.verify_pan(None, pan_request()).await.unwrap_err();
        assert!(matches!(err, KycError::Transport { status: Some(502), .. }));

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequestStatus::Failed);
        assert!(records[0].response_masked.is_none());
        assert!(records[0]
            .error_message
            .as_deref()
            .unwrap()
            .starts_with("Transport error"));

        let log = store.log_entries();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].status_code, Some(502));
        assert!(log[0].response_body.is_none());

        assert_store_is_clean(&store);
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_response_format_error() {
        let provider = FakeProvider::start(ProviderMode::InvalidJson).await;
        let (service, store) = wire(&provider);

        let err = service.verify_pan(None, pan_request()).await.unwrap_err();
        assert!(matches!(err, KycError::ResponseFormat(_)));

        let message = store.records()[0].error_message.clone().unwrap();
        assert!(message.starts_with("Response format error"));
        assert_eq!(store.log_entries().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_sealed_to_wrong_key_is_crypto_error() {
        let provider = FakeProvider::start(ProviderMode::SealedToWrongKey).await;
        let (service, store) = wire(&provider);

        let err = service.verify_pan(None, pan_request()).await.unwrap_err();
        assert!(matches!(err, KycError::Crypto(_)));

        let message = store.records()[0].error_message.clone().unwrap();
        assert!(message.starts_with("Crypto error"));
        assert_store_is_clean(&store);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_as_transport_error() {
        let provider = FakeProvider::start(ProviderMode::Delay(Duration::from_secs(10))).await;
        let mut config = provider.config();
        config.timeout = Duration::from_millis(300);

        let client = EncryptedProviderClient::new(config).unwrap();
        let store = Arc::new(InMemoryKycStore::new());
        let service = PanVerificationService::new(Arc::new(client), Arc::clone(&store));

        let err = service.verify_pan(None, pan_request()).await.unwrap_err();
        assert!(matches!(err, KycError::Transport { status: None, .. }));
        assert!(err.to_string().contains("timed out"));
        assert_eq!(store.records()[0].status, RequestStatus::Failed);
        assert_eq!(store.log_entries().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_verifications_each_leave_a_trail() {
        let provider = FakeProvider::start(ProviderMode::Verified).await;
        let (service, store) = wire(&provider);
        let service = Arc::new(service);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service
                        .verify_pan(Some(format!("user-{}", i)), pan_request())
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(provider.received().len(), 4);
        assert_eq!(store.records().len(), 4);
        assert_eq!(store.log_entries().len(), 4);
        assert!(store.pending_records().is_empty());
    }

    // =============================================================================
    // HTTP BOUNDARY
    // =============================================================================

    fn http_request(user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(PAN_ROUTE)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(AUTHENTICATED_USER_HEADER, user);
        }
        builder
            .body(Body::from(format!(r#"{{"pan_number":"{}"}}"#, PAN)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_runtime_serves_masked_result() {
        let provider = FakeProvider::start(ProviderMode::Verified).await;
        let runtime =
            KycRuntime::new(RuntimeConfig::from_lookup(|_| None).unwrap(), provider.config())
                .unwrap();

        let response = runtime.app().oneshot(http_request(Some("user-9"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["pan_number"], "FN******2D");
        assert!(!body.to_string().contains(PAN));

        let records = runtime.store().records();
        assert_eq!(records[0].user_id.as_deref(), Some("user-9"));
    }

    #[tokio::test]
    async fn test_runtime_hides_failure_detail() {
        let provider = FakeProvider::start(ProviderMode::HttpStatus(502)).await;
        let runtime =
            KycRuntime::new(RuntimeConfig::from_lookup(|_| None).unwrap(), provider.config())
                .unwrap();

        let response = runtime.app().oneshot(http_request(Some("user-9"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "PAN verification failed" })
        );

        let records = runtime.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequestStatus::Failed);
        assert_eq!(runtime.store().log_entries().len(), 1);
    }

    #[tokio::test]
    async fn test_runtime_rejects_anonymous_caller_before_provider() {
        let provider = FakeProvider::start(ProviderMode::Verified).await;
        let runtime =
            KycRuntime::new(RuntimeConfig::from_lookup(|_| None).unwrap(), provider.config())
                .unwrap();

        let response = runtime.app().oneshot(http_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(provider.received().is_empty());
        assert!(runtime.store().records().is_empty());
    }
}
