//! # Fake Verification Provider
//!
//! An axum server on an ephemeral loopback port that speaks the provider's
//! envelope protocol: it opens requests with the provider private key and
//! seals replies to the client's public key.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use kyc_01_pan_verification::{ProviderConfig, Secret, CLIENT_ID_HEADER, PAN_ENDPOINT};
use parking_lot::Mutex;
use shared_crypto::{decrypt, encrypt, Envelope, EnvelopePrivateKey, EnvelopePublicKey};
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const TEST_CLIENT_ID: &str = "client-123";
pub const TEST_API_TOKEN: &str = "token-abc";
pub const VERIFIED_NAME: &str = "RAVI KUMAR SHARMA";

/// How the fake provider answers.
#[derive(Clone, Copy, Debug)]
pub enum ProviderMode {
    /// 200 with `success: true` and a full PAN record
    Verified,
    /// 200 with `success: false` and `invalid_pan`
    Rejected,
    /// Bare HTTP error status, no envelope
    HttpStatus(u16),
    /// 200 with a correctly sealed body that is not JSON
    InvalidJson,
    /// 200 with a body sealed to the wrong public key
    SealedToWrongKey,
    /// Wait, then answer as `Verified`
    Delay(Duration),
}

/// One request as the provider saw it.
#[derive(Clone, Debug)]
pub struct ReceivedRequest {
    pub client_id: Option<String>,
    pub authorization: Option<String>,
    pub encrypted: String,
    pub plaintext: serde_json::Value,
}

struct FakeState {
    mode: ProviderMode,
    provider_key: EnvelopePrivateKey,
    client_public_key: EnvelopePublicKey,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// Running fake provider. The server stops when this is dropped.
pub struct FakeProvider {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

static PROVIDER_KEY: OnceLock<EnvelopePrivateKey> = OnceLock::new();
static CLIENT_KEY: OnceLock<EnvelopePrivateKey> = OnceLock::new();

/// Provider key pair shared by every test in the binary.
pub fn provider_key() -> EnvelopePrivateKey {
    PROVIDER_KEY
        .get_or_init(|| EnvelopePrivateKey::generate(2048).expect("provider key"))
        .clone()
}

/// Client key pair shared by every test in the binary.
pub fn client_key() -> EnvelopePrivateKey {
    CLIENT_KEY
        .get_or_init(|| EnvelopePrivateKey::generate(2048).expect("client key"))
        .clone()
}

impl FakeProvider {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start(mode: ProviderMode) -> Self {
        let state = Arc::new(FakeState {
            mode,
            provider_key: provider_key(),
            client_public_key: client_key().public_key(),
            received: Mutex::new(Vec::new()),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake provider");
        let addr = listener.local_addr().expect("fake provider addr");

        let app = Router::new()
            .route(PAN_ENDPOINT, post(handle_pan))
            .with_state(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this provider.
    pub fn config(&self) -> ProviderConfig {
        ProviderConfig {
            client_id: TEST_CLIENT_ID.to_string(),
            api_token: Secret::new(TEST_API_TOKEN.to_string()),
            provider_public_key: provider_key().public_key(),
            client_private_key: client_key(),
            base_url: self.base_url(),
            timeout: Duration::from_secs(2),
        }
    }

    /// Requests received so far.
    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().clone()
    }
}

impl Drop for FakeProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle_pan(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let encrypted = body["encrypted"].as_str().unwrap_or_default().to_string();
    let plaintext = Envelope::from_base64(&encrypted)
        .and_then(|envelope| decrypt(&envelope, &state.provider_key))
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or(serde_json::Value::Null);

    state.received.lock().push(ReceivedRequest {
        client_id: header(&headers, CLIENT_ID_HEADER),
        authorization: header(&headers, "authorization"),
        encrypted,
        plaintext: plaintext.clone(),
    });

    let verified = serde_json::json!({
        "success": true,
        "status_code": 200,
        "message_code": "success",
        "data": {
            "client_id": "pan_kfhgjdtrwu",
            "pan_number": plaintext["pan_number"],
            "full_name": VERIFIED_NAME,
            "category": "person",
            "status": "valid",
            "aadhaar_seeding_status": "Y"
        }
    });

    let (reply, recipient) = match state.mode {
        ProviderMode::HttpStatus(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
            return (status, "upstream unavailable").into_response();
        }
        ProviderMode::Delay(delay) => {
            tokio::time::sleep(delay).await;
            (verified.to_string().into_bytes(), state.client_public_key.clone())
        }
        ProviderMode::Verified => (verified.to_string().into_bytes(), state.client_public_key.clone()),
        ProviderMode::Rejected => (
            serde_json::json!({
                "success": false,
                "status_code": 422,
                "message_code": "invalid_pan",
                "data": null
            })
            .to_string()
            .into_bytes(),
            state.client_public_key.clone(),
        ),
        ProviderMode::InvalidJson => (
            b"<html>maintenance</html>".to_vec(),
            state.client_public_key.clone(),
        ),
        ProviderMode::SealedToWrongKey => (
            verified.to_string().into_bytes(),
            state.provider_key.public_key(),
        ),
    };

    let sealed = encrypt(&reply, &recipient).expect("seal reply");
    Json(serde_json::json!({ "encrypted": sealed.to_base64() })).into_response()
}
