//! Encrypted Provider Client Adapter
//!
//! Implements `ProviderTransport` over HTTPS. Every request body is sealed
//! to the provider's public key and every reply is opened with our private
//! key; plaintext exists only in memory on either side of the envelope.

use crate::domain::{ConfigError, KycError, ProviderConfig, ProviderResponse};
use crate::ports::outbound::ProviderTransport;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared_crypto::{envelope, CryptoError, Envelope};
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the provider-issued client identifier.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// JSON wrapper for a sealed body in either direction.
#[derive(Serialize, Deserialize)]
struct EncryptedBody {
    encrypted: String,
}

/// Provider client that speaks the encrypted envelope protocol.
pub struct EncryptedProviderClient {
    client: Client,
    config: ProviderConfig,
}

impl EncryptedProviderClient {
    /// Create a client from validated configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, KycError> {
        config.validate()?;

        let client = build_http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    /// Create a client from the process environment.
    pub fn from_env() -> Result<Self, KycError> {
        Self::new(ProviderConfig::from_env()?)
    }

    /// Configured provider base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn seal(&self, body: &serde_json::Value) -> Result<EncryptedBody, KycError> {
        let plaintext = serde_json::to_vec(body)
            .map_err(|_| CryptoError::EncryptionFailed("request body not serializable".to_string()))?;
        let sealed = envelope::encrypt(&plaintext, &self.config.provider_public_key)?;
        Ok(EncryptedBody {
            encrypted: sealed.to_base64(),
        })
    }

    fn open(&self, raw: &[u8]) -> Result<ProviderResponse<serde_json::Value>, KycError> {
        let wrapper: EncryptedBody = serde_json::from_slice(raw).map_err(|_| {
            CryptoError::MalformedEnvelope("reply is not an encrypted body".to_string())
        })?;
        let sealed = Envelope::from_base64(&wrapper.encrypted)?;
        let plaintext = envelope::decrypt(&sealed, &self.config.client_private_key)?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| KycError::response_format("provider payload", &e))
    }
}

fn build_http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Map a send failure to a transport error without leaking the URL's query
/// or the request body.
fn send_error(err: &reqwest::Error) -> KycError {
    let status = err.status().map(|s| s.as_u16());
    let message = if err.is_timeout() {
        "provider request timed out"
    } else if err.is_connect() {
        "could not connect to provider"
    } else {
        "provider request failed"
    };
    KycError::transport(status, message)
}

#[async_trait]
impl ProviderTransport for EncryptedProviderClient {
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<ProviderResponse<serde_json::Value>, KycError> {
        let sealed = self.seal(body)?;
        debug!("[kyc-01] POST {}", path);

        let response = self
            .client
            .post(self.url(path))
            .header(CLIENT_ID_HEADER, &self.config.client_id)
            .bearer_auth(self.config.api_token.expose_secret())
            .json(&sealed)
            .send()
            .await
            .map_err(|e| send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("[kyc-01] Provider returned HTTP {} for {}", status.as_u16(), path);
            return Err(KycError::transport(
                Some(status.as_u16()),
                format!("provider returned HTTP {}", status.as_u16()),
            ));
        }

        let raw = response.bytes().await.map_err(|e| send_error(&e))?;
        self.open(&raw)
    }
}
