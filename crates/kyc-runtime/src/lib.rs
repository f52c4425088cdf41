//! # KYC Runtime
//!
//! Wiring for the verification service process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (`KYC_*` variables)
//! 2. Load provider configuration (`SUREPASS_*` variables), failing fast
//! 3. Build the encrypted client, in-memory store and verification service
//! 4. Serve `POST /api/kyc/pan` on `KYC_HTTP_ADDR` until shutdown
//! 5. Report requests left pending

use axum::Router;
use kyc_01_pan_verification::{
    router, user_from_header, EncryptedProviderClient, InMemoryKycStore, KycError,
    PanVerificationService, ProviderConfig,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub const ENV_HTTP_ADDR: &str = "KYC_HTTP_ADDR";

/// Loopback by default: the caller identity header is trusted as sent, so
/// only a fronting proxy should be able to reach the listener.
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";

/// Runtime startup and serving errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid value for KYC_HTTP_ADDR: {0}")]
    InvalidAddr(String),

    #[error("Subsystem error: {0}")]
    Subsystem(#[from] KycError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Process-level settings outside the provider configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub http_addr: SocketAddr,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ENV_HTTP_ADDR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw
            .trim()
            .parse()
            .map_err(|_| RuntimeError::InvalidAddr(raw.clone()))?;
        Ok(Self { http_addr })
    }

    /// Whether clients other than a local proxy can reach the listener and
    /// set `x-authenticated-user` themselves.
    pub fn is_publicly_bound(&self) -> bool {
        !self.http_addr.ip().is_loopback()
    }
}

/// The assembled service.
pub struct KycRuntime {
    config: RuntimeConfig,
    store: Arc<InMemoryKycStore>,
    app: Router,
}

impl KycRuntime {
    /// Wire the verification subsystem.
    pub fn new(config: RuntimeConfig, provider: ProviderConfig) -> Result<Self, RuntimeError> {
        let client = Arc::new(EncryptedProviderClient::new(provider)?);
        let store = Arc::new(InMemoryKycStore::new());
        let service = PanVerificationService::new(client, Arc::clone(&store));

        let app = router(Arc::new(service)).layer(axum::middleware::from_fn(user_from_header));

        Ok(Self { config, store, app })
    }

    /// The HTTP application, for mounting or testing.
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Request store backing this runtime.
    pub fn store(&self) -> Arc<InMemoryKycStore> {
        Arc::clone(&self.store)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.config.is_publicly_bound() {
            warn!(
                addr = %self.config.http_addr,
                "[kyc-runtime] Listening beyond loopback; x-authenticated-user is trusted as sent, \
                 so a proxy must strip it from client requests"
            );
        }

        let listener = tokio::net::TcpListener::bind(self.config.http_addr).await?;
        info!(addr = %listener.local_addr()?, "[kyc-runtime] HTTP server listening");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await?;

        let pending = self.store.pending_records();
        if !pending.is_empty() {
            warn!(
                count = pending.len(),
                "[kyc-runtime] Requests left pending at shutdown"
            );
        }
        info!("[kyc-runtime] Shutdown complete");
        Ok(())
    }
}
