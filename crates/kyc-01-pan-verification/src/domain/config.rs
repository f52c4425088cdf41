//! # Provider Configuration
//!
//! Credentials and key material for the verification provider, loaded once
//! at startup. Loading fails fast: a half-configured client never exists.

use shared_crypto::{CryptoError, EnvelopePrivateKey, EnvelopePublicKey};
use std::time::Duration;
use thiserror::Error;

/// Provider-issued client identifier.
pub const ENV_CLIENT_ID: &str = "SUREPASS_CLIENT_ID";
/// Bearer token for the provider API.
pub const ENV_API_TOKEN: &str = "SUREPASS_API_TOKEN";
/// PEM public key of the provider.
pub const ENV_PROVIDER_PUBLIC_KEY: &str = "SUREPASS_PUBLIC_KEY";
/// PEM private key of this client.
pub const ENV_CLIENT_PRIVATE_KEY: &str = "SUREPASS_CLIENT_PRIVATE_KEY";
/// Optional provider base URL.
pub const ENV_BASE_URL: &str = "SUREPASS_BASE_URL";
/// Optional request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "SUREPASS_TIMEOUT_SECS";

/// Provider sandbox.
pub const DEFAULT_BASE_URL: &str = "https://sandbox.surepass.io";
/// Request timeout when `SUREPASS_TIMEOUT_SECS` is unset.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors. Messages name the variable, never its value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    /// A key setting is not a usable PEM key
    #[error("Invalid key in {name}: {source}")]
    InvalidKey {
        /// Setting that held the key
        name: &'static str,
        /// Why the key was rejected
        #[source]
        source: CryptoError,
    },

    /// A setting is present but out of range or malformed
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Offending setting
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The HTTP client could not be built from the settings
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}

/// Wrapper that keeps a value out of `Debug` and `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T>(T);

impl<T> Secret<T> {
    /// Wrap a sensitive value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Access the wrapped value. Call sites are the audit surface.
    pub fn expose_secret(&self) -> &T {
        &self.0
    }
}

impl<T> std::fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> std::fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Everything the encrypted provider client needs.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Sent as `x-client-id`.
    pub client_id: String,
    /// Sent as the bearer token.
    pub api_token: Secret<String>,
    /// Provider's key; requests are sealed to it.
    pub provider_public_key: EnvelopePublicKey,
    /// Our key; responses are sealed to its public half.
    pub client_private_key: EnvelopePrivateKey,
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout, surfaced as a transport error.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary name lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let client_id = required(ENV_CLIENT_ID)?;
        let api_token = Secret::new(required(ENV_API_TOKEN)?);

        let provider_public_key = EnvelopePublicKey::from_pem(&required(ENV_PROVIDER_PUBLIC_KEY)?)
            .map_err(|source| ConfigError::InvalidKey {
                name: ENV_PROVIDER_PUBLIC_KEY,
                source,
            })?;
        let client_private_key = EnvelopePrivateKey::from_pem(&required(ENV_CLIENT_PRIVATE_KEY)?)
            .map_err(|source| ConfigError::InvalidKey {
                name: ENV_CLIENT_PRIVATE_KEY,
                source,
            })?;

        let base_url = lookup(ENV_BASE_URL)
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: ENV_TIMEOUT_SECS,
                reason: "expected a whole number of seconds".to_string(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            client_id,
            api_token,
            provider_public_key,
            client_private_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that parsing alone does not enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing(ENV_CLIENT_ID));
        }
        if self.api_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Missing(ENV_API_TOKEN));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: ENV_BASE_URL,
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: ENV_TIMEOUT_SECS,
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
