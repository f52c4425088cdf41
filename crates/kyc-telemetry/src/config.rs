//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for process-wide structured logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `info,kyc_01_pan_verification=debug`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment (sandbox, production)
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "kyc-runtime".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "sandbox".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KYC_SERVICE_NAME`: Service name (default: kyc-runtime)
    /// - `KYC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `KYC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `KYC_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `KYC_ENVIRONMENT`: Deployment environment (default: sandbox)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("KYC_SERVICE_NAME").unwrap_or_else(|| "kyc-runtime".to_string()),

            log_level: lookup("KYC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("KYC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("KYC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            environment: lookup("KYC_ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string()),
        }
    }
}
