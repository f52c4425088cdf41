//! # KYC Telemetry
//!
//! Process-wide structured logging for the KYC verification services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kyc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     // Application code: `tracing::info!` etc. now reach the subscriber
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KYC_SERVICE_NAME` | `kyc-runtime` | Service name in log lines |
//! | `KYC_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `KYC_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `KYC_CONSOLE_OUTPUT` | `true` | Write to stdout at all |
//! | `KYC_ENVIRONMENT` | `sandbox` | Deployment environment tag |
//!
//! Log lines must never carry raw PII or key material; callers log masked
//! values and correlation hashes only.

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed
    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),

    /// Configuration value could not be used
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize telemetry for a service process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use kyc_telemetry::subsystem_span;
///
/// let span = subsystem_span!("verify_pan", subsystem = "kyc-01", request_type = "pan");
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
