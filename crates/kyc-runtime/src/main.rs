//! # KYC Runtime
//!
//! Entry point for the verification service.

use anyhow::{Context, Result};
use kyc_01_pan_verification::ProviderConfig;
use kyc_runtime::{KycRuntime, RuntimeConfig};
use kyc_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    // Missing credentials or unreadable keys stop the process here.
    let provider = ProviderConfig::from_env().context("invalid provider configuration")?;
    let config = RuntimeConfig::from_env().context("invalid runtime configuration")?;

    info!(
        base_url = %provider.base_url,
        http_addr = %config.http_addr,
        "[kyc-runtime] Starting verification service"
    );

    let runtime = KycRuntime::new(config, provider).context("failed to wire runtime")?;

    runtime
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("[kyc-runtime] Failed to listen for Ctrl+C: {}", e);
            }
            info!("[kyc-runtime] Shutdown signal received");
        })
        .await
        .context("server terminated with an error")?;

    Ok(())
}
