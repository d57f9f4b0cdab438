//! # Cross-Swap Runtime
//!
//! Deploys both ledgers and the relay, runs one demo swap end to end, then
//! keeps the relay running until Ctrl+C.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load configuration from `XS_*` environment variables
//! 3. Generate an ephemeral relay key if none was provided
//! 4. Deploy and start the runtime
//! 5. Run the demo swap and print the metrics snapshot

use anyhow::{Context, Result};
use tracing::{info, warn};

use swap_runtime::{run_demo_swap, ChainClocks, RelayKey, RuntimeConfig, SwapRuntime};
use xs_01_escrow_ledger::SystemClock;
use xs_telemetry::{gather_metrics, init_telemetry, TelemetryConfig};

/// Load configuration from the environment.
fn load_config() -> Result<RuntimeConfig> {
    let mut config = RuntimeConfig::from_env().context("Failed to load configuration")?;

    if config.relay.key.is_zero() {
        warn!("XS_RELAY_KEY not set, using an ephemeral relay key");
        config.relay.key = RelayKey::generate();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_component("swap-runtime"))?;

    let config = load_config()?;
    config.validate().context("Configuration rejected")?;

    let runtime = SwapRuntime::new(config, ChainClocks::<SystemClock>::independent())?;
    runtime.start()?;

    let network = runtime.network();
    let report = run_demo_swap(network.as_ref())
        .await
        .context("Demo swap failed")?;
    info!(
        swap_id = %hex::encode(report.swap_id),
        source = %report.source_state,
        destination = %report.destination_state,
        "Demo swap complete"
    );

    match gather_metrics() {
        Ok(text) => info!("Metrics snapshot:\n{}", text),
        Err(e) => warn!("Failed to gather metrics: {}", e),
    }

    info!("Relay is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
