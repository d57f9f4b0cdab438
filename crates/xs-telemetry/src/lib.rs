//! # XS Telemetry
//!
//! Logging and metrics for the cross-swap runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xs_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     println!("{}", xs_telemetry::gather_metrics()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `cross-swap` | Service name on log lines |
//! | `XS_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `XS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `XS_JSON_LOGS` | `false` | JSON log format |
//! | `XS_NETWORK` | `devnet` | Network label |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;
pub use metrics::{gather_metrics, record_envelope_routed, TaskGauge};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// The subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metrics could not be rendered.
    #[error("Failed to encode metrics: {0}")]
    MetricsEncode(String),
}

/// Initialize logging and touch the runtime metrics so they are exported
/// from the start.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    init_logging(&config)?;
    lazy_static::initialize(&metrics::TASKS_RUNNING);
    lazy_static::initialize(&metrics::ENVELOPES_ROUTED);
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}
