//! Structured logging.
//!
//! Log lines carry consistent fields so a log shipper can index them:
//! - `level`, `target`, `timestamp`
//! - `component`: escrow, relay, receiver, runtime
//! - `chain` and `swap_id` on swap-related lines

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    // JSON output for containers/production
    let json_layer = (config.console_output && config.json_logs).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    // Pretty output for development
    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "Logging initialized"
    );
    Ok(())
}

/// Helper to create structured log entries with a component field.
#[macro_export]
macro_rules! log_event {
    ($level:ident, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a swap-related event with standard fields.
///
/// `$swap_id` is rendered with `Display`; pass a short hex string.
#[macro_export]
macro_rules! log_swap_event {
    ($level:ident, $component:expr, $msg:expr, $chain:expr, $swap_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            chain = %$chain,
            swap_id = %$swap_id,
            $($($field)*,)?
            $msg
        )
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand() {
        crate::log_event!(info, "runtime", "started", tasks = 3);
        crate::log_swap_event!(debug, "escrow", "opened", "ethereum", "0x1d1d1d1d..");
        crate::log_swap_event!(warn, "relay", "failed", "polkadot", "0x1d1d1d1d..", reason = "transport");
    }
}
