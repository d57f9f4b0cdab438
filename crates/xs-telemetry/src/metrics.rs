//! Prometheus metrics.
//!
//! Subsystem crates register their counters on the default registry when
//! built with their `metrics` feature; this module owns the runtime-level
//! metrics and renders everything in the text exposition format.
//!
//! All runtime metrics follow the naming convention: `xs_runtime_<metric>`

use crate::TelemetryError;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    /// Background tasks currently running
    pub static ref TASKS_RUNNING: IntGauge = register_int_gauge!(
        "xs_runtime_tasks_running",
        "Number of background relay tasks currently running"
    )
    .expect("Failed to create TASKS_RUNNING metric");

    /// Envelopes moved between chains by the runtime, by kind
    pub static ref ENVELOPES_ROUTED: IntCounterVec = register_int_counter_vec!(
        "xs_runtime_envelopes_routed_total",
        "Total number of envelopes routed between chains",
        &["kind"]  // kind: call/ack
    )
    .expect("Failed to create ENVELOPES_ROUTED metric");
}

/// Render every registered metric.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}

/// Count one routed envelope.
pub fn record_envelope_routed(kind: &str) {
    ENVELOPES_ROUTED.with_label_values(&[kind]).inc();
}

/// Tracks one running task in [`TASKS_RUNNING`] for its lifetime.
pub struct TaskGauge(());

impl TaskGauge {
    /// Increment the gauge; decremented on drop.
    pub fn start() -> Self {
        TASKS_RUNNING.inc();
        Self(())
    }
}

impl Drop for TaskGauge {
    fn drop(&mut self) {
        TASKS_RUNNING.dec();
    }
}
