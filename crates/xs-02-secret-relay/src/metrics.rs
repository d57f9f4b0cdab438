//! # Relay Metrics
//!
//! Enabled with the `metrics` feature.
//!
//! - `relay_messages_sent_total{chain}`
//! - `relay_send_failures_total{chain,reason}`
//! - `relay_call_failures_total{chain,op,reason}` (bridge, fee and ack calls)
//! - `relay_deliveries_confirmed_total{chain,outcome}`
//! - `relay_receiver_rejections_total{chain,reason}`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Secrets dispatched to the sibling chain.
    pub static ref MESSAGES_SENT: IntCounterVec = register_int_counter_vec!(
        "relay_messages_sent_total",
        "Total number of secrets relayed",
        &["chain"]
    )
    .expect("Failed to create MESSAGES_SENT metric");

    /// Rejected or rolled-back sends.
    pub static ref SEND_FAILURES: IntCounterVec = register_int_counter_vec!(
        "relay_send_failures_total",
        "Total number of failed relay sends",
        &["chain", "reason"]
    )
    .expect("Failed to create SEND_FAILURES metric");

    /// Rejected calls other than `send`.
    pub static ref CALL_FAILURES: IntCounterVec = register_int_counter_vec!(
        "relay_call_failures_total",
        "Total number of rejected relay calls other than send",
        &["chain", "op", "reason"]
    )
    .expect("Failed to create CALL_FAILURES metric");

    /// Acknowledgements accepted.
    pub static ref DELIVERIES_CONFIRMED: IntCounterVec = register_int_counter_vec!(
        "relay_deliveries_confirmed_total",
        "Total number of delivery acknowledgements accepted",
        &["chain", "outcome"]
    )
    .expect("Failed to create DELIVERIES_CONFIRMED metric");

    /// Envelopes refused by a receiver.
    pub static ref RECEIVER_REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "relay_receiver_rejections_total",
        "Total number of relayed calls refused by a receiver",
        &["chain", "reason"]
    )
    .expect("Failed to create RECEIVER_REJECTIONS metric");
}

/// Record a relayed secret
#[cfg(feature = "metrics")]
pub fn record_message_sent(chain: &str) {
    MESSAGES_SENT.with_label_values(&[chain]).inc();
}

/// Record a failed send
#[cfg(feature = "metrics")]
pub fn record_send_failure(chain: &str, reason: &str) {
    SEND_FAILURES.with_label_values(&[chain, reason]).inc();
}

/// Record a rejected bridge, fee or acknowledgement call
#[cfg(feature = "metrics")]
pub fn record_call_failure(chain: &str, op: &str, reason: &str) {
    CALL_FAILURES.with_label_values(&[chain, op, reason]).inc();
}

/// Record an accepted acknowledgement
#[cfg(feature = "metrics")]
pub fn record_delivery_confirmed(chain: &str, outcome: &str) {
    DELIVERIES_CONFIRMED.with_label_values(&[chain, outcome]).inc();
}

/// Record a receiver rejection
#[cfg(feature = "metrics")]
pub fn record_receiver_rejection(chain: &str, reason: &str) {
    RECEIVER_REJECTIONS.with_label_values(&[chain, reason]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a relayed secret (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_message_sent(_chain: &str) {}

/// Record a failed send (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_send_failure(_chain: &str, _reason: &str) {}

/// Record a rejected bridge, fee or acknowledgement call (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_call_failure(_chain: &str, _op: &str, _reason: &str) {}

/// Record an accepted acknowledgement (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_delivery_confirmed(_chain: &str, _outcome: &str) {}

/// Record a receiver rejection (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_receiver_rejection(_chain: &str, _reason: &str) {}
