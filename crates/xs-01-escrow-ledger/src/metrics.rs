//! # Escrow Metrics
//!
//! Prometheus counters for ledger activity.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! xs-01-escrow-ledger = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `escrow_swaps_created_total{chain}`
//! - `escrow_swaps_completed_total{chain,path}` - path is `direct` or `relayed`
//! - `escrow_swaps_cancelled_total{chain}`
//! - `escrow_funds_rescued_total{chain}`
//! - `escrow_rejections_total{chain,category}`

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Swaps opened, by chain.
    pub static ref SWAPS_CREATED: IntCounterVec = register_int_counter_vec!(
        "escrow_swaps_created_total",
        "Total number of swaps opened",
        &["chain"]
    )
    .expect("Failed to create SWAPS_CREATED metric");

    /// Swaps completed, by chain and completion path.
    pub static ref SWAPS_COMPLETED: IntCounterVec = register_int_counter_vec!(
        "escrow_swaps_completed_total",
        "Total number of swaps completed",
        &["chain", "path"]
    )
    .expect("Failed to create SWAPS_COMPLETED metric");

    /// Swaps refunded to the maker, by chain.
    pub static ref SWAPS_CANCELLED: IntCounterVec = register_int_counter_vec!(
        "escrow_swaps_cancelled_total",
        "Total number of swaps cancelled by the maker",
        &["chain"]
    )
    .expect("Failed to create SWAPS_CANCELLED metric");

    /// Swaps swept by the owner, by chain.
    pub static ref FUNDS_RESCUED: IntCounterVec = register_int_counter_vec!(
        "escrow_funds_rescued_total",
        "Total number of swaps rescued by the ledger owner",
        &["chain"]
    )
    .expect("Failed to create FUNDS_RESCUED metric");

    /// Rejected calls, by chain and error category.
    pub static ref REJECTIONS: IntCounterVec = register_int_counter_vec!(
        "escrow_rejections_total",
        "Total number of rejected ledger calls",
        &["chain", "category"]
    )
    .expect("Failed to create REJECTIONS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a swap opened
#[cfg(feature = "metrics")]
pub fn record_swap_created(chain: &str) {
    SWAPS_CREATED.with_label_values(&[chain]).inc();
}

/// Record a swap completed
#[cfg(feature = "metrics")]
pub fn record_swap_completed(chain: &str, path: &str) {
    SWAPS_COMPLETED.with_label_values(&[chain, path]).inc();
}

/// Record a maker refund
#[cfg(feature = "metrics")]
pub fn record_swap_cancelled(chain: &str) {
    SWAPS_CANCELLED.with_label_values(&[chain]).inc();
}

/// Record an owner rescue
#[cfg(feature = "metrics")]
pub fn record_funds_rescued(chain: &str) {
    FUNDS_RESCUED.with_label_values(&[chain]).inc();
}

/// Record a rejected call
#[cfg(feature = "metrics")]
pub fn record_rejection(chain: &str, category: &str) {
    REJECTIONS.with_label_values(&[chain, category]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

/// Record a new swap (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_swap_created(_chain: &str) {}

/// Record a completed swap (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_swap_completed(_chain: &str, _path: &str) {}

/// Record a refunded swap (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_swap_cancelled(_chain: &str) {}

/// Record an owner rescue (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_funds_rescued(_chain: &str) {}

/// Record a rejected call (no-op)
#[cfg(not(feature = "metrics"))]
pub fn record_rejection(_chain: &str, _category: &str) {}
