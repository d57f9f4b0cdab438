//! # Cross-Swap Test Suite
//!
//! Scenarios that span more than one crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Deployed two-chain network on manual clocks
//!     ├── atomic_swap_flow.rs  # Both legs, refunds, rescue, re-entrancy
//!     ├── relay_flow.rs        # Relay, receiver and acknowledgements
//!     └── adversarial.rs       # Replayed, tampered and forged envelopes
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p xs-tests
//! cargo test -p xs-tests integration::adversarial::
//! ```

#![allow(dead_code)]

pub mod integration;
