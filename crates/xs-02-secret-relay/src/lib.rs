//! # XS-02 Secret Relay
//!
//! Propagates a swap secret revealed on one chain to the sibling chain.
//!
//! **Subsystem ID:** 02  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! destination chain                          source chain
//! ┌──────────────┐  SwapCompleted  ┌──────────────┐
//! │ EscrowLedger │ ──────────────→ │ RelayWatcher │
//! └──────────────┘                 └──────┬───────┘
//!                                         │ send()
//!                                  ┌──────▼───────┐  RelayCall   ┌───────────────┐
//!                                  │ SecretRelay  │ ───────────→ │ RelayReceiver │
//!                                  │              │ ←─────────── │  → escrow     │
//!                                  └──────────────┘  DeliveryAck └───────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - At most one forwarded call per secret.
//! - Only secrets the paired escrow actually revealed are forwarded.
//! - Every call and acknowledgement is an HMAC-signed
//!   `AuthenticatedMessage`; receivers reject replays and forgeries.
//! - Delivery is best-effort. Neither leg's safety depends on the relay:
//!   the secret is public once revealed, and anyone can complete the
//!   sibling leg directly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod receiver;
pub mod service;
pub mod watcher;

// Re-exports
pub use adapters::ChannelTransport;
pub use domain::{
    BridgeConfig, DeliveryAck, DeliveryOutcome, FeeSchedule, Message, RelayCall, RelayError,
    RelayResult, TransportError, DEFAULT_FEE, DEFAULT_MIN_FEE, NATIVE_UNIT,
};
pub use ports::{CrossChainTransport, LocalEscrowView, SecretRelayApi};
pub use receiver::RelayReceiver;
pub use service::{SecretRelay, SecretRelayBuilder};
pub use watcher::RelayWatcher;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
