//! # Cross-Chain Handlers
//!
//! Background loops moving envelopes between the two chains.
//!
//! ```text
//! Relay ──RelayCall──→ [RelayCallHandler] ──→ source escrow
//!   ↑                          │
//!   └──[AckHandler]←──DeliveryAck
//! ```

mod acks;
mod relay_calls;

pub use acks::AckHandler;
pub use relay_calls::RelayCallHandler;
