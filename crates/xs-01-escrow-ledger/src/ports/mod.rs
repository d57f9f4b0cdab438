//! # Ports
//!
//! Inbound API and outbound dependencies of the escrow ledger.

pub mod inbound;
pub mod outbound;

pub use inbound::EscrowApi;
pub use outbound::{EventSink, LedgerClock, NativeBank};
