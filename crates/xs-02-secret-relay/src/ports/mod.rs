//! # Ports Layer
//!
//! - `inbound`: the relay API
//! - `outbound`: transport and escrow access

pub mod inbound;
pub mod outbound;

pub use inbound::SecretRelayApi;
pub use outbound::{CrossChainTransport, LocalEscrowView};
