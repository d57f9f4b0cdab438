//! # Domain Entities
//!
//! Relay records and the payloads carried inside `AuthenticatedMessage`.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, ChainId, Hash, Secret, Timestamp};
use std::fmt;
use uuid::Uuid;

/// One native unit (18 decimals).
pub const NATIVE_UNIT: Amount = 1_000_000_000_000_000_000;

/// Fee floor: 0.01 native units.
pub const DEFAULT_MIN_FEE: Amount = NATIVE_UNIT / 100;

/// Fee charged per relayed secret until the owner changes it.
pub const DEFAULT_FEE: Amount = DEFAULT_MIN_FEE;

/// A relayed secret, keyed by swap id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Swap the secret unlocks.
    pub swap_id: Hash,
    /// Revealed preimage.
    pub secret: Secret,
    /// Set once the sibling ledger acknowledged consumption.
    pub processed: bool,
    /// Relay ledger time at send.
    pub timestamp: Timestamp,
    /// Correlation id of the dispatched envelope; acks must echo it.
    pub correlation_id: Uuid,
}

/// One-time wiring of a relay to its escrow and the sibling chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Escrow on this chain whose completions are relayed.
    pub local_escrow: Address,
    /// Escrow on the sibling chain that receives relayed calls.
    pub sibling_escrow: Address,
    /// Chain hosting `sibling_escrow`.
    pub sibling_chain: ChainId,
}

/// Fee parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Lowest fee the owner may set.
    pub min_fee: Amount,
    /// Fee required per `send`.
    pub fee: Amount,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            min_fee: DEFAULT_MIN_FEE,
            fee: DEFAULT_FEE,
        }
    }
}

/// Cross-chain call equivalent to `complete_swap` on the sibling ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCall {
    /// Swap to complete.
    pub swap_id: Hash,
    /// Revealed secret.
    pub secret: Secret,
    /// Escrow expected to execute the call.
    pub target_escrow: Address,
}

/// What the sibling ledger did with a relayed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// The swap was completed by this call.
    Completed,
    /// The swap had already left `Open` (claimed directly, cancelled or
    /// rescued).
    AlreadySettled,
    /// The ledger rejected the call.
    Failed(String),
}

impl DeliveryOutcome {
    /// Whether the secret has been consumed on the sibling ledger.
    pub fn is_consumed(&self) -> bool {
        matches!(self, Self::Completed | Self::AlreadySettled)
    }
}

impl fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::AlreadySettled => f.write_str("already settled"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Receipt returned by the sibling receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAck {
    /// Swap the relayed call targeted.
    pub swap_id: Hash,
    /// Result on the sibling ledger.
    pub outcome: DeliveryOutcome,
}
