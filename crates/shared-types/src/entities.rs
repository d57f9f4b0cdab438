//! # Core Identifiers
//!
//! Primitive types shared by both escrow ledgers and the secret relay.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `ChainId`, `RemoteOrigin`
//! - **Locks**: `Hash`, `Secret`
//! - **Value**: `Amount`, `CounterTerms`, `Timestamp`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte account or contract address.
pub type Address = [u8; 20];

/// The all-zero address, never a valid participant.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Identifier of a ledger taking part in a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainId {
    /// EVM-style source chain.
    Ethereum,
    /// Polkadot relay chain or Asset Hub style destination.
    Polkadot,
    /// A parachain addressed by its para id.
    Parachain(u32),
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Ethereum => f.write_str("ethereum"),
            ChainId::Polkadot => f.write_str("polkadot"),
            ChainId::Parachain(id) => write!(f, "parachain-{id}"),
        }
    }
}

/// The authenticated source of a cross-chain call: which chain, and which
/// account on that chain, issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteOrigin {
    /// Chain the call originated on.
    pub chain: ChainId,
    /// Account (usually a relay contract) that issued the call.
    pub account: Address,
}

impl RemoteOrigin {
    /// Create a new origin.
    #[must_use]
    pub fn new(chain: ChainId, account: Address) -> Self {
        Self { chain, account }
    }
}

impl fmt::Display for RemoteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{}", self.chain, hex::encode(self.account))
    }
}

// =============================================================================
// CLUSTER B: LOCKS
// =============================================================================

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// The all-zero hash. Rejected as a hashlock.
pub const ZERO_HASH: Hash = [0u8; 32];

/// A 32-byte HTLC preimage.
pub type Secret = [u8; 32];

// =============================================================================
// CLUSTER C: VALUE
// =============================================================================

/// Native value in the ledger's smallest unit.
pub type Amount = u128;

/// Seconds since the Unix epoch, as reported by a ledger clock.
pub type Timestamp = u64;

/// Counter-leg terms recorded on source-chain swaps. Informational only;
/// the ledger never enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTerms {
    /// Amount expected on the sibling chain.
    pub counter_amount: Amount,
    /// Quoted exchange rate, scaled by the quoting party.
    pub exchange_rate: Amount,
}

/// Short hex rendering for log fields.
#[must_use]
pub fn short_hex(bytes: &[u8]) -> String {
    let head = &bytes[..bytes.len().min(4)];
    format!("0x{}..", hex::encode(head))
}
