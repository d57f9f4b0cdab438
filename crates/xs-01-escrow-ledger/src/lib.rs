//! # XS-01 Escrow Ledger
//!
//! Hash-time-locked custody of native value on one chain.
//!
//! **Subsystem ID:** 01  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Lock value against `keccak256(secret)` and a timelock, then release it
//! exactly once:
//! - to the claimant who presents the secret, or
//! - back to the maker after `unlock_time`, or
//! - to the ledger owner after `unlock_time + rescue_delay`.
//!
//! The same implementation serves both legs of a swap; a [`LedgerPolicy`]
//! carries the per-chain timelock bounds and claim rule.
//!
//! ## Safety Properties
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | One exit per swap | every exit requires `Open` and flips state before paying |
//! | Re-entrancy | per-ledger re-entrant transaction guard, state-before-transfer |
//! | Cross-leg ordering | source min timelock > destination max timelock, checked at configuration |
//! | Shared hashlock | Keccak-256 on both ledgers |
//!
//! ## Module Structure
//!
//! ```text
//! xs-01-escrow-ledger/
//! ├── domain/          # Swap, SwapState, LedgerPolicy, EventLog, errors
//! ├── algorithms/      # hashlocks, timelock arithmetic
//! ├── ports/           # EscrowApi, NativeBank, LedgerClock, EventSink
//! ├── adapters/        # InMemoryBank, clocks, bus sink
//! └── service.rs       # EscrowLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{InMemoryBank, ManualClock, SystemClock};
pub use algorithms::{create_hash_lock, generate_random_secret, verify_secret};
pub use domain::{
    check_pairing, AmountIssue, CallContext, ClaimRule, CreateSwapRequest, ErrorCategory,
    EscrowError, EscrowResult, LedgerPolicy, LedgerPolicyBuilder, LedgerRole, LogEntry,
    NativeSwapRequest, PolicyError, SecureSecret, Swap, SwapState, DAY, DEFAULT_RESCUE_DELAY,
    DESTINATION_MAX_TIMELOCK, DESTINATION_MIN_TIMELOCK, HOUR, SOURCE_MAX_TIMELOCK,
    SOURCE_MIN_TIMELOCK,
};
pub use ports::{EscrowApi, EventSink, LedgerClock, NativeBank};
pub use service::{EscrowLedger, EscrowLedgerBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    #[allow(clippy::const_is_empty)]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
