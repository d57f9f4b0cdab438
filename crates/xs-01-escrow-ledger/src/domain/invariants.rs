//! # Domain Invariants
//!
//! Business rules every ledger enforces, kept as pure functions so the
//! service and the policy builder share one definition.

use super::errors::{AmountIssue, EscrowError};
use shared_types::{keccak256, Amount, CounterTerms, Hash, Secret, ZERO_HASH};

/// Invariant: timelock ordering across the two legs.
///
/// The shortest lock the source ledger accepts must outlast the longest
/// lock the destination ledger accepts, so the maker can always learn the
/// secret on the destination before the source leg can be refunded.
pub fn invariant_timelock_ordering(source_min_timelock: u64, destination_max_timelock: u64) -> bool {
    source_min_timelock > destination_max_timelock
}

/// Invariant: a hashlock is never the zero hash.
pub fn invariant_nonzero_hashlock(secret_hash: &Hash) -> bool {
    *secret_hash != ZERO_HASH
}

/// Invariant: keccak256(secret) equals the hashlock.
pub fn invariant_secret_matches(secret: &Secret, hashlock: &Hash) -> bool {
    keccak256(secret) == *hashlock
}

/// Invariant: a non-zero amount equal to the attached value.
pub fn invariant_amount_matches(declared: Amount, attached: Amount) -> Result<(), EscrowError> {
    if declared == 0 {
        return Err(EscrowError::InvalidAmount(AmountIssue::Zero));
    }
    if declared != attached {
        return Err(EscrowError::InvalidAmount(AmountIssue::ValueMismatch {
            declared,
            attached,
        }));
    }
    Ok(())
}

/// Invariant: recorded counter terms name a non-zero counter amount.
pub fn invariant_counter_terms(terms: &CounterTerms) -> Result<(), EscrowError> {
    if terms.counter_amount == 0 {
        return Err(EscrowError::InvalidAmount(AmountIssue::ZeroCounterAmount));
    }
    Ok(())
}
