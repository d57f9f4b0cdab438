//! # Domain Entities
//!
//! The swap record and the requests that create one.

use super::value_objects::SwapState;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount, CounterTerms, Hash, Secret, Timestamp, ZERO_HASH};

/// One leg of a cross-chain swap as recorded on a single ledger.
///
/// Records are never deleted; terminal swaps stay queryable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    /// Caller-chosen id, shared with the sibling leg.
    pub swap_id: Hash,
    /// Keccak-256 of the secret. Never zero.
    pub secret_hash: Hash,
    /// Account that locked the value.
    pub maker: Address,
    /// Account entitled to claim.
    pub taker: Address,
    /// Locked native value. Never zero.
    pub amount: Amount,
    /// Counter-leg terms recorded at creation, if any.
    pub terms: Option<CounterTerms>,
    /// Ledger time at creation.
    pub created_at: Timestamp,
    /// Earliest time the maker may cancel.
    pub unlock_time: Timestamp,
    /// Current lifecycle state.
    pub state: SwapState,
    /// Opaque reference to the counterpart on the sibling chain.
    pub correlation_ref: Hash,
    /// Secret presented on completion.
    pub revealed_secret: Option<Secret>,
    /// True when the owner swept the swap with `rescue_funds`.
    pub rescued: bool,
}

impl Swap {
    /// Is the swap still claimable or refundable?
    pub fn is_open(&self) -> bool {
        self.state == SwapState::Open
    }

    /// Has the maker's refund window opened at `now`?
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.unlock_time
    }
}

/// Request for a swap with recorded counter-leg terms (maker-facing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateSwapRequest {
    /// Swap id.
    pub swap_id: Hash,
    /// Hashlock.
    pub secret_hash: Hash,
    /// Claimant.
    pub taker: Address,
    /// Declared amount; must equal the attached value.
    pub amount: Amount,
    /// Counter-leg terms.
    pub terms: CounterTerms,
    /// Lock duration in seconds.
    pub timelock: u64,
    /// Counterpart reference.
    pub correlation_ref: Hash,
}

impl CreateSwapRequest {
    /// Build a request with no counterpart reference.
    pub fn new(
        swap_id: Hash,
        secret_hash: Hash,
        taker: Address,
        amount: Amount,
        terms: CounterTerms,
        timelock: u64,
    ) -> Self {
        Self {
            swap_id,
            secret_hash,
            taker,
            amount,
            terms,
            timelock,
            correlation_ref: ZERO_HASH,
        }
    }

    /// Attach a counterpart reference.
    #[must_use]
    pub fn with_correlation_ref(mut self, correlation_ref: Hash) -> Self {
        self.correlation_ref = correlation_ref;
        self
    }
}

/// Request for a swap whose amount is the attached value (resolver-facing).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeSwapRequest {
    /// Swap id, normally mirrored from the sibling leg.
    pub swap_id: Hash,
    /// Hashlock, identical to the sibling leg.
    pub secret_hash: Hash,
    /// Claimant.
    pub taker: Address,
    /// Lock duration in seconds.
    pub timelock: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swap(state: SwapState) -> Swap {
        Swap {
            swap_id: [1; 32],
            secret_hash: [2; 32],
            maker: [3; 20],
            taker: [4; 20],
            amount: 100,
            terms: None,
            created_at: 1_000,
            unlock_time: 2_000,
            state,
            correlation_ref: ZERO_HASH,
            revealed_secret: None,
            rescued: false,
        }
    }

    #[test]
    fn test_is_open() {
        assert!(swap(SwapState::Open).is_open());
        assert!(!swap(SwapState::Completed).is_open());
    }

    #[test]
    fn test_is_expired_at_unlock_time() {
        let s = swap(SwapState::Open);
        assert!(!s.is_expired(1_999));
        assert!(s.is_expired(2_000));
    }

    #[test]
    fn test_create_request_correlation() {
        let terms = CounterTerms {
            counter_amount: 5,
            exchange_rate: 2,
        };
        let req = CreateSwapRequest::new([1; 32], [2; 32], [3; 20], 10, terms, 3600);
        assert_eq!(req.correlation_ref, ZERO_HASH);
        let req = req.with_correlation_ref([9; 32]);
        assert_eq!(req.correlation_ref, [9; 32]);
    }
}
