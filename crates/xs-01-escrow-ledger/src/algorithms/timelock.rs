//! # Timelock Arithmetic
//!
//! Expiry is a plain comparison against the ledger clock; nothing is
//! scheduled.

use crate::domain::{EscrowError, EscrowResult, Swap, SwapState};
use shared_types::Timestamp;

/// `now + timelock`, rejecting overflow as an over-long timelock.
pub fn unlock_time(now: Timestamp, timelock: u64) -> EscrowResult<Timestamp> {
    now.checked_add(timelock)
        .ok_or(EscrowError::TimelockTooLong {
            timelock,
            max: u64::MAX - now,
        })
}

/// First instant the owner may rescue `swap`.
pub fn rescue_available_at(swap: &Swap, rescue_delay: u64) -> Timestamp {
    swap.unlock_time.saturating_add(rescue_delay)
}

/// Can the maker cancel at `now`?
pub fn can_cancel(swap: &Swap, now: Timestamp) -> bool {
    swap.state == SwapState::Open && now >= swap.unlock_time
}

/// Err unless `now` has reached `available_at`.
pub fn require_elapsed(now: Timestamp, available_at: Timestamp) -> EscrowResult<()> {
    if now < available_at {
        return Err(EscrowError::TimelockNotExpired { now, available_at });
    }
    Ok(())
}
