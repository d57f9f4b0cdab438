//! # Ledger Policy
//!
//! Per-ledger constants. One generic ledger implementation is instantiated
//! twice with different policies instead of keeping two drifting copies.
//!
//! | Ledger | Min timelock | Max timelock | Claim rule |
//! |--------|--------------|--------------|------------|
//! | Source (Ethereum) | 12 h | 30 d | taker only |
//! | Destination (Polkadot) | 30 min | 6 h | anyone, explicit target |
//!
//! Both use a 7-day rescue delay.

use super::errors::{EscrowError, EscrowResult};
use super::invariants::invariant_timelock_ordering;
use super::value_objects::{ClaimRule, LedgerRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One hour in seconds.
pub const HOUR: u64 = 3600;

/// One day in seconds.
pub const DAY: u64 = 24 * HOUR;

/// Delay after `unlock_time` before the owner may sweep a swap.
pub const DEFAULT_RESCUE_DELAY: u64 = 7 * DAY;

/// Shortest lock accepted on the source ledger.
pub const SOURCE_MIN_TIMELOCK: u64 = 12 * HOUR;

/// Longest lock accepted on the source ledger.
pub const SOURCE_MAX_TIMELOCK: u64 = 30 * DAY;

/// Shortest lock accepted on the destination ledger.
pub const DESTINATION_MIN_TIMELOCK: u64 = 30 * 60;

/// Longest lock accepted on the destination ledger.
pub const DESTINATION_MAX_TIMELOCK: u64 = 6 * HOUR;

/// Ledger configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// A required address was left as the zero address.
    #[error("{field} must not be the zero address")]
    ZeroAddress {
        /// Offending field.
        field: &'static str,
    },

    /// `min_timelock` exceeds `max_timelock`, or is zero.
    #[error("Invalid timelock bounds: min {min}s, max {max}s")]
    InvalidBounds {
        /// Minimum.
        min: u64,
        /// Maximum.
        max: u64,
    },

    /// Rescue delay of zero would let the owner sweep at unlock.
    #[error("Rescue delay must be non-zero")]
    ZeroRescueDelay,

    /// Source minimum does not outlast the destination maximum.
    #[error("Timelock ordering violated: source min {source_min}s <= destination max {destination_max}s")]
    TimelockOrdering {
        /// Source ledger minimum.
        source_min: u64,
        /// Destination ledger maximum.
        destination_max: u64,
    },

    /// A policy was paired in the wrong role.
    #[error("Expected {expected:?} policy, found {found:?}")]
    RoleMismatch {
        /// Role required.
        expected: LedgerRole,
        /// Role supplied.
        found: LedgerRole,
    },
}

/// Per-ledger constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Leg hosted by this ledger.
    pub role: LedgerRole,
    /// Shortest accepted timelock (seconds).
    pub min_timelock: u64,
    /// Longest accepted timelock (seconds).
    pub max_timelock: u64,
    /// Delay after unlock before the owner may rescue (seconds).
    pub rescue_delay: u64,
    /// Completion rule.
    pub claim_rule: ClaimRule,
    /// Longest timelock the sibling ledger accepts, when known.
    pub counterpart_max_timelock: Option<u64>,
}

impl LedgerPolicy {
    /// Source-leg defaults for an EVM chain.
    pub fn ethereum_source() -> Self {
        Self {
            role: LedgerRole::Source,
            min_timelock: SOURCE_MIN_TIMELOCK,
            max_timelock: SOURCE_MAX_TIMELOCK,
            rescue_delay: DEFAULT_RESCUE_DELAY,
            claim_rule: ClaimRule::TakerOnly,
            counterpart_max_timelock: Some(DESTINATION_MAX_TIMELOCK),
        }
    }

    /// Destination-leg defaults for a Polkadot chain.
    pub fn polkadot_destination() -> Self {
        Self {
            role: LedgerRole::Destination,
            min_timelock: DESTINATION_MIN_TIMELOCK,
            max_timelock: DESTINATION_MAX_TIMELOCK,
            rescue_delay: DEFAULT_RESCUE_DELAY,
            claim_rule: ClaimRule::OpenWithTarget,
            counterpart_max_timelock: None,
        }
    }

    /// Start a custom policy for `role`.
    pub fn builder(role: LedgerRole) -> LedgerPolicyBuilder {
        LedgerPolicyBuilder::new(role)
    }

    /// Reject timelocks outside `[min_timelock, max_timelock]`.
    pub fn check_timelock(&self, timelock: u64) -> EscrowResult<()> {
        if timelock < self.min_timelock {
            return Err(EscrowError::TimelockTooShort {
                timelock,
                min: self.min_timelock,
            });
        }
        if timelock > self.max_timelock {
            return Err(EscrowError::TimelockTooLong {
                timelock,
                max: self.max_timelock,
            });
        }
        Ok(())
    }
}

/// Checks that a source and a destination policy can be deployed together.
pub fn check_pairing(source: &LedgerPolicy, destination: &LedgerPolicy) -> Result<(), PolicyError> {
    if source.role != LedgerRole::Source {
        return Err(PolicyError::RoleMismatch {
            expected: LedgerRole::Source,
            found: source.role,
        });
    }
    if destination.role != LedgerRole::Destination {
        return Err(PolicyError::RoleMismatch {
            expected: LedgerRole::Destination,
            found: destination.role,
        });
    }
    if !invariant_timelock_ordering(source.min_timelock, destination.max_timelock) {
        return Err(PolicyError::TimelockOrdering {
            source_min: source.min_timelock,
            destination_max: destination.max_timelock,
        });
    }
    Ok(())
}

/// Builder for [`LedgerPolicy`], starting from the role's defaults.
#[derive(Clone, Debug)]
pub struct LedgerPolicyBuilder {
    policy: LedgerPolicy,
}

impl LedgerPolicyBuilder {
    /// Start from the defaults of `role`.
    pub fn new(role: LedgerRole) -> Self {
        let policy = match role {
            LedgerRole::Source => LedgerPolicy::ethereum_source(),
            LedgerRole::Destination => LedgerPolicy::polkadot_destination(),
        };
        Self { policy }
    }

    /// Set the shortest accepted timelock.
    pub fn min_timelock(mut self, secs: u64) -> Self {
        self.policy.min_timelock = secs;
        self
    }

    /// Set the longest accepted timelock.
    pub fn max_timelock(mut self, secs: u64) -> Self {
        self.policy.max_timelock = secs;
        self
    }

    /// Set the rescue delay.
    pub fn rescue_delay(mut self, secs: u64) -> Self {
        self.policy.rescue_delay = secs;
        self
    }

    /// Override the claim rule.
    pub fn claim_rule(mut self, rule: ClaimRule) -> Self {
        self.policy.claim_rule = rule;
        self
    }

    /// Declare the sibling ledger's longest timelock.
    pub fn counterpart_max_timelock(mut self, secs: Option<u64>) -> Self {
        self.policy.counterpart_max_timelock = secs;
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<LedgerPolicy, PolicyError> {
        let p = self.policy;
        if p.min_timelock == 0 || p.min_timelock > p.max_timelock {
            return Err(PolicyError::InvalidBounds {
                min: p.min_timelock,
                max: p.max_timelock,
            });
        }
        if p.rescue_delay == 0 {
            return Err(PolicyError::ZeroRescueDelay);
        }
        if let (LedgerRole::Source, Some(counterpart_max)) = (p.role, p.counterpart_max_timelock) {
            if !invariant_timelock_ordering(p.min_timelock, counterpart_max) {
                return Err(PolicyError::TimelockOrdering {
                    source_min: p.min_timelock,
                    destination_max: counterpart_max,
                });
            }
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies_pair() {
        let source = LedgerPolicy::ethereum_source();
        let destination = LedgerPolicy::polkadot_destination();
        assert!(check_pairing(&source, &destination).is_ok());
        assert!(source.min_timelock > destination.max_timelock);
    }

    #[test]
    fn test_pairing_rejects_overlap() {
        let source = LedgerPolicy::builder(LedgerRole::Source)
            .min_timelock(4 * HOUR)
            .counterpart_max_timelock(None)
            .build()
            .unwrap();
        let destination = LedgerPolicy::polkadot_destination();
        assert!(matches!(
            check_pairing(&source, &destination),
            Err(PolicyError::TimelockOrdering { .. })
        ));
    }

    #[test]
    fn test_pairing_rejects_swapped_roles() {
        let source = LedgerPolicy::ethereum_source();
        assert!(matches!(
            check_pairing(&source, &source),
            Err(PolicyError::RoleMismatch { .. })
        ));
    }

    #[test]
    fn test_builder_enforces_declared_counterpart() {
        let result = LedgerPolicy::builder(LedgerRole::Source)
            .min_timelock(6 * HOUR)
            .build();
        assert_eq!(
            result,
            Err(PolicyError::TimelockOrdering {
                source_min: 6 * HOUR,
                destination_max: DESTINATION_MAX_TIMELOCK,
            })
        );
    }

    #[test]
    fn test_builder_rejects_inverted_bounds() {
        let result = LedgerPolicy::builder(LedgerRole::Destination)
            .min_timelock(2 * HOUR)
            .max_timelock(HOUR)
            .build();
        assert!(matches!(result, Err(PolicyError::InvalidBounds { .. })));
    }

    #[test]
    fn test_builder_rejects_zero_rescue_delay() {
        let result = LedgerPolicy::builder(LedgerRole::Destination)
            .rescue_delay(0)
            .build();
        assert_eq!(result, Err(PolicyError::ZeroRescueDelay));
    }

    #[test]
    fn test_check_timelock_bounds() {
        let p = LedgerPolicy::polkadot_destination();
        assert!(p.check_timelock(DESTINATION_MIN_TIMELOCK).is_ok());
        assert!(p.check_timelock(DESTINATION_MAX_TIMELOCK).is_ok());
        assert!(matches!(
            p.check_timelock(DESTINATION_MIN_TIMELOCK - 1),
            Err(EscrowError::TimelockTooShort { .. })
        ));
        assert!(matches!(
            p.check_timelock(DESTINATION_MAX_TIMELOCK + 1),
            Err(EscrowError::TimelockTooLong { .. })
        ));
    }
}
