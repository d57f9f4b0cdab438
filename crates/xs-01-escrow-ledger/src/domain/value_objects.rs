//! # Domain Value Objects
//!
//! Immutable value types for the escrow ledger.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Amount};
use std::fmt;

/// Lifecycle of a swap record.
///
/// `Invalid` is the implicit state of every id that was never created.
/// The only transitions are `Invalid -> Open` and `Open -> {Completed,
/// Cancelled}`; nothing leaves a terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapState {
    /// Unused swap id.
    #[default]
    Invalid,
    /// Value locked, awaiting claim or expiry.
    Open,
    /// Claimed with the correct secret.
    Completed,
    /// Refunded to the maker or swept by the owner.
    Cancelled,
}

impl SwapState {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: SwapState) -> bool {
        matches!(
            (self, next),
            (Self::Invalid, Self::Open)
                | (Self::Open, Self::Completed)
                | (Self::Open, Self::Cancelled)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Lowercase name, used for log fields and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SwapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which leg of a swap a ledger hosts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerRole {
    /// Long-timelock leg, created first by the maker.
    Source,
    /// Short-timelock leg, mirrored by the resolver.
    Destination,
}

/// Who may complete a swap, and where the value goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimRule {
    /// Only the taker may complete. An explicit target redirects payment.
    TakerOnly,
    /// Anyone holding the secret may complete. Without an explicit target
    /// the taker is paid.
    OpenWithTarget,
}

/// How a completion reached the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionPath {
    /// A local caller presented the secret.
    Direct,
    /// The sibling chain's relay forwarded the secret.
    Relayed,
}

impl CompletionPath {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Relayed => "relayed",
        }
    }
}

/// Caller identity and attached native value for a ledger call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Account issuing the call.
    pub sender: Address,
    /// Native value attached to the call.
    pub value: Amount,
}

impl CallContext {
    /// A call without attached value.
    pub fn call(sender: Address) -> Self {
        Self { sender, value: 0 }
    }

    /// A call carrying `value`.
    pub fn payable(sender: Address, value: Amount) -> Self {
        Self { sender, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_state_transitions() {
        assert!(SwapState::Invalid.can_transition_to(SwapState::Open));
        assert!(SwapState::Open.can_transition_to(SwapState::Completed));
        assert!(SwapState::Open.can_transition_to(SwapState::Cancelled));
    }

    #[test]
    fn test_terminal_states_never_move() {
        for from in [SwapState::Completed, SwapState::Cancelled] {
            assert!(from.is_terminal());
            for to in [
                SwapState::Invalid,
                SwapState::Open,
                SwapState::Completed,
                SwapState::Cancelled,
            ] {
                assert!(!from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn test_invalid_cannot_skip_open() {
        assert!(!SwapState::Invalid.can_transition_to(SwapState::Completed));
        assert!(!SwapState::Open.can_transition_to(SwapState::Invalid));
    }

    #[test]
    fn test_default_state_is_invalid() {
        assert_eq!(SwapState::default(), SwapState::Invalid);
        assert_eq!(SwapState::Open.to_string(), "open");
    }

    #[test]
    fn test_call_context() {
        let ctx = CallContext::call([1u8; 20]);
        assert_eq!(ctx.value, 0);
        assert_eq!(CallContext::payable([1u8; 20], 9).value, 9);
    }
}
