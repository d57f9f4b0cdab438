//! # Domain Errors
//!
//! Every failure a ledger operation can return. A failed operation never
//! leaves partial state behind.

use super::value_objects::SwapState;
use shared_types::{Address, Amount, Hash, RemoteOrigin, Timestamp, TransferError};
use thiserror::Error;

/// Result alias for ledger operations.
pub type EscrowResult<T> = Result<T, EscrowError>;

/// Why an amount was rejected.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AmountIssue {
    /// Declared amount is zero.
    #[error("amount is zero")]
    Zero,

    /// Attached value differs from the declared amount.
    #[error("declared {declared}, attached {attached}")]
    ValueMismatch {
        /// Amount in the request.
        declared: Amount,
        /// Value attached to the call.
        attached: Amount,
    },

    /// Counter-leg amount is zero.
    #[error("counter amount is zero")]
    ZeroCounterAmount,
}

/// Escrow ledger error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EscrowError {
    /// The swap id was already used on this ledger.
    #[error("Swap already exists: 0x{}", hex::encode(.0))]
    SwapAlreadyExists(Hash),

    /// The hashlock is the zero hash.
    #[error("Invalid secret hash")]
    InvalidSecretHash,

    /// Amount validation failed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(AmountIssue),

    /// Timelock below the ledger minimum.
    #[error("Timelock too short: {timelock}s < {min}s")]
    TimelockTooShort {
        /// Requested timelock.
        timelock: u64,
        /// Ledger minimum.
        min: u64,
    },

    /// Timelock above the ledger maximum.
    #[error("Timelock too long: {timelock}s > {max}s")]
    TimelockTooLong {
        /// Requested timelock.
        timelock: u64,
        /// Ledger maximum.
        max: u64,
    },

    /// No swap with this id.
    #[error("Swap does not exist: 0x{}", hex::encode(.0))]
    SwapDoesNotExist(Hash),

    /// The swap already left the Open state.
    #[error("Swap not open (state: {state})")]
    SwapNotOpen {
        /// Current state.
        state: SwapState,
    },

    /// Secret does not hash to the hashlock.
    #[error("Invalid secret")]
    InvalidSecret,

    /// Caller is not allowed to perform this operation.
    #[error("Unauthorized caller: 0x{}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller.
        caller: Address,
    },

    /// Cross-chain call from an origin other than the trusted relay.
    #[error("Untrusted origin: {0}")]
    UntrustedOrigin(RemoteOrigin),

    /// The timelock (or rescue delay) has not passed yet.
    #[error("Timelock not expired: now {now}, available at {available_at}")]
    TimelockNotExpired {
        /// Ledger time of the call.
        now: Timestamp,
        /// First instant the operation is allowed.
        available_at: Timestamp,
    },

    /// Moving native value failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

/// Coarse error taxonomy, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input.
    Validation,
    /// Operation not valid in the swap's current state.
    State,
    /// Caller not permitted.
    Authorization,
    /// Too early.
    Timing,
    /// Value movement failed.
    Transfer,
}

impl ErrorCategory {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::State => "state",
            Self::Authorization => "authorization",
            Self::Timing => "timing",
            Self::Transfer => "transfer",
        }
    }
}

impl EscrowError {
    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSecretHash
            | Self::InvalidAmount(_)
            | Self::TimelockTooShort { .. }
            | Self::TimelockTooLong { .. }
            | Self::InvalidSecret => ErrorCategory::Validation,
            Self::SwapAlreadyExists(_) | Self::SwapDoesNotExist(_) | Self::SwapNotOpen { .. } => {
                ErrorCategory::State
            }
            Self::Unauthorized { .. } | Self::UntrustedOrigin(_) => ErrorCategory::Authorization,
            Self::TimelockNotExpired { .. } => ErrorCategory::Timing,
            Self::TransferFailed(_) => ErrorCategory::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ChainId;

    #[test]
    fn test_swap_not_open_mentions_state() {
        let err = EscrowError::SwapNotOpen {
            state: SwapState::Completed,
        };
        assert!(err.to_string().contains("completed"));
    }

    #[test]
    fn test_invalid_amount_mismatch_message() {
        let err = EscrowError::InvalidAmount(AmountIssue::ValueMismatch {
            declared: 10,
            attached: 9,
        });
        assert!(err.to_string().contains("declared 10, attached 9"));
    }

    #[test]
    fn test_swap_id_rendered_as_hex() {
        let err = EscrowError::SwapDoesNotExist([0xAB; 32]);
        assert!(err.to_string().contains("0xabab"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(EscrowError::InvalidSecret.category(), ErrorCategory::Validation);
        assert_eq!(
            EscrowError::SwapAlreadyExists([0; 32]).category(),
            ErrorCategory::State
        );
        assert_eq!(
            EscrowError::UntrustedOrigin(RemoteOrigin::new(ChainId::Polkadot, [1; 20]))
                .category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            EscrowError::TimelockNotExpired {
                now: 1,
                available_at: 2
            }
            .category(),
            ErrorCategory::Timing
        );
        assert_eq!(
            EscrowError::from(TransferError::Rejected("no".into())).category(),
            ErrorCategory::Transfer
        );
    }
}
