//! # Domain Errors
//!
//! Failures of relay, receiver and transport operations. A rejected `send`
//! leaves no message record, no propagated flag and no accrued fee.

use shared_types::{
    Address, Amount, ChainId, Hash, MessageError, TransferError, VerificationResult,
};
use thiserror::Error;

/// Result alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Transport failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The far side of the channel is gone.
    #[error("Transport disconnected from {0}")]
    Disconnected(ChainId),

    /// The transport refused the message.
    #[error("Transport rejected message: {0}")]
    Rejected(String),
}

/// Secret relay error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// `configure_bridge` has not been called.
    #[error("Bridge not configured")]
    BridgeNotConfigured,

    /// `configure_bridge` was already called.
    #[error("Bridge already configured")]
    AlreadyConfigured,

    /// The bridge names an escrow other than the one paired with this relay.
    #[error("Escrow mismatch: paired 0x{}, provided 0x{}", hex::encode(.paired), hex::encode(.provided))]
    EscrowMismatch {
        /// Escrow the relay was built with.
        paired: Address,
        /// Escrow named in the call.
        provided: Address,
    },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Caller is not the relay owner.
    #[error("Unauthorized caller: 0x{}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller.
        caller: Address,
    },

    /// This secret was already relayed.
    #[error("Secret already propagated")]
    SecretAlreadyPropagated,

    /// The local escrow has not completed the swap with this secret.
    #[error("Secret not revealed for swap 0x{}", hex::encode(.0))]
    SecretNotRevealed(Hash),

    /// Attached value below the current fee.
    #[error("Insufficient fee: attached {attached}, required {required}")]
    InsufficientFee {
        /// Value attached to the call.
        attached: Amount,
        /// Current fee.
        required: Amount,
    },

    /// New fee below the floor.
    #[error("Fee below minimum: {fee} < {min}")]
    FeeBelowMinimum {
        /// Requested fee.
        fee: Amount,
        /// Fee floor.
        min: Amount,
    },

    /// No accrued fees.
    #[error("Nothing to withdraw")]
    NothingToWithdraw,

    /// No message recorded for the swap.
    #[error("Message not found: 0x{}", hex::encode(.0))]
    MessageNotFound(Hash),

    /// An acknowledgement does not answer the recorded message.
    #[error("Acknowledgement does not match message for swap 0x{}", hex::encode(.0))]
    CorrelationMismatch(Hash),

    /// A relayed call names an escrow other than the receiver's.
    #[error("Wrong target escrow: expected 0x{}, received 0x{}", hex::encode(.expected), hex::encode(.received))]
    WrongTarget {
        /// Receiver's escrow.
        expected: Address,
        /// Escrow named in the call.
        received: Address,
    },

    /// Envelope verification failed.
    #[error("Message rejected: {0}")]
    Rejected(VerificationResult),

    /// Building or signing an envelope failed.
    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    /// Dispatch to the sibling chain failed.
    #[error("Transport failed: {0}")]
    TransportFailed(#[from] TransportError),

    /// Moving native value failed.
    #[error("Transfer failed: {0}")]
    TransferFailed(#[from] TransferError),
}

impl RelayError {
    /// Short label, used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BridgeNotConfigured => "bridge_not_configured",
            Self::AlreadyConfigured => "already_configured",
            Self::EscrowMismatch { .. } => "escrow_mismatch",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Unauthorized { .. } => "unauthorized",
            Self::SecretAlreadyPropagated => "already_propagated",
            Self::SecretNotRevealed(_) => "not_revealed",
            Self::InsufficientFee { .. } => "insufficient_fee",
            Self::FeeBelowMinimum { .. } => "fee_below_minimum",
            Self::NothingToWithdraw => "nothing_to_withdraw",
            Self::MessageNotFound(_) => "message_not_found",
            Self::CorrelationMismatch(_) => "correlation_mismatch",
            Self::WrongTarget { .. } => "wrong_target",
            Self::Rejected(_) => "rejected",
            Self::Message(_) => "message",
            Self::TransportFailed(_) => "transport",
            Self::TransferFailed(_) => "transfer",
        }
    }
}
