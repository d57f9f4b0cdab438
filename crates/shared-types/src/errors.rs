//! # Error Types
//!
//! Errors shared across the ledgers and the relay.

use crate::entities::{Address, Amount};
use thiserror::Error;

/// Errors from building or signing an envelope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageError {
    /// Canonical encoding failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The HMAC key was rejected.
    #[error("Invalid signing key")]
    InvalidKey,
}

impl From<bincode::Error> for MessageError {
    fn from(err: bincode::Error) -> Self {
        MessageError::Serialization(err.to_string())
    }
}

/// Errors from moving native value between accounts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The debited account holds less than requested.
    #[error("Insufficient balance for 0x{}: have {balance}, need {required}", hex::encode(.account))]
    InsufficientBalance {
        /// Debited account.
        account: Address,
        /// Current balance.
        balance: Amount,
        /// Requested amount.
        required: Amount,
    },

    /// The receiving side refused the value.
    #[error("Transfer rejected: {0}")]
    Rejected(String),
}
