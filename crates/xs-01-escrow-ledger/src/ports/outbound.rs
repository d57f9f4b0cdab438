//! # Outbound Ports
//!
//! What a ledger needs from its host chain.

use shared_bus::SwapEvent;
use shared_types::{Address, Amount, Timestamp, TransferError};

/// The chain's native currency.
///
/// A transfer may call back into the ledger (a contract recipient); the
/// ledger updates its own state before every outgoing transfer.
pub trait NativeBank: Send + Sync {
    /// Balance of `account`.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Move `amount` from `from` to `to`.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

/// The chain's block timestamp.
pub trait LedgerClock: Send + Sync {
    /// Current ledger time.
    fn now(&self) -> Timestamp;
}

/// Public event feed of the chain.
pub trait EventSink: Send + Sync {
    /// Publish an event emitted by a committed operation.
    fn emit(&self, event: &SwapEvent);
}
