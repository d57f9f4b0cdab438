//! # Outbound Ports
//!
//! What a relay needs from its surroundings.

use crate::domain::TransportError;
use shared_types::{Address, AuthenticatedMessage, Hash, Secret};
use xs_01_escrow_ledger::EscrowApi;

/// Carries signed envelopes to the sibling chain.
///
/// Dispatch is fire-and-forget: `Ok` means the message left this chain,
/// not that it was executed.
pub trait CrossChainTransport<T>: Send + Sync {
    /// Hand `message` to the transport.
    fn dispatch(&self, message: AuthenticatedMessage<T>) -> Result<(), TransportError>;
}

/// Read access to the escrow a relay is paired with.
pub trait LocalEscrowView: Send + Sync {
    /// Escrow account.
    fn escrow_address(&self) -> Address;

    /// Secret recorded when the escrow completed `swap_id`.
    fn completed_with(&self, swap_id: &Hash) -> Option<Secret>;
}

impl<E: EscrowApi + ?Sized> LocalEscrowView for E {
    fn escrow_address(&self) -> Address {
        self.address()
    }

    fn completed_with(&self, swap_id: &Hash) -> Option<Secret> {
        self.revealed_secret(swap_id)
    }
}
