//! # Inbound Ports
//!
//! The public interface of an escrow ledger: what makers, takers,
//! resolvers, wallets and the sibling chain's relay may call.

use crate::domain::{
    CallContext, CreateSwapRequest, EscrowResult, LedgerPolicy, NativeSwapRequest, Swap,
    SwapState,
};
use shared_types::{Address, Amount, ChainId, Hash, RemoteOrigin, Secret, Timestamp};

/// Escrow ledger API - inbound port.
///
/// Every mutating call is atomic: it either commits fully or returns an
/// error with no observable effect.
pub trait EscrowApi: Send + Sync {
    /// Address of this ledger (its custody account).
    fn address(&self) -> Address;

    /// Chain hosting this ledger.
    fn chain(&self) -> ChainId;

    /// Account allowed to rescue expired swaps.
    fn owner(&self) -> Address;

    /// Constants this ledger enforces.
    fn policy(&self) -> LedgerPolicy;

    /// Current ledger time.
    fn ledger_time(&self) -> Timestamp;

    /// Lock the attached value with recorded counter-leg terms. The caller
    /// becomes the maker.
    fn create_swap(&self, ctx: CallContext, request: CreateSwapRequest) -> EscrowResult<Swap>;

    /// Lock the attached value; the amount is whatever was attached.
    fn create_native_swap(&self, ctx: CallContext, request: NativeSwapRequest)
        -> EscrowResult<Swap>;

    /// Claim with the secret, paying the default recipient.
    fn complete_swap(&self, ctx: CallContext, swap_id: Hash, secret: Secret) -> EscrowResult<Swap>;

    /// Claim with the secret, paying `target`.
    fn complete_swap_to(
        &self,
        ctx: CallContext,
        swap_id: Hash,
        secret: Secret,
        target: Address,
    ) -> EscrowResult<Swap>;

    /// Claim on behalf of the sibling chain's relay. Pays the taker.
    fn complete_swap_relayed(
        &self,
        origin: RemoteOrigin,
        swap_id: Hash,
        secret: Secret,
    ) -> EscrowResult<Swap>;

    /// Refund the maker after `unlock_time`.
    fn cancel_swap(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Swap>;

    /// Sweep to the owner after `unlock_time + rescue_delay`. Returns the
    /// swept amount.
    fn rescue_funds(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Amount>;

    /// Snapshot of a swap record.
    fn get_swap(&self, swap_id: &Hash) -> Option<Swap>;

    /// State of a swap id; `Invalid` if never created.
    fn swap_state(&self, swap_id: &Hash) -> SwapState;

    /// Could the maker cancel right now?
    fn can_cancel(&self, swap_id: &Hash) -> bool;

    /// Does `candidate` open the hashlock of `swap_id`? False for unknown ids.
    fn is_valid_secret(&self, swap_id: &Hash, candidate: &Secret) -> bool;

    /// Secret a completed swap was claimed with.
    fn revealed_secret(&self, swap_id: &Hash) -> Option<Secret>;
}
