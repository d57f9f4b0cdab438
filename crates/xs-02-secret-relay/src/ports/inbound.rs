//! # Inbound Ports
//!
//! The public interface of a secret relay contract.

use crate::domain::{BridgeConfig, DeliveryAck, FeeSchedule, Message, RelayResult};
use shared_types::{Address, Amount, AuthenticatedMessage, ChainId, Hash, Secret};
use xs_01_escrow_ledger::CallContext;

/// Secret relay API.
///
/// Mutating calls take a [`CallContext`]; `send` is payable and the
/// attached value pays the relay fee.
pub trait SecretRelayApi: Send + Sync {
    /// Relay account.
    fn address(&self) -> Address;

    /// Chain hosting the relay.
    fn chain(&self) -> ChainId;

    /// Relay owner.
    fn owner(&self) -> Address;

    /// Wire the relay to its escrow and the sibling chain. Owner only,
    /// once.
    fn configure_bridge(
        &self,
        ctx: CallContext,
        local_escrow: Address,
        sibling_escrow: Address,
        sibling_chain: ChainId,
    ) -> RelayResult<BridgeConfig>;

    /// Current wiring, if configured.
    fn bridge(&self) -> Option<BridgeConfig>;

    /// Forward a revealed secret to the sibling ledger.
    fn send(&self, ctx: CallContext, swap_id: Hash, secret: Secret) -> RelayResult<Message>;

    /// Consume a signed acknowledgement from the sibling receiver.
    fn confirm_delivery(&self, ack: &AuthenticatedMessage<DeliveryAck>) -> RelayResult<Message>;

    /// Message recorded for `swap_id`.
    fn get_message(&self, swap_id: &Hash) -> Option<Message>;

    /// Whether `secret` has been relayed.
    fn is_secret_propagated(&self, secret: &Secret) -> bool;

    /// Fee required per `send`.
    fn xcm_fee(&self) -> Amount;

    /// Fee floor and current fee.
    fn fee_schedule(&self) -> FeeSchedule;

    /// Change the fee. Owner only, never below the floor.
    fn update_xcm_fee(&self, ctx: CallContext, fee: Amount) -> RelayResult<()>;

    /// Fees collected and not yet withdrawn.
    fn accrued_fees(&self) -> Amount;

    /// Pay accrued fees to the owner. Owner only.
    fn withdraw_fees(&self, ctx: CallContext) -> RelayResult<Amount>;
}
