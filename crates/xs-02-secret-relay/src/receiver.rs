//! # Relay Receiver
//!
//! Sibling-side endpoint: verifies relayed calls and executes them on the
//! local escrow as `complete_swap_relayed`.
//!
//! Every envelope goes through [`MessageVerifier`] (version, destination,
//! trusted origin, timestamp window, signature, nonce) before the escrow is
//! touched. Calls are stamped by the relay chain's clock, so the window is
//! widened by the tolerated clock skew between the two chains. Verified calls are answered with a signed [`DeliveryAck`] that
//! echoes the call's correlation id.

use crate::domain::{DeliveryAck, DeliveryOutcome, RelayCall, RelayError, RelayResult};
use crate::metrics;
use shared_types::{
    short_hex, AuthenticatedMessage, MessageVerifier, NonceCache, RemoteOrigin,
    CROSS_CHAIN_CLOCK_SKEW,
};
use std::sync::Arc;
use tracing::{info, warn};
use xs_01_escrow_ledger::{EscrowApi, EscrowError};
use zeroize::Zeroizing;

/// Executes relayed calls on one escrow.
pub struct RelayReceiver<E: EscrowApi> {
    escrow: Arc<E>,
    verifier: MessageVerifier,
    identity: RemoteOrigin,
    key: Zeroizing<Vec<u8>>,
    chain_label: String,
}

impl<E: EscrowApi> RelayReceiver<E> {
    /// Receiver for `escrow`, accepting calls signed by `trusted_relay`.
    pub fn new(escrow: Arc<E>, trusted_relay: RemoteOrigin, key: &[u8]) -> Self {
        let chain = escrow.chain();
        let identity = RemoteOrigin::new(chain, escrow.address());
        Self {
            verifier: MessageVerifier::new(chain, trusted_relay, key)
                .with_clock_skew(CROSS_CHAIN_CLOCK_SKEW),
            identity,
            key: Zeroizing::new(key.to_vec()),
            chain_label: chain.to_string(),
            escrow,
        }
    }

    /// Share a nonce cache with other verifiers on this chain.
    #[must_use]
    pub fn with_nonce_cache(mut self, nonce_cache: Arc<NonceCache>) -> Self {
        self.verifier = self.verifier.with_nonce_cache(nonce_cache);
        self
    }

    /// Tolerate `secs` of drift between the relay chain's clock and this
    /// ledger's.
    #[must_use]
    pub fn with_clock_skew(mut self, secs: u64) -> Self {
        self.verifier = self.verifier.with_clock_skew(secs);
        self
    }

    /// Identity acknowledgements are signed with.
    pub fn identity(&self) -> RemoteOrigin {
        self.identity
    }

    /// Verify and execute one relayed call.
    pub fn handle(
        &self,
        call: &AuthenticatedMessage<RelayCall>,
    ) -> RelayResult<AuthenticatedMessage<DeliveryAck>> {
        let now = self.escrow.ledger_time();

        let verdict = self.verifier.verify(call, now);
        if !verdict.is_valid() {
            warn!(
                chain = %self.identity.chain,
                origin = %call.origin,
                reason = %verdict,
                "[xs-02] Relayed call rejected"
            );
            metrics::record_receiver_rejection(&self.chain_label, "verification");
            return Err(RelayError::Rejected(verdict));
        }

        let RelayCall {
            swap_id,
            secret,
            target_escrow,
        } = call.payload.clone();
        if target_escrow != self.identity.account {
            metrics::record_receiver_rejection(&self.chain_label, "wrong_target");
            return Err(RelayError::WrongTarget {
                expected: self.identity.account,
                received: target_escrow,
            });
        }

        let outcome = match self.escrow.complete_swap_relayed(call.origin, swap_id, secret) {
            Ok(_) => DeliveryOutcome::Completed,
            Err(EscrowError::SwapNotOpen { .. }) => DeliveryOutcome::AlreadySettled,
            Err(e) => DeliveryOutcome::Failed(e.to_string()),
        };
        info!(
            chain = %self.identity.chain,
            swap_id = %short_hex(&swap_id),
            %outcome,
            "[xs-02] Relayed call executed"
        );

        let ack = AuthenticatedMessage::new(
            self.identity,
            call.origin.chain,
            now,
            DeliveryAck { swap_id, outcome },
        )
        .with_correlation(call.correlation_id)
        .sign(&self.key)?;
        Ok(ack)
    }
}
