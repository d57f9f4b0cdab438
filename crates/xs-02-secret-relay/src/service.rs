//! # Secret Relay Service
//!
//! Forwards a secret revealed on the paired escrow to the sibling chain as
//! a signed [`RelayCall`].
//!
//! `send` records the message, marks the secret propagated and accrues the
//! attached fee before dispatching. If the transport refuses the envelope
//! all three are rolled back and the fee is refunded, so a failed send can
//! be retried. There is no automatic retry.
//!
//! Queries wait on the transaction guard, so a pending send is invisible
//! until its dispatch has succeeded or been rolled back.

use crate::domain::{
    BridgeConfig, DeliveryAck, FeeSchedule, Message, RelayCall, RelayError, RelayResult,
};
use crate::metrics;
use crate::ports::{CrossChainTransport, LocalEscrowView, SecretRelayApi};
use parking_lot::{ReentrantMutex, RwLock};
use shared_bus::SwapEvent;
use shared_types::{
    short_hex, Address, Amount, AuthenticatedMessage, ChainId, Hash, MessageVerifier, NonceCache,
    RemoteOrigin, Secret, CROSS_CHAIN_CLOCK_SKEW, ZERO_ADDRESS,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use xs_01_escrow_ledger::{CallContext, EventSink, LedgerClock, NativeBank};
use zeroize::Zeroizing;

/// Wiring plus the verifier for acknowledgements from the sibling escrow.
struct Bridge {
    config: BridgeConfig,
    ack_verifier: MessageVerifier,
}

struct RelayState {
    bridge: Option<Bridge>,
    messages: HashMap<Hash, Message>,
    propagated: HashSet<Secret>,
    fees: FeeSchedule,
    accrued: Amount,
}

/// Secret relay paired with one escrow.
pub struct SecretRelay<E, T, B, C>
where
    E: LocalEscrowView,
    T: CrossChainTransport<RelayCall>,
    B: NativeBank,
    C: LedgerClock,
{
    address: Address,
    chain: ChainId,
    chain_label: String,
    owner: Address,
    key: Zeroizing<Vec<u8>>,
    ack_nonces: Arc<NonceCache>,
    clock_skew: u64,
    escrow: Arc<E>,
    transport: Arc<T>,
    bank: Arc<B>,
    clock: Arc<C>,
    sink: Option<Arc<dyn EventSink>>,
    state: RwLock<RelayState>,
    tx_guard: ReentrantMutex<()>,
}

impl<E, T, B, C> SecretRelay<E, T, B, C>
where
    E: LocalEscrowView,
    T: CrossChainTransport<RelayCall>,
    B: NativeBank,
    C: LedgerClock,
{
    /// Identity this relay signs with.
    pub fn origin(&self) -> RemoteOrigin {
        RemoteOrigin::new(self.chain, self.address)
    }

    /// Number of messages recorded.
    pub fn message_count(&self) -> usize {
        self.committed(|state| state.messages.len())
    }

    fn committed<R>(&self, read: impl FnOnce(&RelayState) -> R) -> R {
        let _tx = self.tx_guard.lock();
        let state = self.state.read();
        read(&state)
    }

    fn ensure_owner(&self, caller: Address) -> RelayResult<()> {
        if caller != self.owner {
            return Err(RelayError::Unauthorized { caller });
        }
        Ok(())
    }

    fn configure(
        &self,
        ctx: CallContext,
        local_escrow: Address,
        sibling_escrow: Address,
        sibling_chain: ChainId,
    ) -> RelayResult<BridgeConfig> {
        let _tx = self.tx_guard.lock();
        self.ensure_owner(ctx.sender)?;

        let mut state = self.state.write();
        if state.bridge.is_some() {
            return Err(RelayError::AlreadyConfigured);
        }
        if local_escrow == ZERO_ADDRESS || sibling_escrow == ZERO_ADDRESS {
            return Err(RelayError::InvalidConfiguration("escrow address is zero"));
        }
        if sibling_chain == self.chain {
            return Err(RelayError::InvalidConfiguration(
                "sibling chain is the local chain",
            ));
        }
        let paired = self.escrow.escrow_address();
        if local_escrow != paired {
            return Err(RelayError::EscrowMismatch {
                paired,
                provided: local_escrow,
            });
        }

        let config = BridgeConfig {
            local_escrow,
            sibling_escrow,
            sibling_chain,
        };
        let ack_verifier = MessageVerifier::new(
            self.chain,
            RemoteOrigin::new(sibling_chain, sibling_escrow),
            &self.key,
        )
        .with_nonce_cache(Arc::clone(&self.ack_nonces))
        .with_clock_skew(self.clock_skew);
        state.bridge = Some(Bridge {
            config,
            ack_verifier,
        });

        info!(
            chain = %self.chain,
            sibling_chain = %sibling_chain,
            sibling_escrow = %short_hex(&sibling_escrow),
            "[xs-02] Bridge configured"
        );
        Ok(config)
    }

    fn relay_secret(&self, ctx: CallContext, swap_id: Hash, secret: Secret) -> RelayResult<Message> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();

        let (config, fee) = {
            let state = self.state.read();
            let bridge = state.bridge.as_ref().ok_or(RelayError::BridgeNotConfigured)?;
            if state.propagated.contains(&secret) {
                return Err(RelayError::SecretAlreadyPropagated);
            }
            (bridge.config, state.fees.fee)
        };
        if self.escrow.completed_with(&swap_id) != Some(secret) {
            return Err(RelayError::SecretNotRevealed(swap_id));
        }
        if ctx.value < fee {
            return Err(RelayError::InsufficientFee {
                attached: ctx.value,
                required: fee,
            });
        }

        self.bank.transfer(&ctx.sender, &self.address, ctx.value)?;

        let envelope = AuthenticatedMessage::new(
            self.origin(),
            config.sibling_chain,
            now,
            RelayCall {
                swap_id,
                secret,
                target_escrow: config.sibling_escrow,
            },
        );
        let message = Message {
            swap_id,
            secret,
            processed: false,
            timestamp: now,
            correlation_id: envelope.correlation_id,
        };

        {
            let mut state = self.state.write();
            if state.propagated.contains(&secret) {
                // Relayed by a call that re-entered during the fee transfer.
                drop(state);
                self.refund(ctx.sender, ctx.value);
                return Err(RelayError::SecretAlreadyPropagated);
            }
            state.messages.insert(swap_id, message.clone());
            state.propagated.insert(secret);
            state.accrued = state.accrued.saturating_add(ctx.value);
        }

        let dispatched = envelope
            .sign(&self.key)
            .map_err(RelayError::from)
            .and_then(|signed| self.transport.dispatch(signed).map_err(RelayError::from));
        if let Err(e) = dispatched {
            {
                let mut state = self.state.write();
                state.messages.remove(&swap_id);
                state.propagated.remove(&secret);
                state.accrued = state.accrued.saturating_sub(ctx.value);
            }
            self.refund(ctx.sender, ctx.value);
            return Err(e);
        }

        self.emit(SwapEvent::MessageSent {
            chain: self.chain,
            relay: self.address,
            swap_id,
            secret,
            destination: config.sibling_chain,
            fee: ctx.value,
        });
        metrics::record_message_sent(&self.chain_label);
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap_id),
            destination = %config.sibling_chain,
            correlation_id = %message.correlation_id,
            "[xs-02] Secret relayed"
        );
        Ok(message)
    }

    fn confirm(&self, ack: &AuthenticatedMessage<DeliveryAck>) -> RelayResult<Message> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();
        let swap_id = ack.payload.swap_id;

        let message = {
            let mut state = self.state.write();
            let verdict = {
                let bridge = state.bridge.as_ref().ok_or(RelayError::BridgeNotConfigured)?;
                bridge.ack_verifier.verify(ack, now)
            };
            if !verdict.is_valid() {
                return Err(RelayError::Rejected(verdict));
            }

            let message = state
                .messages
                .get_mut(&swap_id)
                .ok_or(RelayError::MessageNotFound(swap_id))?;
            if message.correlation_id != ack.correlation_id {
                return Err(RelayError::CorrelationMismatch(swap_id));
            }
            if !ack.payload.outcome.is_consumed() {
                warn!(
                    chain = %self.chain,
                    swap_id = %short_hex(&swap_id),
                    outcome = %ack.payload.outcome,
                    "[xs-02] Sibling ledger did not consume relayed secret"
                );
                return Ok(message.clone());
            }
            if message.processed {
                return Ok(message.clone());
            }
            message.processed = true;
            message.clone()
        };

        self.emit(SwapEvent::MessageProcessed {
            chain: self.chain,
            relay: self.address,
            swap_id,
        });
        metrics::record_delivery_confirmed(&self.chain_label, &ack.payload.outcome.to_string());
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap_id),
            outcome = %ack.payload.outcome,
            "[xs-02] Delivery confirmed"
        );
        Ok(message)
    }

    fn withdraw(&self, ctx: CallContext) -> RelayResult<Amount> {
        let _tx = self.tx_guard.lock();
        self.ensure_owner(ctx.sender)?;

        let amount = {
            let mut state = self.state.write();
            if state.accrued == 0 {
                return Err(RelayError::NothingToWithdraw);
            }
            std::mem::take(&mut state.accrued)
        };

        if let Err(e) = self.bank.transfer(&self.address, &self.owner, amount) {
            let mut state = self.state.write();
            state.accrued = state.accrued.saturating_add(amount);
            return Err(e.into());
        }

        info!(chain = %self.chain, amount, "[xs-02] Fees withdrawn");
        Ok(amount)
    }

    fn refund(&self, to: Address, amount: Amount) {
        if let Err(e) = self.bank.transfer(&self.address, &to, amount) {
            error!(
                chain = %self.chain,
                to = %short_hex(&to),
                amount,
                error = %e,
                "[xs-02] Failed to refund relay fee"
            );
        }
    }

    fn emit(&self, event: SwapEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(&event);
        }
    }

    /// Count and log a failed call, then pass the result through.
    fn observe<R>(&self, op: &'static str, result: RelayResult<R>) -> RelayResult<R> {
        if let Err(e) = &result {
            if op == "send" {
                metrics::record_send_failure(&self.chain_label, e.reason());
            } else {
                metrics::record_call_failure(&self.chain_label, op, e.reason());
            }
            debug!(chain = %self.chain, op, error = %e, "[xs-02] Call rejected");
        }
        result
    }
}

impl<E, T, B, C> SecretRelayApi for SecretRelay<E, T, B, C>
where
    E: LocalEscrowView,
    T: CrossChainTransport<RelayCall>,
    B: NativeBank,
    C: LedgerClock,
{
    fn address(&self) -> Address {
        self.address
    }

    fn chain(&self) -> ChainId {
        self.chain
    }

    fn owner(&self) -> Address {
        self.owner
    }

    fn configure_bridge(
        &self,
        ctx: CallContext,
        local_escrow: Address,
        sibling_escrow: Address,
        sibling_chain: ChainId,
    ) -> RelayResult<BridgeConfig> {
        let result = self.configure(ctx, local_escrow, sibling_escrow, sibling_chain);
        self.observe("configure_bridge", result)
    }

    fn bridge(&self) -> Option<BridgeConfig> {
        self.committed(|state| state.bridge.as_ref().map(|b| b.config))
    }

    fn send(&self, ctx: CallContext, swap_id: Hash, secret: Secret) -> RelayResult<Message> {
        let result = self.relay_secret(ctx, swap_id, secret);
        self.observe("send", result)
    }

    fn confirm_delivery(&self, ack: &AuthenticatedMessage<DeliveryAck>) -> RelayResult<Message> {
        let result = self.confirm(ack);
        self.observe("confirm_delivery", result)
    }

    fn get_message(&self, swap_id: &Hash) -> Option<Message> {
        self.committed(|state| state.messages.get(swap_id).cloned())
    }

    fn is_secret_propagated(&self, secret: &Secret) -> bool {
        self.committed(|state| state.propagated.contains(secret))
    }

    fn xcm_fee(&self) -> Amount {
        self.committed(|state| state.fees.fee)
    }

    fn fee_schedule(&self) -> FeeSchedule {
        self.committed(|state| state.fees)
    }

    fn update_xcm_fee(&self, ctx: CallContext, fee: Amount) -> RelayResult<()> {
        let _tx = self.tx_guard.lock();
        let result = self.ensure_owner(ctx.sender).and_then(|()| {
            let mut state = self.state.write();
            if fee < state.fees.min_fee {
                return Err(RelayError::FeeBelowMinimum {
                    fee,
                    min: state.fees.min_fee,
                });
            }
            state.fees.fee = fee;
            info!(chain = %self.chain, fee, "[xs-02] Relay fee updated");
            Ok(())
        });
        self.observe("update_xcm_fee", result)
    }

    fn accrued_fees(&self) -> Amount {
        self.committed(|state| state.accrued)
    }

    fn withdraw_fees(&self, ctx: CallContext) -> RelayResult<Amount> {
        let result = self.withdraw(ctx);
        self.observe("withdraw_fees", result)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`SecretRelay`].
pub struct SecretRelayBuilder {
    chain: ChainId,
    address: Address,
    owner: Address,
    key: Zeroizing<Vec<u8>>,
    fees: FeeSchedule,
    ack_nonces: Option<Arc<NonceCache>>,
    clock_skew: u64,
    sink: Option<Arc<dyn EventSink>>,
}

impl SecretRelayBuilder {
    /// Start configuring a relay deployed at `address` on `chain`.
    pub fn new(chain: ChainId, address: Address, owner: Address) -> Self {
        Self {
            chain,
            address,
            owner,
            key: Zeroizing::new(Vec::new()),
            fees: FeeSchedule::default(),
            ack_nonces: None,
            clock_skew: CROSS_CHAIN_CLOCK_SKEW,
            sink: None,
        }
    }

    /// HMAC key shared with the sibling receiver.
    pub fn relay_key(mut self, key: &[u8]) -> Self {
        self.key = Zeroizing::new(key.to_vec());
        self
    }

    /// Override the fee floor and initial fee.
    pub fn fee_schedule(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Share a nonce cache for acknowledgements with other verifiers on
    /// this chain.
    pub fn ack_nonce_cache(mut self, cache: Arc<NonceCache>) -> Self {
        self.ack_nonces = Some(cache);
        self
    }

    /// Tolerated drift between this chain's clock and the sibling's, in
    /// seconds. Defaults to [`CROSS_CHAIN_CLOCK_SKEW`].
    pub fn clock_skew(mut self, secs: u64) -> Self {
        self.clock_skew = secs;
        self
    }

    /// Publish relay events to `sink`.
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Finish with the paired escrow, the transport and the chain's bank
    /// and clock.
    pub fn build<E, T, B, C>(
        self,
        escrow: Arc<E>,
        transport: Arc<T>,
        bank: Arc<B>,
        clock: Arc<C>,
    ) -> RelayResult<SecretRelay<E, T, B, C>>
    where
        E: LocalEscrowView,
        T: CrossChainTransport<RelayCall>,
        B: NativeBank,
        C: LedgerClock,
    {
        if self.address == ZERO_ADDRESS {
            return Err(RelayError::InvalidConfiguration("relay address is zero"));
        }
        if self.owner == ZERO_ADDRESS {
            return Err(RelayError::InvalidConfiguration("relay owner is zero"));
        }
        if self.key.is_empty() {
            return Err(RelayError::InvalidConfiguration("relay key is empty"));
        }
        if self.fees.min_fee == 0 {
            return Err(RelayError::InvalidConfiguration("fee floor is zero"));
        }
        if self.fees.fee < self.fees.min_fee {
            return Err(RelayError::FeeBelowMinimum {
                fee: self.fees.fee,
                min: self.fees.min_fee,
            });
        }

        info!(
            chain = %self.chain,
            address = %short_hex(&self.address),
            fee = self.fees.fee,
            "[xs-02] Secret relay deployed"
        );

        Ok(SecretRelay {
            address: self.address,
            chain: self.chain,
            chain_label: self.chain.to_string(),
            owner: self.owner,
            key: self.key,
            ack_nonces: self.ack_nonces.unwrap_or_else(NonceCache::new_shared),
            clock_skew: self.clock_skew,
            escrow,
            transport,
            bank,
            clock,
            sink: self.sink,
            state: RwLock::new(RelayState {
                bridge: None,
                messages: HashMap::new(),
                propagated: HashSet::new(),
                fees: self.fees,
                accrued: 0,
            }),
            tx_guard: ReentrantMutex::new(()),
        })
    }
}
