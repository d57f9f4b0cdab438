//! # Escrow Ledger Service
//!
//! One generic HTLC ledger, parameterised by a [`LedgerPolicy`] and
//! instantiated once per chain.
//!
//! ## Atomicity
//!
//! Every public operation holds the ledger's re-entrant transaction guard
//! for its whole duration, so operations on one ledger run in a single
//! serial order. Exit transitions flip the swap's state *before* value
//! leaves custody; a call that re-enters from inside a transfer sees the
//! terminal state and fails with `SwapNotOpen`. A failed transfer restores
//! the previous state, so a rejected call has no observable effect.
//!
//! Queries take the same guard, so a reader on another thread never sees
//! a transition that is still waiting on its transfer.

use crate::algorithms::{can_cancel, require_elapsed, rescue_available_at, unlock_time};
use crate::domain::{
    invariant_amount_matches, invariant_counter_terms, invariant_nonzero_hashlock,
    invariant_secret_matches, CallContext, ClaimRule, CompletionPath, CreateSwapRequest,
    EscrowError, EscrowResult, EventLog, LedgerPolicy, LogEntry, NativeSwapRequest, PolicyError,
    Swap, SwapState,
};
use crate::metrics;
use crate::ports::{EscrowApi, EventSink, LedgerClock, NativeBank};
use parking_lot::{ReentrantMutex, RwLock};
use shared_bus::SwapEvent;
use shared_types::{
    short_hex, Address, Amount, ChainId, CounterTerms, Hash, RemoteOrigin, Secret, Timestamp,
    ZERO_ADDRESS, ZERO_HASH,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Who is presenting a secret.
#[derive(Clone, Copy, Debug)]
enum Claimant {
    /// A local account, optionally naming where the value should go.
    Local {
        caller: Address,
        target: Option<Address>,
    },
    /// The sibling chain's relay.
    Relay(RemoteOrigin),
}

/// Parameters shared by both creation entry points.
struct OpenSwap {
    swap_id: Hash,
    secret_hash: Hash,
    taker: Address,
    amount: Amount,
    terms: Option<CounterTerms>,
    timelock: u64,
    correlation_ref: Hash,
}

/// Ledger storage.
#[derive(Default)]
struct LedgerState {
    swaps: HashMap<Hash, Swap>,
    log: EventLog,
}

/// HTLC escrow ledger.
pub struct EscrowLedger<B, C>
where
    B: NativeBank,
    C: LedgerClock,
{
    address: Address,
    chain: ChainId,
    chain_label: String,
    owner: Address,
    policy: LedgerPolicy,
    trusted_relay: Option<RemoteOrigin>,
    bank: Arc<B>,
    clock: Arc<C>,
    sink: Option<Arc<dyn EventSink>>,
    state: RwLock<LedgerState>,
    tx_guard: ReentrantMutex<()>,
}

impl<B, C> EscrowLedger<B, C>
where
    B: NativeBank,
    C: LedgerClock,
{
    /// Origin whose relayed completions this ledger accepts.
    pub fn trusted_relay(&self) -> Option<RemoteOrigin> {
        self.trusted_relay
    }

    /// Native value currently in custody.
    pub fn custodied_balance(&self) -> Amount {
        self.bank.balance_of(&self.address)
    }

    /// Number of swap ids ever used.
    pub fn swap_count(&self) -> usize {
        self.committed(|state| state.swaps.len())
    }

    /// Logged events of one swap, oldest first.
    pub fn events_for_swap(&self, swap_id: &Hash) -> Vec<LogEntry> {
        self.committed(|state| state.log.for_swap(swap_id))
    }

    /// Logged events naming `account`.
    pub fn events_for_participant(&self, account: &Address) -> Vec<LogEntry> {
        self.committed(|state| state.log.for_participant(account))
    }

    /// Logged events from sequence `from` onwards.
    pub fn events_since(&self, from: u64) -> Vec<LogEntry> {
        self.committed(|state| state.log.since(from))
    }

    /// Read state between transactions.
    fn committed<R>(&self, read: impl FnOnce(&LedgerState) -> R) -> R {
        let _tx = self.tx_guard.lock();
        let state = self.state.read();
        read(&state)
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    fn open_swap(&self, ctx: CallContext, req: OpenSwap) -> EscrowResult<Swap> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();

        if self.state.read().swaps.contains_key(&req.swap_id) {
            return Err(EscrowError::SwapAlreadyExists(req.swap_id));
        }
        if !invariant_nonzero_hashlock(&req.secret_hash) {
            return Err(EscrowError::InvalidSecretHash);
        }
        invariant_amount_matches(req.amount, ctx.value)?;
        if let Some(terms) = &req.terms {
            invariant_counter_terms(terms)?;
        }
        self.policy.check_timelock(req.timelock)?;
        let unlock = unlock_time(now, req.timelock)?;

        self.bank.transfer(&ctx.sender, &self.address, req.amount)?;

        let swap = Swap {
            swap_id: req.swap_id,
            secret_hash: req.secret_hash,
            maker: ctx.sender,
            taker: req.taker,
            amount: req.amount,
            terms: req.terms,
            created_at: now,
            unlock_time: unlock,
            state: SwapState::Open,
            correlation_ref: req.correlation_ref,
            revealed_secret: None,
            rescued: false,
        };

        {
            let mut state = self.state.write();
            if state.swaps.contains_key(&req.swap_id) {
                // Claimed by a call that re-entered during the deposit.
                drop(state);
                if let Err(e) = self.bank.transfer(&self.address, &ctx.sender, req.amount) {
                    error!(
                        swap_id = %short_hex(&req.swap_id),
                        error = %e,
                        "[xs-01] Failed to return deposit for duplicate swap id"
                    );
                }
                return Err(EscrowError::SwapAlreadyExists(req.swap_id));
            }
            state.swaps.insert(req.swap_id, swap.clone());
        }

        self.emit(
            now,
            SwapEvent::SwapCreated {
                chain: self.chain,
                escrow: self.address,
                swap_id: swap.swap_id,
                secret_hash: swap.secret_hash,
                maker: swap.maker,
                taker: swap.taker,
                amount: swap.amount,
                terms: swap.terms,
                unlock_time: swap.unlock_time,
                correlation_ref: swap.correlation_ref,
            },
        );
        metrics::record_swap_created(&self.chain_label);
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap.swap_id),
            amount = swap.amount,
            unlock_time = swap.unlock_time,
            "[xs-01] Swap opened"
        );
        Ok(swap)
    }

    fn settle_completion(
        &self,
        claimant: Claimant,
        swap_id: Hash,
        secret: Secret,
    ) -> EscrowResult<Swap> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();

        let (recipient, amount) = {
            let mut state = self.state.write();
            let swap = state
                .swaps
                .get_mut(&swap_id)
                .ok_or(EscrowError::SwapDoesNotExist(swap_id))?;
            if swap.state != SwapState::Open {
                return Err(EscrowError::SwapNotOpen { state: swap.state });
            }
            if !invariant_secret_matches(&secret, &swap.secret_hash) {
                return Err(EscrowError::InvalidSecret);
            }
            let recipient = self.authorize_claim(swap, claimant)?;

            swap.state = SwapState::Completed;
            swap.revealed_secret = Some(secret);
            (recipient, swap.amount)
        };

        if let Err(e) = self.bank.transfer(&self.address, &recipient, amount) {
            self.restore_open(&swap_id);
            return Err(e.into());
        }

        let path = match claimant {
            Claimant::Local { .. } => CompletionPath::Direct,
            Claimant::Relay(_) => CompletionPath::Relayed,
        };
        self.emit(
            now,
            SwapEvent::SwapCompleted {
                chain: self.chain,
                escrow: self.address,
                swap_id,
                secret,
                recipient,
                amount,
            },
        );
        metrics::record_swap_completed(&self.chain_label, path.as_str());
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap_id),
            recipient = %short_hex(&recipient),
            path = path.as_str(),
            "[xs-01] Swap completed"
        );
        self.snapshot(&swap_id)
    }

    /// Resolves the recipient of a claim, or rejects the claimant.
    fn authorize_claim(&self, swap: &Swap, claimant: Claimant) -> EscrowResult<Address> {
        match claimant {
            Claimant::Relay(origin) => {
                if self.trusted_relay != Some(origin) {
                    return Err(EscrowError::UntrustedOrigin(origin));
                }
                Ok(swap.taker)
            }
            Claimant::Local { caller, target } => {
                if self.policy.claim_rule == ClaimRule::TakerOnly && caller != swap.taker {
                    return Err(EscrowError::Unauthorized { caller });
                }
                Ok(target
                    .filter(|t| *t != ZERO_ADDRESS)
                    .unwrap_or(swap.taker))
            }
        }
    }

    fn cancel(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Swap> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();

        let (maker, amount) = {
            let mut state = self.state.write();
            let swap = state
                .swaps
                .get_mut(&swap_id)
                .ok_or(EscrowError::SwapDoesNotExist(swap_id))?;
            if swap.state != SwapState::Open {
                return Err(EscrowError::SwapNotOpen { state: swap.state });
            }
            require_elapsed(now, swap.unlock_time)?;
            if ctx.sender != swap.maker {
                return Err(EscrowError::Unauthorized { caller: ctx.sender });
            }
            swap.state = SwapState::Cancelled;
            (swap.maker, swap.amount)
        };

        if let Err(e) = self.bank.transfer(&self.address, &maker, amount) {
            self.restore_open(&swap_id);
            return Err(e.into());
        }

        self.emit(
            now,
            SwapEvent::SwapCancelled {
                chain: self.chain,
                escrow: self.address,
                swap_id,
                maker,
                amount,
            },
        );
        metrics::record_swap_cancelled(&self.chain_label);
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap_id),
            amount,
            "[xs-01] Swap cancelled"
        );
        self.snapshot(&swap_id)
    }

    fn rescue(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Amount> {
        let _tx = self.tx_guard.lock();
        let now = self.clock.now();

        let amount = {
            let mut state = self.state.write();
            let swap = state
                .swaps
                .get_mut(&swap_id)
                .ok_or(EscrowError::SwapDoesNotExist(swap_id))?;
            if swap.state != SwapState::Open {
                return Err(EscrowError::SwapNotOpen { state: swap.state });
            }
            require_elapsed(now, rescue_available_at(swap, self.policy.rescue_delay))?;
            if ctx.sender != self.owner {
                return Err(EscrowError::Unauthorized { caller: ctx.sender });
            }
            swap.state = SwapState::Cancelled;
            swap.rescued = true;
            swap.amount
        };

        if let Err(e) = self.bank.transfer(&self.address, &self.owner, amount) {
            self.restore_open(&swap_id);
            return Err(e.into());
        }

        self.emit(
            now,
            SwapEvent::FundsRescued {
                chain: self.chain,
                escrow: self.address,
                swap_id,
                owner: self.owner,
                amount,
            },
        );
        metrics::record_funds_rescued(&self.chain_label);
        info!(
            chain = %self.chain,
            swap_id = %short_hex(&swap_id),
            amount,
            "[xs-01] Funds rescued"
        );
        Ok(amount)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Undo an exit transition whose transfer failed.
    fn restore_open(&self, swap_id: &Hash) {
        if let Some(swap) = self.state.write().swaps.get_mut(swap_id) {
            swap.state = SwapState::Open;
            swap.revealed_secret = None;
            swap.rescued = false;
        }
    }

    fn snapshot(&self, swap_id: &Hash) -> EscrowResult<Swap> {
        self.state
            .read()
            .swaps
            .get(swap_id)
            .cloned()
            .ok_or(EscrowError::SwapDoesNotExist(*swap_id))
    }

    fn emit(&self, now: Timestamp, event: SwapEvent) {
        self.state.write().log.append(now, event.clone());
        if let Some(sink) = &self.sink {
            sink.emit(&event);
        }
    }

    /// Count and log a rejection, then pass the result through.
    fn observe<T>(&self, op: &'static str, swap_id: &Hash, result: EscrowResult<T>) -> EscrowResult<T> {
        if let Err(e) = &result {
            metrics::record_rejection(&self.chain_label, e.category().as_str());
            debug!(
                chain = %self.chain,
                op,
                swap_id = %short_hex(swap_id),
                error = %e,
                "[xs-01] Call rejected"
            );
        }
        result
    }
}

impl<B, C> EscrowApi for EscrowLedger<B, C>
where
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

    fn policy(&self) -> LedgerPolicy {
        self.policy.clone()
    }

    fn ledger_time(&self) -> Timestamp {
        self.clock.now()
    }

    fn create_swap(&self, ctx: CallContext, request: CreateSwapRequest) -> EscrowResult<Swap> {
        let result = self.open_swap(
            ctx,
            OpenSwap {
                swap_id: request.swap_id,
                secret_hash: request.secret_hash,
                taker: request.taker,
                amount: request.amount,
                terms: Some(request.terms),
                timelock: request.timelock,
                correlation_ref: request.correlation_ref,
            },
        );
        self.observe("create_swap", &request.swap_id, result)
    }

    fn create_native_swap(
        &self,
        ctx: CallContext,
        request: NativeSwapRequest,
    ) -> EscrowResult<Swap> {
        let result = self.open_swap(
            ctx,
            OpenSwap {
                swap_id: request.swap_id,
                secret_hash: request.secret_hash,
                taker: request.taker,
                amount: ctx.value,
                terms: None,
                timelock: request.timelock,
                correlation_ref: ZERO_HASH,
            },
        );
        self.observe("create_native_swap", &request.swap_id, result)
    }

    fn complete_swap(&self, ctx: CallContext, swap_id: Hash, secret: Secret) -> EscrowResult<Swap> {
        let claimant = Claimant::Local {
            caller: ctx.sender,
            target: None,
        };
        let result = self.settle_completion(claimant, swap_id, secret);
        self.observe("complete_swap", &swap_id, result)
    }

    fn complete_swap_to(
        &self,
        ctx: CallContext,
        swap_id: Hash,
        secret: Secret,
        target: Address,
    ) -> EscrowResult<Swap> {
        let claimant = Claimant::Local {
            caller: ctx.sender,
            target: Some(target),
        };
        let result = self.settle_completion(claimant, swap_id, secret);
        self.observe("complete_swap_to", &swap_id, result)
    }

    fn complete_swap_relayed(
        &self,
        origin: RemoteOrigin,
        swap_id: Hash,
        secret: Secret,
    ) -> EscrowResult<Swap> {
        let result = self.settle_completion(Claimant::Relay(origin), swap_id, secret);
        self.observe("complete_swap_relayed", &swap_id, result)
    }

    fn cancel_swap(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Swap> {
        let result = self.cancel(ctx, swap_id);
        self.observe("cancel_swap", &swap_id, result)
    }

    fn rescue_funds(&self, ctx: CallContext, swap_id: Hash) -> EscrowResult<Amount> {
        let result = self.rescue(ctx, swap_id);
        self.observe("rescue_funds", &swap_id, result)
    }

    fn get_swap(&self, swap_id: &Hash) -> Option<Swap> {
        self.committed(|state| state.swaps.get(swap_id).cloned())
    }

    fn swap_state(&self, swap_id: &Hash) -> SwapState {
        self.committed(|state| state.swaps.get(swap_id).map(|s| s.state))
            .unwrap_or_default()
    }

    fn can_cancel(&self, swap_id: &Hash) -> bool {
        let now = self.clock.now();
        self.committed(|state| state.swaps.get(swap_id).is_some_and(|s| can_cancel(s, now)))
    }

    fn is_valid_secret(&self, swap_id: &Hash, candidate: &Secret) -> bool {
        self.committed(|state| {
            state
                .swaps
                .get(swap_id)
                .is_some_and(|s| invariant_secret_matches(candidate, &s.secret_hash))
        })
    }

    fn revealed_secret(&self, swap_id: &Hash) -> Option<Secret> {
        self.committed(|state| state.swaps.get(swap_id).and_then(|s| s.revealed_secret))
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`EscrowLedger`].
pub struct EscrowLedgerBuilder {
    chain: ChainId,
    address: Address,
    owner: Address,
    policy: Option<LedgerPolicy>,
    trusted_relay: Option<RemoteOrigin>,
    sink: Option<Arc<dyn EventSink>>,
}

impl EscrowLedgerBuilder {
    /// Start configuring a ledger deployed at `address` on `chain`.
    pub fn new(chain: ChainId, address: Address, owner: Address) -> Self {
        Self {
            chain,
            address,
            owner,
            policy: None,
            trusted_relay: None,
            sink: None,
        }
    }

    /// Policy to enforce. Defaults to the source policy on Ethereum and
    /// the destination policy elsewhere.
    pub fn policy(mut self, policy: LedgerPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Accept relayed completions from `origin`.
    pub fn trusted_relay(mut self, origin: RemoteOrigin) -> Self {
        self.trusted_relay = Some(origin);
        self
    }

    /// Publish events to `sink` in addition to the ledger's own log.
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Finish with the chain's bank and clock.
    pub fn build<B, C>(self, bank: Arc<B>, clock: Arc<C>) -> Result<EscrowLedger<B, C>, PolicyError>
    where
        B: NativeBank,
        C: LedgerClock,
    {
        if self.address == ZERO_ADDRESS {
            return Err(PolicyError::ZeroAddress { field: "address" });
        }
        if self.owner == ZERO_ADDRESS {
            return Err(PolicyError::ZeroAddress { field: "owner" });
        }
        let policy = self.policy.unwrap_or_else(|| match self.chain {
            ChainId::Ethereum => LedgerPolicy::ethereum_source(),
            _ => LedgerPolicy::polkadot_destination(),
        });

        info!(
            chain = %self.chain,
            address = %short_hex(&self.address),
            role = ?policy.role,
            "[xs-01] Escrow ledger deployed"
        );

        Ok(EscrowLedger {
            address: self.address,
            chain: self.chain,
            chain_label: self.chain.to_string(),
            owner: self.owner,
            policy,
            trusted_relay: self.trusted_relay,
            bank,
            clock,
            sink: self.sink,
            state: RwLock::new(LedgerState::default()),
            tx_guard: ReentrantMutex::new(()),
        })
    }
}
