//! # Atomic Swap Flows
//!
//! Both legs driven directly through the ledgers, without the relay:
//!
//! 1. Claim with the secret, exactly once
//! 2. The resolver learns the secret from the destination ledger
//! 3. Refunds in timelock order (destination first)
//! 4. Owner rescue after the rescue delay
//! 5. Re-entrant completion from inside the payout

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Weak};

    use parking_lot::Mutex;
    use shared_bus::{EventFilter, EventSubscriber, EventTopic, SwapEvent};
    use shared_types::{keccak256, Address, Amount, ChainId, CounterTerms, TransferError};
    use xs_01_escrow_ledger::{
        CallContext, CreateSwapRequest, EscrowApi, EscrowError, EscrowLedger,
        EscrowLedgerBuilder, EscrowResult, InMemoryBank, ManualClock, NativeBank, Swap,
        SwapState, DAY,
    };

    use crate::integration::fixtures::{
        swap_id_for, TestNetwork, MAKER, ONE, RESOLVER, SECRET, STRANGER,
    };

    // =============================================================================
    // CLAIM
    // =============================================================================

    #[test]
    fn test_taker_claims_once_and_secret_is_published() {
        let net = TestNetwork::deploy();
        let source = &net.network.source;
        let mut sub = source
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Escrow]));

        let swap_id = swap_id_for(&SECRET);
        let request = CreateSwapRequest::new(
            swap_id,
            keccak256(&SECRET),
            RESOLVER,
            ONE,
            CounterTerms {
                counter_amount: 5 * ONE,
                exchange_rate: 5,
            },
            DAY,
        );
        source
            .escrow
            .create_swap(CallContext::payable(MAKER, ONE), request)
            .unwrap();
        assert_eq!(source.escrow.swap_state(&swap_id), SwapState::Open);
        assert_eq!(source.escrow.custodied_balance(), ONE);

        let swap = source
            .escrow
            .complete_swap(CallContext::call(RESOLVER), swap_id, SECRET)
            .unwrap();
        assert_eq!(swap.state, SwapState::Completed);
        assert_eq!(source.bank.balance_of(&RESOLVER), ONE);

        assert!(matches!(
            sub.try_recv().unwrap(),
            Some(SwapEvent::SwapCreated { .. })
        ));
        match sub.try_recv().unwrap() {
            Some(SwapEvent::SwapCompleted {
                swap_id: id,
                secret,
                recipient,
                amount,
                ..
            }) => {
                assert_eq!(id, swap_id);
                assert_eq!(secret, SECRET);
                assert_eq!(recipient, RESOLVER);
                assert_eq!(amount, ONE);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert_eq!(
            source
                .escrow
                .complete_swap(CallContext::call(RESOLVER), swap_id, SECRET),
            Err(EscrowError::SwapNotOpen {
                state: SwapState::Completed
            })
        );

        net.advance(DAY);
        assert_eq!(
            source.escrow.cancel_swap(CallContext::call(MAKER), swap_id),
            Err(EscrowError::SwapNotOpen {
                state: SwapState::Completed
            })
        );
        assert_eq!(source.bank.balance_of(&RESOLVER), ONE);
        assert_eq!(source.escrow.events_for_swap(&swap_id).len(), 2);
    }

    #[test]
    fn test_resolver_learns_secret_from_destination() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        let source = &net.network.source;
        let destination = &net.network.destination;

        assert_eq!(destination.escrow.revealed_secret(&swap_id), None);
        net.reveal_on_destination(swap_id, SECRET);
        assert_eq!(destination.bank.balance_of(&MAKER), 5 * ONE);

        let learned = destination.escrow.revealed_secret(&swap_id).unwrap();
        assert!(source.escrow.is_valid_secret(&swap_id, &learned));
        source
            .escrow
            .complete_swap(CallContext::call(RESOLVER), swap_id, learned)
            .unwrap();

        assert_eq!(source.bank.balance_of(&RESOLVER), ONE);
        assert_eq!(source.escrow.custodied_balance(), 0);
        assert_eq!(destination.escrow.custodied_balance(), 0);
    }

    #[test]
    fn test_wrong_secret_leaves_both_legs_open() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);

        for escrow in [&net.network.source.escrow, &net.network.destination.escrow] {
            let caller = if escrow.chain() == ChainId::Ethereum {
                RESOLVER
            } else {
                MAKER
            };
            assert_eq!(
                escrow.complete_swap(CallContext::call(caller), swap_id, [0x11; 32]),
                Err(EscrowError::InvalidSecret)
            );
            assert_eq!(escrow.swap_state(&swap_id), SwapState::Open);
        }
    }

    // =============================================================================
    // REFUND AND RESCUE
    // =============================================================================

    #[test]
    fn test_refunds_follow_timelock_order() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        let source = &net.network.source;
        let destination = &net.network.destination;

        net.advance(net.destination_timelock());
        assert!(destination.escrow.can_cancel(&swap_id));
        assert!(!source.escrow.can_cancel(&swap_id));
        assert!(matches!(
            source.escrow.cancel_swap(CallContext::call(MAKER), swap_id),
            Err(EscrowError::TimelockNotExpired { .. })
        ));

        destination
            .escrow
            .cancel_swap(CallContext::call(RESOLVER), swap_id)
            .unwrap();
        assert_eq!(destination.bank.balance_of(&RESOLVER), 10 * ONE);

        net.advance(net.source_timelock() - net.destination_timelock());
        assert!(matches!(
            source.escrow.cancel_swap(CallContext::call(STRANGER), swap_id),
            Err(EscrowError::Unauthorized { .. })
        ));
        let refunded = source
            .escrow
            .cancel_swap(CallContext::call(MAKER), swap_id)
            .unwrap();
        assert_eq!(refunded.state, SwapState::Cancelled);
        assert_eq!(source.bank.balance_of(&MAKER), 10 * ONE);
    }

    #[test]
    fn test_owner_rescue_waits_for_delay() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_source(&SECRET);
        let source = &net.network.source;
        let owner = net.config().deployment.owner;
        let delay = net.config().source_policy.rescue_delay;

        net.advance(net.source_timelock() + delay - 1);
        assert!(matches!(
            source.escrow.rescue_funds(CallContext::call(owner), swap_id),
            Err(EscrowError::TimelockNotExpired { .. })
        ));

        net.advance(1);
        assert!(matches!(
            source.escrow.rescue_funds(CallContext::call(MAKER), swap_id),
            Err(EscrowError::Unauthorized { .. })
        ));
        assert_eq!(
            source
                .escrow
                .rescue_funds(CallContext::call(owner), swap_id),
            Ok(ONE)
        );
        assert_eq!(source.bank.balance_of(&owner), ONE);
        assert!(source.escrow.get_swap(&swap_id).unwrap().rescued);
        assert!(matches!(
            source.escrow.cancel_swap(CallContext::call(MAKER), swap_id),
            Err(EscrowError::SwapNotOpen { .. })
        ));
    }

    // =============================================================================
    // RE-ENTRANCY
    // =============================================================================

    type ReentrantLedger = EscrowLedger<ReentrantBank, ManualClock>;

    /// Bank that calls back into the ledger while paying `hook_target`.
    struct ReentrantBank {
        inner: InMemoryBank,
        hook_target: Address,
        ledger: Mutex<Option<Weak<ReentrantLedger>>>,
        nested: Mutex<Vec<EscrowResult<Swap>>>,
    }

    impl NativeBank for ReentrantBank {
        fn balance_of(&self, account: &Address) -> Amount {
            self.inner.balance_of(account)
        }

        fn transfer(
            &self,
            from: &Address,
            to: &Address,
            amount: Amount,
        ) -> Result<(), TransferError> {
            if *to == self.hook_target {
                let ledger = self.ledger.lock().take().and_then(|weak| weak.upgrade());
                if let Some(ledger) = ledger {
                    let swap_id = swap_id_for(&SECRET);
                    let result =
                        ledger.complete_swap(CallContext::call(self.hook_target), swap_id, SECRET);
                    self.nested.lock().push(result);
                }
            }
            self.inner.transfer(from, to, amount)
        }
    }

    #[test]
    fn test_reentrant_completion_pays_once() {
        let bank = Arc::new(ReentrantBank {
            inner: InMemoryBank::with_balances([(MAKER, 10 * ONE)]),
            hook_target: RESOLVER,
            ledger: Mutex::new(None),
            nested: Mutex::new(Vec::new()),
        });
        let ledger: Arc<ReentrantLedger> = Arc::new(
            EscrowLedgerBuilder::new(ChainId::Ethereum, [0xE1; 20], [0x0A; 20])
                .build(bank.clone(), Arc::new(ManualClock::default()))
                .unwrap(),
        );
        *bank.ledger.lock() = Some(Arc::downgrade(&ledger));

        let swap_id = swap_id_for(&SECRET);
        let request = CreateSwapRequest::new(
            swap_id,
            keccak256(&SECRET),
            RESOLVER,
            ONE,
            CounterTerms {
                counter_amount: ONE,
                exchange_rate: 1,
            },
            DAY,
        );
        ledger
            .create_swap(CallContext::payable(MAKER, ONE), request)
            .unwrap();

        let outer = ledger
            .complete_swap(CallContext::call(RESOLVER), swap_id, SECRET)
            .unwrap();
        assert_eq!(outer.state, SwapState::Completed);

        let nested = bank.nested.lock();
        assert_eq!(nested.len(), 1);
        assert_eq!(
            nested[0],
            Err(EscrowError::SwapNotOpen {
                state: SwapState::Completed
            })
        );
        assert_eq!(bank.balance_of(&RESOLVER), ONE);
        assert_eq!(ledger.custodied_balance(), 0);
        assert_eq!(ledger.events_for_swap(&swap_id).len(), 2);
    }
}
