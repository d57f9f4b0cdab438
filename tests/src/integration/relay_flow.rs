//! # Relay Flows
//!
//! Secret revealed on the destination ledger, carried by the relay to the
//! source ledger, acknowledged back.
//!
//! ```text
//! Maker ──complete_swap──→ destination escrow ──SwapCompleted──→ relay
//!   relay ──RelayCall──→ receiver ──complete_swap_relayed──→ source escrow
//!   receiver ──DeliveryAck──→ relay (message processed)
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_bus::{EventFilter, EventSubscriber, EventTopic, SwapEvent};
    use shared_types::{Hash, VerificationResult};
    use swap_runtime::handlers::{AckHandler, RelayCallHandler};
    use swap_runtime::{ChainClocks, SwapRuntime};
    use tokio::sync::mpsc::unbounded_channel;
    use xs_01_escrow_ledger::{
        CallContext, EscrowApi, LedgerClock, ManualClock, NativeBank, SwapState,
    };
    use xs_02_secret_relay::{DeliveryOutcome, Message, RelayError, SecretRelayApi};

    use crate::integration::fixtures::{
        fund, lock_both_legs, reveal_on_destination, swap_id_for, test_config, TestNetwork,
        MAKER, ONE, RESOLVER, SECRET, STRANGER,
    };

    fn operator_send(net: &TestNetwork, swap_id: Hash) -> Result<Message, RelayError> {
        let relay = &net.network.relay;
        let operator = net.config().deployment.operator;
        relay.send(
            CallContext::payable(operator, relay.xcm_fee()),
            swap_id,
            SECRET,
        )
    }

    /// Deliver the pending relay call, returning the outcome on the source
    /// ledger.
    fn deliver_call(net: &mut TestNetwork) -> DeliveryOutcome {
        let call = net.channels.relay_calls.try_recv().unwrap();
        let handler = RelayCallHandler::new(
            Arc::clone(&net.network.receiver),
            Arc::clone(&net.network.ack_transport),
            unbounded_channel().1,
        );
        handler.process(&call).unwrap()
    }

    /// Apply the pending acknowledgement.
    fn deliver_ack(net: &mut TestNetwork) -> Message {
        let ack = net.channels.acks.try_recv().unwrap();
        let handler = AckHandler::new(Arc::clone(&net.network.relay), unbounded_channel().1);
        handler.process(&ack).unwrap()
    }

    // =============================================================================
    // END TO END
    // =============================================================================

    #[tokio::test]
    async fn test_runtime_relays_secret_to_source_leg() {
        let config = test_config();
        let fee = config.relay.fees.fee;
        let operator_funds = config.relay.operator_funds;
        let runtime = SwapRuntime::new(config, ChainClocks::<ManualClock>::independent()).unwrap();
        let network = runtime.network();
        let operator = network.config().deployment.operator;
        fund(&network);

        let mut source_events = network
            .source
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Escrow]));
        let mut relay_events = network
            .destination
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Relay]));
        runtime.start().unwrap();

        let swap_id = lock_both_legs(&network, &SECRET);
        reveal_on_destination(&network, swap_id, SECRET);

        let recipient = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match source_events.recv().await {
                    Some(SwapEvent::SwapCompleted { recipient, .. }) => break recipient,
                    Some(_) => continue,
                    None => panic!("source bus closed"),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(recipient, RESOLVER);
        assert_eq!(network.source.bank.balance_of(&RESOLVER), ONE);
        assert_eq!(
            network.source.escrow.swap_state(&swap_id),
            SwapState::Completed
        );

        let mut paid_fee = None;
        let processed = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match relay_events.recv().await {
                    Some(SwapEvent::MessageSent { fee, .. }) => paid_fee = Some(fee),
                    Some(SwapEvent::MessageProcessed { swap_id, .. }) => break swap_id,
                    Some(_) => continue,
                    None => panic!("destination bus closed"),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(processed, swap_id);
        assert_eq!(paid_fee, Some(fee));
        assert!(network.relay.get_message(&swap_id).unwrap().processed);
        assert_eq!(network.relay.accrued_fees(), fee);
        assert_eq!(
            network.destination.bank.balance_of(&operator),
            operator_funds - fee
        );

        runtime.shutdown().await;
    }

    #[test]
    fn test_manual_delivery_and_acknowledgement() {
        let mut net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);

        let sent = operator_send(&net, swap_id).unwrap();
        assert!(!sent.processed);
        assert!(net.network.relay.is_secret_propagated(&SECRET));

        assert_eq!(deliver_call(&mut net), DeliveryOutcome::Completed);
        assert_eq!(net.network.source.bank.balance_of(&RESOLVER), ONE);

        let confirmed = deliver_ack(&mut net);
        assert!(confirmed.processed);
        assert_eq!(confirmed.correlation_id, sent.correlation_id);
    }

    // =============================================================================
    // CHAIN CLOCK DRIFT
    // =============================================================================

    const EPOCH: u64 = 1_700_000_000;

    /// Reveal, relay, deliver and acknowledge with the chains' clocks apart.
    fn settle_across_drift(net: &mut TestNetwork) {
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);
        let sent = operator_send(net, swap_id).unwrap();

        assert_eq!(deliver_call(net), DeliveryOutcome::Completed);
        assert_eq!(
            net.network.source.escrow.swap_state(&swap_id),
            SwapState::Completed
        );
        assert_eq!(net.network.source.bank.balance_of(&RESOLVER), ONE);

        let confirmed = deliver_ack(net);
        assert!(confirmed.processed);
        assert_eq!(confirmed.correlation_id, sent.correlation_id);
    }

    #[test]
    fn test_delivery_with_destination_clock_ahead() {
        let mut net = TestNetwork::deploy_with_clocks(EPOCH, EPOCH + 120);
        assert_eq!(net.source_clock.now() + 120, net.destination_clock.now());
        settle_across_drift(&mut net);
    }

    #[test]
    fn test_delivery_with_source_clock_ahead() {
        let mut net = TestNetwork::deploy_with_clocks(EPOCH + 120, EPOCH);
        settle_across_drift(&mut net);
    }

    #[test]
    fn test_drift_beyond_tolerance_rejected_without_settling() {
        let mut config = test_config();
        config.relay.clock_skew_secs = 0;
        let mut net = TestNetwork::deploy_on(config, EPOCH, EPOCH + 120);
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);
        operator_send(&net, swap_id).unwrap();

        let call = net.channels.relay_calls.try_recv().unwrap();
        assert!(matches!(
            net.network.receiver.handle(&call),
            Err(RelayError::Rejected(
                VerificationResult::TimestampOutOfRange { .. }
            ))
        ));
        assert_eq!(
            net.network.source.escrow.swap_state(&swap_id),
            SwapState::Open
        );
        assert!(net.channels.acks.try_recv().is_err());
    }

    // =============================================================================
    // DELIVERY OUTCOMES
    // =============================================================================

    #[test]
    fn test_direct_claim_before_delivery_settles_once() {
        let mut net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);
        operator_send(&net, swap_id).unwrap();

        net.network
            .source
            .escrow
            .complete_swap(CallContext::call(RESOLVER), swap_id, SECRET)
            .unwrap();

        assert_eq!(deliver_call(&mut net), DeliveryOutcome::AlreadySettled);
        assert!(deliver_ack(&mut net).processed);
        assert_eq!(net.network.source.bank.balance_of(&RESOLVER), ONE);
    }

    #[test]
    fn test_failed_delivery_leaves_message_pending() {
        let mut net = TestNetwork::deploy();
        let swap_id = crate::integration::fixtures::lock_destination(&net.network, &SECRET);
        net.reveal_on_destination(swap_id, SECRET);
        operator_send(&net, swap_id).unwrap();

        assert!(matches!(deliver_call(&mut net), DeliveryOutcome::Failed(_)));
        let message = deliver_ack(&mut net);
        assert!(!message.processed);
        assert!(net.network.relay.is_secret_propagated(&SECRET));
    }

    // =============================================================================
    // SEND GUARDS AND FEES
    // =============================================================================

    #[test]
    fn test_send_guards() {
        let mut net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        let relay = Arc::clone(&net.network.relay);
        let operator = net.config().deployment.operator;

        assert_eq!(
            operator_send(&net, swap_id),
            Err(RelayError::SecretNotRevealed(swap_id))
        );
        assert!(!relay.is_secret_propagated(&SECRET));

        net.reveal_on_destination(swap_id, SECRET);
        let short = relay.send(
            CallContext::payable(operator, relay.xcm_fee() - 1),
            swap_id,
            SECRET,
        );
        assert!(matches!(short, Err(RelayError::InsufficientFee { .. })));

        operator_send(&net, swap_id).unwrap();
        assert_eq!(
            operator_send(&net, swap_id),
            Err(RelayError::SecretAlreadyPropagated)
        );
        assert!(net.channels.relay_calls.try_recv().is_ok());
        assert!(net.channels.relay_calls.try_recv().is_err());
        assert_eq!(relay.message_count(), 1);
    }

    #[test]
    fn test_owner_withdraws_fees() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);
        operator_send(&net, swap_id).unwrap();

        let relay = &net.network.relay;
        let owner = net.config().deployment.owner;
        let fee = relay.xcm_fee();

        assert_eq!(
            relay.withdraw_fees(CallContext::call(STRANGER)),
            Err(RelayError::Unauthorized { caller: STRANGER })
        );
        assert_eq!(relay.withdraw_fees(CallContext::call(owner)), Ok(fee));
        assert_eq!(net.network.destination.bank.balance_of(&owner), fee);
        assert_eq!(
            relay.withdraw_fees(CallContext::call(owner)),
            Err(RelayError::NothingToWithdraw)
        );
    }

    #[test]
    fn test_maker_claim_pays_maker_on_destination() {
        let net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        assert_eq!(swap_id, swap_id_for(&SECRET));
        net.reveal_on_destination(swap_id, SECRET);
        assert_eq!(net.network.destination.bank.balance_of(&MAKER), 5 * ONE);
    }
}
