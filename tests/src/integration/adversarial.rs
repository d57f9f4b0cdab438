//! # Adversarial Envelopes
//!
//! Replayed, tampered, stale, misaddressed and forged envelopes on both
//! directions of the relay. None of them may move value.

#[cfg(test)]
mod tests {
    use shared_types::{
        AuthenticatedMessage, ChainId, Hash, RemoteOrigin, VerificationResult, MAX_AGE,
    };
    use xs_01_escrow_ledger::{CallContext, EscrowApi, EscrowError, NativeBank, SwapState};
    use xs_02_secret_relay::{
        DeliveryAck, DeliveryOutcome, RelayCall, RelayError, SecretRelayApi,
    };

    use crate::integration::fixtures::{TestNetwork, KEY, ONE, RESOLVER, SECRET, STRANGER};

    /// Both legs locked, secret revealed and relayed; returns the swap id and
    /// the intercepted call.
    fn intercepted_call() -> (TestNetwork, Hash, AuthenticatedMessage<RelayCall>) {
        let mut net = TestNetwork::deploy();
        let swap_id = net.lock_both_legs(&SECRET);
        net.reveal_on_destination(swap_id, SECRET);

        let relay = &net.network.relay;
        let operator = net.config().deployment.operator;
        relay
            .send(
                CallContext::payable(operator, relay.xcm_fee()),
                swap_id,
                SECRET,
            )
            .unwrap();
        let call = net.channels.relay_calls.try_recv().unwrap();
        (net, swap_id, call)
    }

    fn ack_from(
        net: &TestNetwork,
        origin: RemoteOrigin,
        call: &AuthenticatedMessage<RelayCall>,
        key: &[u8],
    ) -> AuthenticatedMessage<DeliveryAck> {
        AuthenticatedMessage::new(
            origin,
            ChainId::Polkadot,
            net.network.source.escrow.ledger_time(),
            DeliveryAck {
                swap_id: call.payload.swap_id,
                outcome: DeliveryOutcome::Completed,
            },
        )
        .with_correlation(call.correlation_id)
        .sign(key)
        .unwrap()
    }

    fn source_state(net: &TestNetwork, swap_id: &Hash) -> SwapState {
        net.network.source.escrow.swap_state(swap_id)
    }

    // =============================================================================
    // RELAY CALLS
    // =============================================================================

    #[test]
    fn test_replayed_call_rejected() {
        let (net, _, call) = intercepted_call();
        let receiver = &net.network.receiver;

        receiver.handle(&call).unwrap();
        assert!(matches!(
            receiver.handle(&call),
            Err(RelayError::Rejected(VerificationResult::ReplayDetected { .. }))
        ));
        assert_eq!(net.network.source.bank.balance_of(&RESOLVER), ONE);
    }

    #[test]
    fn test_tampered_call_rejected_without_burning_nonce() {
        let (net, swap_id, call) = intercepted_call();
        let receiver = &net.network.receiver;

        let mut tampered = call.clone();
        tampered.payload.secret = [0x11; 32];
        assert!(matches!(
            receiver.handle(&tampered),
            Err(RelayError::Rejected(VerificationResult::InvalidSignature))
        ));
        assert_eq!(source_state(&net, &swap_id), SwapState::Open);

        let ack = receiver.handle(&call).unwrap();
        assert_eq!(ack.payload.outcome, DeliveryOutcome::Completed);
    }

    #[test]
    fn test_call_signed_with_wrong_key_rejected() {
        let (net, swap_id, call) = intercepted_call();
        let forged = AuthenticatedMessage::new(
            call.origin,
            call.destination,
            call.timestamp,
            call.payload.clone(),
        )
        .sign(b"not-the-relay-key")
        .unwrap();

        assert!(matches!(
            net.network.receiver.handle(&forged),
            Err(RelayError::Rejected(VerificationResult::InvalidSignature))
        ));
        assert_eq!(source_state(&net, &swap_id), SwapState::Open);
    }

    #[test]
    fn test_stale_call_rejected() {
        let (net, swap_id, call) = intercepted_call();
        net.advance(MAX_AGE + net.config().relay.clock_skew_secs + 1);

        assert!(matches!(
            net.network.receiver.handle(&call),
            Err(RelayError::Rejected(
                VerificationResult::TimestampOutOfRange { .. }
            ))
        ));
        assert_eq!(source_state(&net, &swap_id), SwapState::Open);
    }

    #[test]
    fn test_misaddressed_call_rejected() {
        let (net, swap_id, call) = intercepted_call();
        let redirected = AuthenticatedMessage::new(
            call.origin,
            ChainId::Parachain(1000),
            call.timestamp,
            call.payload.clone(),
        )
        .sign(&KEY)
        .unwrap();

        assert!(matches!(
            net.network.receiver.handle(&redirected),
            Err(RelayError::Rejected(
                VerificationResult::WrongDestination { .. }
            ))
        ));
        assert_eq!(source_state(&net, &swap_id), SwapState::Open);
    }

    #[test]
    fn test_untrusted_origin_cannot_complete_directly() {
        let (net, swap_id, _) = intercepted_call();
        let imposter = RemoteOrigin::new(ChainId::Polkadot, STRANGER);

        assert_eq!(
            net.network
                .source
                .escrow
                .complete_swap_relayed(imposter, swap_id, SECRET),
            Err(EscrowError::UntrustedOrigin(imposter))
        );
        assert_eq!(source_state(&net, &swap_id), SwapState::Open);
        assert_eq!(net.network.source.bank.balance_of(&RESOLVER), 0);
    }

    // =============================================================================
    // ACKNOWLEDGEMENTS
    // =============================================================================

    #[test]
    fn test_forged_ack_rejected() {
        let (net, swap_id, call) = intercepted_call();
        let forged = ack_from(
            &net,
            RemoteOrigin::new(ChainId::Ethereum, STRANGER),
            &call,
            &KEY,
        );

        assert!(matches!(
            net.network.relay.confirm_delivery(&forged),
            Err(RelayError::Rejected(
                VerificationResult::UntrustedOrigin { .. }
            ))
        ));
        assert!(!net.network.relay.get_message(&swap_id).unwrap().processed);
    }

    #[test]
    fn test_ack_with_foreign_correlation_rejected() {
        let (net, swap_id, call) = intercepted_call();
        let identity = net.network.receiver.identity();
        let stray = AuthenticatedMessage::new(
            identity,
            ChainId::Polkadot,
            net.network.source.escrow.ledger_time(),
            DeliveryAck {
                swap_id,
                outcome: DeliveryOutcome::Completed,
            },
        )
        .sign(&KEY)
        .unwrap();

        assert_eq!(
            net.network.relay.confirm_delivery(&stray),
            Err(RelayError::CorrelationMismatch(swap_id))
        );

        let genuine = ack_from(&net, identity, &call, &KEY);
        assert!(net.network.relay.confirm_delivery(&genuine).unwrap().processed);
    }

    #[test]
    fn test_replayed_ack_rejected() {
        let (net, _, call) = intercepted_call();
        let ack = net.network.receiver.handle(&call).unwrap();

        assert!(net.network.relay.confirm_delivery(&ack).unwrap().processed);
        assert!(matches!(
            net.network.relay.confirm_delivery(&ack),
            Err(RelayError::Rejected(VerificationResult::ReplayDetected { .. }))
        ));
    }
}
