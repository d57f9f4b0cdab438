//! Source-side loop: executes relayed calls and returns acknowledgements.

use std::sync::Arc;

use shared_types::{short_hex, AuthenticatedMessage};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use xs_01_escrow_ledger::EscrowApi;
use xs_02_secret_relay::{
    CrossChainTransport, DeliveryAck, DeliveryOutcome, RelayCall, RelayReceiver, RelayResult,
};
use xs_telemetry::{record_envelope_routed, TaskGauge};

/// Feeds inbound relay calls to a [`RelayReceiver`].
pub struct RelayCallHandler<E: EscrowApi, T: CrossChainTransport<DeliveryAck>> {
    receiver: Arc<RelayReceiver<E>>,
    acks: Arc<T>,
    inbox: UnboundedReceiver<AuthenticatedMessage<RelayCall>>,
}

impl<E: EscrowApi, T: CrossChainTransport<DeliveryAck>> RelayCallHandler<E, T> {
    /// Create a new handler.
    pub fn new(
        receiver: Arc<RelayReceiver<E>>,
        acks: Arc<T>,
        inbox: UnboundedReceiver<AuthenticatedMessage<RelayCall>>,
    ) -> Self {
        Self {
            receiver,
            acks,
            inbox,
        }
    }

    /// Execute one call and send its acknowledgement.
    pub fn process(&self, call: &AuthenticatedMessage<RelayCall>) -> RelayResult<DeliveryOutcome> {
        let ack = self.receiver.handle(call)?;
        let outcome = ack.payload.outcome.clone();
        self.acks.dispatch(ack)?;
        record_envelope_routed("relay_call");
        Ok(outcome)
    }

    /// Run the handler loop until the channel closes or `shutdown` fires.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let _running = TaskGauge::start();
        info!("[xs-02] Relay call handler started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                call = self.inbox.recv() => match call {
                    Some(call) => match self.process(&call) {
                        Ok(outcome) => {
                            debug!(
                                swap_id = %short_hex(&call.payload.swap_id),
                                %outcome,
                                "[xs-02] Acknowledgement sent"
                            );
                        }
                        Err(e) => {
                            warn!(
                                swap_id = %short_hex(&call.payload.swap_id),
                                error = %e,
                                "[xs-02] Relay call dropped"
                            );
                        }
                    },
                    None => break,
                },
                _ = shutdown.changed() => {}
            }
        }

        info!("[xs-02] Relay call handler stopped");
    }
}
