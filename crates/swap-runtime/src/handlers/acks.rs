//! Relay-side loop: applies delivery acknowledgements.

use std::sync::Arc;

use shared_types::{short_hex, AuthenticatedMessage};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::watch;
use tracing::{info, warn};
use xs_02_secret_relay::{DeliveryAck, Message, RelayResult, SecretRelayApi};
use xs_telemetry::{record_envelope_routed, TaskGauge};

/// Feeds acknowledgements to the relay's `confirm_delivery`.
pub struct AckHandler<R: SecretRelayApi> {
    relay: Arc<R>,
    inbox: UnboundedReceiver<AuthenticatedMessage<DeliveryAck>>,
}

impl<R: SecretRelayApi> AckHandler<R> {
    /// Create a new handler.
    pub fn new(relay: Arc<R>, inbox: UnboundedReceiver<AuthenticatedMessage<DeliveryAck>>) -> Self {
        Self { relay, inbox }
    }

    /// Apply one acknowledgement.
    pub fn process(&self, ack: &AuthenticatedMessage<DeliveryAck>) -> RelayResult<Message> {
        let message = self.relay.confirm_delivery(ack)?;
        record_envelope_routed("delivery_ack");
        Ok(message)
    }

    /// Run the handler loop until the channel closes or `shutdown` fires.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let _running = TaskGauge::start();
        info!(chain = %self.relay.chain(), "[xs-02] Ack handler started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                ack = self.inbox.recv() => match ack {
                    Some(ack) => {
                        if let Err(e) = self.process(&ack) {
                            warn!(
                                swap_id = %short_hex(&ack.payload.swap_id),
                                error = %e,
                                "[xs-02] Acknowledgement rejected"
                            );
                        }
                    }
                    None => break,
                },
                _ = shutdown.changed() => {}
            }
        }

        info!(chain = %self.relay.chain(), "[xs-02] Ack handler stopped");
    }
}
