//! # Relay Watcher
//!
//! Turns `SwapCompleted` events of the paired escrow into relay sends, with
//! an operator account paying the current fee.

use crate::domain::{Message, RelayError, RelayResult};
use crate::ports::SecretRelayApi;
use shared_bus::{EventFilter, EventTopic, Subscription, SwapEvent};
use shared_types::{short_hex, Address};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use xs_01_escrow_ledger::CallContext;

/// Background driver for one relay.
pub struct RelayWatcher<R: SecretRelayApi> {
    relay: Arc<R>,
    operator: Address,
}

impl<R: SecretRelayApi> RelayWatcher<R> {
    /// Watch for `relay`, paying fees from `operator`.
    pub fn new(relay: Arc<R>, operator: Address) -> Self {
        Self { relay, operator }
    }

    /// Escrow events of the paired escrow; `None` until the bridge is
    /// configured.
    pub fn filter(&self) -> Option<EventFilter> {
        let bridge = self.relay.bridge()?;
        Some(
            EventFilter::topics(vec![EventTopic::Escrow])
                .on_chain(self.relay.chain())
                .from_emitter(bridge.local_escrow),
        )
    }

    /// React to one event. Returns `None` for events the relay ignores.
    pub fn handle_event(&self, event: &SwapEvent) -> Option<RelayResult<Message>> {
        let SwapEvent::SwapCompleted {
            chain,
            escrow,
            swap_id,
            secret,
            ..
        } = event
        else {
            return None;
        };
        let bridge = self.relay.bridge()?;
        if *chain != self.relay.chain() || *escrow != bridge.local_escrow {
            return None;
        }

        let ctx = CallContext::payable(self.operator, self.relay.xcm_fee());
        let result = self.relay.send(ctx, *swap_id, *secret);
        match &result {
            Ok(_) => {}
            Err(RelayError::SecretAlreadyPropagated) => {
                debug!(swap_id = %short_hex(swap_id), "[xs-02] Secret already relayed");
            }
            Err(e) => {
                warn!(
                    swap_id = %short_hex(swap_id),
                    error = %e,
                    "[xs-02] Failed to relay secret"
                );
            }
        }
        Some(result)
    }

    /// Consume `subscription` until it closes or `shutdown` fires.
    pub async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!(chain = %self.relay.chain(), "[xs-02] Relay watcher started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => {
                        self.handle_event(&event);
                    }
                    None => break,
                },
                _ = shutdown.changed() => {}
            }
        }
        info!(chain = %self.relay.chain(), "[xs-02] Relay watcher stopped");
    }
}
