//! In-process transport over an unbounded tokio channel.

use crate::domain::TransportError;
use crate::ports::CrossChainTransport;
use shared_types::{AuthenticatedMessage, ChainId};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::trace;

/// Sending half of a relay link to `destination`.
pub struct ChannelTransport<T> {
    destination: ChainId,
    sender: mpsc::UnboundedSender<AuthenticatedMessage<T>>,
    dispatched: AtomicU64,
}

impl<T> ChannelTransport<T> {
    /// Open a link; the receiver belongs to the sibling chain.
    pub fn channel(destination: ChainId) -> (Self, mpsc::UnboundedReceiver<AuthenticatedMessage<T>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let transport = Self {
            destination,
            sender,
            dispatched: AtomicU64::new(0),
        };
        (transport, receiver)
    }

    /// Chain at the far end.
    pub fn destination(&self) -> ChainId {
        self.destination
    }

    /// Messages handed to the channel so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Whether the far side has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl<T: Send> CrossChainTransport<T> for ChannelTransport<T> {
    fn dispatch(&self, message: AuthenticatedMessage<T>) -> Result<(), TransportError> {
        let nonce = message.nonce;
        self.sender
            .send(message)
            .map_err(|_| TransportError::Disconnected(self.destination))?;
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        trace!(destination = %self.destination, %nonce, "[xs-02] Envelope dispatched");
        Ok(())
    }
}
