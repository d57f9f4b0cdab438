//! # Event Subscriber
//!
//! Readers of a chain's event feed. A subscription sees every event
//! published after it was opened and keeps the ones its filter accepts.
//! Events lost to lag are counted, not replayed: the ledger's own log is
//! the authoritative history.

use crate::events::{EventFilter, SwapEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The chain's feed was dropped.
    #[error("Event feed closed")]
    Closed,
}

/// Anything that hands out filtered views of a chain's event feed.
pub trait EventSubscriber: Send + Sync {
    /// Open a subscription that yields only events accepted by `filter`.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// Pull-style reader over a chain's event feed.
pub struct Subscription {
    receiver: broadcast::Receiver<SwapEvent>,
    filter: EventFilter,
    skipped: u64,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<SwapEvent>, filter: EventFilter) -> Self {
        Self {
            receiver,
            filter,
            skipped: 0,
        }
    }

    fn note_lag(&mut self, count: u64) {
        self.skipped = self.skipped.saturating_add(count);
        warn!(
            lagged = count,
            total_skipped = self.skipped,
            "Subscriber fell behind the event feed"
        );
    }

    /// Wait for the next accepted event. `None` once the feed is dropped.
    pub async fn recv(&mut self) -> Option<SwapEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(count)) => self.note_lag(count),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next accepted event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<Option<SwapEvent>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.filter.matches(&event) => return Ok(Some(event)),
                Ok(_) => {}
                Err(TryRecvError::Lagged(count)) => self.note_lag(count),
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Closed) => return Err(SubscriptionError::Closed),
            }
        }
    }

    /// Drain every accepted event currently buffered.
    pub fn drain(&mut self) -> Result<Vec<SwapEvent>, SubscriptionError> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv()? {
            events.push(event);
        }
        Ok(events)
    }

    /// Events dropped because this subscriber lagged.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Filter this subscription applies.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// Push-style reader: a [`Stream`] of accepted events.
pub struct EventStream {
    inner: BroadcastStream<SwapEvent>,
    filter: EventFilter,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<SwapEvent>, filter: EventFilter) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    /// Filter this stream applies. Not named `filter`, which
    /// `StreamExt` already claims for owned streams.
    #[must_use]
    pub fn event_filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = SwapEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let next = match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(next) => next,
            };
            match next {
                None => return Poll::Ready(None),
                Some(Ok(event)) if this.filter.matches(&event) => {
                    return Poll::Ready(Some(event))
                }
                Some(Ok(_)) => {}
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    warn!(lagged = count, "Event stream fell behind the event feed");
                }
            }
        }
    }
}
