//! # Event Publisher
//!
//! Writers of a chain's event feed.
//!
//! Publishing never suspends. Ledger operations run to completion under
//! their own lock and hand the resulting events to the broadcast channel on
//! the way out.

use crate::events::{EventFilter, EventTopic, SwapEvent};
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Anything that accepts events for a chain's feed.
pub trait EventPublisher: Send + Sync {
    /// Broadcast `event`, returning how many subscribers were live.
    fn publish(&self, event: SwapEvent) -> usize;

    /// Events accepted since creation, delivered or not.
    fn events_published(&self) -> u64;
}

/// Broadcast-backed feed for one chain.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SwapEvent>,
    escrow_events: AtomicU64,
    relay_events: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Feed with [`DEFAULT_CHANNEL_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Feed buffering at most `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            escrow_events: AtomicU64::new(0),
            relay_events: AtomicU64::new(0),
            capacity,
        }
    }

    /// Push-style view of the feed.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Live subscriptions and streams.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events accepted under one topic. [`EventTopic::All`] sums both.
    #[must_use]
    pub fn published_on(&self, topic: EventTopic) -> u64 {
        let escrow = self.escrow_events.load(Ordering::Relaxed);
        let relay = self.relay_events.load(Ordering::Relaxed);
        match topic {
            EventTopic::Escrow => escrow,
            EventTopic::Relay => relay,
            EventTopic::All => escrow + relay,
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(
            topics = ?filter.topics,
            chains = ?filter.chains,
            emitters = filter.emitters.len(),
            "Subscription opened"
        );
        Subscription::new(self.sender.subscribe(), filter)
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: SwapEvent) -> usize {
        let topic = event.topic();
        let chain = event.chain();
        let counter = match topic {
            EventTopic::Relay => &self.relay_events,
            _ => &self.escrow_events,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        // send only fails when nobody is subscribed
        let receivers = self.sender.send(event).unwrap_or(0);
        if receivers == 0 {
            trace!(topic = ?topic, chain = %chain, "Event published with no subscribers");
        } else {
            debug!(topic = ?topic, chain = %chain, receivers, "Event published");
        }
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published_on(EventTopic::All)
    }
}
