//! Publishes ledger events onto the chain's event bus.

use crate::ports::EventSink;
use shared_bus::{EventPublisher, InMemoryEventBus, SwapEvent};

impl EventSink for InMemoryEventBus {
    fn emit(&self, event: &SwapEvent) {
        self.publish(event.clone());
    }
}
