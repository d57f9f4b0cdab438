//! # Shared Bus - Chain Event Feeds
//!
//! Each simulated chain gets one [`InMemoryEventBus`]: its public event
//! feed. Escrow ledgers and relays publish [`SwapEvent`]s into it, and
//! resolvers, wallets and the relay watcher read from it through an
//! [`EventFilter`].
//!
//! ```text
//!   EscrowLedger ──┐                         ┌──→ RelayWatcher
//!                  ├──publish──→ feed ──subscribe──┤
//!   SecretRelay  ──┘                         └──→ resolver / wallet
//! ```
//!
//! Delivery is best-effort. A subscriber that falls more than the channel
//! capacity behind skips events and sees the count through
//! [`Subscription::skipped`]; the ledger log remains complete.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, SwapEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Events buffered per subscriber before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
