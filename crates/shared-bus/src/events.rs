//! # Swap Events
//!
//! Every event an escrow ledger or a secret relay emits. Ledgers append
//! these to their own log and publish them here so resolvers, wallets and
//! the relay watcher can react without polling.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, Amount, ChainId, CounterTerms, Hash, Secret, Timestamp};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapEvent {
    // =========================================================================
    // ESCROW LEDGER
    // =========================================================================
    /// Value was locked against a hashlock.
    SwapCreated {
        /// Chain of the emitting ledger.
        chain: ChainId,
        /// Address of the emitting ledger.
        escrow: Address,
        /// Cross-ledger correlation key.
        swap_id: Hash,
        /// Keccak-256 of the secret.
        secret_hash: Hash,
        /// Account that locked the value.
        maker: Address,
        /// Account entitled to claim.
        taker: Address,
        /// Locked value.
        amount: Amount,
        /// Counter-leg terms, when the swap was created with them.
        terms: Option<CounterTerms>,
        /// Earliest time the maker may cancel.
        unlock_time: Timestamp,
        /// Opaque counterpart reference.
        correlation_ref: Hash,
    },

    /// A swap was claimed. Carries the secret, which is now public.
    SwapCompleted {
        /// Chain of the emitting ledger.
        chain: ChainId,
        /// Address of the emitting ledger.
        escrow: Address,
        /// Swap id.
        swap_id: Hash,
        /// Revealed preimage.
        secret: Secret,
        /// Account that received the value.
        recipient: Address,
        /// Released value.
        amount: Amount,
    },

    /// The maker reclaimed an expired swap.
    SwapCancelled {
        /// Chain of the emitting ledger.
        chain: ChainId,
        /// Address of the emitting ledger.
        escrow: Address,
        /// Swap id.
        swap_id: Hash,
        /// Refunded maker.
        maker: Address,
        /// Refunded value.
        amount: Amount,
    },

    /// The ledger owner swept a long-expired swap.
    FundsRescued {
        /// Chain of the emitting ledger.
        chain: ChainId,
        /// Address of the emitting ledger.
        escrow: Address,
        /// Swap id.
        swap_id: Hash,
        /// Ledger owner that received the value.
        owner: Address,
        /// Swept value.
        amount: Amount,
    },

    // =========================================================================
    // SECRET RELAY
    // =========================================================================
    /// A secret was forwarded to the sibling chain.
    MessageSent {
        /// Chain of the emitting relay.
        chain: ChainId,
        /// Address of the emitting relay.
        relay: Address,
        /// Swap id.
        swap_id: Hash,
        /// Forwarded secret.
        secret: Secret,
        /// Chain the call was dispatched to.
        destination: ChainId,
        /// Fee paid for the dispatch.
        fee: Amount,
    },

    /// The sibling chain acknowledged consuming a forwarded secret.
    MessageProcessed {
        /// Chain of the emitting relay.
        chain: ChainId,
        /// Address of the emitting relay.
        relay: Address,
        /// Swap id.
        swap_id: Hash,
    },
}

impl SwapEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::SwapCreated { .. }
            | Self::SwapCompleted { .. }
            | Self::SwapCancelled { .. }
            | Self::FundsRescued { .. } => EventTopic::Escrow,
            Self::MessageSent { .. } | Self::MessageProcessed { .. } => EventTopic::Relay,
        }
    }

    /// Chain of the emitter.
    #[must_use]
    pub fn chain(&self) -> ChainId {
        match self {
            Self::SwapCreated { chain, .. }
            | Self::SwapCompleted { chain, .. }
            | Self::SwapCancelled { chain, .. }
            | Self::FundsRescued { chain, .. }
            | Self::MessageSent { chain, .. }
            | Self::MessageProcessed { chain, .. } => *chain,
        }
    }

    /// Address of the ledger or relay that emitted the event.
    #[must_use]
    pub fn emitter(&self) -> Address {
        match self {
            Self::SwapCreated { escrow, .. }
            | Self::SwapCompleted { escrow, .. }
            | Self::SwapCancelled { escrow, .. }
            | Self::FundsRescued { escrow, .. } => *escrow,
            Self::MessageSent { relay, .. } | Self::MessageProcessed { relay, .. } => *relay,
        }
    }

    /// Swap the event belongs to.
    #[must_use]
    pub fn swap_id(&self) -> Hash {
        match self {
            Self::SwapCreated { swap_id, .. }
            | Self::SwapCompleted { swap_id, .. }
            | Self::SwapCancelled { swap_id, .. }
            | Self::FundsRescued { swap_id, .. }
            | Self::MessageSent { swap_id, .. }
            | Self::MessageProcessed { swap_id, .. } => *swap_id,
        }
    }

    /// Accounts an event concerns, used to index ledger logs by participant.
    #[must_use]
    pub fn participants(&self) -> Vec<Address> {
        match self {
            Self::SwapCreated { maker, taker, .. } if maker == taker => vec![*maker],
            Self::SwapCreated { maker, taker, .. } => vec![*maker, *taker],
            Self::SwapCompleted { recipient, .. } => vec![*recipient],
            Self::SwapCancelled { maker, .. } => vec![*maker],
            Self::FundsRescued { owner, .. } => vec![*owner],
            Self::MessageSent { .. } | Self::MessageProcessed { .. } => Vec::new(),
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Escrow ledger lifecycle events.
    Escrow,
    /// Secret relay events.
    Relay,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Chains to include. Empty means all chains.
    pub chains: Vec<ChainId>,
    /// Emitting contracts to include. Empty means any emitter.
    pub emitters: Vec<Address>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Narrow the filter to one chain.
    #[must_use]
    pub fn on_chain(mut self, chain: ChainId) -> Self {
        self.chains.push(chain);
        self
    }

    /// Narrow the filter to one emitting contract.
    #[must_use]
    pub fn from_emitter(mut self, emitter: Address) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SwapEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let chain_match = self.chains.is_empty() || self.chains.contains(&event.chain());

        let emitter_match = self.emitters.is_empty() || self.emitters.contains(&event.emitter());

        topic_match && chain_match && emitter_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(chain: ChainId, escrow: Address) -> SwapEvent {
        SwapEvent::SwapCompleted {
            chain,
            escrow,
            swap_id: [1u8; 32],
            secret: [2u8; 32],
            recipient: [3u8; 20],
            amount: 10,
        }
    }

    fn sent() -> SwapEvent {
        SwapEvent::MessageSent {
            chain: ChainId::Polkadot,
            relay: [9u8; 20],
            swap_id: [1u8; 32],
            secret: [2u8; 32],
            destination: ChainId::Ethereum,
            fee: 1,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(completed(ChainId::Ethereum, [0xE; 20]).topic(), EventTopic::Escrow);
        assert_eq!(sent().topic(), EventTopic::Relay);
        assert_eq!(sent().emitter(), [9u8; 20]);
    }

    #[test]
    fn test_participants_deduplicates_self_swap() {
        let event = SwapEvent::SwapCreated {
            chain: ChainId::Ethereum,
            escrow: [0xE; 20],
            swap_id: [1u8; 32],
            secret_hash: [2u8; 32],
            maker: [5u8; 20],
            taker: [5u8; 20],
            amount: 1,
            terms: None,
            unlock_time: 0,
            correlation_ref: [0u8; 32],
        };
        assert_eq!(event.participants(), vec![[5u8; 20]]);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&sent()));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Relay]);
        assert!(filter.matches(&sent()));
        assert!(!filter.matches(&completed(ChainId::Ethereum, [0xE; 20])));
    }

    #[test]
    fn test_filter_by_chain_and_emitter() {
        let filter = EventFilter::topics(vec![EventTopic::Escrow])
            .on_chain(ChainId::Polkadot)
            .from_emitter([0xD; 20]);

        assert!(filter.matches(&completed(ChainId::Polkadot, [0xD; 20])));
        assert!(!filter.matches(&completed(ChainId::Ethereum, [0xD; 20])));
        assert!(!filter.matches(&completed(ChainId::Polkadot, [0xE; 20])));
    }
}
