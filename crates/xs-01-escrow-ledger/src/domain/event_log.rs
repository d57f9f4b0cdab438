//! # Event Log
//!
//! Append-only record of every event a ledger emitted, indexed by swap id
//! and by participant. Readers that missed bus traffic recover from here.

use shared_bus::SwapEvent;
use shared_types::{Address, Hash, Timestamp};
use std::collections::HashMap;

/// One emitted event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Ledger time of emission.
    pub timestamp: Timestamp,
    /// The event.
    pub event: SwapEvent,
}

/// Append-only, indexed event log.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    by_swap: HashMap<Hash, Vec<usize>>,
    by_participant: HashMap<Address, Vec<usize>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, timestamp: Timestamp, event: SwapEvent) -> u64 {
        let index = self.entries.len();
        self.by_swap.entry(event.swap_id()).or_default().push(index);
        for participant in event.participants() {
            self.by_participant.entry(participant).or_default().push(index);
        }
        let sequence = index as u64;
        self.entries.push(LogEntry {
            sequence,
            timestamp,
            event,
        });
        sequence
    }

    /// Events of one swap, oldest first.
    pub fn for_swap(&self, swap_id: &Hash) -> Vec<LogEntry> {
        self.collect(self.by_swap.get(swap_id))
    }

    /// Events naming `account` as maker, taker, recipient or owner.
    pub fn for_participant(&self, account: &Address) -> Vec<LogEntry> {
        self.collect(self.by_participant.get(account))
    }

    /// Entries with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<LogEntry> {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.entries.len());
        self.entries[start..].to_vec()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was logged yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect(&self, indices: Option<&Vec<usize>>) -> Vec<LogEntry> {
        indices
            .map(|ix| ix.iter().map(|&i| self.entries[i].clone()).collect())
            .unwrap_or_default()
    }
}
