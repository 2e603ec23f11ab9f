//! Retry queue for pairs whose last copy attempt failed

use crate::types::CopyFailure;
use std::collections::HashMap;

/// A pair currently in the failed state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Index of the failing pair
    pub pair_index: usize,

    /// Most recent failure for this pair
    pub last_error: CopyFailure,

    /// Insertion order, kept across error refreshes
    seq: u64,
}

/// Pending pairs keyed by pair index.
///
/// Holds at most one entry per index. An entry only leaves the set through
/// [`PendingSet::mark_resolved`], i.e. after a successful copy.
#[derive(Debug, Default)]
pub struct PendingSet {
    entries: HashMap<usize, PendingEntry>,
    next_seq: u64,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. Returns `true` if the pair just became pending,
    /// `false` if it already was (its error text is replaced).
    pub fn mark_failed(&mut self, index: usize, error: CopyFailure) -> bool {
        if let Some(entry) = self.entries.get_mut(&index) {
            entry.last_error = error;
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            index,
            PendingEntry {
                pair_index: index,
                last_error: error,
                seq,
            },
        );
        true
    }

    /// Clear a pair after a successful copy. Returns `true` if it was pending.
    pub fn mark_resolved(&mut self, index: usize) -> bool {
        self.entries.remove(&index).is_some()
    }

    /// Pending indices for the retry pass, newest first.
    ///
    /// The returned list is detached from the set, so it stays valid while
    /// the retry pass resolves or refreshes entries.
    pub fn snapshot(&self) -> Vec<usize> {
        let mut ordered: Vec<&PendingEntry> = self.entries.values().collect();
        ordered.sort_by(|a, b| b.seq.cmp(&a.seq));
        ordered.into_iter().map(|e| e.pair_index).collect()
    }

    /// Entries in the order they became pending
    pub fn entries(&self) -> Vec<&PendingEntry> {
        let mut ordered: Vec<&PendingEntry> = self.entries.values().collect();
        ordered.sort_by_key(|e| e.seq);
        ordered
    }

    pub fn get(&self, index: usize) -> Option<&PendingEntry> {
        self.entries.get(&index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
