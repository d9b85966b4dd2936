//! Interface state cache.
//!
//! Remembers every interface index seen during a session so a link
//! notification can be told apart as "first seen" or "existing interface
//! changed". Entries are never evicted: an index stays known after its link
//! is removed.

use std::collections::HashSet;

/// Result of observing an interface index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The index was not known and has now been recorded.
    FirstSeen,
    /// The index was already known; the cache is unchanged.
    AlreadyKnown,
}

/// Set of interface indices observed so far.
#[derive(Debug, Clone, Default)]
pub struct InterfaceCache {
    known: HashSet<u32>,
}

impl InterfaceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `index`, reporting whether it was new.
    pub fn observe(&mut self, index: u32) -> Observation {
        if self.known.insert(index) {
            Observation::FirstSeen
        } else {
            Observation::AlreadyKnown
        }
    }

    /// Pre-populate the cache without classifying. Returns `true` if the
    /// index was not yet known.
    pub fn seed(&mut self, index: u32) -> bool {
        self.known.insert(index)
    }

    /// Check whether `index` has been seen.
    pub fn contains(&self, index: u32) -> bool {
        self.known.contains(&index)
    }

    /// Number of known indices.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Check if no index is known.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Iterate over known indices in no particular order.
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.known.iter().copied()
    }
}

impl Extend<u32> for InterfaceCache {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        self.known.extend(iter);
    }
}
