//! Exact membership alongside the Bloom engine.
//!
//! The shadow set answers "is this item really present" without false
//! positives, and is the only place removal has any effect. It also keeps the
//! history of every item ever added, which is what a compacted journal must
//! replay to restore the bits of removed items.

use std::collections::HashSet;

/// Items currently present, plus every item ever added.
#[derive(Debug, Default, Clone)]
pub struct ShadowSet {
    present: HashSet<String>,
    history: HashSet<String>,
}

impl ShadowSet {
    /// Create an empty shadow set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `item` present.
    pub fn insert(&mut self, item: &str) {
        if !self.present.contains(item) {
            self.present.insert(item.to_owned());
        }
        if !self.history.contains(item) {
            self.history.insert(item.to_owned());
        }
    }

    /// Erase `item`, returning whether it was present. History is kept.
    pub fn remove(&mut self, item: &str) -> bool {
        self.present.remove(item)
    }

    /// Exact membership test.
    pub fn contains(&self, item: &str) -> bool {
        self.present.contains(item)
    }

    /// Number of items currently present.
    pub fn len(&self) -> usize {
        self.present.len()
    }

    /// Returns true if no item is currently present.
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Every item ever added, present or not.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Number of distinct items ever added.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}
