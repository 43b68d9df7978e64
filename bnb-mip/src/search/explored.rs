//! Optional set of already explored node keys.

use std::collections::HashSet;

use parking_lot::Mutex;

use super::NodeKey;

/// Remembers the bound sets that were already explored.
///
/// When disabled every key is reported as new and nothing is stored.
#[derive(Debug)]
pub struct ExploredSet {
    /// Whether deduplication is on.
    enabled: bool,

    /// Keys seen so far.
    seen: Mutex<HashSet<NodeKey>>,
}

impl ExploredSet {
    /// Create a set; `enabled = false` gives a no-op set.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Mark `key` as explored.
    ///
    /// Returns false if it had been marked before.
    pub fn mark(&self, key: &NodeKey) -> bool {
        if !self.enabled {
            return true;
        }
        self.seen.lock().insert(key.clone())
    }
}
