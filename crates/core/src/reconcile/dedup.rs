//! Notification deduplicator
//!
//! Remembers which conflicts have already been alerted so repeated detection
//! passes stay quiet about the same unresolved divergence.
//!
//! Keys are sticky: they are only dropped when the conflict is resolved,
//! dismissed, or the whole engine is cleared. A host that never resolves
//! conflicts grows this set by at most one key per (record, severity) pair.

use std::collections::HashSet;

use clinisync_domain::NotifiedKey;

/// Process-lifetime set of already-alerted conflict keys
#[derive(Debug, Default, Clone)]
pub struct NotificationDeduplicator {
    keys: HashSet<NotifiedKey>,
}

impl NotificationDeduplicator {
    /// Empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alert was already raised for this key.
    pub fn has(&self, key: &NotifiedKey) -> bool {
        self.keys.contains(key)
    }

    /// Record a key; returns `false` if it was already present.
    pub fn add(&mut self, key: NotifiedKey) -> bool {
        self.keys.insert(key)
    }

    /// Forget a key so the same divergence can alert again.
    pub fn remove(&mut self, key: &NotifiedKey) -> bool {
        self.keys.remove(key)
    }

    /// Forget every recorded key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Number of recorded keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
