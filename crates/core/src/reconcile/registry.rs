//! Conflict registry
//!
//! In-memory collection of currently open conflicts. Detection replaces the
//! contents wholesale; resolution removes entries one at a time.

use clinisync_domain::{Conflict, ConflictId, ConflictStats};

/// Open conflicts, in detection order
#[derive(Debug, Default, Clone)]
pub struct ConflictRegistry {
    conflicts: Vec<Conflict>,
}

impl ConflictRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open conflicts in detection order.
    pub fn list(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Look up an open conflict by id.
    pub fn get(&self, id: &ConflictId) -> Option<&Conflict> {
        self.conflicts.iter().find(|c| c.id() == id)
    }

    /// Identifiers of every open conflict.
    pub fn ids(&self) -> Vec<ConflictId> {
        self.conflicts.iter().map(|c| c.id().clone()).collect()
    }

    /// Remove a conflict, returning it if it was open.
    pub fn remove_by_id(&mut self, id: &ConflictId) -> Option<Conflict> {
        let index = self.conflicts.iter().position(|c| c.id() == id)?;
        Some(self.conflicts.remove(index))
    }

    /// Swap in the result of a full detection pass.
    pub fn replace_all(&mut self, conflicts: Vec<Conflict>) {
        self.conflicts = conflicts;
    }

    /// Drop every open conflict.
    pub fn clear(&mut self) {
        self.conflicts.clear();
    }

    /// Totals by severity over the open conflicts.
    pub fn stats(&self) -> ConflictStats {
        ConflictStats::from_conflicts(&self.conflicts)
    }

    /// Number of open conflicts.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}
