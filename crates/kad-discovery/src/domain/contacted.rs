//! Contacted-set: ids already admitted into one lookup.

use std::collections::HashSet;

use crate::domain::PeerId;

/// Deduplication set for a single lookup. Grows monotonically until cleared.
#[derive(Debug, Default, Clone)]
pub struct ContactedSet {
    seen: HashSet<PeerId>,
}

impl ContactedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id`, returning `true` if it was not present before.
    pub fn mark_and_check(&mut self, id: &PeerId) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.clone())
    }

    pub fn contains(&self, id: &PeerId) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
