use crate::item::ItemId;
use std::collections::HashSet;

/// Remembers every item identifier seen during a crawl
///
/// The set only grows: an identifier accepted once is never accepted again
/// within the same crawl.
#[derive(Debug, Clone, Default)]
pub struct LinkDeduplicator {
    seen: HashSet<ItemId>,
}

impl LinkDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the identifier has not been seen yet
    pub fn is_new(&self, id: &ItemId) -> bool {
        !self.seen.contains(id)
    }

    /// Check-and-set: marks the identifier seen and returns true if it was new
    ///
    /// Acceptance and marking happen in one call, so the same identifier can
    /// never be queued twice.
    pub fn mark_seen(&mut self, id: &ItemId) -> bool {
        self.seen.insert(id.clone())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
