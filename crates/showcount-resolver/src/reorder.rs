//! Releases out-of-order results in their original order.

use std::collections::BTreeMap;

/// Buffers items keyed by their original index and hands back every
/// contiguous run starting at the next index not yet released.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    pending: BTreeMap<usize, T>,
    next: usize,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next: 0,
        }
    }

    /// Buffer `item` at `index`. Indices already released are ignored.
    pub fn insert(&mut self, index: usize, item: T) {
        if index >= self.next {
            self.pending.insert(index, item);
        }
    }

    /// Remove and return the contiguous run starting at the next index.
    pub fn drain_ready(&mut self) -> Vec<T> {
        let mut ready = Vec::new();
        while let Some(item) = self.pending.remove(&self.next) {
            ready.push(item);
            self.next += 1;
        }
        ready
    }

    /// Index of the next item to be released.
    #[cfg(test)]
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Items buffered behind a gap.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
