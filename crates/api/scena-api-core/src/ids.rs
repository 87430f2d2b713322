//! Identifiers and monotonic allocators for document entities.

use serde::{Deserialize, Serialize};

/// Stable node identifier, unique within one Symbol for the life of the
/// process. Never reused while the node is alive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Symbol identifier, unique within one Document.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u64);

/// Monotonic identifier allocator. Identifiers only ever increase; loading a
/// snapshot with explicit identifiers ratchets the allocator past them via
/// `advance_next` so fresh allocations cannot collide.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    #[inline]
    pub fn peek_next(&self) -> u64 {
        self.next
    }

    /// Ratchet the allocator so it never issues an id below `min`.
    /// Lower values are ignored.
    #[inline]
    pub fn advance_next(&mut self, min: u64) {
        if min > self.next {
            self.next = min;
        }
    }
}
