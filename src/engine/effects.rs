//! Effect tags and the amortized effect accumulator.
//!
//! Every fiber carries a local effect list for its subtree, spliced into the
//! parent's list when the fiber completes. Naive list concatenation at every
//! one of N positions would cost O(N^2); this list is threaded through the
//! fibers themselves (`Fiber::next_effect`), so both push and splice are O(1)
//! and accumulation over a whole tree is O(N) with zero allocation.

use bitflags::bitflags;

use super::fiber::{FiberArena, FiberId};

bitflags! {
    /// Pending mutation of a fiber, applied at commit.
    ///
    /// MOVE marks a keyed relocation and combines with UPDATE; the other
    /// flags are exclusive in practice.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EffectTag: u8 {
        const PLACEMENT = 1 << 0;
        const UPDATE    = 1 << 1;
        const DELETION  = 1 << 2;
        const MOVE      = 1 << 3;
    }
}

/// Intrusive singly linked effect list.
///
/// A fiber belongs to at most one list at a time; its position is stored in
/// its own `next_effect` field.
#[derive(Debug, Default)]
pub struct EffectList {
    head: Option<FiberId>,
    tail: Option<FiberId>,
    len: usize,
}

impl EffectList {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<FiberId> {
        self.head
    }

    /// Append one fiber. O(1).
    ///
    /// Clears the fiber's own link first: a fiber recycled from an aborted
    /// walk may still carry a stale link, and the pushed fiber is always the
    /// new tail.
    pub fn push(&mut self, arena: &mut FiberArena, id: FiberId) {
        arena[id].next_effect = None;
        match self.tail {
            Some(tail) => arena[tail].next_effect = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Append another whole list. O(1).
    pub fn splice(&mut self, arena: &mut FiberArena, other: EffectList) {
        if other.is_empty() {
            return;
        }
        match self.tail {
            Some(tail) => arena[tail].next_effect = other.head,
            None => self.head = other.head,
        }
        self.tail = other.tail;
        self.len += other.len;
    }

    /// Collect the member ids in order. For inspection and tests; commit
    /// walks the links directly.
    pub fn ids(&self, arena: &FiberArena) -> Vec<FiberId> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(id) = cursor {
            out.push(id);
            cursor = arena[id].next_effect;
        }
        out
    }
}

// =============================================================================
// Tests
// =============================================================================
