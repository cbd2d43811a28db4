//! Fiber records and arena storage.
//!
//! A fiber describes one logical tree position within one generation. The
//! same position in the prior committed generation is reachable through the
//! `alternate` link; the prior fiber points forward through `forward`. Host
//! node handles survive across generations by being copied at clone time.

use std::ops::{Index, IndexMut};

use super::effects::{EffectList, EffectTag};
use crate::types::HostNode;
use crate::vnode::VNode;

// =============================================================================
// Handles and kinds
// =============================================================================

/// Stable handle to a fiber slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId(u32);

impl FiberId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a fiber describes.
///
/// Derived from the fiber's source node. Component nodes only appear between
/// fiber creation and resolution; a finalized fiber is Root, Element, or Text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberKind {
    Root,
    Element,
    Text,
    Component,
}

// =============================================================================
// Fiber
// =============================================================================

/// One tree position across generations.
#[derive(Debug)]
pub struct Fiber {
    /// Source virtual node. `None` only for the per-generation root fiber.
    /// Component nodes are rewritten in place by resolution.
    pub vnode: Option<VNode>,
    /// Host node handle, once committed. Inherited from the alternate at
    /// clone time so updates can mutate in place.
    pub host: Option<HostNode>,

    // Structural links, this generation only.
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,

    /// Same logical position in the prior committed generation.
    pub alternate: Option<FiberId>,
    /// Back-reference from a prior-generation fiber to its successor.
    pub forward: Option<FiberId>,

    /// Pending mutation for this fiber; cleared after commit.
    pub tag: EffectTag,
    /// Effects accumulated from this fiber's subtree, spliced into the
    /// parent's list on completion.
    pub effects: EffectList,
    /// Intrusive link threading this fiber through an effect list.
    pub next_effect: Option<FiberId>,
    /// Old-generation fiber whose host position this fiber is inserted
    /// before at commit (replacement, fresh keyed insert, or relocation).
    pub before: Option<FiberId>,
}

impl Fiber {
    /// A fresh fiber for a source node.
    pub fn new(vnode: VNode) -> Self {
        Self {
            vnode: Some(vnode),
            host: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            forward: None,
            tag: EffectTag::empty(),
            effects: EffectList::new(),
            next_effect: None,
            before: None,
        }
    }

    /// The root fiber of a generation, anchored at a host target node.
    pub fn root(target: HostNode) -> Self {
        Self {
            vnode: None,
            host: Some(target),
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            forward: None,
            tag: EffectTag::empty(),
            effects: EffectList::new(),
            next_effect: None,
            before: None,
        }
    }

    pub fn kind(&self) -> FiberKind {
        match &self.vnode {
            None => FiberKind::Root,
            Some(VNode::Element { .. }) => FiberKind::Element,
            Some(VNode::Text(_)) => FiberKind::Text,
            Some(VNode::Component { .. }) => FiberKind::Component,
        }
    }

    /// Identity string: element tag, or text payload. Empty for Root and
    /// unresolved components (which are never classified).
    pub fn name(&self) -> &str {
        match &self.vnode {
            Some(VNode::Element { tag, .. }) => tag,
            Some(VNode::Text(value)) => value,
            _ => "",
        }
    }

    /// Attributes of the source node, if it carries any.
    pub fn attrs(&self) -> Option<&crate::types::Attrs> {
        match &self.vnode {
            Some(VNode::Element { attrs, .. }) | Some(VNode::Component { attrs, .. }) => {
                Some(attrs)
            }
            _ => None,
        }
    }

    /// The node's stable key, if its attributes declare one.
    pub fn key(&self) -> Option<String> {
        self.vnode.as_ref().and_then(VNode::key)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Contiguous fiber storage with a free-index pool.
///
/// Handles stay valid until the slot is released; released slots are reused
/// in O(1). Indexing a released slot is a bug in the engine and panics.
#[derive(Debug, Default)]
pub struct FiberArena {
    slots: Vec<Option<Fiber>>,
    free: Vec<u32>,
    live: usize,
}

impl FiberArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fiber, reusing a freed slot when one is available.
    pub fn insert(&mut self, fiber: Fiber) -> FiberId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(fiber);
            FiberId(index)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(fiber));
            FiberId(index)
        }
    }

    /// Release a slot back to the pool.
    pub fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        let fiber = self.slots.get_mut(id.index()).and_then(Option::take);
        if fiber.is_some() {
            self.live -= 1;
            self.free.push(id.0);
        }
        fiber
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Number of live fibers.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Release an entire tree of fibers, following child/sibling links.
    ///
    /// Explicit work stack so release cost is bounded by tree size, not
    /// nesting depth.
    pub fn release_tree(&mut self, root: FiberId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(fiber) = self.remove(id) {
                if let Some(child) = fiber.child {
                    stack.push(child);
                }
                if let Some(sibling) = fiber.sibling {
                    stack.push(sibling);
                }
            }
        }
    }
}

impl Index<FiberId> for FiberArena {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        self.slots[id.index()]
            .as_ref()
            .expect("stale fiber handle")
    }
}

impl IndexMut<FiberId> for FiberArena {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        self.slots[id.index()]
            .as_mut()
            .expect("stale fiber handle")
    }
}

// =============================================================================
// Tests
// =============================================================================
