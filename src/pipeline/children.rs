//! Child diffing.
//!
//! Builds the work-in-progress child list of an element fiber from its new
//! children, pairing each against the old generation's child fibers. Pairing
//! decides which old fiber becomes each child's alternate and records
//! relocation/insertion hints; classification of each child happens later,
//! when the walker visits it as its own unit.
//!
//! Two strategies:
//! - Keyed (default): single forward pass over the new sequence with a
//!   lookback map over the old one. A keyed child found elsewhere in the old
//!   order is relocated with a single host move, never destroyed and
//!   recreated. O(n), at most one relocation per moved key.
//! - Positional: pair strictly by index. Cheaper bookkeeping for sequences
//!   that never reorder.
//!
//! Old children left unpaired after the pass are tagged DELETION and pushed
//! into the parent's local effect list ahead of the children's own effects.

use std::collections::{HashMap, HashSet};
use std::mem;

use crate::engine::{EffectTag, Fiber, FiberArena, FiberId};
use crate::types::DiffMode;
use crate::vnode::VNode;

/// Diff an element fiber's children; returns its first child this generation.
pub(crate) fn reconcile_children(
    arena: &mut FiberArena,
    wip: FiberId,
    mode: DiffMode,
) -> Option<FiberId> {
    let children = match &mut arena[wip].vnode {
        Some(VNode::Element { children, .. }) => mem::take(children),
        _ => Vec::new(),
    };
    let old_first = arena[wip].alternate.and_then(|alt| arena[alt].child);

    match mode {
        DiffMode::Keyed => diff_keyed(arena, wip, children, old_first),
        DiffMode::Positional => diff_positional(arena, wip, children, old_first),
    }
}

/// Links freshly created child fibers into a sibling chain.
#[derive(Default)]
struct Linker {
    first: Option<FiberId>,
    prev: Option<FiberId>,
}

impl Linker {
    fn append(&mut self, arena: &mut FiberArena, id: FiberId) {
        match self.prev {
            Some(prev) => arena[prev].sibling = Some(id),
            None => self.first = Some(id),
        }
        self.prev = Some(id);
    }
}

/// Create a work-in-progress fiber for a child, cloned from its paired old
/// fiber when one exists (inheriting the host handle, cross-linking the
/// generations) or fresh otherwise.
fn clone_child(
    arena: &mut FiberArena,
    previous: Option<FiberId>,
    vnode: VNode,
    parent: FiberId,
) -> FiberId {
    let mut fiber = Fiber::new(vnode);
    fiber.parent = Some(parent);
    if let Some(prev) = previous {
        fiber.host = arena[prev].host;
        fiber.alternate = Some(prev);
    }
    let id = arena.insert(fiber);
    if let Some(prev) = previous {
        arena[prev].forward = Some(id);
    }
    id
}

fn diff_positional(
    arena: &mut FiberArena,
    wip: FiberId,
    children: Vec<VNode>,
    old_first: Option<FiberId>,
) -> Option<FiberId> {
    let mut linker = Linker::default();
    let mut old = old_first;
    for vnode in children {
        let id = clone_child(arena, old, vnode, wip);
        linker.append(arena, id);
        if let Some(o) = old {
            old = arena[o].sibling;
        }
    }

    // Old children beyond the new sequence are gone.
    let mut fx = mem::take(&mut arena[wip].effects);
    while let Some(o) = old {
        let next = arena[o].sibling;
        arena[o].tag = EffectTag::DELETION;
        fx.push(arena, o);
        old = next;
    }
    arena[wip].effects = fx;

    arena[wip].child = linker.first;
    linker.first
}

fn diff_keyed(
    arena: &mut FiberArena,
    wip: FiberId,
    children: Vec<VNode>,
    old_first: Option<FiberId>,
) -> Option<FiberId> {
    // Old children in order, plus a key lookback map.
    let mut old_ids = Vec::new();
    let mut cursor = old_first;
    while let Some(o) = cursor {
        old_ids.push(o);
        cursor = arena[o].sibling;
    }
    let old_keys: Vec<Option<String>> = old_ids.iter().map(|&o| arena[o].key()).collect();
    let mut old_by_key: HashMap<String, FiberId> = HashMap::new();
    for (idx, key) in old_keys.iter().enumerate() {
        if let Some(key) = key {
            old_by_key.insert(key.clone(), old_ids[idx]);
        }
    }

    let new_keys: Vec<Option<String>> = children.iter().map(VNode::key).collect();
    let mut new_nodes: Vec<Option<VNode>> = children.into_iter().map(Some).collect();

    let mut consumed: HashSet<String> = HashSet::new();
    let mut paired: HashSet<FiberId> = HashSet::new();
    let mut linker = Linker::default();
    let mut i = 0;
    let mut j = 0;

    while j < new_nodes.len() {
        let old_i = old_ids.get(i).copied();
        let old_key = old_keys.get(i).cloned().flatten();

        // An old keyed child already matched earlier in this pass: step over.
        if let Some(key) = &old_key {
            if consumed.contains(key) {
                i += 1;
                continue;
            }
        }

        match new_keys[j].clone() {
            None => {
                if old_key.is_none() {
                    // Unkeyed/unkeyed: pair positionally (old may be
                    // exhausted, in which case this is a fresh child).
                    let Some(vnode) = new_nodes[j].take() else { break };
                    if let Some(o) = old_i {
                        paired.insert(o);
                    }
                    let id = clone_child(arena, old_i, vnode, wip);
                    linker.append(arena, id);
                    j += 1;
                }
                // Keyed old vs unkeyed new: skip the old child for now; it
                // may still match a later keyed new child.
                i += 1;
            }
            Some(new_key) => {
                let Some(vnode) = new_nodes[j].take() else { break };
                match old_by_key.get(&new_key).copied() {
                    Some(hit) if old_key.as_deref() == Some(new_key.as_str()) => {
                        // Same key at the current old position: no shift.
                        paired.insert(hit);
                        let id = clone_child(arena, Some(hit), vnode, wip);
                        linker.append(arena, id);
                        i += 1;
                    }
                    Some(hit) => {
                        // Key exists elsewhere in the old order: one host
                        // move, relocated before the current old position.
                        paired.insert(hit);
                        let id = clone_child(arena, Some(hit), vnode, wip);
                        arena[id].tag |= EffectTag::MOVE;
                        arena[id].before = old_i;
                        linker.append(arena, id);
                    }
                    None => {
                        // Fresh keyed child, inserted at the current old
                        // position.
                        let id = clone_child(arena, None, vnode, wip);
                        arena[id].before = old_i;
                        linker.append(arena, id);
                    }
                }
                consumed.insert(new_key);
                j += 1;
            }
        }
    }

    // Anything never paired is gone in this generation.
    let mut fx = mem::take(&mut arena[wip].effects);
    for &o in &old_ids {
        if !paired.contains(&o) {
            arena[o].tag = EffectTag::DELETION;
            fx.push(arena, o);
        }
    }
    arena[wip].effects = fx;

    arena[wip].child = linker.first;
    linker.first
}

// =============================================================================
// Tests
// =============================================================================
