//! Commit executor.
//!
//! Applies a finalized generation's effect list to the host in three ordered
//! passes, none interleaved with the walk:
//!
//! 1. Pre-mutation: removal hooks for every Delete-tagged fiber's subtree,
//!    top-down, while the subtree is still intact.
//! 2. Host mutation, in list order. The list is ancestor-before-descendant,
//!    so a Placement always finds its parent's host node already created.
//! 3. Post-mutation: created/updated hooks, once all mutations are visible.
//!
//! Hook failures are logged and isolated; a failed host primitive stops the
//! mutation pass but the bookkeeping cleanup still runs so the fiber arena
//! stays consistent.

use crate::engine::{EffectTag, FiberArena, FiberId};
use crate::error::HostError;
use crate::host::Host;
use crate::types::Attrs;
use crate::vnode::VNode;

/// Apply the effect list sitting on `root`. Returns the number of effects.
pub(crate) fn commit_generation<H: Host>(
    arena: &mut FiberArena,
    host: &mut H,
    root: FiberId,
) -> Result<usize, HostError> {
    let list = std::mem::take(&mut arena[root].effects);
    let total = list.len();

    // Pass 1: pre-mutation removal hooks.
    let mut cursor = list.head();
    while let Some(id) = cursor {
        cursor = arena[id].next_effect;
        if arena[id].tag.contains(EffectTag::DELETION) {
            notify_removal(arena, host, id);
        }
    }

    // Pass 2: host mutations in list order.
    let mut mutation_result = Ok(());
    let mut cursor = list.head();
    while let Some(id) = cursor {
        cursor = arena[id].next_effect;
        if let Err(e) = apply_mutation(arena, host, id) {
            mutation_result = Err(e);
            break;
        }
    }

    // Pass 3: post-mutation hooks, only over a fully mutated host.
    if mutation_result.is_ok() {
        let mut cursor = list.head();
        while let Some(id) = cursor {
            cursor = arena[id].next_effect;
            let tag = arena[id].tag;
            let Some(node) = arena[id].host else { continue };
            let hook_result = if tag.contains(EffectTag::PLACEMENT) {
                host.created(node)
            } else if tag.contains(EffectTag::UPDATE) {
                host.updated(node)
            } else {
                Ok(())
            };
            if let Err(error) = hook_result {
                tracing::warn!(node = node.0, %error, "lifecycle hook failed; continuing");
            }
        }
    }

    // Cleanup: pending state is meaningful only between walk and commit.
    // Also sever the cross-generation links; the superseded tree is about
    // to be released.
    let mut cursor = list.head();
    while let Some(id) = cursor {
        let fiber = &mut arena[id];
        cursor = fiber.next_effect;
        fiber.next_effect = None;
        fiber.tag = EffectTag::empty();
        fiber.before = None;
        fiber.alternate = None;
    }

    mutation_result.map(|_| total)
}

/// Fire `before_removal` over a still-intact subtree, parent before child.
pub(crate) fn notify_removal<H: Host>(arena: &mut FiberArena, host: &mut H, root: FiberId) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if let Some(node) = arena[id].host {
            if let Err(error) = host.before_removal(node) {
                tracing::warn!(node = node.0, %error, "removal hook failed; continuing");
            }
        }
        // Push children in reverse so hooks fire left to right.
        let mut children = Vec::new();
        let mut child = arena[id].child;
        while let Some(c) = child {
            children.push(c);
            child = arena[c].sibling;
        }
        while let Some(c) = children.pop() {
            stack.push(c);
        }
    }
}

fn apply_mutation<H: Host>(
    arena: &mut FiberArena,
    host: &mut H,
    id: FiberId,
) -> Result<(), HostError> {
    let tag = arena[id].tag;

    if tag.contains(EffectTag::DELETION) {
        if let Some(node) = arena[id].host {
            host.remove(node)?;
        }
        return Ok(());
    }

    if tag.contains(EffectTag::PLACEMENT) {
        let node = match arena[id].vnode.as_ref() {
            Some(VNode::Text(value)) => host.create_text(value)?,
            Some(VNode::Element { tag, attrs, .. }) => host.create_element(tag, attrs)?,
            _ => return Ok(()),
        };
        let Some(parent_host) = arena[id].parent.and_then(|p| arena[p].host) else {
            // The parent's own placement failed earlier in this pass (or in
            // a previous, partially applied commit).
            return Err(HostError::ParentUnavailable);
        };
        let before = arena[id].before.and_then(|b| arena[b].host);
        host.insert_before(parent_host, node, before)?;
        arena[id].host = Some(node);
        return Ok(());
    }

    if tag.contains(EffectTag::UPDATE) {
        let Some(node) = arena[id].host else {
            return Ok(());
        };
        if tag.contains(EffectTag::MOVE) {
            let Some(parent_host) = arena[id].parent.and_then(|p| arena[p].host) else {
                return Err(HostError::ParentUnavailable);
            };
            let before = arena[id].before.and_then(|b| arena[b].host);
            host.insert_before(parent_host, node, before)?;
        }
        match arena[id].vnode.as_ref() {
            Some(VNode::Text(value)) => host.set_text(node, value)?,
            Some(VNode::Element { attrs, .. }) => {
                static EMPTY: Attrs = Attrs::new();
                let old_attrs = arena[id]
                    .alternate
                    .and_then(|alt| arena[alt].attrs())
                    .unwrap_or(&EMPTY);
                // Remove what vanished, set what is new or changed.
                for name in old_attrs.keys() {
                    if !attrs.contains_key(name) {
                        host.remove_attribute(node, name)?;
                    }
                }
                for (name, value) in attrs {
                    if old_attrs.get(name) != Some(value) {
                        host.set_attribute(node, name, value)?;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}
