//! Reconciliation walker.
//!
//! One work unit covers one fiber: resolve its component chain, classify it
//! against its alternate, and set up its child diff. The walk descends to a
//! fiber's first child when the diff produces one, otherwise completes the
//! fiber - splicing its local effects into its parent with its own effect
//! first - and moves to its sibling, ascending when none remains.
//!
//! Classification deliberately performs no value-equality short-circuit:
//! every surviving position is tagged UPDATE even when nothing changed, so
//! update hooks keep firing for unchanged nodes.

use std::mem;

use crate::engine::{EffectTag, FiberArena, FiberId, FiberKind};
use crate::error::ResolveError;
use crate::types::DiffMode;
use crate::vnode::VNode;

use super::children::reconcile_children;

/// Walk parameters, fixed for the lifetime of a renderer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkConfig {
    pub mode: DiffMode,
    pub max_resolve_depth: usize,
}

/// Perform one unit of work. Returns the next unit, or `None` when the
/// generation's walk is finished (the full effect list then sits on the
/// root fiber).
pub(crate) fn perform_unit(
    arena: &mut FiberArena,
    unit: FiberId,
    config: &WalkConfig,
) -> Result<Option<FiberId>, ResolveError> {
    if let Some(next) = begin_work(arena, unit, config)? {
        return Ok(Some(next));
    }
    Ok(complete_unit(arena, unit))
}

/// Descend into a fiber: resolve, classify, diff children.
///
/// Returns the first child to continue with, or `None` to ascend.
fn begin_work(
    arena: &mut FiberArena,
    unit: FiberId,
    config: &WalkConfig,
) -> Result<Option<FiberId>, ResolveError> {
    if arena[unit].kind() == FiberKind::Root {
        return Ok(arena[unit].child);
    }
    resolve(arena, unit, config.max_resolve_depth)?;
    classify(arena, unit);
    if arena[unit].kind() == FiberKind::Element {
        Ok(reconcile_children(arena, unit, config.mode))
    } else {
        // Text fibers have no descendable children at this layer.
        Ok(None)
    }
}

/// Expand a component fiber to a fixed point.
///
/// A resolver may itself return another component reference; expansion
/// repeats until an element or text node results, bounded by `limit`.
fn resolve(arena: &mut FiberArena, unit: FiberId, limit: usize) -> Result<(), ResolveError> {
    let mut depth = 0;
    loop {
        let resolved = match &arena[unit].vnode {
            Some(VNode::Component {
                component,
                attrs,
                children,
            }) => {
                depth += 1;
                if depth > limit {
                    return Err(ResolveError::DepthExceeded { limit });
                }
                component.call(attrs, children)?
            }
            _ => return Ok(()),
        };
        arena[unit].vnode = Some(resolved);
    }
}

enum Verdict {
    Place,
    Update,
    /// Type or identity changed: place the new fiber, delete the old one.
    Replace(FiberId),
}

/// Compare a fiber against its alternate and record its pending effect.
fn classify(arena: &mut FiberArena, unit: FiberId) {
    // A keyed relocation set up by the child diff survives an Update verdict.
    let keep_move = arena[unit].tag & EffectTag::MOVE;

    let verdict = match arena[unit].alternate {
        None => Verdict::Place,
        Some(old) => {
            let old_kind = arena[old].kind();
            let new_kind = arena[unit].kind();
            if arena[old].host.is_none() {
                // The prior fiber never reached the host (its placement
                // failed mid-commit): mount this position fresh, with no
                // paired deletion since there is nothing to detach.
                Verdict::Place
            } else if old_kind != new_kind {
                Verdict::Replace(old)
            } else if new_kind == FiberKind::Text {
                // Payload change or not: always Update, applied in place.
                Verdict::Update
            } else if arena[old].name() != arena[unit].name() {
                Verdict::Replace(old)
            } else {
                Verdict::Update
            }
        }
    };

    match verdict {
        Verdict::Place => {
            arena[unit].tag = EffectTag::PLACEMENT;
        }
        Verdict::Update => {
            arena[unit].tag = EffectTag::UPDATE | keep_move;
        }
        Verdict::Replace(old) => {
            arena[unit].tag = EffectTag::PLACEMENT;
            arena[unit].before = Some(old);
            // The old fiber's deletion is recorded immediately in this
            // fiber's local list, so at commit the replacement insert lands
            // before the old node is detached.
            arena[old].tag = EffectTag::DELETION;
            let mut fx = mem::take(&mut arena[unit].effects);
            fx.push(arena, old);
            arena[unit].effects = fx;
        }
    }
}

/// Ascend: complete fibers until a sibling is found or the root finishes.
fn complete_unit(arena: &mut FiberArena, mut fiber: FiberId) -> Option<FiberId> {
    loop {
        complete_work(arena, fiber);
        if let Some(sibling) = arena[fiber].sibling {
            return Some(sibling);
        }
        match arena[fiber].parent {
            Some(parent) => fiber = parent,
            None => return None,
        }
    }
}

/// Splice a completed fiber's effects into its parent, own effect first.
///
/// The ordering invariant - a fiber's effect precedes all effects from its
/// descendants - is established here: Placement of a child needs its
/// parent's host node to already exist.
fn complete_work(arena: &mut FiberArena, fiber: FiberId) {
    let Some(parent) = arena[fiber].parent else {
        // Root: the finalized generation effect list stays on this fiber.
        return;
    };
    let subtree = mem::take(&mut arena[fiber].effects);
    let mut merged = mem::take(&mut arena[parent].effects);
    if !arena[fiber].tag.is_empty() {
        merged.push(arena, fiber);
    }
    merged.splice(arena, subtree);
    arena[parent].effects = merged;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Fiber;
    use crate::types::{Attrs, HostNode};
    use crate::vnode::{component, element, text};

    const CONFIG: WalkConfig = WalkConfig {
        mode: DiffMode::Keyed,
        max_resolve_depth: 16,
    };

    /// Build a generation and walk it to completion; returns (arena, root).
    fn walk(tree: crate::vnode::VNode) -> (FiberArena, FiberId) {
        let mut arena = FiberArena::new();
        let root = arena.insert(Fiber::root(HostNode(0)));
        let child = arena.insert(Fiber::new(tree));
        arena[root].child = Some(child);
        arena[child].parent = Some(root);

        let mut next = Some(root);
        while let Some(unit) = next {
            next = perform_unit(&mut arena, unit, &CONFIG).unwrap();
        }
        (arena, root)
    }

    #[test]
    fn test_fresh_tree_all_placements() {
        let tree = element("div", Attrs::new(), vec![text("a"), text("b")]).unwrap();
        let (arena, root) = walk(tree);

        let effects = arena[root].effects.ids(&arena);
        assert_eq!(effects.len(), 3);
        for id in effects {
            assert_eq!(arena[id].tag, EffectTag::PLACEMENT);
        }
    }

    #[test]
    fn test_effect_order_ancestor_first() {
        let tree = element(
            "div",
            Attrs::new(),
            vec![
                element("span", Attrs::new(), vec![text("x")]).unwrap(),
                text("y"),
            ],
        )
        .unwrap();
        let (arena, root) = walk(tree);

        let names: Vec<String> = arena[root]
            .effects
            .ids(&arena)
            .into_iter()
            .map(|id| arena[id].name().to_string())
            .collect();
        assert_eq!(names, ["div", "span", "x", "y"]);
    }

    #[test]
    fn test_component_resolves_to_fixed_point() {
        let inner = |_: &Attrs, _: &[crate::vnode::VNode]| text("deep");
        let outer = move |_: &Attrs, _: &[crate::vnode::VNode]| {
            component(inner, Attrs::new(), vec![])
        };
        let tree = component(outer, Attrs::new(), vec![]);
        let (arena, root) = walk(tree);

        let child = arena[root].child.unwrap();
        assert_eq!(arena[child].kind(), FiberKind::Text);
        assert_eq!(arena[child].name(), "deep");
    }

    #[test]
    fn test_resolve_depth_exceeded() {
        fn endless(_: &Attrs, _: &[crate::vnode::VNode]) -> crate::vnode::VNode {
            component(endless, Attrs::new(), vec![])
        }
        let mut arena = FiberArena::new();
        let fiber = arena.insert(Fiber::new(component(endless, Attrs::new(), vec![])));
        let err = resolve(&mut arena, fiber, 8).unwrap_err();
        assert_eq!(err, ResolveError::DepthExceeded { limit: 8 });
    }

    #[test]
    fn test_always_update_without_changes() {
        // Walk the same tree twice; every surviving fiber must be UPDATE.
        let make = || element("div", Attrs::new(), vec![text("a")]).unwrap();
        let (mut arena, old_root) = walk(make());

        // Clear first-generation state the way commit would.
        for id in arena[old_root].effects.ids(&arena) {
            arena[id].tag = EffectTag::empty();
            arena[id].next_effect = None;
        }
        arena[old_root].effects = Default::default();

        let root = arena.insert(Fiber::root(HostNode(0)));
        let child = arena.insert(Fiber::new(make()));
        arena[root].child = Some(child);
        arena[child].parent = Some(root);
        arena[root].alternate = Some(old_root);
        let old_child = arena[old_root].child.unwrap();
        arena[old_child].host = Some(HostNode(1));
        let old_text = arena[old_child].child.unwrap();
        arena[old_text].host = Some(HostNode(2));
        arena[child].alternate = Some(old_child);
        arena[child].host = arena[old_child].host;

        let mut next = Some(root);
        while let Some(unit) = next {
            next = perform_unit(&mut arena, unit, &CONFIG).unwrap();
        }

        let effects = arena[root].effects.ids(&arena);
        assert_eq!(effects.len(), 2);
        for id in effects {
            assert_eq!(arena[id].tag, EffectTag::UPDATE);
        }
    }

    #[test]
    fn test_identity_change_places_and_deletes() {
        let (mut arena, old_root) = walk(element("div", Attrs::new(), vec![]).unwrap());
        for id in arena[old_root].effects.ids(&arena) {
            arena[id].tag = EffectTag::empty();
            arena[id].next_effect = None;
        }
        arena[old_root].effects = Default::default();

        let root = arena.insert(Fiber::root(HostNode(0)));
        let child = arena.insert(Fiber::new(element("span", Attrs::new(), vec![]).unwrap()));
        arena[root].child = Some(child);
        arena[child].parent = Some(root);
        arena[root].alternate = Some(old_root);
        let old_child = arena[old_root].child.unwrap();
        arena[old_child].host = Some(HostNode(1));
        arena[child].alternate = Some(old_child);

        let mut next = Some(root);
        while let Some(unit) = next {
            next = perform_unit(&mut arena, unit, &CONFIG).unwrap();
        }

        assert_eq!(arena[child].tag, EffectTag::PLACEMENT);
        assert_eq!(arena[child].before, Some(old_child));
        assert_eq!(arena[old_child].tag, EffectTag::DELETION);
        // New fiber's placement precedes the old fiber's deletion.
        let effects = arena[root].effects.ids(&arena);
        assert_eq!(effects, vec![child, old_child]);
    }

    #[test]
    fn test_unmaterialized_alternate_is_placed_fresh() {
        // An alternate with no host node (its placement failed at commit)
        // is mounted again, not updated, and pairs no deletion.
        let (mut arena, old_root) = walk(element("div", Attrs::new(), vec![]).unwrap());
        for id in arena[old_root].effects.ids(&arena) {
            arena[id].tag = EffectTag::empty();
            arena[id].next_effect = None;
        }
        arena[old_root].effects = Default::default();

        let root = arena.insert(Fiber::root(HostNode(0)));
        let child = arena.insert(Fiber::new(element("div", Attrs::new(), vec![]).unwrap()));
        arena[root].child = Some(child);
        arena[child].parent = Some(root);
        arena[root].alternate = Some(old_root);
        let old_child = arena[old_root].child.unwrap();
        assert_eq!(arena[old_child].host, None);
        arena[child].alternate = Some(old_child);

        let mut next = Some(root);
        while let Some(unit) = next {
            next = perform_unit(&mut arena, unit, &CONFIG).unwrap();
        }

        assert_eq!(arena[child].tag, EffectTag::PLACEMENT);
        assert_eq!(arena[old_child].tag, EffectTag::empty());
        assert_eq!(arena[root].effects.ids(&arena), vec![child]);
    }
}
