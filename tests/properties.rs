//! End-to-end behavior of the renderer against the in-memory host.
//!
//! Each test drives full render cycles and asserts on the host's operation
//! log or its structural dump, never on engine internals.

use proptest::prelude::*;
use spool::{
    attrs, element, text, try_component, AttrValue, Attrs, ComponentError, DiffMode, Host,
    HostError, HostNode, HostOp, MemoryHost, Renderer, RendererOptions, UnitBudget, VNode,
    WorkStatus,
};

fn rendered(tree: VNode) -> Renderer<MemoryHost> {
    let mut renderer = Renderer::new(MemoryHost::new());
    let target = renderer.host().root();
    renderer.render(tree, target);
    renderer.run().unwrap();
    renderer
}

fn rerender(renderer: &mut Renderer<MemoryHost>, tree: VNode) {
    let target = renderer.host().root();
    renderer.host_mut().clear_ops();
    renderer.render(tree, target);
    renderer.run().unwrap();
}

fn count(renderer: &Renderer<MemoryHost>, pred: impl Fn(&HostOp) -> bool) -> usize {
    renderer.host().ops().iter().filter(|op| pred(op)).count()
}

fn is_structural(op: &HostOp) -> bool {
    matches!(
        op,
        HostOp::CreateElement { .. }
            | HostOp::CreateText { .. }
            | HostOp::InsertBefore { .. }
            | HostOp::Remove { .. }
    )
}

fn item(key: &str, label: &str) -> VNode {
    element("li", attrs([("key", key)]), vec![text(label)]).unwrap()
}

fn list(items: &[(&str, &str)]) -> VNode {
    element(
        "ul",
        Attrs::new(),
        items.iter().map(|&(k, l)| item(k, l)).collect(),
    )
    .unwrap()
}

// =============================================================================
// Stability
// =============================================================================

#[test]
fn test_identical_rerender_touches_no_structure() {
    let make = || {
        element(
            "div",
            attrs([("class", "box")]),
            vec![text("hello"), element("span", Attrs::new(), vec![]).unwrap()],
        )
        .unwrap()
    };
    let mut renderer = rendered(make());
    rerender(&mut renderer, make());

    assert_eq!(count(&renderer, is_structural), 0);
    // Unchanged attributes are not rewritten either.
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::SetAttr { .. })), 0);
    // Surviving text positions are still written through.
    assert!(count(&renderer, |op| matches!(op, HostOp::SetText { .. })) > 0);
    assert_eq!(renderer.host().root_html(), "<div class=\"box\">hello<span></span></div>");
}

#[test]
fn test_attr_diff_is_minimal() {
    let mut renderer = rendered(
        element("div", attrs([("a", "1"), ("b", "2")]), vec![]).unwrap(),
    );
    rerender(
        &mut renderer,
        element("div", attrs([("b", "2"), ("c", "3")]), vec![]).unwrap(),
    );

    let ops: Vec<&HostOp> = renderer
        .host()
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::SetAttr { .. } | HostOp::RemoveAttr { .. }))
        .collect();
    // "a" removed, "c" set; "b" untouched.
    assert_eq!(ops.len(), 2);
    assert!(matches!(ops[0], HostOp::RemoveAttr { name, .. } if name == "a"));
    assert!(matches!(
        ops[1],
        HostOp::SetAttr { name, value, .. } if name == "c" && *value == AttrValue::from("3")
    ));
    assert_eq!(renderer.host().root_html(), "<div b=\"2\" c=\"3\"></div>");
}

#[test]
fn test_text_update_in_place() {
    let mut renderer = rendered(
        element("div", Attrs::new(), vec![text("a"), text("b")]).unwrap(),
    );
    let nodes_before = renderer.host().node_count();
    rerender(
        &mut renderer,
        element("div", Attrs::new(), vec![text("a"), text("c")]).unwrap(),
    );

    assert_eq!(count(&renderer, is_structural), 0);
    assert_eq!(renderer.host().node_count(), nodes_before);
    assert_eq!(renderer.host().root_html(), "<div>ac</div>");
}

// =============================================================================
// Coalescing
// =============================================================================

#[test]
fn test_coalesced_requests_render_once() {
    let mut renderer = Renderer::new(MemoryHost::new());
    let target = renderer.host().root();
    for label in ["a", "b", "c"] {
        renderer.render(
            element("div", Attrs::new(), vec![text(label)]).unwrap(),
            target,
        );
    }
    renderer.run().unwrap();

    // Intermediate requests never reached the host.
    assert_eq!(
        count(&renderer, |op| matches!(op, HostOp::CreateElement { .. })),
        1
    );
    assert_eq!(renderer.host().root_html(), "<div>c</div>");
}

// =============================================================================
// Keyed diffing
// =============================================================================

#[test]
fn test_keyed_reorder_is_one_relocation() {
    let mut renderer = rendered(list(&[("1", "one"), ("2", "two"), ("3", "three")]));
    rerender(&mut renderer, list(&[("3", "three"), ("1", "one"), ("2", "two")]));

    // Moving "3" to the front is a single reinsertion; nothing is rebuilt.
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::InsertBefore { .. })), 1);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::CreateElement { .. })), 0);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::Remove { .. })), 0);
    assert_eq!(
        renderer.host().root_html(),
        "<ul><li key=\"3\">three</li><li key=\"1\">one</li><li key=\"2\">two</li></ul>",
    );
}

#[test]
fn test_keyed_tail_append() {
    let mut renderer = rendered(list(&[("a", "a"), ("b", "b")]));
    rerender(&mut renderer, list(&[("a", "a"), ("b", "b"), ("c", "c")]));

    // One new li and its text, nothing else structural.
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::CreateElement { .. })), 1);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::CreateText { .. })), 1);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::Remove { .. })), 0);
    assert_eq!(
        renderer.host().root_html(),
        "<ul><li key=\"a\">a</li><li key=\"b\">b</li><li key=\"c\">c</li></ul>",
    );
}

#[test]
fn test_keyed_removal_mid_list() {
    let mut renderer = rendered(list(&[("a", "a"), ("b", "b"), ("c", "c")]));
    rerender(&mut renderer, list(&[("a", "a"), ("c", "c")]));

    assert_eq!(count(&renderer, |op| matches!(op, HostOp::Remove { .. })), 1);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::CreateElement { .. })), 0);
    assert_eq!(
        renderer.host().root_html(),
        "<ul><li key=\"a\">a</li><li key=\"c\">c</li></ul>",
    );
}

#[test]
fn test_keyed_fresh_insert_is_anchored() {
    let mut renderer = rendered(list(&[("a", "a"), ("c", "c")]));
    rerender(&mut renderer, list(&[("a", "a"), ("b", "b"), ("c", "c")]));

    assert_eq!(
        renderer.host().root_html(),
        "<ul><li key=\"a\">a</li><li key=\"b\">b</li><li key=\"c\">c</li></ul>",
    );
}

#[test]
fn test_clear_all_children() {
    let mut renderer = rendered(
        element("div", Attrs::new(), vec![text("a"), text("b"), text("c")]).unwrap(),
    );
    rerender(&mut renderer, element("div", Attrs::new(), vec![]).unwrap());

    assert_eq!(count(&renderer, |op| matches!(op, HostOp::Remove { .. })), 3);
    assert_eq!(renderer.host().root_html(), "<div></div>");
}

#[test]
fn test_positional_mode_rewrites_instead_of_moving() {
    let mut renderer = Renderer::with_options(
        MemoryHost::new(),
        RendererOptions {
            diff_mode: DiffMode::Positional,
            ..RendererOptions::default()
        },
    );
    let target = renderer.host().root();
    renderer.render(
        element("div", Attrs::new(), vec![text("a"), text("b")]).unwrap(),
        target,
    );
    renderer.run().unwrap();

    rerender(
        &mut renderer,
        element("div", Attrs::new(), vec![text("b"), text("a")]).unwrap(),
    );
    // Index pairing: both positions are rewritten in place, nothing moves.
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::InsertBefore { .. })), 0);
    assert_eq!(count(&renderer, |op| matches!(op, HostOp::SetText { .. })), 2);
    assert_eq!(renderer.host().root_html(), "<div>ba</div>");
}

// =============================================================================
// Failure behavior
// =============================================================================

#[test]
fn test_resolution_failure_leaves_host_intact() {
    let mut renderer = rendered(element("div", Attrs::new(), vec![text("ok")]).unwrap());
    let target = renderer.host().root();

    let failing = try_component(
        |_, _| Err(ComponentError::new("boom")),
        Attrs::new(),
        vec![],
    );
    renderer.host_mut().clear_ops();
    renderer.render(failing, target);
    assert!(renderer.run().is_err());

    // Committed tree untouched, no host operation issued.
    assert!(renderer.host().ops().is_empty());
    assert_eq!(renderer.host().root_html(), "<div>ok</div>");

    // And the renderer keeps working afterwards.
    rerender(
        &mut renderer,
        element("div", Attrs::new(), vec![text("recovered")]).unwrap(),
    );
    assert_eq!(renderer.host().root_html(), "<div>recovered</div>");
}

/// Delegating host that rejects a set number of node creations.
struct FlakyHost {
    inner: MemoryHost,
    failures_left: usize,
}

impl Host for FlakyHost {
    fn create_element(&mut self, tag: &str, attrs: &Attrs) -> Result<HostNode, HostError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(HostError::Backend("allocation rejected".into()));
        }
        self.inner.create_element(tag, attrs)
    }

    fn create_text(&mut self, value: &str) -> Result<HostNode, HostError> {
        self.inner.create_text(value)
    }

    fn set_attribute(
        &mut self,
        node: HostNode,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        self.inner.set_attribute(node, name, value)
    }

    fn remove_attribute(&mut self, node: HostNode, name: &str) -> Result<(), HostError> {
        self.inner.remove_attribute(node, name)
    }

    fn set_text(&mut self, node: HostNode, value: &str) -> Result<(), HostError> {
        self.inner.set_text(node, value)
    }

    fn insert_before(
        &mut self,
        parent: HostNode,
        node: HostNode,
        before: Option<HostNode>,
    ) -> Result<(), HostError> {
        self.inner.insert_before(parent, node, before)
    }

    fn remove(&mut self, node: HostNode) -> Result<(), HostError> {
        self.inner.remove(node)
    }
}

#[test]
fn test_commit_failure_surfaces_and_retry_recovers() {
    let mut renderer = Renderer::new(FlakyHost {
        inner: MemoryHost::new(),
        failures_left: 1,
    });
    let target = renderer.host().inner.root();

    renderer.render(
        element("div", Attrs::new(), vec![text("a")]).unwrap(),
        target,
    );
    assert!(renderer.run().is_err());
    assert_eq!(renderer.host().inner.root_html(), "");

    // The failed subtree was never materialized; a later render mounts it
    // fresh instead of erroring (or worse) on the missing parent node.
    renderer.render(
        element("div", Attrs::new(), vec![text("a"), text("b")]).unwrap(),
        target,
    );
    renderer.run().unwrap();
    assert_eq!(renderer.host().inner.root_html(), "<div>ab</div>");
}

#[test]
fn test_hook_failure_does_not_abort_commit() {
    let mut renderer = rendered(element("div", Attrs::new(), vec![text("a")]).unwrap());

    // Poison the div's hooks; the next update must still commit.
    let div = match renderer.host().ops()[0] {
        HostOp::CreateElement { node, .. } => node,
        ref op => panic!("unexpected first op {op:?}"),
    };
    renderer.host_mut().poison_hooks(div);

    let target = renderer.host().root();
    renderer.host_mut().clear_ops();
    renderer.render(element("div", Attrs::new(), vec![text("b")]).unwrap(), target);
    renderer.run().unwrap();
    assert_eq!(renderer.host().root_html(), "<div>b</div>");
}

// =============================================================================
// Hook ordering
// =============================================================================

#[test]
fn test_removal_hook_precedes_detach() {
    let mut renderer = rendered(element("div", Attrs::new(), vec![]).unwrap());
    rerender(&mut renderer, element("span", Attrs::new(), vec![]).unwrap());

    let ops = renderer.host().ops();
    let removal_hook = ops
        .iter()
        .position(|op| matches!(op, HostOp::BeforeRemoval { .. }))
        .expect("removal hook fired");
    let detach = ops
        .iter()
        .position(|op| matches!(op, HostOp::Remove { .. }))
        .expect("old node detached");
    let insert = ops
        .iter()
        .position(|op| matches!(op, HostOp::InsertBefore { .. }))
        .expect("new node inserted");
    let created = ops
        .iter()
        .position(|op| matches!(op, HostOp::Created { .. }))
        .expect("created hook fired");

    assert!(removal_hook < detach);
    assert!(insert < created);
    // Replacement lands at the old node's position before the old node goes.
    assert!(insert < detach);
    assert_eq!(renderer.host().root_html(), "<span></span>");
}

#[test]
fn test_unmount_fires_removal_hooks_and_detaches() {
    let mut renderer = rendered(
        element(
            "div",
            Attrs::new(),
            vec![element("span", Attrs::new(), vec![text("x")]).unwrap()],
        )
        .unwrap(),
    );
    renderer.host_mut().clear_ops();

    let host = renderer.unmount();
    assert_eq!(host.root_html(), "");
    // One hook per mounted node: div, span, text.
    let hooks = host
        .ops()
        .iter()
        .filter(|op| matches!(op, HostOp::BeforeRemoval { .. }))
        .count();
    assert_eq!(hooks, 3);
}

// =============================================================================
// Components
// =============================================================================

#[test]
fn test_component_expansion_end_to_end() {
    let badge = |attrs: &Attrs, _children: &[VNode]| {
        let label = attrs
            .get("label")
            .and_then(AttrValue::as_str)
            .unwrap_or("?")
            .to_string();
        element("b", Attrs::new(), vec![text(label)]).unwrap()
    };
    let renderer = rendered(
        element(
            "div",
            Attrs::new(),
            vec![spool::component(badge, attrs([("label", "new")]), vec![])],
        )
        .unwrap(),
    );
    assert_eq!(renderer.host().root_html(), "<div><b>new</b></div>");
}

// =============================================================================
// Property tests
// =============================================================================

fn expected_html(node: &VNode) -> String {
    match node {
        VNode::Text(value) => value.clone(),
        VNode::Element {
            tag,
            attrs,
            children,
        } => {
            let mut out = format!("<{tag}");
            for (name, value) in attrs {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            out.push('>');
            for child in children {
                out.push_str(&expected_html(child));
            }
            out.push_str(&format!("</{tag}>"));
            out
        }
        VNode::Component { .. } => unreachable!("strategy emits no components"),
    }
}

fn arb_attrs() -> impl Strategy<Value = Attrs> {
    prop::collection::btree_map(
        "[a-c]",
        "[a-z]{0,3}".prop_map(AttrValue::from),
        0..3,
    )
}

fn arb_tree() -> impl Strategy<Value = VNode> {
    let leaf = "[a-z]{1,6}".prop_map(text);
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::sample::select(vec!["div", "span", "p"]),
            arb_attrs(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, attrs, children)| element(tag, attrs, children).unwrap())
    })
}

proptest! {
    /// Any tree transition converges to the target description.
    #[test]
    fn prop_transition_converges(a in arb_tree(), b in arb_tree()) {
        let mut renderer = rendered(a.clone());
        prop_assert_eq!(renderer.host().root_html(), expected_html(&a));
        rerender(&mut renderer, b.clone());
        prop_assert_eq!(renderer.host().root_html(), expected_html(&b));
    }

    /// Slicing the walk arbitrarily finely never changes the outcome.
    #[test]
    fn prop_budgeted_walk_matches_unbounded(a in arb_tree(), b in arb_tree()) {
        let mut renderer = rendered(a);
        let target = renderer.host().root();
        renderer.render(b.clone(), target);
        loop {
            match renderer.tick(&UnitBudget::new(1)).unwrap() {
                WorkStatus::Idle => break,
                WorkStatus::InProgress | WorkStatus::Committed => {}
            }
        }
        prop_assert_eq!(renderer.host().root_html(), expected_html(&b));
    }

    /// Re-rendering an identical description is structurally silent.
    #[test]
    fn prop_identical_rerender_is_structurally_silent(a in arb_tree()) {
        let mut renderer = rendered(a.clone());
        rerender(&mut renderer, a);
        let structural = renderer
            .host()
            .ops()
            .iter()
            .filter(|op| is_structural(op))
            .count();
        prop_assert_eq!(structural, 0);
    }
}
