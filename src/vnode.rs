//! Virtual tree construction.
//!
//! A virtual node is an immutable description of desired tree shape for one
//! render: element nodes (tag, attributes, ordered children), text nodes
//! (string payload), and component nodes (a resolver function plus
//! attributes/children). Components are expanded by the walker - repeatedly,
//! since a component may itself return another component - until a concrete
//! element or text node results.
//!
//! Malformed input is rejected here, at construction time; the walker never
//! sees it.

use std::fmt;
use std::rc::Rc;

use crate::error::{ComponentError, TreeError};
use crate::types::{Attrs, KEY_ATTR};

// =============================================================================
// Component
// =============================================================================

/// Resolver function of a component node.
///
/// Receives the component's attributes and children and produces the node it
/// stands for. Fallible so a resolver can reject bad input; infallible
/// components are wrapped by [`component`].
pub type ComponentFn = dyn Fn(&Attrs, &[VNode]) -> Result<VNode, ComponentError>;

/// A component reference with pointer identity.
#[derive(Clone)]
pub struct Component {
    func: Rc<ComponentFn>,
}

impl Component {
    /// Invoke the resolver.
    pub fn call(&self, attrs: &Attrs, children: &[VNode]) -> Result<VNode, ComponentError> {
        (self.func)(attrs, children)
    }

    /// Identity comparison: two references to the same resolver function.
    #[cfg(test)]
    fn same(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({:p})", Rc::as_ptr(&self.func))
    }
}

// =============================================================================
// VNode
// =============================================================================

/// A virtual tree node.
#[derive(Debug, Clone)]
pub enum VNode {
    Element {
        tag: String,
        attrs: Attrs,
        children: Vec<VNode>,
    },
    Text(String),
    Component {
        component: Component,
        attrs: Attrs,
        children: Vec<VNode>,
    },
}

impl VNode {
    /// The node's stable key, if its attributes declare one.
    ///
    /// Text nodes carry no attributes and therefore no key.
    pub fn key(&self) -> Option<String> {
        match self {
            VNode::Element { attrs, .. } | VNode::Component { attrs, .. } => {
                attrs.get(KEY_ATTR).map(|v| v.to_string())
            }
            VNode::Text(_) => None,
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Build an element node.
///
/// Rejects an empty tag name - an element without an identity cannot be
/// classified against a previous generation.
pub fn element(
    tag: impl Into<String>,
    attrs: Attrs,
    children: Vec<VNode>,
) -> Result<VNode, TreeError> {
    let tag = tag.into();
    if tag.is_empty() {
        return Err(TreeError::EmptyTag);
    }
    Ok(VNode::Element {
        tag,
        attrs,
        children,
    })
}

/// Build a text node.
pub fn text(value: impl Into<String>) -> VNode {
    VNode::Text(value.into())
}

/// Build a component node from an infallible resolver.
pub fn component<F>(func: F, attrs: Attrs, children: Vec<VNode>) -> VNode
where
    F: Fn(&Attrs, &[VNode]) -> VNode + 'static,
{
    try_component(move |a, c| Ok(func(a, c)), attrs, children)
}

/// Build a component node from a fallible resolver.
pub fn try_component<F>(func: F, attrs: Attrs, children: Vec<VNode>) -> VNode
where
    F: Fn(&Attrs, &[VNode]) -> Result<VNode, ComponentError> + 'static,
{
    VNode::Component {
        component: Component {
            func: Rc::new(func),
        },
        attrs,
        children,
    }
}

// =============================================================================
// Tests
// =============================================================================
