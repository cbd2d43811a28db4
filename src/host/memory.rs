//! In-memory host tree.
//!
//! A headless [`Host`] backend: nodes live in a slot vector, every mutation
//! and hook invocation is recorded in an operation log, and subtrees can be
//! dumped as an html-ish string for structural assertions.

use std::fmt::Write as _;

use super::Host;
use crate::error::HostError;
use crate::types::{AttrValue, Attrs, HostNode};

/// One recorded host operation, in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateElement { node: HostNode, tag: String },
    CreateText { node: HostNode, value: String },
    SetAttr { node: HostNode, name: String, value: AttrValue },
    RemoveAttr { node: HostNode, name: String },
    SetText { node: HostNode, value: String },
    InsertBefore { parent: HostNode, node: HostNode, before: Option<HostNode> },
    Remove { node: HostNode },
    Created { node: HostNode },
    Updated { node: HostNode },
    BeforeRemoval { node: HostNode },
}

#[derive(Debug, Clone)]
enum MemNodeKind {
    Element { tag: String, attrs: Attrs },
    Text(String),
}

#[derive(Debug, Clone)]
struct MemNode {
    kind: MemNodeKind,
    parent: Option<HostNode>,
    children: Vec<HostNode>,
}

/// Headless host tree with an operation log.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<Option<MemNode>>,
    ops: Vec<HostOp>,
    /// Hooks on these nodes fail, for testing hook isolation.
    poisoned: Vec<HostNode>,
}

impl MemoryHost {
    /// Create a host with a single root container node.
    pub fn new() -> Self {
        let mut host = Self::default();
        host.nodes.push(Some(MemNode {
            kind: MemNodeKind::Element {
                tag: "#root".to_string(),
                attrs: Attrs::new(),
            },
            parent: None,
            children: Vec::new(),
        }));
        host
    }

    /// The root container node, used as a render target.
    pub fn root(&self) -> HostNode {
        HostNode(0)
    }

    /// Operations recorded since the last [`clear_ops`](Self::clear_ops).
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Make every lifecycle hook on `node` fail.
    pub fn poison_hooks(&mut self, node: HostNode) {
        self.poisoned.push(node);
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Render the root's content as an html-ish string.
    pub fn root_html(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.node(self.root()) {
            for &child in &root.children {
                self.write_node(&mut out, child);
            }
        }
        out
    }

    /// Render one subtree as an html-ish string.
    pub fn html(&self, node: HostNode) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    fn write_node(&self, out: &mut String, id: HostNode) {
        let Some(node) = self.node(id) else { return };
        match &node.kind {
            MemNodeKind::Text(value) => out.push_str(value),
            MemNodeKind::Element { tag, attrs } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(out, child);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn node(&self, id: HostNode) -> Option<&MemNode> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: HostNode) -> Result<&mut MemNode, HostError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(HostError::NodeNotFound(id))
    }

    fn alloc(&mut self, node: MemNode) -> HostNode {
        let id = HostNode(self.nodes.len() as u64);
        self.nodes.push(Some(node));
        id
    }

    fn detach(&mut self, node: HostNode) -> Result<(), HostError> {
        let parent = self.node_mut(node)?.parent.take();
        if let Some(parent) = parent {
            let siblings = &mut self.node_mut(parent)?.children;
            siblings.retain(|&c| c != node);
        }
        Ok(())
    }

    fn hook(&mut self, node: HostNode, op: HostOp, name: &str) -> Result<(), HostError> {
        self.ops.push(op);
        if self.poisoned.contains(&node) {
            return Err(HostError::Hook(format!("{name} poisoned for node {}", node.0)));
        }
        Ok(())
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str, attrs: &Attrs) -> Result<HostNode, HostError> {
        let node = self.alloc(MemNode {
            kind: MemNodeKind::Element {
                tag: tag.to_string(),
                attrs: attrs.clone(),
            },
            parent: None,
            children: Vec::new(),
        });
        self.ops.push(HostOp::CreateElement {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text(&mut self, value: &str) -> Result<HostNode, HostError> {
        let node = self.alloc(MemNode {
            kind: MemNodeKind::Text(value.to_string()),
            parent: None,
            children: Vec::new(),
        });
        self.ops.push(HostOp::CreateText {
            node,
            value: value.to_string(),
        });
        Ok(node)
    }

    fn set_attribute(
        &mut self,
        node: HostNode,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            MemNodeKind::Element { attrs, .. } => {
                attrs.insert(name.to_string(), value.clone());
            }
            MemNodeKind::Text(_) => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::SetAttr {
            node,
            name: name.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostNode, name: &str) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            MemNodeKind::Element { attrs, .. } => {
                attrs.remove(name);
            }
            MemNodeKind::Text(_) => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::RemoveAttr {
            node,
            name: name.to_string(),
        });
        Ok(())
    }

    fn set_text(&mut self, node: HostNode, value: &str) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.kind {
            MemNodeKind::Text(text) => *text = value.to_string(),
            MemNodeKind::Element { .. } => return Err(HostError::NotAText(node)),
        }
        self.ops.push(HostOp::SetText {
            node,
            value: value.to_string(),
        });
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostNode,
        node: HostNode,
        before: Option<HostNode>,
    ) -> Result<(), HostError> {
        // Re-inserting an attached node is a move.
        self.detach(node)?;
        self.node_mut(node)?.parent = Some(parent);
        let children = &mut self.node_mut(parent)?.children;
        let position = before
            .and_then(|b| children.iter().position(|&c| c == b))
            .unwrap_or(children.len());
        children.insert(position, node);
        self.ops.push(HostOp::InsertBefore {
            parent,
            node,
            before,
        });
        Ok(())
    }

    fn remove(&mut self, node: HostNode) -> Result<(), HostError> {
        self.detach(node)?;
        self.ops.push(HostOp::Remove { node });
        Ok(())
    }

    fn created(&mut self, node: HostNode) -> Result<(), HostError> {
        self.hook(node, HostOp::Created { node }, "created")
    }

    fn updated(&mut self, node: HostNode) -> Result<(), HostError> {
        self.hook(node, HostOp::Updated { node }, "updated")
    }

    fn before_removal(&mut self, node: HostNode) -> Result<(), HostError> {
        self.hook(node, HostOp::BeforeRemoval { node }, "before_removal")
    }
}

// =============================================================================
// Tests
// =============================================================================
