//! Host mutation interface.
//!
//! The engine never touches the external tree directly: every mutation goes
//! through this trait, exclusively from inside the commit executor. Backends
//! implement node creation, attribute and text updates, insertion/removal,
//! and the three lifecycle hooks.
//!
//! [`memory::MemoryHost`] is the bundled headless backend, used by the test
//! suite and available for embedding.

pub mod memory;

pub use memory::{HostOp, MemoryHost};

use crate::error::HostError;
use crate::types::{AttrValue, Attrs, HostNode};

/// Primitive mutation capabilities of a host tree.
///
/// `insert_before` contract: when `before` is `None` or names a node that is
/// no longer a child of `parent`, the node is appended - a reference sibling
/// may have been detached earlier in the same commit.
pub trait Host {
    /// Create an element node with its initial attributes applied.
    fn create_element(&mut self, tag: &str, attrs: &Attrs) -> Result<HostNode, HostError>;

    /// Create a text node.
    fn create_text(&mut self, value: &str) -> Result<HostNode, HostError>;

    /// Set or overwrite a named attribute.
    fn set_attribute(
        &mut self,
        node: HostNode,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError>;

    /// Remove a named attribute.
    fn remove_attribute(&mut self, node: HostNode, name: &str) -> Result<(), HostError>;

    /// Replace a text node's value in place.
    fn set_text(&mut self, node: HostNode, value: &str) -> Result<(), HostError>;

    /// Insert `node` under `parent`, before `before` or appended last.
    fn insert_before(
        &mut self,
        parent: HostNode,
        node: HostNode,
        before: Option<HostNode>,
    ) -> Result<(), HostError>;

    /// Detach a node from its parent.
    fn remove(&mut self, node: HostNode) -> Result<(), HostError>;

    /// Lifecycle hook: a node was created and inserted this commit.
    fn created(&mut self, _node: HostNode) -> Result<(), HostError> {
        Ok(())
    }

    /// Lifecycle hook: a node was updated this commit.
    fn updated(&mut self, _node: HostNode) -> Result<(), HostError> {
        Ok(())
    }

    /// Lifecycle hook: a node is about to be removed; the subtree is still
    /// intact when this fires.
    fn before_removal(&mut self, _node: HostNode) -> Result<(), HostError> {
        Ok(())
    }
}
