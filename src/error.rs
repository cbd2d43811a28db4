//! Error types.
//!
//! Construction errors are surfaced by the vnode builders so malformed trees
//! never reach the walker. Resolution errors abort an in-progress walk and
//! leave the committed host tree untouched. Host primitive errors abort the
//! commit; lifecycle hook errors are logged and isolated instead.

use std::fmt;

use crate::types::HostNode;

// =============================================================================
// Tree construction
// =============================================================================

/// Rejected virtual-tree input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Element constructed with an empty tag name.
    EmptyTag,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::EmptyTag => write!(f, "element tag name must not be empty"),
        }
    }
}

impl std::error::Error for TreeError {}

// =============================================================================
// Component resolution
// =============================================================================

/// Failure reported by a component function itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component failed: {}", self.message)
    }
}

impl std::error::Error for ComponentError {}

/// Failure while resolving a component fiber to a concrete node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A component chain did not reach an element or text node within the
    /// configured depth (likely a component returning itself).
    DepthExceeded { limit: usize },
    /// The component function returned an error.
    Component(ComponentError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::DepthExceeded { limit } => {
                write!(f, "component did not resolve within {limit} expansions")
            }
            ResolveError::Component(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Component(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ComponentError> for ResolveError {
    fn from(e: ComponentError) -> Self {
        ResolveError::Component(e)
    }
}

// =============================================================================
// Host
// =============================================================================

/// Failure reported by the host mutation interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The handle does not name a live host node.
    NodeNotFound(HostNode),
    /// An element operation was applied to a non-element node.
    NotAnElement(HostNode),
    /// A text operation was applied to a non-text node.
    NotAText(HostNode),
    /// A mutation needed a parent host node that was never created (its own
    /// placement failed in an earlier commit).
    ParentUnavailable,
    /// A lifecycle hook failed.
    Hook(String),
    /// The backend rejected the operation for a reason of its own.
    Backend(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NodeNotFound(n) => write!(f, "host node {} not found", n.0),
            HostError::NotAnElement(n) => write!(f, "host node {} is not an element", n.0),
            HostError::NotAText(n) => write!(f, "host node {} is not a text node", n.0),
            HostError::ParentUnavailable => write!(f, "parent host node unavailable"),
            HostError::Hook(msg) => write!(f, "lifecycle hook failed: {msg}"),
            HostError::Backend(msg) => write!(f, "host backend error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

// =============================================================================
// Renderer
// =============================================================================

/// Top-level failure surfaced by [`Renderer::tick`](crate::Renderer::tick).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Component resolution failed; the in-progress generation was discarded
    /// and the committed host tree is untouched.
    Resolve(ResolveError),
    /// A host mutation primitive failed mid-commit.
    Host(HostError),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Resolve(e) => write!(f, "reconciliation aborted: {e}"),
            RenderError::Host(e) => write!(f, "commit failed: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resolve(e) => Some(e),
            RenderError::Host(e) => Some(e),
        }
    }
}

impl From<ResolveError> for RenderError {
    fn from(e: ResolveError) -> Self {
        RenderError::Resolve(e)
    }
}

impl From<HostError> for RenderError {
    fn from(e: HostError) -> Self {
        RenderError::Host(e)
    }
}
