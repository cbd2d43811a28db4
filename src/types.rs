//! Core types for spool.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reconciliation pipeline and define what the
//! host interface understands.

use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Attributes
// =============================================================================

/// Attribute map of a virtual element.
///
/// A `BTreeMap` so attribute application order is deterministic - the same
/// tree always produces the same host-operation sequence.
pub type Attrs = BTreeMap<String, AttrValue>;

/// Name of the reserved attribute carrying a child's stable key.
pub const KEY_ATTR: &str = "key";

/// An attribute value.
///
/// Using plain data variants for exact comparison during attribute diffing.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttrValue {
    /// Borrow the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

/// Build an attribute map from `(name, value)` pairs.
pub fn attrs<N, V, I>(pairs: I) -> Attrs
where
    N: Into<String>,
    V: Into<AttrValue>,
    I: IntoIterator<Item = (N, V)>,
{
    pairs
        .into_iter()
        .map(|(n, v)| (n.into(), v.into()))
        .collect()
}

// =============================================================================
// Diff mode
// =============================================================================

/// Child-diffing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Single forward pass with a key lookback map. Reordered keyed children
    /// produce one relocation each instead of destroy/recreate pairs.
    #[default]
    Keyed,
    /// Pair children strictly by index, ignoring keys. Lower overhead for
    /// trees known to never reorder.
    Positional,
}

// =============================================================================
// Host node handle
// =============================================================================

/// Opaque handle to a node in the host tree.
///
/// Minted by the [`Host`](crate::host::Host) implementation; the engine only
/// stores and passes these back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostNode(pub u64);

// =============================================================================
// Tests
// =============================================================================
