//! Abstract content-node contract consumed by the digest engine and the
//! snapshot serializer.
//!
//! The host system (whatever actually stores the tree) implements
//! [`ContentNode`] as a read-only view. The engine never asks for parent
//! pointers: it maintains its own ancestor chain of [`NodeInfo`] frames
//! while descending, which is what the pattern matchers run against.

use crate::error::TreeError;
use crate::tree::value::Value;

/// One or many values of a property.
#[derive(Debug, Clone)]
pub enum PropertyValues {
    Single(Value),
    Multi(Vec<Value>),
}

impl PropertyValues {
    /// View the values as a slice regardless of cardinality.
    pub fn as_slice(&self) -> &[Value] {
        match self {
            PropertyValues::Single(v) => std::slice::from_ref(v),
            PropertyValues::Multi(vs) => vs.as_slice(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, PropertyValues::Multi(_))
    }
}

/// A named property with one or many scalar values.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub values: PropertyValues,
}

impl Property {
    pub fn single(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            values: PropertyValues::Single(value),
        }
    }

    pub fn multi(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values: PropertyValues::Multi(values),
        }
    }
}

/// Identity frame for one node in an ancestor chain.
///
/// Pattern matching needs only the local name and the primary type of each
/// ancestor, so traversal keeps a stack of these instead of requiring the
/// host to expose parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
    pub primary_type: String,
}

impl NodeInfo {
    pub fn of<N: ContentNode>(node: &N) -> Self {
        Self {
            name: node.name().to_string(),
            primary_type: node.primary_type().to_string(),
        }
    }
}

/// Read-only view of one node in a content tree.
///
/// Implementations are cheap handles (the engine clones none of them, but
/// `children` returns owned handles so lazy hosts can materialize on
/// demand). Paths are absolute and `/`-separated; the local name is the last
/// path segment, empty only for the root `/`.
pub trait ContentNode: Sized {
    /// Absolute path of this node.
    fn path(&self) -> &str;

    /// Local name (last path segment).
    fn name(&self) -> &str;

    /// Primary type name, e.g. `app:Component`.
    fn primary_type(&self) -> &str;

    /// Whether this node's children have a stable, caller-meaningful order.
    ///
    /// This is an explicit capability query, resolved by the implementation,
    /// never probed via failure.
    fn orderable_children(&self) -> bool;

    /// Child nodes in the store's enumeration order.
    fn children(&self) -> Result<Vec<Self>, TreeError>;

    /// Properties of this node. Order is not significant.
    fn properties(&self) -> Result<Vec<Property>, TreeError>;
}
