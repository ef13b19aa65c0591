//! Error types for opticnet-topology.

use thiserror::Error;

use crate::{NodeId, Primitive};

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised by the tree topology.
///
/// Outside construction, each one means a caller passed an id that does not
/// exist or the links have stopped describing a BST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The id does not resolve to a node of this topology.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// A topology must hold at least one node.
    #[error("topology must contain at least one node")]
    Empty,

    /// The parent does not list the node as one of its children.
    #[error("node {child} names {parent} as parent but {parent} does not link back")]
    InconsistentLink { parent: NodeId, child: NodeId },

    /// The primitive needs a parent (or grandparent) the node does not have.
    #[error("{primitive:?} on node {node} needs an ancestor that is absent")]
    MissingAncestor { node: NodeId, primitive: Primitive },

    /// The node, its parent and grandparent do not form the primitive's shape.
    #[error("{primitive:?} does not match the shape around node {node}")]
    UnexpectedShape { node: NodeId, primitive: Primitive },

    /// Left subtree ids must be smaller and right subtree ids larger.
    #[error("BST ordering violated at node {node}: {offender} is on the wrong side")]
    OrderViolation { node: NodeId, offender: NodeId },

    /// More than one node has no parent, or the root has one.
    #[error("expected a single root, found {0:?}")]
    RootMismatch(Vec<NodeId>),

    /// A node cannot be reached from the root (cycle or detached subtree).
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),

    /// An explicit edge list names a child twice or links a node to itself.
    #[error("invalid edge {parent} -> {child}")]
    InvalidEdge { parent: NodeId, child: NodeId },
}
