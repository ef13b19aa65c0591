//! Node identity and links.
//!
//! Nodes live in an arena owned by [`Topology`](crate::Topology). Links are
//! plain ids into that arena, so the parent/child back-pointers never own
//! anything and navigation in either direction is O(1).

use std::fmt;

/// A switch identifier. A tree of `n` nodes uses ids `1..=n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create from a raw id.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Arena slot of this id, if the id is in the 1-based range.
    #[inline]
    pub(crate) fn index(&self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<NodeId> for u32 {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

/// Which child slot of its parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other child slot.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One tree node. `None` links are the "absent" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeNode {
    /// Stable identity
    pub id: NodeId,
    /// Parent link (absent for the root)
    pub parent: Option<NodeId>,
    /// Left child link
    pub left: Option<NodeId>,
    /// Right child link
    pub right: Option<NodeId>,
}

impl TreeNode {
    /// A node with no links.
    pub const fn detached(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            left: None,
            right: None,
        }
    }

    /// The parent link.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The left child link.
    #[inline]
    pub fn left_child(&self) -> Option<NodeId> {
        self.left
    }

    /// The right child link.
    #[inline]
    pub fn right_child(&self) -> Option<NodeId> {
        self.right
    }

    /// Child link on the given side.
    #[inline]
    pub fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Whether this node has no parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
