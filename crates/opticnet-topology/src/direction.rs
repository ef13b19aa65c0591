//! Routing direction from one node toward another.
//!
//! Directions are derived from BST ordering alone: walking from a node up to
//! the root narrows the open id interval its subtree covers. A destination
//! inside that interval lies below the node, anything else lies above it.

use crate::{NodeId, Result, Side, Topology, TopologyError};

/// Where a destination lies relative to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// The destination is this node
    Local,
    /// Somewhere below the left child
    Left,
    /// Somewhere below the right child
    Right,
    /// Outside this subtree, beyond the parent
    Parent,
    /// The left child itself
    LeftRoute,
    /// The right child itself
    RightRoute,
    /// The parent itself
    ParentRoute,
}

impl Topology {
    /// Open id interval `(lo, hi)` covered by the subtree rooted at `id`.
    ///
    /// `None` bounds are unbounded. The nearest ancestor reached from the left
    /// gives the upper bound, the nearest reached from the right the lower one.
    pub fn subtree_interval(&self, id: NodeId) -> Result<(Option<NodeId>, Option<NodeId>)> {
        let (mut lo, mut hi) = (None, None);
        let mut cur = id;
        let mut steps = 0;

        while let Some(parent) = self.parent(cur)? {
            match self.side_of(cur)? {
                Some(Side::Left) if hi.is_none() => hi = Some(parent),
                Some(Side::Right) if lo.is_none() => lo = Some(parent),
                _ => {}
            }
            if lo.is_some() && hi.is_some() {
                break;
            }
            steps += 1;
            if steps > self.len() {
                return Err(TopologyError::Unreachable(id));
            }
            cur = parent;
        }
        Ok((lo, hi))
    }

    /// Where `to` lies relative to `from`.
    pub fn routing_direction(&self, from: NodeId, to: NodeId) -> Result<Direction> {
        self.node(to)?;
        let node = self.node(from)?;

        if from == to {
            return Ok(Direction::Local);
        }
        if node.left == Some(to) {
            return Ok(Direction::LeftRoute);
        }
        if node.right == Some(to) {
            return Ok(Direction::RightRoute);
        }
        if node.parent == Some(to) {
            return Ok(Direction::ParentRoute);
        }

        let (lo, hi) = self.subtree_interval(from)?;
        let below = lo.map_or(true, |lo| to > lo) && hi.map_or(true, |hi| to < hi);

        Ok(match (below, to < from) {
            (true, true) => Direction::Left,
            (true, false) => Direction::Right,
            (false, _) => Direction::Parent,
        })
    }

    /// Neighbour of `from` on the tree path toward `to`; `None` when they coincide.
    pub fn next_hop(&self, from: NodeId, to: NodeId) -> Result<Option<NodeId>> {
        let node = self.node(from)?;
        let link = match self.routing_direction(from, to)? {
            Direction::Local => return Ok(None),
            Direction::Left | Direction::LeftRoute => node.left,
            Direction::Right | Direction::RightRoute => node.right,
            Direction::Parent | Direction::ParentRoute => node.parent,
        };
        link.map(Some).ok_or(TopologyError::Unreachable(to))
    }
}
