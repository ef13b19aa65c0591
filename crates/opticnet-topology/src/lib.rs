//! OpticNet Tree Topology
//!
//! A fixed set of switches arranged as a binary search tree over their ids.
//! The tree is an arena: nodes are addressed by [`NodeId`] and every link
//! (parent, left, right) is a plain id, so back-pointers own nothing.
//!
//! # Routing
//!
//! [`Topology::routing_direction`] tells where a destination lies relative to
//! a node, derived purely from BST ordering. A message climbs (`Parent`) until
//! it reaches the lowest common ancestor with its destination, then descends.
//!
//! # Rotations
//!
//! The topology adjusts itself to traffic through three bottom-up primitives
//! ([`Primitive::Zig`], [`Primitive::ZigZig`], [`Primitive::ZigZag`]), the
//! single and double rotations of a splay tree. Each one lifts a node toward
//! the root and preserves:
//!
//! - BST ordering over ids
//! - bidirectional parent/child consistency
//! - a single root from which every node is reachable

mod build;
mod direction;
mod error;
mod node;
mod rotate;
mod tree;

pub use direction::Direction;
pub use error::{Result, TopologyError};
pub use node::{NodeId, Side, TreeNode};
pub use rotate::Primitive;
pub use tree::Topology;

/// Depth lifted by one application of a primitive.
pub const fn lift(primitive: Primitive) -> usize {
    match primitive {
        Primitive::Zig => 1,
        Primitive::ZigZig | Primitive::ZigZag => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_lifts_by_primitive() {
        for primitive in [Primitive::Zig, Primitive::ZigZig, Primitive::ZigZag] {
            let mut tree = Topology::balanced(15).unwrap();
            // 1 and 5 both sit three levels below the root.
            let x = if primitive == Primitive::ZigZag { NodeId(5) } else { NodeId(1) };
            let before = tree.depth(x).unwrap();
            tree.apply(x, primitive).unwrap();
            assert_eq!(tree.depth(x).unwrap(), before - lift(primitive));
        }
    }
}
