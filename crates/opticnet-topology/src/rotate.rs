//! Bottom-up rotation primitives.
//!
//! Every primitive lifts a node `x` toward the root:
//!
//! ```text
//!   Zig:        y            x
//!              / \          / \
//!             x   c   →    a   y
//!            / \              / \
//!           a   b            b   c
//!
//!   ZigZig:  rotate y over z, then x over y   (x, y on the same side)
//!   ZigZag:  rotate x over y, then x over z   (x, y on opposite sides)
//! ```
//!
//! Shapes are checked before the first link is touched, so a primitive either
//! fails leaving the tree untouched or completes with every invariant intact.

use crate::{NodeId, Result, Side, Topology, TopologyError};

/// The structural restructurings a node can undergo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// Single rotation of x over its parent
    Zig,
    /// Double rotation, x and its parent on the same side
    ZigZig,
    /// Double rotation, x and its parent on opposite sides
    ZigZag,
}

impl Topology {
    /// Every node whose links `primitive` would change when applied to `x`.
    ///
    /// Covers x, its parent y, the grandparent z for double rotations, the node
    /// above the rotated group, and the subtree roots that change parent.
    pub fn footprint(&self, x: NodeId, primitive: Primitive) -> Result<Vec<NodeId>> {
        let missing = TopologyError::MissingAncestor { node: x, primitive };
        let y = self.parent(x)?.ok_or(missing.clone())?;
        let side_x = self.side_of(x)?.ok_or(missing.clone())?;
        let node_x = self.node(x)?;

        let mut nodes = vec![x, y];
        match primitive {
            Primitive::Zig => {
                nodes.extend(self.parent(y)?);
                nodes.extend(node_x.child(side_x.opposite()));
            }
            Primitive::ZigZig => {
                let z = self.parent(y)?.ok_or(missing.clone())?;
                let side_y = self.side_of(y)?.ok_or(missing)?;
                nodes.push(z);
                nodes.extend(self.parent(z)?);
                nodes.extend(self.node(y)?.child(side_y.opposite()));
                nodes.extend(node_x.child(side_x.opposite()));
            }
            Primitive::ZigZag => {
                let z = self.parent(y)?.ok_or(missing)?;
                nodes.push(z);
                nodes.extend(self.parent(z)?);
                nodes.extend(node_x.left);
                nodes.extend(node_x.right);
            }
        }
        Ok(nodes)
    }

    /// Apply `primitive` to `x`.
    pub fn apply(&mut self, x: NodeId, primitive: Primitive) -> Result<()> {
        match primitive {
            Primitive::Zig => self.zig(x),
            Primitive::ZigZig => self.zig_zig(x),
            Primitive::ZigZag => self.zig_zag(x),
        }
    }

    /// Rotate `x` over its parent.
    pub fn zig(&mut self, x: NodeId) -> Result<()> {
        let y = self
            .parent(x)?
            .ok_or(TopologyError::MissingAncestor { node: x, primitive: Primitive::Zig })?;
        self.side_of(x)?;
        self.side_of(y)?;
        self.rotate_up(x)
    }

    /// Rotate the parent over the grandparent, then `x` over the parent.
    pub fn zig_zig(&mut self, x: NodeId) -> Result<()> {
        let (y, side_x, side_y) = self.double_shape(x, Primitive::ZigZig)?;
        if side_x != side_y {
            return Err(TopologyError::UnexpectedShape { node: x, primitive: Primitive::ZigZig });
        }
        self.rotate_up(y)?;
        self.rotate_up(x)
    }

    /// Rotate `x` over its parent, then over its former grandparent.
    pub fn zig_zag(&mut self, x: NodeId) -> Result<()> {
        let (_, side_x, side_y) = self.double_shape(x, Primitive::ZigZag)?;
        if side_x == side_y {
            return Err(TopologyError::UnexpectedShape { node: x, primitive: Primitive::ZigZag });
        }
        self.rotate_up(x)?;
        self.rotate_up(x)
    }

    /// Parent and both sides of a double rotation, all links checked.
    fn double_shape(&self, x: NodeId, primitive: Primitive) -> Result<(NodeId, Side, Side)> {
        let missing = TopologyError::MissingAncestor { node: x, primitive };
        let y = self.parent(x)?.ok_or(missing.clone())?;
        let z = self.parent(y)?.ok_or(missing.clone())?;
        let side_x = self.side_of(x)?.ok_or(missing.clone())?;
        let side_y = self.side_of(y)?.ok_or(missing)?;
        self.side_of(z)?;
        Ok((y, side_x, side_y))
    }

    /// Single rotation of `x` over its parent. Links must already be checked.
    fn rotate_up(&mut self, x: NodeId) -> Result<()> {
        let y = self
            .parent(x)?
            .ok_or(TopologyError::MissingAncestor { node: x, primitive: Primitive::Zig })?;
        let side_x = self
            .side_of(x)?
            .ok_or(TopologyError::InconsistentLink { parent: y, child: x })?;
        let above = self.parent(y)?.zip(self.side_of(y)?);
        let inner = self.node(x)?.child(side_x.opposite());
        if let Some(inner) = inner {
            self.node(inner)?;
        }

        self.node_mut(y)?.set_child(side_x, inner);
        if let Some(inner) = inner {
            self.node_mut(inner)?.parent = Some(y);
        }

        self.node_mut(x)?.set_child(side_x.opposite(), Some(y));
        self.node_mut(y)?.parent = Some(x);

        match above {
            Some((w, side_y)) => {
                self.node_mut(w)?.set_child(side_y, Some(x));
                self.node_mut(x)?.parent = Some(w);
            }
            None => {
                self.node_mut(x)?.parent = None;
                self.root = x;
            }
        }
        Ok(())
    }
}
