//! Bottom-up rotation classifier.
//!
//! Given a node `x` and the node it must reach, decide which rotation (if any)
//! lifts `x` toward the lowest common ancestor of the two:
//!
//! | direction of x           | y's direction   | shape of x, y, z | rotation          |
//! |--------------------------|-----------------|------------------|-------------------|
//! | local, one hop, or below | -               | -                | `Null`            |
//! | `Parent`, no y or z      | -               | -                | `Null`            |
//! | `Parent`                 | not `Parent`    | -                | `ZigBottomUp`     |
//! | `Parent`                 | `Parent`        | left, left       | `ZigZigLeft…`     |
//! | `Parent`                 | `Parent`        | right, right     | `ZigZigRight…`    |
//! | `Parent`                 | `Parent`        | right, left      | `ZigZagLeft…`     |
//! | `Parent`                 | `Parent`        | left, right      | `ZigZagRight…`    |
//!
//! The classifier only reads the topology. A tree whose links disagree with
//! each other is fatal, never a silent `Null`.

use opticnet_topology::{Direction, NodeId, Side, Topology, TopologyError, TreeNode};

use crate::{ControllerError, Result, Rotation};

/// Rotation to apply to `x` so it moves toward `destination`.
pub fn decide_bottom_up(topology: &Topology, x: NodeId, destination: NodeId) -> Result<Rotation> {
    if direction(topology, x, x, destination)? != Direction::Parent {
        return Ok(Rotation::Null);
    }

    let Some(y) = topology.parent(x)?.filter(|&y| topology.contains(y)) else {
        return Ok(Rotation::Null);
    };
    let Some(z) = topology.parent(y)?.filter(|&z| topology.contains(z)) else {
        return Ok(Rotation::Null);
    };

    if direction(topology, x, y, destination)? != Direction::Parent {
        return Ok(Rotation::ZigBottomUp);
    }

    let side_x = child_side(topology.node(y)?, x);
    let side_y = child_side(topology.node(z)?, y);
    match (side_x, side_y) {
        (Some(Side::Left), Some(Side::Left)) => Ok(Rotation::ZigZigLeftBottomUp),
        (Some(Side::Right), Some(Side::Right)) => Ok(Rotation::ZigZigRightBottomUp),
        (Some(Side::Right), Some(Side::Left)) => Ok(Rotation::ZigZagLeftBottomUp),
        (Some(Side::Left), Some(Side::Right)) => Ok(Rotation::ZigZagRightBottomUp),
        _ => Err(ControllerError::UnexpectedTopology {
            node: x,
            reason: format!("parent {y} and grandparent {z} form no rotation shape"),
        }),
    }
}

/// Which child of `parent` is `child`, if either.
fn child_side(parent: &TreeNode, child: NodeId) -> Option<Side> {
    if parent.left == Some(child) {
        Some(Side::Left)
    } else if parent.right == Some(child) {
        Some(Side::Right)
    } else {
        None
    }
}

/// Routing direction of `from`, reporting broken links as a bad shape at `x`.
fn direction(topology: &Topology, x: NodeId, from: NodeId, to: NodeId) -> Result<Direction> {
    topology.routing_direction(from, to).map_err(|e| match e {
        TopologyError::InconsistentLink { .. } | TopologyError::Unreachable(_) => {
            ControllerError::UnexpectedTopology { node: x, reason: e.to_string() }
        }
        other => other.into(),
    })
}
