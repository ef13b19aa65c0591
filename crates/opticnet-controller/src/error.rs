//! Error types for opticnet-controller.

use opticnet_topology::{NodeId, TopologyError};
use thiserror::Error;

/// Result type for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// Errors that abort a round.
///
/// Lock contention is not an error: a rotation or forward that loses the race
/// for a node reports `false`/`None` and the message retries next round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The node, its parent and grandparent form none of the rotation shapes.
    #[error("network topology for bottom-up routing is not expected at node {node}: {reason}")]
    UnexpectedTopology { node: NodeId, reason: String },

    /// A topology query or primitive failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl ControllerError {
    /// Whether the simulation must stop.
    ///
    /// Every variant signals a corrupted tree or an id outside the network,
    /// neither of which a later round can repair.
    pub fn is_fatal(&self) -> bool {
        match self {
            ControllerError::UnexpectedTopology { .. } => true,
            ControllerError::Topology(_) => true,
        }
    }
}
