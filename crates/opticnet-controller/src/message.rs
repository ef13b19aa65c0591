//! Pending-message records handed to the controller each round.

use opticnet_topology::NodeId;
use serde::Serialize;

/// Identifier the harness assigns to a message for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A message sitting at `current`, bound for `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HasMessage {
    pub id: MessageId,
    pub current: NodeId,
    pub destination: NodeId,
}

impl HasMessage {
    pub fn new(id: MessageId, current: NodeId, destination: NodeId) -> Self {
        Self { id, current, destination }
    }

    /// Already at its destination.
    pub fn is_delivered(&self) -> bool {
        self.current == self.destination
    }
}
