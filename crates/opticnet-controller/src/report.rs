//! What happened to each record in one round.

use opticnet_topology::NodeId;
use serde::Serialize;

use crate::{HasMessage, RecordId, Rotation};

/// A message moved along the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Forward {
    pub from: NodeId,
    pub to: NodeId,
    pub hops: usize,
    /// `to` is the message's destination
    pub delivered: bool,
}

/// A rotation that took effect, with the nodes it locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRotation {
    pub record: RecordId,
    pub node: NodeId,
    pub rotation: Rotation,
    pub footprint: Vec<NodeId>,
}

/// Classification and result of one record's turn in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub record: RecordId,
    pub message: HasMessage,
    /// Classification of the node holding the message
    pub source_op: Rotation,
    /// Classification of the destination node
    pub destination_op: Rotation,
    pub source_rotated: bool,
    pub destination_rotated: bool,
    pub forward: Option<Forward>,
}

impl RecordOutcome {
    pub fn new(
        record: RecordId,
        message: HasMessage,
        source_op: Rotation,
        destination_op: Rotation,
    ) -> Self {
        Self {
            record,
            message,
            source_op,
            destination_op,
            source_rotated: false,
            destination_rotated: false,
            forward: None,
        }
    }

    /// At least one endpoint rotated.
    pub fn is_active(&self) -> bool {
        self.source_rotated || self.destination_rotated
    }

    /// Neither rotated nor forwarded.
    pub fn is_stalled(&self) -> bool {
        !self.is_active() && self.forward.is_none()
    }
}

/// Nodes set aside before dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockPhase {
    /// Around the oldest record's path
    pub guarded: usize,
    /// Endpoints of every other record
    pub reserved: usize,
}

/// Everything one round did, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    pub lock: LockPhase,
    pub outcomes: Vec<RecordOutcome>,
    pub rotations: Vec<AppliedRotation>,
}

impl RoundReport {
    pub fn new(round: u64, lock: LockPhase) -> Self {
        Self { round, lock, ..Default::default() }
    }

    pub fn forwards(&self) -> impl Iterator<Item = (&HasMessage, &Forward)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.forward.as_ref().map(|f| (&o.message, f)))
    }

    pub fn deliveries(&self) -> usize {
        self.forwards().filter(|(_, f)| f.delivered).count()
    }

    pub fn active_records(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_active()).count()
    }

    pub fn is_idle(&self) -> bool {
        self.outcomes.is_empty()
    }
}
