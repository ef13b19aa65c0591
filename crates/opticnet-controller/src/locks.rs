//! Per-round lock table.
//!
//! One entry per node. A record may use a node that is [`NodeLock::Free`] or
//! that the lock phase set aside for it. Claims are all-or-nothing:
//! either every requested node is available and all of them are taken, or
//! nothing changes.

use opticnet_topology::NodeId;
use serde::Serialize;

/// Position of a pending record in the round's dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordId(pub usize);

/// Lock state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NodeLock {
    #[default]
    Free,
    /// Endpoint of a pending record, released once the record is dispatched
    Reserved(RecordId),
    /// Near the path of the round's priority record, held for the whole round
    Guarded(RecordId),
    /// Part of a rotation footprint, held until the next lock phase
    Rotating(RecordId),
    /// On a forwarding path, held until the next lock phase
    Routing(RecordId),
}

impl NodeLock {
    /// Record holding this entry.
    pub const fn holder(&self) -> Option<RecordId> {
        match self {
            NodeLock::Free => None,
            NodeLock::Reserved(r)
            | NodeLock::Guarded(r)
            | NodeLock::Rotating(r)
            | NodeLock::Routing(r) => Some(*r),
        }
    }

    /// Whether `record` may claim a node in this state.
    pub fn admits(&self, record: RecordId) -> bool {
        match self {
            NodeLock::Free => true,
            NodeLock::Reserved(r) | NodeLock::Guarded(r) => *r == record,
            NodeLock::Rotating(_) | NodeLock::Routing(_) => false,
        }
    }

    /// Taken by a rotation or forward this round.
    pub const fn is_committed(&self) -> bool {
        matches!(self, NodeLock::Rotating(_) | NodeLock::Routing(_))
    }
}

/// Lock state of every node for the current round, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct LockTable {
    locks: Vec<NodeLock>,
}

impl LockTable {
    pub fn new(len: usize) -> Self {
        Self { locks: vec![NodeLock::Free; len] }
    }

    /// Free every node, resizing to `len` entries.
    pub fn reset(&mut self, len: usize) {
        self.locks.clear();
        self.locks.resize(len, NodeLock::Free);
    }

    fn slot(&self, node: NodeId) -> Option<usize> {
        (node.value() as usize)
            .checked_sub(1)
            .filter(|&i| i < self.locks.len())
    }

    /// Current state of `node`. Ids outside the table read as `Free`.
    pub fn get(&self, node: NodeId) -> NodeLock {
        self.slot(node).map_or(NodeLock::Free, |i| self.locks[i])
    }

    /// Whether `record` may use `node`. Ids outside the table never are.
    pub fn is_available(&self, node: NodeId, record: RecordId) -> bool {
        self.slot(node).is_some_and(|i| self.locks[i].admits(record))
    }

    /// Take every node in `nodes` as `lock`, or none of them.
    ///
    /// Availability is judged for the holder of `lock`; a `Free` lock always
    /// fails.
    pub fn try_acquire(&mut self, nodes: &[NodeId], lock: NodeLock) -> bool {
        let Some(record) = lock.holder() else {
            return false;
        };
        if !nodes.iter().all(|&node| self.is_available(node, record)) {
            return false;
        }
        for &node in nodes {
            if let Some(i) = self.slot(node) {
                self.locks[i] = lock;
            }
        }
        true
    }

    /// Drop `record`'s unconsumed reservation on `node`. Guarded nodes stay
    /// guarded.
    ///
    /// Returns whether the node is free afterwards.
    pub fn release(&mut self, node: NodeId, record: RecordId) -> bool {
        let Some(i) = self.slot(node) else {
            return false;
        };
        if self.locks[i] == NodeLock::Reserved(record) {
            self.locks[i] = NodeLock::Free;
        }
        self.locks[i] == NodeLock::Free
    }

    /// Nodes taken by rotations or forwards this round.
    pub fn committed(&self) -> usize {
        self.locks.iter().filter(|l| l.is_committed()).count()
    }
}
