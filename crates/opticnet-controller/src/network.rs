//! The network a routing policy drives: topology, lock table, pending queue
//! and counters.
//!
//! All mutation of the topology goes through [`Network::apply_rotation`], so
//! every structural change is covered by a lock claim.

use std::collections::VecDeque;

use opticnet_topology::{NodeId, Primitive, Side, Topology, TopologyError, TreeNode};
use tracing::{debug, trace};

use crate::{
    AppliedRotation, ControllerError, Forward, HasMessage, LockPhase, LockTable, NetworkStats,
    NodeLock, RecordId, Result, Rotation,
};

/// A tree network with its lock table and the records waiting for a round.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    locks: LockTable,
    nodes_with_msg: VecDeque<HasMessage>,
    stats: NetworkStats,
    round: u64,
}

impl Network {
    pub fn new(topology: Topology) -> Self {
        let locks = LockTable::new(topology.len());
        Self {
            topology,
            locks,
            nodes_with_msg: VecDeque::new(),
            stats: NetworkStats::default(),
            round: 0,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    /// Index of the round about to run.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn is_valid_node(&self, link: Option<NodeId>) -> bool {
        self.topology.is_valid_node(link)
    }

    /// Resolve an id to its node.
    pub fn infra_node(&self, id: NodeId) -> Result<&TreeNode> {
        Ok(self.topology.node(id)?)
    }

    /// Queue a record for the next round.
    pub fn submit(&mut self, message: HasMessage) {
        self.nodes_with_msg.push_back(message);
    }

    pub fn pending_len(&self) -> usize {
        self.nodes_with_msg.len()
    }

    /// Next record in FIFO order.
    pub fn poll_message(&mut self) -> Option<HasMessage> {
        self.nodes_with_msg.pop_front()
    }

    /// Lock phase: free every node, then set nodes aside in queue order.
    ///
    /// The oldest record guards its whole path and every node next to it, so
    /// no other record can alter that path this round. Each later record
    /// reserves both of its endpoints if neither is taken yet.
    pub fn lock_routing_nodes(&mut self) -> Result<LockPhase> {
        self.locks.reset(self.topology.len());
        let mut phase = LockPhase::default();

        let mut pending = self.nodes_with_msg.iter().enumerate();
        if let Some((i, oldest)) = pending.next() {
            let zone = self.topology.path_neighbourhood(oldest.current, oldest.destination)?;
            self.locks.try_acquire(&zone, NodeLock::Guarded(RecordId(i)));
            phase.guarded = zone.len();
        }

        for (i, msg) in pending {
            let endpoints = [msg.current, msg.destination];
            let len = if msg.is_delivered() { 1 } else { 2 };
            if self
                .locks
                .try_acquire(&endpoints[..len], NodeLock::Reserved(RecordId(i)))
            {
                phase.reserved += len;
            } else {
                trace!(message = %msg.id, node = %msg.current, "reservation already held");
            }
        }
        Ok(phase)
    }

    /// Move a message from `src` up to `hop_budget` hops toward `dst`.
    ///
    /// The whole path is claimed for `record` or the forward does not happen
    /// (`None`). A message already at `dst` is delivered in place.
    pub fn allow_routing(
        &mut self,
        record: RecordId,
        src: NodeId,
        dst: NodeId,
        hop_budget: usize,
    ) -> Result<Option<Forward>> {
        self.topology.node(dst)?;
        let mut path = vec![src];
        let mut cur = src;
        for _ in 0..hop_budget {
            match self.topology.next_hop(cur, dst)? {
                Some(hop) => {
                    path.push(hop);
                    cur = hop;
                    if hop == dst {
                        break;
                    }
                }
                None => break,
            }
        }

        let hops = path.len() - 1;
        let delivered = cur == dst;
        if hops == 0 && !delivered {
            return Ok(None);
        }

        if !self.locks.try_acquire(&path, NodeLock::Routing(record)) {
            self.stats.contention_failures += 1;
            debug!(from = %src, to = %cur, "forward blocked by a locked node");
            return Ok(None);
        }

        self.stats.forwards += 1;
        self.stats.hops += hops as u64;
        if delivered {
            self.stats.deliveries += 1;
        }
        debug!(from = %src, to = %cur, hops, delivered, "forwarded");
        Ok(Some(Forward { from: src, to: cur, hops, delivered }))
    }

    /// Release `record`'s unconsumed reservation on `node` and report whether
    /// it is free for the records dispatched after it.
    pub fn are_available_nodes(&mut self, record: RecordId, node: NodeId) -> bool {
        self.locks.release(node, record)
    }

    /// Apply `rotation` to `node` if its whole footprint is available to
    /// `record`.
    ///
    /// `Ok(None)` for [`Rotation::Null`] and for lock contention. A footprint
    /// that cannot be computed, or a primitive that rejects the shape, is a
    /// corrupted tree and returned as an error.
    pub fn apply_rotation(
        &mut self,
        record: RecordId,
        node: NodeId,
        rotation: Rotation,
    ) -> Result<Option<AppliedRotation>> {
        let Some(primitive) = rotation.primitive() else {
            return Ok(None);
        };
        let footprint = self.topology.footprint(node, primitive)?;

        if !self.locks.try_acquire(&footprint, NodeLock::Rotating(record)) {
            self.stats.contention_failures += 1;
            debug!(%node, %rotation, "rotation blocked by a locked node");
            return Ok(None);
        }

        self.topology.apply(node, primitive)?;
        self.stats.record_rotation(primitive);
        debug!(%node, %rotation, footprint = footprint.len(), "rotated");
        Ok(Some(AppliedRotation { record, node, rotation, footprint }))
    }

    pub fn zig_bottom_up(&mut self, record: RecordId, node: NodeId) -> Result<bool> {
        Ok(self.apply_rotation(record, node, Rotation::ZigBottomUp)?.is_some())
    }

    /// ZigZig on `node`; the side is read from the tree.
    pub fn zig_zig_bottom_up(&mut self, record: RecordId, node: NodeId) -> Result<bool> {
        let rotation = match self.topology.side_of(node)? {
            Some(Side::Right) => Rotation::ZigZigRightBottomUp,
            Some(Side::Left) => Rotation::ZigZigLeftBottomUp,
            None => return Err(missing_ancestor(node, Primitive::ZigZig)),
        };
        Ok(self.apply_rotation(record, node, rotation)?.is_some())
    }

    /// ZigZag on `node`; the side is read from the tree.
    pub fn zig_zag_bottom_up(&mut self, record: RecordId, node: NodeId) -> Result<bool> {
        let rotation = match self.topology.side_of(node)? {
            Some(Side::Right) => Rotation::ZigZagLeftBottomUp,
            Some(Side::Left) => Rotation::ZigZagRightBottomUp,
            None => return Err(missing_ancestor(node, Primitive::ZigZag)),
        };
        Ok(self.apply_rotation(record, node, rotation)?.is_some())
    }

    pub fn log_increment_active_requests(&mut self) {
        self.stats.log_increment_active_requests();
    }

    /// Close the round.
    pub fn finish_round(&mut self) {
        self.stats.rounds += 1;
        self.round += 1;
    }
}

fn missing_ancestor(node: NodeId, primitive: Primitive) -> ControllerError {
    TopologyError::MissingAncestor { node, primitive }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageId;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    fn msg(id: u64, current: u32, destination: u32) -> HasMessage {
        HasMessage::new(MessageId(id), n(current), n(destination))
    }

    fn balanced(size: u32) -> Network {
        Network::new(Topology::balanced(size).unwrap())
    }

    #[test]
    fn one_hop_forward_delivers() {
        let mut net = balanced(7);
        net.submit(msg(0, 1, 2));
        // 1-2 plus the neighbours 3 and 4.
        assert_eq!(net.lock_routing_nodes().unwrap(), LockPhase { guarded: 4, reserved: 0 });
        assert_eq!(net.locks().get(n(1)), NodeLock::Guarded(RecordId(0)));
        assert!(!net.locks().is_available(n(3), RecordId(1)));

        let forward = net.allow_routing(RecordId(0), n(1), n(2), 1).unwrap();
        assert_eq!(forward, Some(Forward { from: n(1), to: n(2), hops: 1, delivered: true }));
        assert_eq!(net.locks().get(n(2)), NodeLock::Routing(RecordId(0)));
        assert_eq!(net.stats().deliveries, 1);
        assert_eq!(net.stats().hops, 1);
    }

    #[test]
    fn forward_respects_hop_budget() {
        let mut net = balanced(7);
        let partial = net.allow_routing(RecordId(0), n(1), n(7), 2).unwrap().unwrap();
        assert_eq!((partial.to, partial.hops, partial.delivered), (n(4), 2, false));

        net.lock_routing_nodes().unwrap();
        let full = net.allow_routing(RecordId(0), n(1), n(7), 8).unwrap().unwrap();
        assert_eq!((full.to, full.hops, full.delivered), (n(7), 4, true));

        assert_eq!(net.allow_routing(RecordId(1), n(3), n(5), 0).unwrap(), None);
    }

    #[test]
    fn message_at_destination_is_delivered_in_place() {
        let mut net = balanced(3);
        let forward = net.allow_routing(RecordId(0), n(3), n(3), 1).unwrap().unwrap();
        assert_eq!(forward.hops, 0);
        assert!(forward.delivered);
    }

    #[test]
    fn reservation_blocks_other_records_until_released() {
        // 8 / 4,12 / 2,6,10,14 / odd leaves
        let mut net = balanced(15);
        net.submit(msg(0, 1, 2));
        net.submit(msg(1, 13, 15));
        let phase = net.lock_routing_nodes().unwrap();
        assert_eq!(phase, LockPhase { guarded: 4, reserved: 2 });
        assert_eq!(net.locks().get(n(15)), NodeLock::Reserved(RecordId(1)));

        // zig(15) needs 15, reserved by record 1.
        assert!(!net.zig_bottom_up(RecordId(2), n(15)).unwrap());
        assert_eq!(net.stats().contention_failures, 1);

        assert!(net.are_available_nodes(RecordId(1), n(15)));
        assert!(net.zig_bottom_up(RecordId(2), n(15)).unwrap());
        assert_eq!(net.topology().parent(n(14)).unwrap(), Some(n(15)));
        assert!(!net.are_available_nodes(RecordId(2), n(15)));

        // The oldest record's guard is not a reservation.
        assert!(!net.are_available_nodes(RecordId(0), n(2)));
        assert_eq!(net.locks().get(n(2)), NodeLock::Guarded(RecordId(0)));
    }

    #[test]
    fn later_records_cannot_reserve_inside_the_guard() {
        let mut net = balanced(15);
        net.submit(msg(0, 1, 7));
        net.submit(msg(1, 3, 5));
        net.submit(msg(2, 9, 11));
        net.submit(msg(3, 10, 10));

        let phase = net.lock_routing_nodes().unwrap();

        // 1-2-4-6-7 plus 3, 5 and 8.
        assert_eq!(phase, LockPhase { guarded: 8, reserved: 3 });
        assert_eq!(net.locks().get(n(3)), NodeLock::Guarded(RecordId(0)));
        assert_eq!(net.locks().get(n(9)), NodeLock::Reserved(RecordId(2)));
        assert_eq!(net.locks().get(n(10)), NodeLock::Reserved(RecordId(3)));
        assert!(net.locks().is_available(n(12), RecordId(1)));
    }

    #[test]
    fn rotations_commit_their_footprint() {
        let mut net = balanced(15);
        let applied = net
            .apply_rotation(RecordId(0), n(1), Rotation::ZigZigLeftBottomUp)
            .unwrap()
            .unwrap();
        for node in &applied.footprint {
            assert_eq!(net.locks().get(*node), NodeLock::Rotating(RecordId(0)));
        }
        assert_eq!(net.stats().zig_zig_rotations, 1);

        // 4 went into record 0's footprint.
        assert!(!net.zig_zag_bottom_up(RecordId(1), n(5)).unwrap());
        assert!(net.topology().validate().is_ok());
    }

    #[test]
    fn side_is_read_from_the_tree() {
        let mut net = balanced(7);
        assert!(net.zig_zag_bottom_up(RecordId(0), n(5)).unwrap());
        assert_eq!(net.topology().root(), n(5));

        let mut net = balanced(7);
        assert!(net.zig_zig_bottom_up(RecordId(0), n(7)).unwrap());
        assert_eq!(net.topology().root(), n(7));

        assert!(net.zig_zig_bottom_up(RecordId(1), n(7)).is_err());
    }

    #[test]
    fn null_rotation_is_a_no_op() {
        let mut net = balanced(7);
        assert_eq!(net.apply_rotation(RecordId(0), n(1), Rotation::Null).unwrap(), None);
        assert_eq!(net.locks().committed(), 0);
    }

    #[test]
    fn unknown_nodes_are_fatal() {
        let mut net = balanced(3);
        assert!(net.infra_node(n(4)).is_err());
        assert!(net.allow_routing(RecordId(0), n(1), n(9), 1).is_err());
        assert!(!net.is_valid_node(Some(n(9))));
        assert!(!net.is_valid_node(None));
    }
}
