//! Routing policies: how a round turns pending records into rotations and
//! forwards.

use opticnet_topology::{NodeId, Topology};
use tracing::{debug, trace};

use crate::{decide_bottom_up, Network, RecordId, RecordOutcome, Result, RoundReport, Rotation};

/// A strategy for one round of routing over a [`Network`].
pub trait RoutingPolicy {
    /// Short name for logs and reports.
    fn name(&self) -> &'static str;

    /// Rotation that moves `x` toward `destination`.
    fn decide_rotation(
        &self,
        topology: &Topology,
        x: NodeId,
        destination: NodeId,
    ) -> Result<Rotation>;

    /// Lock, then drain every pending record once.
    fn dispatch_round(&self, network: &mut Network) -> Result<RoundReport>;
}

/// Bottom-up splaying: both endpoints of a message climb toward their lowest
/// common ancestor until they are adjacent, then the message crosses the
/// remaining edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BottomUp;

impl RoutingPolicy for BottomUp {
    fn name(&self) -> &'static str {
        "bottom-up"
    }

    fn decide_rotation(
        &self,
        topology: &Topology,
        x: NodeId,
        destination: NodeId,
    ) -> Result<Rotation> {
        decide_bottom_up(topology, x, destination)
    }

    fn dispatch_round(&self, network: &mut Network) -> Result<RoundReport> {
        let lock = network.lock_routing_nodes()?;
        let mut report = RoundReport::new(network.round(), lock);
        let mut index = 0;

        while let Some(message) = network.poll_message() {
            let record = RecordId(index);
            index += 1;

            let node = network.infra_node(message.current)?.id;
            let dst_node = network.infra_node(message.destination)?.id;

            let c_op = self.decide_rotation(network.topology(), node, dst_node)?;
            let d_op = self.decide_rotation(network.topology(), dst_node, node)?;
            trace!(message = %message.id, %node, %dst_node, %c_op, %d_op, "classified");

            let mut outcome = RecordOutcome::new(record, message, c_op, d_op);

            if c_op.is_null() && d_op.is_null() {
                outcome.forward = network.allow_routing(record, node, dst_node, 1)?;
            } else {
                if let Some(applied) = network.apply_rotation(record, node, c_op)? {
                    outcome.source_rotated = true;
                    report.rotations.push(applied);
                }
                // The destination's rotation is classified against the tree
                // as it stood before the source rotated.
                if let Some(applied) = network.apply_rotation(record, dst_node, d_op)? {
                    outcome.destination_rotated = true;
                    report.rotations.push(applied);
                }
                if outcome.is_active() {
                    network.log_increment_active_requests();
                }
            }

            network.are_available_nodes(record, node);
            network.are_available_nodes(record, dst_node);
            report.outcomes.push(outcome);
        }

        network.finish_round();
        debug!(
            round = report.round,
            records = report.outcomes.len(),
            rotations = report.rotations.len(),
            deliveries = report.deliveries(),
            "round dispatched"
        );
        Ok(report)
    }
}
