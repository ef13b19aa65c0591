//! The controller: one network driven by one routing policy.

use opticnet_topology::Topology;
use tracing::error;

use crate::{BottomUp, HasMessage, Network, NetworkStats, Result, RoundReport, RoutingPolicy};

/// A network driven round by round by a routing policy.
#[derive(Debug, Clone)]
pub struct Controller<P = BottomUp> {
    network: Network,
    policy: P,
}

impl Controller<BottomUp> {
    pub fn bottom_up(topology: Topology) -> Self {
        Self::new(topology, BottomUp)
    }
}

impl<P: RoutingPolicy> Controller<P> {
    pub fn new(topology: Topology, policy: P) -> Self {
        Self { network: Network::new(topology), policy }
    }

    /// Run one round over every submitted record.
    ///
    /// An error means the topology can no longer be trusted; the round is
    /// abandoned where it stood.
    pub fn controller_step(&mut self) -> Result<RoundReport> {
        match self.policy.dispatch_round(&mut self.network) {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(
                    policy = self.policy.name(),
                    round = self.network.round(),
                    error = %e,
                    "routing round aborted"
                );
                Err(e)
            }
        }
    }

    pub fn submit(&mut self, message: HasMessage) {
        self.network.submit(message);
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn topology(&self) -> &Topology {
        self.network.topology()
    }

    pub fn stats(&self) -> &NetworkStats {
        self.network.stats()
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ControllerError, MessageId};
    use opticnet_topology::NodeId;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn message(id: u64, current: u32, destination: u32) -> HasMessage {
        HasMessage::new(MessageId(id), NodeId(current), NodeId(destination))
    }

    /// BST over `1..=order.len()` built by inserting ids in `order`.
    fn inserted(order: &[u32]) -> Topology {
        let mut left = vec![None; order.len() + 1];
        let mut right = vec![None; order.len() + 1];
        let mut edges = Vec::new();
        for &id in &order[1..] {
            let mut cur = order[0];
            loop {
                let slot = if id < cur {
                    &mut left[cur as usize]
                } else {
                    &mut right[cur as usize]
                };
                match *slot {
                    Some(next) => cur = next,
                    None => {
                        *slot = Some(id);
                        edges.push((cur, id));
                        break;
                    }
                }
            }
        }
        Topology::from_edges(order.len() as u32, &edges).unwrap()
    }

    /// Resubmit everything undelivered, oldest first, until nothing is left.
    /// Returns the number of rounds taken, or `None` after `limit` rounds.
    fn rounds_to_drain(
        controller: &mut Controller,
        mut messages: Vec<HasMessage>,
        limit: u64,
    ) -> Option<u64> {
        for round in 1..=limit {
            for message in &messages {
                controller.submit(*message);
            }
            let report = controller.controller_step().unwrap();
            for (message, forward) in report.forwards() {
                let tracked = messages.iter_mut().find(|m| m.id == message.id).unwrap();
                tracked.current = forward.to;
            }
            messages.retain(|m| !m.is_delivered());
            if messages.is_empty() {
                return Some(round);
            }
        }
        None
    }

    /// Each oldest message needs at most one round per edge between its
    /// endpoints, plus one.
    fn round_limit(messages: usize, size: u32) -> u64 {
        messages as u64 * 2 * u64::from(size) + 1
    }

    #[test]
    fn crossing_traffic_drains() {
        let messages = vec![
            message(0, 1, 13),
            message(1, 7, 15),
            message(2, 4, 11),
            message(3, 16, 2),
            message(4, 9, 3),
        ];
        let limit = round_limit(messages.len(), 17);
        let mut controller = Controller::bottom_up(Topology::balanced(17).unwrap());

        assert!(rounds_to_drain(&mut controller, messages, limit).is_some());
        assert!(controller.topology().validate().is_ok());
        assert_eq!(controller.stats().deliveries, 5);
    }

    #[test]
    fn opposing_messages_drain_on_an_uneven_tree() {
        let order = [
            13, 5, 21, 2, 9, 17, 24, 1, 3, 7, 11, 15, 19, 23, 26, 4, 6, 8, 10, 12, 14, 16, 18,
            20, 22, 25,
        ];
        let messages = vec![
            message(0, 4, 20),
            message(1, 20, 4),
            message(2, 12, 14),
            message(3, 14, 12),
            message(4, 1, 26),
            message(5, 26, 1),
        ];
        let limit = round_limit(messages.len(), 26);
        let mut controller = Controller::bottom_up(inserted(&order));

        assert!(rounds_to_drain(&mut controller, messages, limit).is_some());
    }

    #[test]
    fn many_senders_drain_on_a_wide_tree() {
        let messages = vec![
            message(0, 1, 48),
            message(1, 48, 1),
            message(2, 12, 36),
            message(3, 24, 25),
            message(4, 30, 6),
            message(5, 40, 40),
        ];
        let limit = round_limit(messages.len(), 48);
        let mut controller = Controller::bottom_up(Topology::balanced(48).unwrap());

        assert!(rounds_to_drain(&mut controller, messages, limit).is_some());
        assert_eq!(controller.stats().deliveries, 6);
    }

    #[test]
    fn corrupted_tree_stops_the_controller() {
        let mut nodes = Topology::balanced(7).unwrap().links().to_vec();
        nodes[1].left = None;
        let topology = Topology::from_links_unchecked(nodes, NodeId(4)).unwrap();

        let mut controller = Controller::bottom_up(topology);
        controller.submit(HasMessage::new(MessageId(0), NodeId(1), NodeId(7)));

        let err = controller.controller_step().unwrap_err();
        assert!(matches!(err, ControllerError::UnexpectedTopology { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn policy_is_selected_at_construction() {
        let controller = Controller::new(Topology::balanced(3).unwrap(), BottomUp);
        assert_eq!(controller.policy().name(), "bottom-up");
        assert_eq!(controller.stats(), &NetworkStats::default());
    }

    proptest! {
        #[test]
        fn every_message_reaches_its_destination(
            size in 2u32..32,
            pairs in proptest::collection::vec((any::<u32>(), any::<u32>()), 1..8),
        ) {
            let messages: Vec<HasMessage> = pairs
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| message(i as u64, a % size + 1, b % size + 1))
                .collect();
            let limit = round_limit(messages.len(), size);
            let mut controller = Controller::bottom_up(Topology::balanced(size).unwrap());

            prop_assert!(rounds_to_drain(&mut controller, messages, limit).is_some());
            prop_assert!(controller.topology().validate().is_ok());
        }

        #[test]
        fn every_message_reaches_its_destination_on_any_shape(
            order in (2u32..32)
                .prop_flat_map(|size| Just((1..=size).collect::<Vec<_>>()).prop_shuffle()),
            pairs in proptest::collection::vec((any::<u32>(), any::<u32>()), 1..8),
        ) {
            let size = order.len() as u32;
            let messages: Vec<HasMessage> = pairs
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| message(i as u64, a % size + 1, b % size + 1))
                .collect();
            let limit = round_limit(messages.len(), size);
            let mut controller = Controller::bottom_up(inserted(&order));

            prop_assert!(rounds_to_drain(&mut controller, messages, limit).is_some());
        }

        #[test]
        fn random_workloads_keep_the_tree_sound(
            size in 2u32..40,
            pairs in proptest::collection::vec((any::<u32>(), any::<u32>()), 1..16),
            rounds in 1usize..12,
        ) {
            let mut controller = Controller::bottom_up(Topology::balanced(size).unwrap());
            let mut messages: Vec<HasMessage> = pairs
                .iter()
                .enumerate()
                .map(|(i, &(a, b))| message(i as u64, a % size + 1, b % size + 1))
                .collect();

            for _ in 0..rounds {
                for message in &messages {
                    controller.submit(*message);
                }
                let report = controller.controller_step().unwrap();
                prop_assert!(controller.topology().validate().is_ok());

                let mut seen = HashSet::new();
                for applied in &report.rotations {
                    for node in &applied.footprint {
                        prop_assert!(seen.insert(*node), "{} locked twice in one round", node);
                    }
                }

                for (message, forward) in report.forwards() {
                    let tracked = messages.iter_mut().find(|m| m.id == message.id).unwrap();
                    tracked.current = forward.to;
                }
                messages.retain(|m| !m.is_delivered());
            }
        }
    }
}
