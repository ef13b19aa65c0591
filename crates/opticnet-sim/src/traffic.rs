//! Message injection.

use std::collections::VecDeque;

use opticnet_topology::NodeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Request, SimulationConfig, Traffic};

/// Produces `(source, destination)` pairs round by round.
#[derive(Debug, Clone)]
pub enum TrafficSource {
    Explicit {
        /// Sorted by injection round
        requests: VecDeque<Request>,
    },
    Uniform {
        remaining: u64,
        per_round: u64,
        num_nodes: u32,
        rng: StdRng,
    },
}

impl TrafficSource {
    pub fn new(config: &SimulationConfig) -> Self {
        match &config.traffic {
            Traffic::Explicit { requests } => {
                let mut requests = requests.clone();
                requests.sort_by_key(|r| r.round);
                TrafficSource::Explicit { requests: requests.into() }
            }
            Traffic::Uniform { messages, per_round } => TrafficSource::Uniform {
                remaining: *messages,
                per_round: *per_round,
                num_nodes: config.num_nodes,
                rng: StdRng::seed_from_u64(config.seed),
            },
        }
    }

    /// Messages entering the network at `round`.
    pub fn inject(&mut self, round: u64) -> Vec<(NodeId, NodeId)> {
        match self {
            TrafficSource::Explicit { requests } => {
                let mut out = Vec::new();
                while requests.front().is_some_and(|r| r.round <= round) {
                    if let Some(r) = requests.pop_front() {
                        out.push((NodeId(r.source), NodeId(r.destination)));
                    }
                }
                out
            }
            TrafficSource::Uniform { remaining, per_round, num_nodes, rng } => {
                let count = (*per_round).min(*remaining);
                *remaining -= count;
                (0..count).map(|_| uniform_pair(rng, *num_nodes)).collect()
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        match self {
            TrafficSource::Explicit { requests } => requests.is_empty(),
            TrafficSource::Uniform { remaining, .. } => *remaining == 0,
        }
    }
}

/// Two distinct ids in `1..=num_nodes`, or the lone node twice.
fn uniform_pair(rng: &mut StdRng, num_nodes: u32) -> (NodeId, NodeId) {
    let source = rng.gen_range(1..=num_nodes);
    if num_nodes == 1 {
        return (NodeId(source), NodeId(source));
    }
    let mut destination = rng.gen_range(1..num_nodes);
    if destination >= source {
        destination += 1;
    }
    (NodeId(source), NodeId(destination))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(messages: u64, per_round: u64, seed: u64) -> SimulationConfig {
        SimulationConfig {
            num_nodes: 31,
            seed,
            traffic: Traffic::Uniform { messages, per_round },
            ..Default::default()
        }
    }

    #[test]
    fn uniform_is_deterministic_per_seed() {
        let mut a = TrafficSource::new(&uniform(20, 5, 7));
        let mut b = TrafficSource::new(&uniform(20, 5, 7));
        for round in 0..4 {
            assert_eq!(a.inject(round), b.inject(round));
        }
        assert!(a.is_exhausted());
    }

    #[test]
    fn uniform_pairs_are_distinct_and_in_range() {
        let mut source = TrafficSource::new(&uniform(500, 500, 1));
        for (src, dst) in source.inject(0) {
            assert_ne!(src, dst);
            assert!((1..=31).contains(&src.value()));
            assert!((1..=31).contains(&dst.value()));
        }
    }

    #[test]
    fn last_round_gets_the_remainder() {
        let mut source = TrafficSource::new(&uniform(7, 3, 0));
        assert_eq!(source.inject(0).len(), 3);
        assert_eq!(source.inject(1).len(), 3);
        assert_eq!(source.inject(2).len(), 1);
        assert!(source.inject(3).is_empty());
    }

    #[test]
    fn explicit_requests_wait_for_their_round() {
        let config = SimulationConfig {
            num_nodes: 7,
            traffic: Traffic::Explicit {
                requests: vec![
                    Request { source: 3, destination: 5, round: 2 },
                    Request { source: 1, destination: 7, round: 0 },
                ],
            },
            ..Default::default()
        };
        let mut source = TrafficSource::new(&config);

        assert_eq!(source.inject(0), vec![(NodeId(1), NodeId(7))]);
        assert!(source.inject(1).is_empty());
        assert_eq!(source.inject(2), vec![(NodeId(3), NodeId(5))]);
        assert!(source.is_exhausted());
    }
}
