//! Simulation configuration.

use std::path::Path;

use opticnet_topology::Topology;
use serde::{Deserialize, Serialize};

use crate::{Result, SimError};

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Switches, with ids `1..=num_nodes`
    pub num_nodes: u32,
    /// Initial `(parent, child)` links; empty for a balanced tree
    pub edges: Vec<(u32, u32)>,
    /// Seed for deterministic traffic
    pub seed: u64,
    /// Upper bound on rounds before giving up on undelivered messages
    pub max_rounds: u64,
    /// Validate the whole tree after every round
    pub check_invariants: bool,
    pub traffic: Traffic,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_nodes: 127,
            edges: Vec::new(),
            seed: 42,
            max_rounds: 10_000,
            check_invariants: false,
            traffic: Traffic::default(),
        }
    }
}

/// Where messages come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Traffic {
    /// A fixed list of requests
    Explicit { requests: Vec<Request> },
    /// `messages` uniformly random pairs, `per_round` injected each round
    Uniform { messages: u64, per_round: u64 },
}

impl Default for Traffic {
    fn default() -> Self {
        Traffic::Uniform { messages: 1_000, per_round: 10 }
    }
}

/// A message from `source` to `destination`, injected at `round`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub source: u32,
    pub destination: u32,
    #[serde(default)]
    pub round: u64,
}

impl SimulationConfig {
    /// Load from a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(SimError::Config("num_nodes must be at least 1".into()));
        }
        if self.max_rounds == 0 {
            return Err(SimError::Config("max_rounds must be at least 1".into()));
        }
        let in_range = |id: u32| (1..=self.num_nodes).contains(&id);

        match &self.traffic {
            Traffic::Explicit { requests } => {
                if let Some(bad) = requests
                    .iter()
                    .find(|r| !in_range(r.source) || !in_range(r.destination))
                {
                    return Err(SimError::Config(format!(
                        "request {} -> {} outside 1..={}",
                        bad.source, bad.destination, self.num_nodes
                    )));
                }
            }
            Traffic::Uniform { messages, per_round } => {
                if *messages > 0 && *per_round == 0 {
                    return Err(SimError::Config("per_round must be at least 1".into()));
                }
            }
        }
        Ok(())
    }

    /// Initial tree: the configured edges, or a balanced tree when there are
    /// none or they do not form a BST.
    pub fn topology(&self) -> Result<Topology> {
        let topology = if self.edges.is_empty() {
            Topology::balanced(self.num_nodes)?
        } else {
            Topology::from_edges_or_balanced(self.num_nodes, &self.edges)?
        };
        Ok(topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opticnet_topology::NodeId;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{
                "num_nodes": 7,
                "traffic": { "kind": "explicit", "requests": [{ "source": 1, "destination": 7 }] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.num_nodes, 7);
        assert_eq!(config.seed, 42);
        assert_eq!(
            config.traffic,
            Traffic::Explicit { requests: vec![Request { source: 1, destination: 7, round: 0 }] }
        );
    }

    #[test]
    fn out_of_range_requests_are_rejected() {
        let config = SimulationConfig {
            num_nodes: 3,
            traffic: Traffic::Explicit {
                requests: vec![Request { source: 1, destination: 4, round: 0 }],
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::Config(_))));

        let config = SimulationConfig { num_nodes: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn bad_edges_fall_back_to_balanced() {
        let config = SimulationConfig {
            num_nodes: 7,
            edges: vec![(1, 1)],
            ..Default::default()
        };
        assert_eq!(config.topology().unwrap().root(), NodeId(4));

        let config = SimulationConfig {
            num_nodes: 3,
            edges: vec![(1, 2), (2, 3)],
            ..Default::default()
        };
        assert_eq!(config.topology().unwrap().root(), NodeId(1));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/nonexistent/opticnet.json").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
