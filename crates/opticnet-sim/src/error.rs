//! Error types for opticnet-sim.

use opticnet_controller::ControllerError;
use opticnet_topology::TopologyError;
use thiserror::Error;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration cannot describe a runnable simulation.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The controller hit a fatal topology error.
    #[error(transparent)]
    Controller(#[from] ControllerError),
}
