//! OpticNet Simulation Harness
//!
//! Runs a [`Controller`](opticnet_controller::Controller) round by round:
//! messages are injected from a [`TrafficSource`], every undelivered message
//! is resubmitted each round, and forwards from the round report move them
//! along the tree until they reach their destination.
//!
//! ```
//! use opticnet_sim::{Request, Simulation, SimulationConfig, Traffic};
//!
//! let config = SimulationConfig {
//!     num_nodes: 7,
//!     traffic: Traffic::Explicit {
//!         requests: vec![Request { source: 1, destination: 7, round: 0 }],
//!     },
//!     ..Default::default()
//! };
//! let result = Simulation::new(config).unwrap().run().unwrap();
//! assert_eq!(result.delivered, 1);
//! ```

mod config;
mod error;
mod simulation;
mod traffic;

pub use config::{Request, SimulationConfig, Traffic};
pub use error::{Result, SimError};
pub use simulation::{Simulation, SimulationResult};
pub use traffic::TrafficSource;
