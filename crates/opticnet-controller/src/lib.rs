//! OpticNet Bottom-Up Routing Controller
//!
//! Messages in an OpticNet tree do not follow fixed paths. Each round, the
//! two endpoints of every pending message climb toward each other by splay
//! rotations until they are adjacent, then the message crosses the remaining
//! edge.
//!
//! # Rounds
//!
//! 1. **Lock**: the oldest record guards its path and the nodes next to it;
//!    every other record reserves its two endpoints
//! 2. **Classify**: each endpoint gets a [`Rotation`] from the classifier
//! 3. **Rotate**: a rotation runs only if its whole footprint is free
//! 4. **Forward**: records needing no rotation move one hop
//!
//! A node taken by a rotation or forward stays taken until the next round, so
//! the rotations applied in one round touch pairwise disjoint nodes. Nobody
//! else can change the oldest record's path, so its distance shrinks in all
//! but at most one round and every message is eventually delivered.
//!
//! # Failure
//!
//! Losing a lock is routine and leaves the message for the next round. A
//! tree whose links contradict each other is fatal ([`ControllerError`]).

mod classifier;
mod controller;
mod error;
mod locks;
mod message;
mod network;
mod policy;
mod report;
mod rotation;
mod stats;

pub use classifier::decide_bottom_up;
pub use controller::Controller;
pub use error::{ControllerError, Result};
pub use locks::{LockTable, NodeLock, RecordId};
pub use message::{HasMessage, MessageId};
pub use network::Network;
pub use policy::{BottomUp, RoutingPolicy};
pub use report::{AppliedRotation, Forward, LockPhase, RecordOutcome, RoundReport};
pub use rotation::Rotation;
pub use stats::NetworkStats;
