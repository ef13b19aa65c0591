//! Activity accounting.

use opticnet_topology::Primitive;
use serde::Serialize;

/// Counters accumulated across rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkStats {
    /// Completed rounds
    pub rounds: u64,
    /// Records that performed at least one rotation, counted once per record per round
    pub active_requests: u64,
    pub zig_rotations: u64,
    pub zig_zig_rotations: u64,
    pub zig_zag_rotations: u64,
    /// Rotations and forwards refused for a locked node
    pub contention_failures: u64,
    /// Successful forwards
    pub forwards: u64,
    /// Forwards that reached their destination
    pub deliveries: u64,
    /// Edges traversed by all forwards
    pub hops: u64,
}

impl NetworkStats {
    pub fn log_increment_active_requests(&mut self) {
        self.active_requests += 1;
    }

    pub fn record_rotation(&mut self, primitive: Primitive) {
        match primitive {
            Primitive::Zig => self.zig_rotations += 1,
            Primitive::ZigZig => self.zig_zig_rotations += 1,
            Primitive::ZigZag => self.zig_zag_rotations += 1,
        }
    }

    pub fn rotations(&self) -> u64 {
        self.zig_rotations + self.zig_zig_rotations + self.zig_zag_rotations
    }
}
