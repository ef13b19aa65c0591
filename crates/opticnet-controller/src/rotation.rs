//! Named bottom-up rotations and the primitive each one performs.

use opticnet_topology::Primitive;
use serde::Serialize;

/// Rotation chosen for a node holding (or awaiting) a message.
///
/// The `Left`/`Right` suffix of the double rotations names the side of the
/// grandparent the rotated group hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rotation {
    /// No rotation: forward, or wait for the other endpoint
    Null,
    /// Single rotation over the parent
    ZigBottomUp,
    /// x left of y, y left of z
    ZigZigLeftBottomUp,
    /// x right of y, y right of z
    ZigZigRightBottomUp,
    /// x right of y, y left of z
    ZigZagLeftBottomUp,
    /// x left of y, y right of z
    ZigZagRightBottomUp,
}

impl Rotation {
    /// Structural primitive behind this rotation; `None` for [`Rotation::Null`].
    pub const fn primitive(&self) -> Option<Primitive> {
        match self {
            Rotation::Null => None,
            Rotation::ZigBottomUp => Some(Primitive::Zig),
            Rotation::ZigZigLeftBottomUp | Rotation::ZigZigRightBottomUp => {
                Some(Primitive::ZigZig)
            }
            Rotation::ZigZagLeftBottomUp | Rotation::ZigZagRightBottomUp => {
                Some(Primitive::ZigZag)
            }
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Rotation::Null)
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rotation::Null => "NULL",
            Rotation::ZigBottomUp => "ZIG_BOTTOM_UP",
            Rotation::ZigZigLeftBottomUp => "ZIGZIGLEFT_BOTTOM_UP",
            Rotation::ZigZigRightBottomUp => "ZIGZIGRIGHT_BOTTOM_UP",
            Rotation::ZigZagLeftBottomUp => "ZIGZAGLEFT_BOTTOM_UP",
            Rotation::ZigZagRightBottomUp => "ZIGZAGRIGHT_BOTTOM_UP",
        };
        f.write_str(name)
    }
}
