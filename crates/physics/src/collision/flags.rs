//! Per-tile behaviour flags.

use serde::{Deserialize, Serialize};

/// Flags attached to a whole tile, refining how its mask is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileFlags(pub u8);

impl TileFlags {
    /// Plain tile, mask read as-is.
    pub const NONE: Self = Self(0);

    /// Can be passed through when moving up, solid when landing on it.
    pub const ONE_WAY: Self = Self(1 << 0);

    /// Solid pixels of this tile hurt on contact (spikes).
    pub const HAZARD: Self = Self(1 << 1);

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Combine two flag sets.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for TileFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
