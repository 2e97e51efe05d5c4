//! Tile grid coordinates.

use serde::{Deserialize, Serialize};

use crate::fixed::{ftot, ttof, Fixed};

/// A cell in the level's tile grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: u16,
    pub y: u16,
}

impl GridPos {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// The cell containing a fixed-point position, or `None` when the position
    /// lies above or left of the map.
    pub fn containing(x: Fixed, y: Fixed) -> Option<Self> {
        let (tx, ty) = (ftot(x), ftot(y));
        if tx < 0 || ty < 0 || tx > u16::MAX as i32 || ty > u16::MAX as i32 {
            return None;
        }
        Some(Self::new(tx as u16, ty as u16))
    }

    /// Fixed-point position of the cell's top-left corner.
    pub fn origin(self) -> (Fixed, Fixed) {
        (ttof(self.x as i32), ttof(self.y as i32))
    }
}
