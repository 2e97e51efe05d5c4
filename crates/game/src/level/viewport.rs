//! The visible window onto the level.

use glam::IVec2;
use hopper_physics::fixed::{ftoi, ftot, itof, itot, Fixed, F160, F192};
use hopper_physics::GridPos;
use serde::{Deserialize, Serialize};

/// Viewport origin in fixed pixels and canvas size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: Fixed,
    pub y: Fixed,
    pub width: i32,
    pub height: i32,
}

/// An inclusive range of tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TileRect {
    pub fn expand(self, tiles: i32) -> Self {
        Self {
            left: self.left - tiles,
            top: self.top - tiles,
            right: self.right + tiles,
            bottom: self.bottom + tiles,
        }
    }

    pub fn contains(&self, grid: GridPos) -> bool {
        let (x, y) = (grid.x as i32, grid.y as i32);
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn right(&self) -> Fixed {
        self.x + itof(self.width)
    }

    pub fn bottom(&self) -> Fixed {
        self.y + itof(self.height)
    }

    /// Tiles touched by the viewport.
    pub fn tiles(&self) -> TileRect {
        TileRect {
            left: ftot(self.x),
            top: ftot(self.y),
            right: itot(ftoi(self.x) + self.width),
            bottom: itot(ftoi(self.y) + self.height),
        }
    }

    /// Whether an entity at `pos`, spawned from `grid`, is far enough away
    /// to be dropped. Both its position and its home cell must be out of
    /// range.
    pub fn is_far(&self, pos: IVec2, grid: GridPos) -> bool {
        let pos_far = pos.x < self.x - F192
            || pos.x > self.right() + F192
            || pos.y < self.y - F160
            || pos.y > self.bottom() + F160;
        pos_far && !self.tiles().expand(1).contains(grid)
    }

    /// Keep the viewport inside a level of the given fixed-point size.
    pub fn clamp_to(&mut self, level_width: Fixed, level_height: Fixed) {
        self.x = self.x.min(level_width - itof(self.width)).max(0);
        self.y = self.y.min(level_height - itof(self.height)).max(0);
    }
}
