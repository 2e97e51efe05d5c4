//! Position and velocity shared by every moving entity.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::fixed::{Fixed, FRAC_BITS};

/// A fixed-point body: position in fixed pixels, velocity in fixed pixels
/// per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movable {
    pub pos: IVec2,
    pub vel: IVec2,
}

impl Movable {
    pub const fn at(x: Fixed, y: Fixed) -> Self {
        Self {
            pos: IVec2::new(x, y),
            vel: IVec2::ZERO,
        }
    }

    #[inline]
    pub fn x(&self) -> Fixed {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> Fixed {
        self.pos.y
    }

    /// Move by the velocity over `msps` milliseconds.
    pub fn advance(&mut self, msps: i32) {
        self.pos += (self.vel * msps) >> FRAC_BITS as i32;
    }

    /// Horizontal draw position relative to `view_x`, extrapolated by
    /// `change` milliseconds since the last step.
    #[inline]
    pub fn draw_x(&self, change: i32, view_x: Fixed) -> Fixed {
        self.pos.x + ((self.vel.x * change) >> FRAC_BITS) - view_x
    }

    /// Vertical counterpart of [`Movable::draw_x`].
    #[inline]
    pub fn draw_y(&self, change: i32, view_y: Fixed) -> Fixed {
        self.pos.y + ((self.vel.y * change) >> FRAC_BITS) - view_y
    }
}
