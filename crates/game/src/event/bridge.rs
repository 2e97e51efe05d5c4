//! Sagging bridges.
//!
//! A bridge is a row of pieces that dips under whoever stands on it. The
//! sag is tracked as the span `left_dip..=right_dip` of dip points covered
//! by players this step; with nobody on the bridge the span relaxes back
//! outward until it is empty again.

use hopper_physics::fixed::{Fixed, F1, F10, F32, F4, F8};
use hopper_physics::{GridPos, Movable, TileMask};

use super::{EventAnim, EventType};
use crate::anim::AnimBank;
use crate::canvas::Canvas;
use crate::level::{DrawContext, StepContext};
use crate::player::{footprint, LevelPlayer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSag {
    length: Fixed,
    left_dip: Fixed,
    right_dip: Fixed,
}

/// `a + (b - a) * num / den` without overflow. `den` must be positive.
fn lerp(a: Fixed, b: Fixed, num: Fixed, den: Fixed) -> Fixed {
    a + ((b - a) as i64 * num as i64 / den as i64) as Fixed
}

impl BridgeSag {
    pub fn new(event_type: &EventType) -> Self {
        let length = event_type.multi_a.max(0) as i32 * event_type.piece_size as i32 * F4;
        Self {
            length,
            left_dip: length,
            right_dip: 0,
        }
    }

    pub fn length(&self) -> Fixed {
        self.length
    }

    pub fn left_dip(&self) -> Fixed {
        self.left_dip
    }

    pub fn right_dip(&self) -> Fixed {
        self.right_dip
    }

    /// Whether someone stood on the bridge since it last relaxed.
    pub fn is_loaded(&self) -> bool {
        self.right_dip >= self.left_dip
    }

    /// Depth of the sag under a point `dip_x` along the bridge.
    pub fn dip_depth(&self, dip_x: Fixed) -> Fixed {
        if dip_x < self.length >> 1 {
            dip_x >> 3
        } else {
            (self.length - dip_x) >> 3
        }
    }

    /// Move the dip span outward by `rate` per millisecond.
    pub fn relax(&mut self, rate: i32, msps: i32) {
        self.left_dip = (self.left_dip + rate * msps).min(self.length);
        self.right_dip = (self.right_dip - rate * msps).max(0);
    }

    pub(super) fn step(
        &mut self,
        body: &Movable,
        cell: GridPos,
        event_type: &EventType,
        ctx: &StepContext,
        players: &mut [LevelPlayer],
    ) {
        self.relax(ctx.config.bridge_relax_rate, ctx.msps);
        let (x, y) = (body.x(), body.y());

        for player in players.iter_mut() {
            let px = player.body.x();
            let dip_x = (px + footprint::X_MID - x).clamp(0, self.length);
            let dip_y = self.dip_depth(dip_x);
            let surface = y - F8 + dip_y;

            if player.overlap(x, surface - F4, self.length, F8) && !ctx.mask.is_solid_down(x + dip_x, surface - F32) {
                player.set_event(cell, event_type, &ctx.config.movement);
                self.left_dip = self.left_dip.min(dip_x);
                self.right_dip = self.right_dip.max(dip_x);
                player.set_position(px, surface - F1);
            } else {
                player.clear_event(cell);
            }
        }
    }

    /// Sag of the bridge surface at `px` along it.
    pub fn piece_dip(&self, px: Fixed) -> Fixed {
        if self.length <= 0 {
            return 0;
        }
        if self.is_loaded() {
            let (left, right) = (self.left_dip, self.right_dip);
            let (left_depth, right_depth) = (self.dip_depth(left), self.dip_depth(right));
            if px < left {
                if left == 0 { 0 } else { lerp(0, left_depth, px, left) }
            } else if px > right {
                if right == self.length { 0 } else { lerp(0, right_depth, self.length - px, self.length - right) }
            } else if right == left {
                left_depth
            } else {
                lerp(left_depth, right_depth, px - left, right - left)
            }
        } else {
            // Relaxing: a shrinking triangle peaked between the dip points
            let depth = self.right_dip.min(self.length - self.left_dip) >> 3;
            let centre = (self.left_dip + self.right_dip) >> 1;
            if px < centre {
                lerp(0, depth, px, centre)
            } else if centre == self.length {
                depth
            } else {
                lerp(0, depth, self.length - px, self.length - centre)
            }
        }
    }

    pub(super) fn draw(
        &self,
        body: &Movable,
        cell: GridPos,
        slot: Option<EventAnim>,
        event_type: &EventType,
        dc: &DrawContext,
        anims: &mut AnimBank,
        canvas: &mut dyn Canvas,
    ) {
        let Some(anim) = slot
            .and_then(|slot| event_type.anim(slot))
            .and_then(|id| anims.get_mut(id))
        else {
            return;
        };
        let piece = event_type.piece_size as i32 * F4;
        if piece <= 0 {
            return;
        }

        // Every piece shows the same frame
        anim.set_frame(dc.ticks / event_type.frame_time() + cell.x as u32 + cell.y as u32, true);

        let x = body.draw_x(dc.change, dc.viewport.x);
        let anchor_y = body.draw_y(dc.change, dc.viewport.y) - F10 + anim.offset();
        for offset in (0..self.length).step_by(piece as usize) {
            anim.draw(canvas, x + offset, anchor_y + self.piece_dip(offset));
        }
    }
}
