//! Drawing the player, its shield, invincibility stars and flock.

use hopper_physics::fixed::Fixed;
use hopper_physics::{fcos, fsin};

use super::footprint::{X_MID, Y_MID, Y_TOP};
use super::{ActiveReaction, LevelPlayer, Reaction, YELLOW_SHIELD};
use crate::anim::AnimBank;
use crate::canvas::Canvas;
use crate::level::DrawContext;

/// Milliseconds per player animation frame.
const FRAME_TIME: u32 = 75;

/// Colour a hurt player flashes in.
const HURT_COLOUR: u8 = 36;

/// Four offsets a quarter turn apart, starting from `(dx, dy)`.
fn orbit(dx: Fixed, dy: Fixed) -> [(Fixed, Fixed); 4] {
    [(dx, dy), (-dx, -dy), (dy, -dx), (-dy, dx)]
}

impl LevelPlayer {
    pub fn draw(&self, dc: &DrawContext, bank: &mut AnimBank, canvas: &mut dyn Canvas) {
        let ticks = dc.ticks;
        let x = self.body.draw_x(dc.change, dc.viewport.x);
        let y = self.body.draw_y(dc.change, dc.viewport.y);

        if let Some(anim) = self.anims.get(self.anim).and_then(|id| bank.get_mut(id)) {
            match self.reaction {
                Some(ActiveReaction { kind: Reaction::Killed, since, .. }) => {
                    anim.set_frame(ticks.saturating_sub(since) / FRAME_TIME, false)
                }
                _ => anim.set_frame(ticks / FRAME_TIME, true),
            }

            let hurt = self.reaction.is_some_and(|reaction| reaction.kind == Reaction::Hurt);
            if hurt && (ticks / 30) & 3 == 0 {
                anim.flash_palette(canvas, HURT_COLOUR);
            } else {
                anim.set_palette(canvas, self.anims.palette);
            }
            if self.has_fast_feet(ticks) {
                // Motion blur
                anim.draw(canvas, x - (self.body.vel.x >> 6), y);
            }
            anim.draw(canvas, x, y);
            anim.restore_palette(canvas);
        }

        let centre = x + X_MID;

        let invincible = self.reaction.is_some_and(|reaction| reaction.kind == Reaction::Invincible);
        if let Some(stars) = bank.get_mut(self.anims.stars).filter(|_| invincible) {
            stars.disable_default_offset();
            let angle = (ticks as i32).wrapping_mul(2);
            let frame = ticks / FRAME_TIME;
            for (index, (dx, dy)) in orbit(fsin(angle) * 12, fcos(angle) * 12).into_iter().enumerate() {
                stars.set_frame(frame + index as u32, true);
                stars.draw(canvas, centre + dx, y + Y_MID + dy);
            }
        }

        let (shield_anim, orbs) = match self.shield {
            0 => (None, 0),
            shield if shield > YELLOW_SHIELD => (Some(self.anims.shield_orange), shield - YELLOW_SHIELD),
            shield => (Some(self.anims.shield_yellow), shield),
        };
        if let Some(shield) = shield_anim.and_then(|id| bank.get_mut(id)) {
            shield.set_frame(ticks / FRAME_TIME, true);
            let angle = ticks as i32;
            for (dx, dy) in orbit(fcos(angle) * 20, fsin(angle) * 20).into_iter().take(orbs as usize) {
                shield.draw(canvas, centre + dx, y + Y_TOP + dy);
            }
        }

        for bird in self.birds.iter() {
            let id = if self.facing.is_right() || bird.is_fleeing() {
                self.anims.bird_right
            } else {
                self.anims.bird_left
            };
            if let Some(anim) = bank.get_mut(id) {
                bird.draw(dc, anim, canvas);
            }
        }
    }
}
