//! Collision resolution against the tile mask.
//!
//! Motion is resolved vertically first, then horizontally. Each axis moves in
//! whole 4-pixel cells, probing the cell ahead of the leading edge before
//! every move, then by the sub-cell remainder. A blocked move snaps the
//! player flush against the cell boundary and zeroes that velocity
//! component, so no step length can carry the footprint through a wall.

use hopper_physics::fixed::{step_delta, Fixed, CELL_MASK, F4, F8};
use hopper_physics::TileMask;

use super::footprint::{X_LEFT, X_MID, X_MID_LEFT, X_MID_RIGHT, X_RIGHT, Y_MID, Y_TOP};
use super::{ActiveEvent, ActiveEventKind, LevelPlayer};
use crate::frame_event::FrameEvent;
use crate::level::StepContext;

impl LevelPlayer {
    /// Whether any of the three points across the footprint, `offset` below
    /// the feet, would stop a fall.
    pub(super) fn check_mask_down(&self, mask: &dyn TileMask, offset: Fixed) -> bool {
        let (x, y) = (self.body.x(), self.body.y() + offset);
        mask.is_solid_down(x + X_MID_LEFT, y) || mask.is_solid_down(x + X_MID, y) || mask.is_solid_down(x + X_MID_RIGHT, y)
    }

    /// Whether any of the three points across the footprint, `offset` below
    /// the feet, would stop upward motion.
    pub(super) fn check_mask_up(&self, mask: &dyn TileMask, offset: Fixed) -> bool {
        let (x, y) = (self.body.x(), self.body.y() + offset);
        mask.is_solid_up(x + X_MID_LEFT, y) || mask.is_solid_up(x + X_MID, y) || mask.is_solid_up(x + X_MID_RIGHT, y)
    }

    /// Follow a slope by one cell up or down.
    fn ground(&mut self, mask: &dyn TileMask) {
        // Uphill
        if self.check_mask_up(mask, 0) && !self.check_mask_up(mask, -F4) {
            self.body.pos.y -= F4;
        }
        // Downhill
        if !self.check_mask_up(mask, F4) && self.check_mask_up(mask, F8) {
            self.body.pos.y += F4;
        }
    }

    /// Move vertically, stopping flush against ceilings and floors.
    fn move_vertical(&mut self, mask: &dyn TileMask, pdy: Fixed) {
        if pdy < 0 {
            for _ in 0..(-pdy >> 12) {
                if self.check_mask_up(mask, Y_TOP - F4) {
                    self.body.pos.y &= !CELL_MASK;
                    self.body.vel.y = 0;
                    return;
                }
                self.body.pos.y -= F4;
            }
            let rest = -pdy & CELL_MASK;
            if rest != 0 {
                if self.check_mask_up(mask, Y_TOP - rest) {
                    self.body.pos.y &= !CELL_MASK;
                    self.body.vel.y = 0;
                    return;
                }
                self.body.pos.y -= rest;
            }
        } else {
            for _ in 0..(pdy >> 12) {
                if self.check_mask_down(mask, F4) {
                    self.body.pos.y |= CELL_MASK;
                    self.body.vel.y = 0;
                    return;
                }
                self.body.pos.y += F4;
            }
            let rest = pdy & CELL_MASK;
            if rest != 0 {
                if self.check_mask_down(mask, rest) {
                    self.body.pos.y |= CELL_MASK;
                    self.body.vel.y = 0;
                } else {
                    self.body.pos.y += rest;
                }
            }
        }
    }

    /// Whether the leading edge would run into something moving by `by`.
    fn blocked_sideways(&self, mask: &dyn TileMask, by: Fixed) -> bool {
        let edge = if by < 0 { X_LEFT } else { X_RIGHT };
        mask.is_solid_up(self.body.x() + edge + by, self.body.y() + Y_MID)
    }

    /// Move horizontally. A grounded player follows slopes after every
    /// cell moved and once more at the end, even when a wall stopped them.
    fn move_horizontal(&mut self, mask: &dyn TileMask, pdx: Fixed, grounded: bool) {
        if pdx == 0 {
            return;
        }
        let dir = pdx.signum();
        let snap = |x: Fixed| if dir < 0 { x & !CELL_MASK } else { x | CELL_MASK };

        for _ in 0..(pdx.abs() >> 12) {
            if self.blocked_sideways(mask, dir * F4) {
                self.body.pos.x = snap(self.body.pos.x);
                self.body.vel.x = 0;
                break;
            }
            self.body.pos.x += dir * F4;
            if grounded {
                self.ground(mask);
            }
        }

        let rest = pdx.abs() & CELL_MASK;
        if rest != 0 {
            if self.blocked_sideways(mask, dir * rest) {
                self.body.pos.x = snap(self.body.pos.x);
                self.body.vel.x = 0;
            } else {
                self.body.pos.x += dir * rest;
            }
        }
        if grounded {
            self.ground(mask);
        }
    }

    /// Apply this step's velocity, resolving collisions with the tile mask,
    /// then check for falling out of the level and for hazards.
    pub fn movement(&mut self, ctx: &StepContext, out: &mut Vec<FrameEvent>) {
        self.apply_warp(ctx.ticks);
        let mask = ctx.mask;

        let (pdx, pdy) = if self.has_fast_feet(ctx.ticks) {
            (
                (self.body.vel.x * ctx.msps * 3) >> 11,
                (self.body.vel.y * ctx.msps * 3) >> 11,
            )
        } else {
            (step_delta(self.body.vel.x, ctx.msps), step_delta(self.body.vel.y, ctx.msps))
        };

        self.move_vertical(mask, pdy);

        let mut grounded = false;
        if pdy >= 0 && !self.floating {
            if self.check_mask_down(mask, 0) {
                // Sunk into the ground: rise to the top of the cell above
                if self.body.pos.y >= F4 {
                    self.body.pos.y = (self.body.pos.y - F4) | CELL_MASK;
                }
                grounded = true;
            } else if self.check_mask_down(mask, 1) {
                grounded = true;
            }
        }

        self.move_horizontal(mask, pdx, grounded);

        let floating_up = matches!(self.event, Some(ActiveEvent { kind: ActiveEventKind::Float { .. }, .. }));
        if floating_up && mask.is_solid_up(self.body.x() + X_MID, self.body.y() + Y_TOP - F4) {
            self.event = None;
            self.jump_target = None;
        }

        if ctx.has_ended() {
            return;
        }
        let (x, y) = (self.body.x(), self.body.y());
        if y + F4 > ctx.level_height() {
            self.kill(None, ctx, out);
            return;
        }
        let hazard = mask.is_hazard(x + X_LEFT - F4, y + Y_MID)
            || mask.is_hazard(x + X_RIGHT + F4, y + Y_MID)
            || mask.is_hazard(x + X_MID, y + Y_TOP - F4)
            || mask.is_hazard(x + X_MID, y + F4);
        if hazard {
            self.hit(None, ctx, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::fixture::{TestEnv, GROUND_ROW};
    use crate::player::{PlayerId, Reaction};
    use hopper_physics::fixed::{itof, ttof, F1, F24};
    use hopper_physics::{GridPos, TileFlags, TileShape};
    use proptest::prelude::*;

    const FLOOR: Fixed = ttof(GROUND_ROW as i32);

    fn run(env: &TestEnv, player: &mut LevelPlayer, steps: u32) -> Vec<FrameEvent> {
        let mut out = Vec::new();
        for step in 1..=steps {
            let ctx = env.ctx(step * 20);
            player.movement(&ctx, &mut out);
        }
        out
    }

    #[test]
    fn settles_on_the_floor() {
        let env = TestEnv::flat();
        let mut player = env.player_at(GridPos::new(2, 4));
        player.body.vel.y = env.config.movement.fall_speed;
        run(&env, &mut player, 40);
        assert_eq!(player.body.y(), FLOOR - 1);
        assert_eq!(player.body.vel.y, 0);
    }

    #[test]
    fn standing_inside_the_floor_lifts_out() {
        let env = TestEnv::flat();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        assert_eq!(player.body.y(), FLOOR);
        run(&env, &mut player, 1);
        assert_eq!(player.body.y(), FLOOR - 1);
    }

    proptest! {
        #[test]
        fn never_falls_through_the_floor(
            start in 0i32..(ttof(4)),
            speed in 0i32..itof(4000),
            msps in 1i32..100,
        ) {
            let env = TestEnv::flat();
            let mut player = env.player_at(GridPos::new(2, 4));
            player.body.pos.y = FLOOR - 1 - start;
            player.body.vel.y = speed;
            let mut ctx = env.ctx(100);
            ctx.msps = msps;
            player.movement(&ctx, &mut Vec::new());
            prop_assert!(player.body.y() < FLOOR);
        }

        #[test]
        fn never_walks_through_a_wall(speed in 0i32..itof(4000), msps in 1i32..100) {
            let mut env = TestEnv::flat();
            env.mask.fill(6, 0, 6, GROUND_ROW - 1, TileShape::SOLID).unwrap();
            let mut player = env.player_at(GridPos::new(4, GROUND_ROW - 1));
            player.body.pos.y = FLOOR - 1;
            player.body.vel.x = speed;
            let mut ctx = env.ctx(100);
            ctx.msps = msps;
            player.movement(&ctx, &mut Vec::new());
            prop_assert!(player.body.x() + X_RIGHT < ttof(6));
        }
    }

    #[test]
    fn walls_stop_flush() {
        let mut env = TestEnv::flat();
        env.mask.fill(6, 0, 6, GROUND_ROW - 1, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.vel.x = env.config.movement.run_speed;
        run(&env, &mut player, 40);
        assert_eq!(player.body.x(), ttof(5) + F4 - 1);
        assert_eq!(player.body.vel.x, 0);

        // And from the other side
        let mut player = env.player_at(GridPos::new(9, GROUND_ROW - 1));
        player.body.vel.x = -env.config.movement.run_speed;
        run(&env, &mut player, 40);
        assert_eq!(player.body.x() + X_LEFT, ttof(7));
        assert_eq!(player.body.vel.x, 0);
    }

    #[test]
    fn ceilings_stop_the_head() {
        let mut env = TestEnv::flat();
        env.mask.fill(0, 7, 4, 7, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.pos.y = FLOOR - 1;
        player.body.vel.y = env.config.movement.jump_speed;
        run(&env, &mut player, 10);
        assert_eq!(player.body.y() + Y_TOP, ttof(8));
        assert_eq!(player.body.vel.y, 0);
    }

    #[test]
    fn ceilings_cancel_floats() {
        let mut env = TestEnv::flat();
        env.mask.fill(0, 7, 4, 7, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.pos.y = FLOOR - 1;
        let float = crate::event::EventType::new(crate::event::EventBehavior::Float);
        player.set_event(GridPos::new(2, 9), &float, &env.config.movement);
        player.body.vel.y = env.config.movement.jump_speed;
        run(&env, &mut player, 10);
        assert!(player.event().is_none());
        assert!(player.jump_target().is_none());
    }

    #[test]
    fn floats_end_under_a_ceiling_without_touching_it() {
        let mut env = TestEnv::flat();
        env.mask.fill(0, 8, 4, 8, TileShape::SOLID).unwrap();
        let float = crate::event::EventType::new(crate::event::EventBehavior::Float);

        // Head a cell below the ceiling: the float carries on
        let mut clear = env.player_at(GridPos::new(2, 9));
        clear.body.pos.y = ttof(9) + F24 + F4;
        clear.set_event(GridPos::new(2, 9), &float, &env.config.movement);
        run(&env, &mut clear, 1);
        assert!(clear.event().is_some());

        // Head right under it, not moving: the float ends anyway
        let mut blocked = env.player_at(GridPos::new(2, 9));
        blocked.body.pos.y = ttof(9) + F24 - 1;
        blocked.set_event(GridPos::new(2, 9), &float, &env.config.movement);
        run(&env, &mut blocked, 1);
        assert_eq!(blocked.body.y(), ttof(9) + F24 - 1);
        assert!(blocked.event().is_none());
        assert!(blocked.jump_target().is_none());
    }

    #[test]
    fn wall_stops_still_settle_onto_slopes() {
        let mut env = TestEnv::flat();
        // A one-cell step under the right of the footprint, then a wall
        let step = TileShape::from_rows([0, 0, 0, 0, 0, 0, 0, 1 << 6]);
        env.mask.set_tile(2, GROUND_ROW - 1, step).unwrap();
        env.mask.set_tile(3, GROUND_ROW - 1, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.vel.x = itof(256);

        run(&env, &mut player, 1);
        assert_eq!(player.body.vel.x, 0);
        assert_eq!(player.body.x(), ttof(2) + F4 - 1);
        assert_eq!(player.body.y(), FLOOR - F4 - 1);
    }

    #[test]
    fn sunk_feet_stay_put_at_the_top_of_the_map() {
        let mut env = TestEnv::flat();
        env.mask.set_tile(2, 0, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, 0));
        player.body.pos.y = F1;
        run(&env, &mut player, 1);
        assert_eq!(player.body.y(), F1);
        assert!(player.is_alive());
    }

    #[test]
    fn climbs_and_descends_slopes() {
        let mut env = TestEnv::flat();
        env.mask.set_tile(5, GROUND_ROW - 1, TileShape::ramp_right()).unwrap();
        env.mask.fill(6, GROUND_ROW - 1, 8, GROUND_ROW - 1, TileShape::SOLID).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.pos.y = FLOOR - 1;
        player.body.vel.x = env.config.movement.run_speed;

        run(&env, &mut player, 25);
        assert_eq!(player.body.y(), ttof(GROUND_ROW as i32 - 1) - 1);
        assert_eq!(player.body.vel.x, env.config.movement.run_speed);
    }

    #[test]
    fn falling_out_of_the_level_kills() {
        let mut env = TestEnv::flat();
        env.mask.fill(3, GROUND_ROW, 3, GROUND_ROW + 1, TileShape::EMPTY).unwrap();
        let mut player = env.player_at(GridPos::new(3, GROUND_ROW - 1));
        player.body.vel.y = env.config.movement.fall_speed;
        let out = run(&env, &mut player, 40);
        assert!(!player.is_alive());
        assert_eq!(player.reaction().map(|r| r.kind), Some(Reaction::Killed));
        assert!(out.contains(&FrameEvent::PlayerKilled { player: PlayerId(0), by: None }));
    }

    #[test]
    fn hazards_underfoot_hurt() {
        let mut env = TestEnv::flat();
        env.mask.set_flags(2, GROUND_ROW, TileFlags::HAZARD).unwrap();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        let out = run(&env, &mut player, 1);
        assert_eq!(player.energy(), 3);
        assert!(out.contains(&FrameEvent::PlayerHit { player: PlayerId(0), by: None }));
    }

    #[test]
    fn fast_feet_go_half_again_as_far() {
        let env = TestEnv::flat();
        let mut plain = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        let mut boosted = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        boosted.give_fast_feet(0, &env.config.movement);
        for player in [&mut plain, &mut boosted] {
            player.body.pos.y = FLOOR - 1;
            player.body.vel.x = itof(256);
            run(&env, player, 1);
        }
        assert_eq!(plain.body.x() - ttof(2), itof(5));
        assert_eq!(boosted.body.x() - ttof(2), itof(5) + itof(5) / 2);
    }

    #[test]
    fn warp_relocates_before_moving() {
        let env = TestEnv::flat();
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.warp(GridPos::new(12, GROUND_ROW - 1), 0, &env.config.movement);
        run(&env, &mut player, 50);
        assert_eq!(player.body.pos.x, ttof(12));
        assert_eq!(player.body.y(), FLOOR - 1);
        assert!(player.pending_warp().is_none());
    }
}
