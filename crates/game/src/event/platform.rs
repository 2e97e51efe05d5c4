//! Moving platforms.

use glam::IVec2;
use hopper_physics::fixed::{fmul, ttof, Fixed, F1, F4, F8};
use hopper_physics::{fsin, GridPos, Movable};

use super::EventType;
use crate::level::StepContext;
use crate::player::LevelPlayer;

/// A platform swinging back and forth about its home position along a sine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMotion {
    origin: IVec2,
    range: IVec2,
    /// Milliseconds per full swing.
    period: u32,
    phase: i32,
}

impl PlatformMotion {
    pub fn new(origin: IVec2, grid: GridPos, event_type: &EventType) -> Self {
        Self {
            origin,
            range: IVec2::new(ttof(event_type.multi_a as i32), ttof(event_type.multi_b as i32)),
            period: (event_type.anim_speed.max(1) as u32) << 8,
            // Neighbouring platforms swing out of step
            phase: (grid.x as i32 + grid.y as i32) * 64,
        }
    }

    /// Offset from home at `ticks`.
    pub fn offset_at(&self, ticks: u32) -> IVec2 {
        let angle = ((ticks % self.period) as u64 * 1024 / self.period as u64) as i32 + self.phase;
        let swing = fsin(angle);
        IVec2::new(fmul(swing, self.range.x), fmul(swing, self.range.y))
    }

    /// Move the body to where the platform is at this step. Returns how far
    /// it moved.
    pub fn step(&mut self, body: &mut Movable, ctx: &StepContext) -> IVec2 {
        let target = self.origin + self.offset_at(ctx.ticks);
        let delta = target - body.pos;
        body.vel = if ctx.msps > 0 {
            let per_ms = |d: Fixed| (d as i64 * F1 as i64 / ctx.msps as i64) as Fixed;
            IVec2::new(per_ms(delta.x), per_ms(delta.y))
        } else {
            IVec2::ZERO
        };
        body.pos = target;
        delta
    }

    /// Whether a player is standing on a platform whose top edge is at `top`.
    pub fn carries(&self, player: &LevelPlayer, left: Fixed, top: Fixed, width: Fixed) -> bool {
        player.is_alive() && player.body.vel.y >= 0 && player.overlap(left, top - F4, width, F8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBehavior;

    fn platform(multi_a: i8, multi_b: i8) -> PlatformMotion {
        let mut event_type = EventType::new(EventBehavior::Platform);
        event_type.multi_a = multi_a;
        event_type.multi_b = multi_b;
        event_type.anim_speed = 4;
        PlatformMotion::new(IVec2::new(ttof(10), ttof(5)), GridPos::new(0, 0), &event_type)
    }

    #[test]
    fn swings_within_range() {
        let motion = platform(2, 0);
        assert_eq!(motion.offset_at(0), IVec2::ZERO);
        // A quarter period is the far end of the swing
        assert_eq!(motion.offset_at(256), IVec2::new(ttof(2), 0));
        assert_eq!(motion.offset_at(768), IVec2::new(-ttof(2), 0));
        for ticks in (0..2048).step_by(16) {
            assert!(motion.offset_at(ticks).x.abs() <= ttof(2));
        }
    }

    #[test]
    fn wide_swings_report_their_speed() {
        let env = crate::level::fixture::TestEnv::flat();
        let mut motion = platform(100, 0);
        let mut body = Movable::at(ttof(10), ttof(5));
        let delta = motion.step(&mut body, &env.ctx(256));
        assert_eq!(delta, IVec2::new(ttof(100), 0));
        assert_eq!(body.vel, IVec2::new(ttof(100) / 20 * F1, 0));
    }

    #[test]
    fn periodic() {
        let motion = platform(1, 1);
        assert_eq!(motion.offset_at(100), motion.offset_at(100 + 1024));
    }
}
