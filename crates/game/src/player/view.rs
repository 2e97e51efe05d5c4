//! Following the player with the viewport.

use hopper_physics::fixed::{Fixed, F24, F64, F8, FRAC_BITS};

use super::{LevelPlayer, LookState};
use crate::config::MovementConfig;
use crate::level::Viewport;

/// How far looking up or down has shifted the view by `ticks`.
fn look_shift(since: u32, ticks: u32, config: &MovementConfig) -> Fixed {
    match ticks.checked_sub(since + config.look_delay) {
        Some(elapsed) if elapsed > 0 => (64 * elapsed.min(1024) as i32).min(F64),
        _ => 0,
    }
}

impl LevelPlayer {
    /// Where the viewport should be to follow this player, given where it
    /// was last frame.
    ///
    /// The view centres on the player, shifts while looking up or down and
    /// trails behind by a lag that grows with the player's speed. `mspf` is
    /// the frame time and `change` the milliseconds since the last step.
    pub fn view(&self, previous: &Viewport, ticks: u32, mspf: i32, change: i32, config: &MovementConfig) -> Viewport {
        let vel = self.body.vel;
        let mut x = self.body.x() + ((vel.x * change) >> FRAC_BITS) + F8 - (previous.width << (FRAC_BITS - 1));
        let mut y = self.body.y() + ((vel.y * change) >> FRAC_BITS) - F24 - ((previous.height - 33) << (FRAC_BITS - 1));

        match self.look {
            LookState::Down { since } => y += look_shift(since, ticks, config),
            LookState::Up { since } => y -= look_shift(since, ticks, config),
            LookState::None => {}
        }

        let speed = (vel.x.abs() + vel.y.abs()) >> 14;
        if speed > 0 && mspf < speed {
            let lag = |old: Fixed, new: Fixed| {
                ((old as i64 * (speed - mspf) as i64 + new as i64 * mspf as i64) / speed as i64) as Fixed
            };
            x = lag(previous.x, x);
            y = lag(previous.y, y);
        }

        Viewport { x, y, ..*previous }
    }
}
