//! Input to velocity, firing and animation choice.

use hopper_physics::fixed::{Fixed, F2, F20, F36, F4, F64, F8};
use hopper_physics::TileMask;

use super::footprint::{X_LEFT, X_MID, X_MID_LEFT, X_MID_RIGHT, X_RIGHT, Y_MID, Y_TOP};
use super::{ActiveEventKind, LevelPlayer, LookState, PlayerAnim, PlayerPhase, Reaction, JUMP_SOUND};
use crate::anim::Facing;
use crate::bullet::{Bullet, BulletKind};
use crate::chain::Chain;
use crate::config::MovementConfig;
use crate::frame_event::{play, FrameEvent};
use crate::input::ControlState;
use crate::level::StepContext;

/// Speed up in direction `dir` (-1 or 1): hard when reversing, then up to
/// walking speed, then more gently up to running speed.
fn accelerate(speed: Fixed, dir: i32, config: &MovementConfig, msps: i32) -> Fixed {
    let along = speed * dir;
    let accel = if along < 0 {
        config.reverse_accel
    } else if along < config.walk_speed {
        config.walk_accel
    } else if along < config.run_speed {
        config.run_accel
    } else {
        0
    };
    speed + dir * accel * msps
}

/// Extra jump height for running at `vel_x`. Leftward speed is shifted
/// with its sign, so it rounds up where rightward speed rounds down.
fn run_boost(vel_x: Fixed, shift: u32) -> Fixed {
    if vel_x < 0 {
        -(vel_x >> shift)
    } else {
        vel_x >> shift
    }
}

/// Slow toward zero without passing it.
fn decelerate(speed: Fixed, accel: i32, msps: i32) -> Fixed {
    let step = accel * msps;
    if speed > 0 {
        (speed - step).max(0)
    } else {
        (speed + step).min(0)
    }
}

impl LevelPlayer {
    /// Respond to the controls held this step.
    pub fn control(
        &mut self,
        controls: ControlState,
        ctx: &StepContext,
        bullets: &mut Chain<Bullet>,
        out: &mut Vec<FrameEvent>,
    ) {
        let config = &ctx.config.movement;
        let (mask, msps) = (ctx.mask, ctx.msps);

        if !self.is_alive() {
            // Drop, but otherwise stay put
            self.body.vel.x = 0;
            self.body.vel.y = if self.floating {
                0
            } else {
                (self.body.vel.y + config.gravity * msps).min(config.fall_speed)
            };
            self.anim = PlayerAnim::new(self.facing, PlayerPhase::Die);
            return;
        }

        let vel_x = if controls.right() {
            self.facing = Facing::Right;
            accelerate(self.body.vel.x, 1, config, msps)
        } else if controls.left() {
            self.facing = Facing::Left;
            accelerate(self.body.vel.x, -1, config, msps)
        } else {
            decelerate(self.body.vel.x, config.stop_accel, msps)
        };
        self.body.vel.x = vel_x.clamp(-config.run_speed, config.run_speed);

        let (x, y) = (self.body.x(), self.body.y());
        let platform = self.on_platform_event()
            || self.check_mask_down(mask, F4)
            || (self.body.vel.x > 0 && mask.is_solid_down(x + X_MID_LEFT, y + F8))
            || (self.body.vel.x < 0 && mask.is_solid_down(x + X_MID_RIGHT, y + F8));
        let event_kind = self.event.map(|event| event.kind);
        let headroom = !mask.is_solid_up(x + X_MID, y - F36);

        if self.floating {
            let vel_y = if controls.up() {
                accelerate(self.body.vel.y, -1, config, msps)
            } else if controls.down() {
                accelerate(self.body.vel.y, 1, config, msps)
            } else {
                decelerate(self.body.vel.y, config.stop_accel, msps)
            };
            let vel_y = match event_kind {
                Some(ActiveEventKind::Spring { speed }) => speed,
                Some(ActiveEventKind::Float { .. }) => config.jump_speed,
                _ => vel_y,
            };
            self.body.vel.y = vel_y.clamp(-config.run_speed, config.run_speed);
        } else if y + Y_MID > ctx.water_level {
            let vel_y = if controls.swim() {
                // Ready to jump clear of the surface
                if headroom {
                    self.jump_target = Some(y - config.jump_height - run_boost(self.body.vel.x, 4));
                    self.event = None;
                }
                accelerate(self.body.vel.y, -1, config, msps)
            } else if controls.down() {
                accelerate(self.body.vel.y, 1, config, msps)
            } else {
                (self.body.vel.y + config.sink_accel * msps).min(config.sink_speed)
            };
            self.body.vel.y = vel_y.clamp(-config.run_speed, config.run_speed);
        } else {
            self.ground_control(controls, ctx, platform, headroom, out);
        }

        let event_kind = self.event.map(|event| event.kind);
        let floating_up = matches!(event_kind, Some(ActiveEventKind::Float { .. }));
        let on_platform = matches!(event_kind, Some(ActiveEventKind::Platform));
        let y = self.body.y();

        if !floating_up && self.jump_target.is_some_and(|target| target < y) && self.check_mask_up(mask, Y_TOP - F4) {
            self.jump_target = None;
            self.body.vel.y = self.body.vel.y.max(0);
            if !on_platform {
                self.event = None;
            }
        }
        if self.jump_target.is_some_and(|target| y <= target) {
            self.jump_target = None;
            if !on_platform {
                self.event = None;
            }
        }

        self.fire(controls, ctx, platform, bullets, out);

        if controls.change() && !self.change_held {
            self.arsenal.cycle();
        }
        self.change_held = controls.change();

        self.anim = self.choose_anim(controls, ctx, platform);
    }

    /// Jump arc, gravity and looking while on land.
    fn ground_control(
        &mut self,
        controls: ControlState,
        ctx: &StepContext,
        platform: bool,
        headroom: bool,
        out: &mut Vec<FrameEvent>,
    ) {
        let config = &ctx.config.movement;
        let y = self.body.y();

        if platform && controls.jump() && headroom {
            // Faster runs jump higher
            self.jump_target = Some(y - config.jump_height - run_boost(self.body.vel.x, 3));
            self.event = None;
            play(out, Some(JUMP_SOUND));
        }

        let launch_speed = match self.event.map(|event| event.kind) {
            Some(ActiveEventKind::Spring { speed } | ActiveEventKind::Float { speed }) => Some(speed),
            _ => None,
        };
        if !controls.jump() && launch_speed.is_none() {
            self.jump_target = None;
        }

        if let Some(target) = self.jump_target.filter(|&target| y >= target) {
            let mut vel_y = (target - y - F64) * 4;
            match launch_speed {
                Some(speed) => {
                    let limit = if speed >= 0 { config.jump_speed } else { speed };
                    vel_y = vel_y.max(limit);
                }
                None if self.event.is_none() => vel_y = vel_y.max(config.jump_speed),
                None => {}
            }
            self.body.vel.y = vel_y;
        } else if !platform {
            self.body.vel.y = (self.body.vel.y + config.gravity * ctx.msps).min(config.fall_speed);
        }

        if self.body.vel.y > 0 && self.on_platform_event() {
            self.body.vel.y = 0;
        }

        if platform && self.look == LookState::None {
            if controls.up() {
                self.look = LookState::Up { since: ctx.ticks };
            } else if controls.down() {
                self.look = LookState::Down { since: ctx.ticks };
            }
        }
        let released = match self.look {
            LookState::None => false,
            LookState::Up { .. } => !controls.up(),
            LookState::Down { .. } => !controls.down(),
        };
        if !platform || released {
            self.look = LookState::None;
        }
    }

    fn fire(
        &mut self,
        controls: ControlState,
        ctx: &StepContext,
        platform: bool,
        bullets: &mut Chain<Bullet>,
        out: &mut Vec<FrameEvent>,
    ) {
        if !controls.fire() {
            self.fire_locked = false;
            return;
        }
        if self.fire_locked || ctx.ticks < self.fire_time || !self.arsenal.is_usable(ctx.bullet_types) {
            return;
        }

        // Bullets leave from the shooting animation's gun
        if platform {
            self.anim = PlayerAnim::new(self.facing, PlayerPhase::Shoot);
        }
        let Some(bullet) = Bullet::from_player(self, false, ctx, out) else {
            return;
        };
        bullets.push_back(bullet);
        if self.arsenal.bullet_kind() != BulletKind::Tnt {
            if let Some(lower) = Bullet::from_player(self, true, ctx, out) {
                bullets.push_back(lower);
            }
        }

        match self.arsenal.fire_speed() {
            0 => self.fire_locked = true,
            speed => self.fire_time = ctx.ticks + 1000 / speed as u32,
        }
        self.arsenal.consume();
    }

    fn choose_anim(&self, controls: ControlState, ctx: &StepContext, platform: bool) -> PlayerAnim {
        let config = &ctx.config.movement;
        let (mask, ticks) = (ctx.mask, ctx.ticks);
        let (x, y) = (self.body.x(), self.body.y());
        let (vel_x, vel_y) = (self.body.vel.x, self.body.vel.y);
        let facing = self.facing;
        let with_facing = |phase| PlayerAnim::new(facing, phase);

        let hurting = self
            .reaction
            .is_some_and(|reaction| reaction.kind == Reaction::Hurt && ticks < reaction.since + config.hurt_anim_time);
        if hurting {
            return with_facing(PlayerPhase::Hurt);
        }
        if y + Y_MID > ctx.water_level {
            return with_facing(PlayerPhase::Swim);
        }
        if self.floating {
            return with_facing(PlayerPhase::Float);
        }
        if vel_y < 0 {
            return match self.event.map(|event| event.kind) {
                Some(ActiveEventKind::Spring { .. }) => with_facing(PlayerPhase::Spring),
                _ => with_facing(PlayerPhase::Jump),
            };
        }
        if !platform {
            return with_facing(PlayerPhase::Fall);
        }

        if vel_x != 0 {
            return if vel_x <= -config.run_speed {
                PlayerAnim::new(Facing::Left, PlayerPhase::Run)
            } else if vel_x >= config.run_speed {
                PlayerAnim::new(Facing::Right, PlayerPhase::Run)
            } else if vel_x < 0 && facing.is_right() {
                PlayerAnim::new(Facing::Left, PlayerPhase::Stop)
            } else if vel_x > 0 && !facing.is_right() {
                PlayerAnim::new(Facing::Right, PlayerPhase::Stop)
            } else {
                with_facing(PlayerPhase::Walk)
            };
        }

        let on_platform_event = self.on_platform_event();
        let overhang = |mid: Fixed, edge: Fixed| {
            !on_platform_event && !mask.is_solid_down(x + mid, y + F20) && !mask.is_solid_down(x + edge, y + F2)
        };
        if overhang(X_MID_LEFT, X_LEFT) {
            return PlayerAnim::new(Facing::Left, PlayerPhase::Edge);
        }
        if overhang(X_MID_RIGHT, X_RIGHT) {
            return PlayerAnim::new(Facing::Right, PlayerPhase::Edge);
        }

        match self.look {
            LookState::Up { since } if ticks > since + config.look_delay => with_facing(PlayerPhase::LookUp),
            LookState::Down { since } if ticks < since + config.look_delay => with_facing(PlayerPhase::Crouch),
            LookState::Down { .. } => with_facing(PlayerPhase::LookDown),
            _ if controls.fire() => with_facing(PlayerPhase::Shoot),
            _ => with_facing(PlayerPhase::Stand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventBehavior, EventType};
    use crate::level::fixture::{TestEnv, GROUND_ROW};
    use hopper_physics::fixed::{ttof, F1};
    use hopper_physics::{GridPos, TileShape};

    fn standing(env: &TestEnv) -> LevelPlayer {
        let mut player = env.player_at(GridPos::new(2, GROUND_ROW - 1));
        player.body.pos.y = ttof(GROUND_ROW as i32) - 1;
        player
    }

    fn press(bits: u16) -> ControlState {
        ControlState::from_bits(bits)
    }

    fn control(env: &TestEnv, player: &mut LevelPlayer, controls: ControlState, ticks: u32) -> (Chain<Bullet>, Vec<FrameEvent>) {
        let mut bullets = Chain::new();
        let mut out = Vec::new();
        player.control(controls, &env.ctx(ticks), &mut bullets, &mut out);
        (bullets, out)
    }

    #[test]
    fn jump_from_rest() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.set_event(GridPos::new(2, 9), &EventType::new(EventBehavior::Platform), &env.config.movement);

        let (_, out) = control(&env, &mut player, press(ControlState::JUMP), 100);
        assert!(player.body.vel.y < 0);
        assert!(player.event().is_none());
        assert_eq!(player.jump_target(), Some(player.body.y() - env.config.movement.jump_height));
        assert_eq!(player.anim().phase, PlayerPhase::Jump);
        assert_eq!(out, vec![FrameEvent::Sound(JUMP_SOUND)]);
    }

    #[test]
    fn running_jumps_round_by_direction() {
        let env = TestEnv::flat();
        let coast = env.config.movement.stop_accel * 20;
        let jump_height = env.config.movement.jump_height;

        let mut left = standing(&env);
        left.body.vel.x = -coast - 9;
        control(&env, &mut left, press(ControlState::JUMP), 100);
        assert_eq!(left.body.vel.x, -9);
        assert_eq!(left.jump_target(), Some(left.body.y() - jump_height - 2));

        let mut right = standing(&env);
        right.body.vel.x = coast + 9;
        control(&env, &mut right, press(ControlState::JUMP), 100);
        assert_eq!(right.body.vel.x, 9);
        assert_eq!(right.jump_target(), Some(right.body.y() - jump_height - 1));

        assert_eq!(run_boost(-17, 4), 2);
        assert_eq!(run_boost(17, 4), 1);
    }

    #[test]
    fn no_jump_under_a_low_ceiling() {
        let mut env = TestEnv::flat();
        env.mask.fill(0, GROUND_ROW - 2, 4, GROUND_ROW - 2, TileShape::SOLID).unwrap();
        let mut player = standing(&env);
        let (_, out) = control(&env, &mut player, press(ControlState::JUMP), 100);
        assert!(player.jump_target().is_none());
        assert!(out.is_empty());
    }

    #[test]
    fn releasing_jump_ends_the_arc() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        control(&env, &mut player, press(ControlState::JUMP), 100);
        assert!(player.jump_target().is_some());
        control(&env, &mut player, ControlState::new(), 120);
        assert!(player.jump_target().is_none());
    }

    #[test]
    fn springs_launch_without_jump_held() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        let mut spring = EventType::new(EventBehavior::Spring);
        spring.multi_a = 4;
        player.set_event(GridPos::new(2, 9), &spring, &env.config.movement);

        control(&env, &mut player, ControlState::new(), 100);
        assert_eq!(player.body.vel.y, -4 * F20);
        assert!(player.jump_target().is_some());
        assert_eq!(player.anim().phase, PlayerPhase::Spring);
    }

    #[test]
    fn walking_builds_up_to_running() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        control(&env, &mut player, press(ControlState::RIGHT), 20);
        assert_eq!(player.body.vel.x, env.config.movement.walk_accel * 20);
        assert_eq!(player.anim(), PlayerAnim::new(Facing::Right, PlayerPhase::Walk));

        for step in 2..40 {
            control(&env, &mut player, press(ControlState::RIGHT), step * 20);
        }
        assert_eq!(player.body.vel.x, env.config.movement.run_speed);
        assert_eq!(player.anim(), PlayerAnim::new(Facing::Right, PlayerPhase::Run));

        // Turning round brakes first
        control(&env, &mut player, press(ControlState::LEFT), 1000);
        assert_eq!(player.facing(), Facing::Left);
        assert_eq!(player.anim(), PlayerAnim::new(Facing::Right, PlayerPhase::Stop));
    }

    #[test]
    fn braking_stops_at_zero() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.body.vel.x = 5 * F1;
        control(&env, &mut player, ControlState::new(), 20);
        assert_eq!(player.body.vel.x, 0);
        player.body.vel.x = -5 * F1;
        control(&env, &mut player, ControlState::new(), 40);
        assert_eq!(player.body.vel.x, 0);
    }

    #[test]
    fn falls_when_unsupported() {
        let env = TestEnv::flat();
        let mut player = env.player_at(GridPos::new(2, 3));
        control(&env, &mut player, ControlState::new(), 20);
        assert_eq!(player.body.vel.y, env.config.movement.gravity * 20);
        assert_eq!(player.anim().phase, PlayerPhase::Fall);
    }

    #[test]
    fn fire_cooldown_boundary() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.arsenal_mut().set_fire_speed(5);
        let fire = press(ControlState::FIRE);

        let (bullets, _) = control(&env, &mut player, fire, 1000);
        assert_eq!(bullets.len(), 1);
        assert_eq!(player.anim().phase, PlayerPhase::Shoot);
        let (bullets, _) = control(&env, &mut player, fire, 1199);
        assert!(bullets.is_empty());
        let (bullets, _) = control(&env, &mut player, fire, 1200);
        assert_eq!(bullets.len(), 1);
        let (bullets, _) = control(&env, &mut player, fire, 1200);
        assert!(bullets.is_empty());
    }

    #[test]
    fn zero_fire_speed_needs_a_fresh_press() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        let fire = press(ControlState::FIRE);

        let (bullets, _) = control(&env, &mut player, fire, 100);
        assert_eq!(bullets.len(), 1);
        let (bullets, _) = control(&env, &mut player, fire, 5000);
        assert!(bullets.is_empty());
        control(&env, &mut player, ControlState::new(), 5020);
        let (bullets, _) = control(&env, &mut player, fire, 5040);
        assert_eq!(bullets.len(), 1);
    }

    #[test]
    fn exhausted_ammo_advances() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.arsenal_mut().add_ammo(0, 1);
        player.arsenal_mut().add_ammo(2, 3);
        player.arsenal_mut().cycle();
        assert_eq!(player.arsenal().selected(), Some(0));

        let (bullets, _) = control(&env, &mut player, press(ControlState::FIRE), 100);
        assert_eq!(bullets.front().map(Bullet::kind), Some(BulletKind::Ammo(1)));
        assert_eq!(player.arsenal().ammo()[0], 0);
        assert_eq!(player.arsenal().selected(), Some(2));
    }

    #[test]
    fn change_cycles_once_per_press() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.arsenal_mut().add_ammo(0, 3);
        player.arsenal_mut().add_ammo(1, 3);
        let change = press(ControlState::CHANGE);

        control(&env, &mut player, change, 20);
        control(&env, &mut player, change, 40);
        assert_eq!(player.arsenal().selected(), Some(0));
        control(&env, &mut player, ControlState::new(), 60);
        control(&env, &mut player, change, 80);
        assert_eq!(player.arsenal().selected(), Some(1));
    }

    #[test]
    fn looking_waits_for_the_delay() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        let up = press(ControlState::UP);

        control(&env, &mut player, up, 100);
        assert_eq!(player.look(), LookState::Up { since: 100 });
        assert_eq!(player.anim().phase, PlayerPhase::Stand);
        control(&env, &mut player, up, 1101);
        assert_eq!(player.anim().phase, PlayerPhase::LookUp);

        control(&env, &mut player, ControlState::new(), 1120);
        assert_eq!(player.look(), LookState::None);

        let down = press(ControlState::DOWN);
        control(&env, &mut player, down, 2000);
        assert_eq!(player.anim().phase, PlayerPhase::Crouch);
        control(&env, &mut player, down, 3000);
        assert_eq!(player.anim().phase, PlayerPhase::LookDown);
    }

    #[test]
    fn teeters_over_ledges() {
        let mut env = TestEnv::flat();
        env.mask.fill(3, GROUND_ROW, 3, GROUND_ROW + 1, TileShape::EMPTY).unwrap();
        let mut player = standing(&env);
        player.body.pos.x = ttof(3) + 16 * F1;
        control(&env, &mut player, ControlState::new(), 100);
        assert_eq!(player.anim(), PlayerAnim::new(Facing::Left, PlayerPhase::Edge));
    }

    #[test]
    fn swimming_sinks_slowly() {
        let mut env = TestEnv::flat();
        env.water_level = ttof(5);
        let mut player = standing(&env);
        control(&env, &mut player, ControlState::new(), 20);
        assert_eq!(player.body.vel.y, env.config.movement.sink_accel * 20);
        assert_eq!(player.anim().phase, PlayerPhase::Swim);

        control(&env, &mut player, press(ControlState::SWIM), 40);
        assert!(player.jump_target().is_some());
    }

    #[test]
    fn hurt_shows_briefly() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.hit(None, &env.ctx(1000), &mut Vec::new());
        control(&env, &mut player, ControlState::new(), 1100);
        assert_eq!(player.anim().phase, PlayerPhase::Hurt);
        control(&env, &mut player, ControlState::new(), 1300);
        assert_ne!(player.anim().phase, PlayerPhase::Hurt);
    }

    #[test]
    fn the_dead_only_fall() {
        let env = TestEnv::flat();
        let mut player = standing(&env);
        player.kill(None, &env.ctx(100), &mut Vec::new());
        player.body.vel.x = 5 * F1;
        let (bullets, _) = control(&env, &mut player, press(ControlState::RIGHT | ControlState::FIRE), 120);
        assert_eq!(player.body.vel.x, 0);
        assert_eq!(player.body.vel.y, env.config.movement.gravity * 20);
        assert_eq!(player.anim().phase, PlayerPhase::Die);
        assert!(bullets.is_empty());
    }
}
