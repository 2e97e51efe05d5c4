//! Bird companions.
//!
//! A flock is a queue: each bird follows the bird behind it in the chain and
//! the last bird follows the player. Birds shoot at enemies ahead of their
//! owner and fly off for good once the owner is hurt.

use glam::IVec2;
use hopper_physics::fixed::{Fixed, F100, F160, F24, F64, F80};
use hopper_physics::Movable;
use tracing::debug;

use super::LevelPlayer;
use crate::anim::{Anim, Facing};
use crate::bullet::Bullet;
use crate::canvas::Canvas;
use crate::chain::Chain;
use crate::event::Event;
use crate::frame_event::FrameEvent;
use crate::level::{DrawContext, StepContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bird {
    pub body: Movable,
    fleeing: bool,
    fire_time: u32,
}

/// Accelerate toward `target`, up to cruising speed.
fn approach(pos: Fixed, vel: Fixed, target: Fixed, accel: i32) -> Fixed {
    if pos < target {
        if vel < F80 { vel + accel } else { vel }
    } else if vel > -F80 {
        vel - accel
    } else {
        vel
    }
}

impl Bird {
    pub fn new(x: Fixed, y: Fixed) -> Self {
        Self {
            body: Movable::at(x, y),
            fleeing: false,
            fire_time: 0,
        }
    }

    pub fn is_fleeing(&self) -> bool {
        self.fleeing
    }

    /// The owner was hurt: leave, and never come back.
    pub fn flee(&mut self) {
        if !self.fleeing {
            debug!(x = self.body.x(), y = self.body.y(), "bird fled");
        }
        self.fleeing = true;
    }

    /// Advance the bird by one step. Returns false once it has flown away.
    pub fn step(
        &mut self,
        leader: IVec2,
        owner: &LevelPlayer,
        ctx: &StepContext,
        events: &Chain<Event>,
        bullets: &mut Chain<Bullet>,
        out: &mut Vec<FrameEvent>,
    ) -> bool {
        if self.fleeing {
            self.body.vel = IVec2::new(F80, -F80);
            if self.body.y() < ctx.viewport.y - F160 {
                return false;
            }
        } else {
            let accel = ctx.config.bird_accel * ctx.msps;
            let (x, y) = (self.body.x(), self.body.y());

            // Far behind: close in at a speed proportional to the distance
            self.body.vel.x = if x < leader.x - F160 || x > leader.x + F160 {
                leader.x - x
            } else {
                approach(x, self.body.vel.x, leader.x, accel)
            };

            let ceiling = ctx.water_level - F24;
            if y > ceiling {
                self.body.pos.y = ceiling;
                self.body.vel.y = 0;
            } else {
                // Hover a little above the leader
                self.body.vel.y = if y < leader.y - F100 || y > leader.y + F100 {
                    leader.y - F64 - y
                } else {
                    approach(y, self.body.vel.y, leader.y - F64, accel)
                };
            }

            if ctx.ticks >= self.fire_time && self.sees_enemy(owner.facing(), events) {
                if let Some(bullet) = Bullet::from_bird(self.body.pos, owner.id(), owner.facing(), false, ctx, out) {
                    bullets.push_back(bullet);
                }
                if let Some(bullet) = Bullet::from_bird(self.body.pos, owner.id(), owner.facing(), true, ctx, out) {
                    bullets.push_back(bullet);
                }
                self.fire_time = ctx.ticks + ctx.config.bird_fire_interval;
            }
        }

        self.body.advance(ctx.msps);
        true
    }

    /// Whether an enemy is in the box ahead of the bird.
    fn sees_enemy(&self, facing: Facing, events: &Chain<Event>) -> bool {
        let (x, y) = (self.body.x(), self.body.y());
        let left = if facing.is_right() { x } else { x - F160 };
        events
            .iter()
            .any(|event| event.is_enemy() && !event.is_finishing() && event.overlap(left, y, F160, F100))
    }

    pub fn draw(&self, dc: &DrawContext, anim: &mut Anim, canvas: &mut dyn Canvas) {
        anim.set_frame(dc.ticks / 80, true);
        anim.draw(
            canvas,
            self.body.draw_x(dc.change, dc.viewport.x),
            self.body.draw_y(dc.change, dc.viewport.y),
        );
    }
}

impl LevelPlayer {
    /// Move every bird in the flock, dropping those that have flown away.
    ///
    /// Each bird follows where the bird behind it was at the start of the
    /// step, and the last one follows the player.
    pub fn step_birds(
        &mut self,
        ctx: &StepContext,
        events: &Chain<Event>,
        bullets: &mut Chain<Bullet>,
        out: &mut Vec<FrameEvent>,
    ) {
        if self.birds.is_empty() {
            return;
        }
        let mut leaders: Vec<IVec2> = self.birds.iter().skip(1).map(|bird| bird.body.pos).collect();
        leaders.push(self.body.pos);

        let mut birds = std::mem::take(&mut self.birds);
        let mut leaders = leaders.into_iter();
        birds.retain_mut(|bird| {
            let leader = leaders.next().unwrap_or(self.body.pos);
            bird.step(leader, self, ctx, events, bullets, out)
        });
        self.birds = birds;
    }
}
