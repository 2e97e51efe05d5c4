//! Bullets and TNT.
//!
//! Bullets are fired by players, their birds and armed events. Each refers to
//! a [`BulletType`] in the level's table, which supplies sprites, launch
//! speeds per [`Heading`], gravity and what happens on striking scenery.
//! TNT is a special charge that sits where it was dropped and blasts every
//! event around it when its fuse runs out.

use glam::IVec2;
use hopper_physics::fixed::{ftoi, step_delta, Fixed, F1, F100, F160, F32};
use hopper_physics::{Movable, TileMask};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::anim::{AnimId, Facing};
use crate::canvas::{Canvas, SpriteRef};
use crate::chain::Chain;
use crate::event::Event;
use crate::frame_event::{play, FrameEvent, SoundId};
use crate::level::{DrawContext, EventGrid, StepContext};
use crate::player::{LevelPlayer, PlayerId};

/// Bullet type drawn for TNT charges.
pub const TNT_TYPE: u8 = 4;

/// What a bullet does when it strikes scenery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletBehaviour {
    /// Bursts.
    #[default]
    Straight,
    /// Rebounds off the surface it struck.
    Bounce,
}

/// Direction a bullet was launched in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Left,
    #[default]
    Right,
    LowerLeft,
    LowerRight,
}

impl Heading {
    pub fn from_facing(facing: Facing, lower: bool) -> Self {
        match (facing, lower) {
            (Facing::Left, false) => Heading::Left,
            (Facing::Right, false) => Heading::Right,
            (Facing::Left, true) => Heading::LowerLeft,
            (Facing::Right, true) => Heading::LowerRight,
        }
    }

    /// Slot in the per-heading arrays of a [`BulletType`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Level-wide bullet properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletType {
    /// Sprite per heading. A heading without a sprite cannot be fired.
    pub sprites: [Option<SpriteRef>; 4],
    /// Launch speed per heading, in units of 32 pixels per second.
    pub speed_x: [i8; 4],
    pub speed_y: [i8; 4],
    /// Downward acceleration, in units of 100 per millisecond.
    pub gravity: i8,
    pub behaviour: BulletBehaviour,
    pub start_sound: Option<SoundId>,
    pub finish_sound: Option<SoundId>,
    /// Burst animation reported when the bullet strikes scenery.
    pub finish_anim: Option<AnimId>,
}

impl BulletType {
    /// Whether this type can be fired at all.
    pub fn is_usable(&self) -> bool {
        self.sprites[0].is_some() || self.sprites[1].is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletKind {
    /// An ordinary bullet of the given type.
    Ammo(u8),
    Tnt,
}

impl BulletKind {
    pub fn type_index(self) -> u8 {
        match self {
            BulletKind::Ammo(index) => index,
            BulletKind::Tnt => TNT_TYPE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub body: Movable,
    source: Option<PlayerId>,
    kind: BulletKind,
    heading: Heading,
    expires: u32,
}

impl Bullet {
    /// Launch a bullet. Returns `None` when its type cannot be fired in
    /// `heading`.
    pub fn launch(
        origin: IVec2,
        source: Option<PlayerId>,
        kind: BulletKind,
        heading: Heading,
        ctx: &StepContext,
        out: &mut Vec<FrameEvent>,
    ) -> Option<Self> {
        let bullet_type = ctx.bullet_types.get(kind.type_index() as usize)?;
        bullet_type.sprites[heading.index()]?;

        let mut body = Movable::at(origin.x, origin.y);
        let lifetime = match kind {
            BulletKind::Tnt => ctx.config.tnt_time,
            BulletKind::Ammo(_) => {
                body.vel = IVec2::new(
                    bullet_type.speed_x[heading.index()] as i32 * F32,
                    bullet_type.speed_y[heading.index()] as i32 * F32,
                );
                ctx.config.bullet_time
            }
        };
        play(out, bullet_type.start_sound);
        Some(Self {
            body,
            source,
            kind,
            heading,
            expires: ctx.ticks + lifetime,
        })
    }

    /// A shot from a player's current weapon.
    pub fn from_player(player: &LevelPlayer, lower: bool, ctx: &StepContext, out: &mut Vec<FrameEvent>) -> Option<Self> {
        let kind = player.arsenal().bullet_kind();
        let heading = match kind {
            BulletKind::Tnt => Heading::from_facing(player.facing(), false),
            BulletKind::Ammo(_) => Heading::from_facing(player.facing(), lower),
        };
        Self::launch(player.shoot_origin(ctx.anims), Some(player.id()), kind, heading, ctx, out)
    }

    /// A shot from a bird. Credited to the bird's owner.
    pub fn from_bird(
        origin: IVec2,
        owner: PlayerId,
        facing: Facing,
        lower: bool,
        ctx: &StepContext,
        out: &mut Vec<FrameEvent>,
    ) -> Option<Self> {
        let kind = BulletKind::Ammo(ctx.config.bird_bullet);
        Self::launch(origin, Some(owner), kind, Heading::from_facing(facing, lower), ctx, out)
    }

    /// A shot from an event. Hurts every player.
    pub fn from_event(
        origin: IVec2,
        heading: Heading,
        bullet_type: u8,
        ctx: &StepContext,
        out: &mut Vec<FrameEvent>,
    ) -> Option<Self> {
        Self::launch(origin, None, BulletKind::Ammo(bullet_type), heading, ctx, out)
    }

    pub fn source(&self) -> Option<PlayerId> {
        self.source
    }

    pub fn kind(&self) -> BulletKind {
        self.kind
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn expires(&self) -> u32 {
        self.expires
    }

    /// Advance the bullet by one step. Returns false when it is spent.
    pub fn step(
        &mut self,
        ctx: &StepContext,
        grid: &mut EventGrid,
        players: &mut [LevelPlayer],
        events: &mut Chain<Event>,
        out: &mut Vec<FrameEvent>,
    ) -> bool {
        let Some(bullet_type) = ctx.bullet_types.get(self.kind.type_index() as usize) else {
            return false;
        };

        if !ctx.has_ended() {
            if ctx.ticks > self.expires {
                if self.kind == BulletKind::Tnt {
                    self.explode(bullet_type, ctx, grid, events, out);
                }
                return false;
            }
            if self.kind == BulletKind::Tnt {
                return true;
            }

            let (x, y) = (self.body.x(), self.body.y());
            if x < 0 || y < 0 || x >= ctx.level_width() || y >= ctx.level_height() {
                return false;
            }

            if ctx.mask.is_solid_up(x, y) {
                match bullet_type.behaviour {
                    BulletBehaviour::Bounce => {
                        let prev_x = x - step_delta(self.body.vel.x, ctx.msps);
                        if ctx.mask.is_solid_up(prev_x, y) {
                            self.body.vel.y = -self.body.vel.y;
                        } else {
                            self.body.vel.x = -self.body.vel.x;
                        }
                    }
                    BulletBehaviour::Straight => {
                        self.finish(bullet_type, out);
                        return false;
                    }
                }
            }

            let source = self.source;
            for player in players.iter_mut() {
                if Some(player.id()) != source && player.overlap(x, y, F1, F1) && player.hit(source, ctx, out) {
                    return false;
                }
            }

            if source.is_some() {
                let struck = events.find_map_mut(|event| {
                    (event.overlap(x, y, F1, F1) && event.hit(source, ctx, grid, out)).then_some(())
                });
                if struck.is_some() {
                    return false;
                }
            }
        }

        self.body.vel.y += bullet_type.gravity as i32 * 100 * ctx.msps;
        self.body.advance(ctx.msps);
        true
    }

    fn finish(&self, bullet_type: &BulletType, out: &mut Vec<FrameEvent>) {
        play(out, bullet_type.finish_sound);
        out.push(FrameEvent::BulletFinished {
            pos: self.body.pos,
            anim: bullet_type.finish_anim,
        });
    }

    /// Blast every event within range.
    fn explode(
        &self,
        bullet_type: &BulletType,
        ctx: &StepContext,
        grid: &mut EventGrid,
        events: &mut Chain<Event>,
        out: &mut Vec<FrameEvent>,
    ) {
        let (x, y): (Fixed, Fixed) = (self.body.x(), self.body.y());
        let mut blasted = 0;
        events.for_each_mut(|event| {
            if event.overlap(x - F160, y - F100, F160 * 2, F100 * 2) && event.hit(self.source, ctx, grid, out) {
                blasted += 1;
            }
        });
        trace!(blasted, "tnt exploded");
        self.finish(bullet_type, out);
    }

    pub fn draw(&self, dc: &DrawContext, bullet_types: &[BulletType], canvas: &mut dyn Canvas) {
        let Some(sprite) = bullet_types
            .get(self.kind.type_index() as usize)
            .and_then(|bullet_type| bullet_type.sprites[self.heading.index()])
        else {
            return;
        };
        let x = ftoi(self.body.draw_x(dc.change, dc.viewport.x));
        let y = ftoi(self.body.draw_y(dc.change, dc.viewport.y));
        canvas.draw_sprite(sprite, x - (sprite.width as i32 >> 1), y - (sprite.height as i32 >> 1));
    }
}
