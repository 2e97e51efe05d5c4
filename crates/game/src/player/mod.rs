//! The level player: one controllable character inside a level.
//!
//! A [`LevelPlayer`] owns its body, health, weapons and bird flock. Each
//! simulation step runs [`LevelPlayer::control`] (input to velocity and
//! animation), then [`LevelPlayer::movement`] (velocity to position against
//! the tile mask), then [`LevelPlayer::step_birds`]. Events and bullets act
//! on players afterwards through [`LevelPlayer::hit`],
//! [`LevelPlayer::set_event`] and friends.
//!
//! # Vertical reference
//!
//! The player's `y` is the bottom of its feet; the footprint extends
//! [`footprint::Y_TOP`] above it. `x` is the left edge of a 32 pixel wide
//! sprite box whose middle is [`footprint::X_MID`].

mod anim;
mod arsenal;
mod bird;
mod control;
mod draw;
mod movement;
mod snapshot;
mod view;

pub use anim::{PlayerAnim, PlayerAnimSet, PlayerPhase};
pub use arsenal::{Arsenal, AMMO_SLOTS, TNT_SLOT};
pub use bird::Bird;
pub use snapshot::PlayerSnapshot;

use bincode::{Decode, Encode};
use glam::IVec2;
use hopper_physics::fixed::{ttof, Fixed, F1, F20};
use hopper_physics::{GridPos, Movable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anim::{AnimBank, Facing};
use crate::chain::Chain;
use crate::config::MovementConfig;
use crate::event::{EventBehavior, EventType};
use crate::frame_event::{play, FrameEvent, SoundId};
use crate::level::StepContext;

/// Offsets of the collision footprint from the player's position.
pub mod footprint {
    use hopper_physics::fixed::{Fixed, F10, F12, F16, F20, F8};

    pub const X_MID: Fixed = F16;
    pub const X_LEFT: Fixed = X_MID - F12;
    pub const X_MID_LEFT: Fixed = X_MID - F8;
    pub const X_MID_RIGHT: Fixed = X_MID + F8;
    pub const X_RIGHT: Fixed = X_MID + F12;
    pub const Y_TOP: Fixed = -F20;
    pub const Y_MID: Fixed = -F10;
}

use footprint::{X_LEFT, X_RIGHT, Y_TOP};

/// Energy of a fresh player.
pub const MAX_ENERGY: u8 = 4;

/// Shield values: a yellow shield absorbs two hits, an orange one four.
pub const YELLOW_SHIELD: u8 = 2;
pub const ORANGE_SHIELD: u8 = 6;

/// Sound played when the player is hurt.
pub const OUCH_SOUND: SoundId = SoundId(1);
/// Sound played when the player jumps.
pub const JUMP_SOUND: SoundId = SoundId(3);

/// Index of a player within its level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct PlayerId(pub u8);

/// A timed condition that overrides normal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum Reaction {
    /// Knocked back and briefly immune.
    Hurt,
    /// Dead, playing the death animation.
    Killed,
    /// Immune to harm.
    Invincible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ActiveReaction {
    pub kind: Reaction,
    pub since: u32,
    pub until: u32,
}

/// How an event the player is interacting with affects control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveEventKind {
    /// Launched upward, at least as fast as `speed`.
    Spring { speed: Fixed },
    /// Lifted upward, at least as fast as `speed`.
    Float { speed: Fixed },
    /// Standing on something that is not part of the tile mask.
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEvent {
    pub grid: GridPos,
    pub kind: ActiveEventKind,
}

/// Holding up or down while standing, and since when.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookState {
    #[default]
    None,
    Up { since: u32 },
    Down { since: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Warp {
    target: GridPos,
    at: u32,
}

#[derive(Debug, Clone)]
pub struct LevelPlayer {
    pub body: Movable,
    id: PlayerId,
    anims: PlayerAnimSet,
    anim: PlayerAnim,
    energy: u8,
    shield: u8,
    reaction: Option<ActiveReaction>,
    facing: Facing,
    floating: bool,
    event: Option<ActiveEvent>,
    jump_target: Option<Fixed>,
    look: LookState,
    fire_time: u32,
    /// Set when firing with no fire speed; cleared on releasing fire.
    fire_locked: bool,
    change_held: bool,
    fast_feet_until: u32,
    warp: Option<Warp>,
    arsenal: Arsenal,
    birds: Chain<Bird>,
}

impl LevelPlayer {
    pub fn new(id: PlayerId, anims: PlayerAnimSet, x: Fixed, y: Fixed) -> Self {
        let mut player = Self {
            body: Movable::at(x, y),
            id,
            anims,
            anim: PlayerAnim::default(),
            energy: MAX_ENERGY,
            shield: 0,
            reaction: None,
            facing: Facing::Right,
            floating: false,
            event: None,
            jump_target: None,
            look: LookState::None,
            fire_time: 0,
            fire_locked: false,
            change_held: false,
            fast_feet_until: 0,
            warp: None,
            arsenal: Arsenal::new(),
            birds: Chain::new(),
        };
        player.reset(x, y);
        player
    }

    /// Bring the player back to life at a position. Weapons are kept; the
    /// flock is lost.
    pub fn reset(&mut self, x: Fixed, y: Fixed) {
        self.body = Movable::at(x, y);
        self.anim = PlayerAnim::new(Facing::Right, PlayerPhase::Stand);
        self.energy = MAX_ENERGY;
        self.shield = 0;
        self.reaction = None;
        self.facing = Facing::Right;
        self.floating = false;
        self.event = None;
        self.jump_target = None;
        self.look = LookState::None;
        self.fire_time = 0;
        self.fire_locked = false;
        self.fast_feet_until = 0;
        self.warp = None;
        self.birds.clear();
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn anims(&self) -> &PlayerAnimSet {
        &self.anims
    }

    pub fn anim(&self) -> PlayerAnim {
        self.anim
    }

    pub fn energy(&self) -> u8 {
        self.energy
    }

    pub fn is_alive(&self) -> bool {
        self.energy > 0
    }

    pub fn shield(&self) -> u8 {
        self.shield
    }

    pub fn reaction(&self) -> Option<ActiveReaction> {
        self.reaction
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn is_floating(&self) -> bool {
        self.floating
    }

    /// Switch free flight on or off.
    pub fn set_floating(&mut self, floating: bool) {
        self.floating = floating;
    }

    pub fn event(&self) -> Option<ActiveEvent> {
        self.event
    }

    pub fn jump_target(&self) -> Option<Fixed> {
        self.jump_target
    }

    pub fn look(&self) -> LookState {
        self.look
    }

    pub fn arsenal(&self) -> &Arsenal {
        &self.arsenal
    }

    pub fn arsenal_mut(&mut self) -> &mut Arsenal {
        &mut self.arsenal
    }

    pub fn birds(&self) -> &Chain<Bird> {
        &self.birds
    }

    pub fn has_fast_feet(&self, ticks: u32) -> bool {
        ticks < self.fast_feet_until
    }

    pub fn set_position(&mut self, x: Fixed, y: Fixed) {
        self.body.pos = IVec2::new(x, y);
    }

    /// Whether the footprint touches the given box.
    pub fn overlap(&self, left: Fixed, top: Fixed, width: Fixed, height: Fixed) -> bool {
        let (x, y) = (self.body.x(), self.body.y());
        x + X_RIGHT >= left && x + X_LEFT < left + width && y >= top && y + Y_TOP < top + height
    }

    /// Where the current weapon's bullets leave from.
    pub fn shoot_origin(&self, bank: &AnimBank) -> IVec2 {
        let anim = self.anims.get(self.anim).and_then(|id| bank.get(id));
        match anim {
            Some(anim) => {
                self.body.pos + IVec2::new(anim.accessory_shoot_x(), anim.accessory_shoot_y() - anim.offset())
            }
            None => self.body.pos + IVec2::new(footprint::X_MID, footprint::Y_MID),
        }
    }

    /// Something harmed the player.
    ///
    /// Returns false when the player is immune: the level is over, a
    /// reaction is running, the player is already dead or it shot itself.
    pub fn hit(&mut self, source: Option<PlayerId>, ctx: &StepContext, out: &mut Vec<FrameEvent>) -> bool {
        if ctx.has_ended() || self.reaction.is_some() || !self.is_alive() || source == Some(self.id) {
            return false;
        }

        match self.shield {
            0 => {
                self.energy -= 1;
                self.birds.find_map_mut(|bird| (!bird.is_fleeing()).then(|| bird.flee()));
                play(out, Some(OUCH_SOUND));
            }
            // Last hit of either shield
            1 | 3 => self.shield = 0,
            _ => self.shield -= 1,
        }
        out.push(FrameEvent::PlayerHit { player: self.id, by: source });

        let config = &ctx.config.movement;
        if self.energy > 0 {
            self.reaction = Some(ActiveReaction {
                kind: Reaction::Hurt,
                since: ctx.ticks,
                until: ctx.ticks + config.hurt_time,
            });
            self.body.vel.x = if self.body.vel.x < 0 { config.run_speed } else { -config.run_speed };
            self.body.vel.y = config.jump_speed;
            debug!(player = self.id.0, energy = self.energy, shield = self.shield, "player hurt");
        } else {
            self.kill(source, ctx, out);
        }
        true
    }

    /// Kill the player outright. Returns false if it was already dying.
    pub fn kill(&mut self, source: Option<PlayerId>, ctx: &StepContext, out: &mut Vec<FrameEvent>) -> bool {
        if ctx.has_ended() || self.reaction.is_some_and(|reaction| reaction.kind == Reaction::Killed) {
            return false;
        }
        self.energy = 0;
        self.reaction = Some(ActiveReaction {
            kind: Reaction::Killed,
            since: ctx.ticks,
            until: ctx.ticks + ctx.config.movement.killed_time,
        });
        info!(player = self.id.0, by = ?source, "player killed");
        out.push(FrameEvent::PlayerKilled { player: self.id, by: source });
        true
    }

    /// End the running reaction if its time is up, reporting which ended.
    pub fn reacted(&mut self, ticks: u32) -> Option<Reaction> {
        let reaction = self.reaction?;
        if ticks > reaction.until {
            self.reaction = None;
            return Some(reaction.kind);
        }
        None
    }

    /// Become immune for the configured time.
    pub fn make_invincible(&mut self, ticks: u32, config: &MovementConfig) {
        self.reaction = Some(ActiveReaction {
            kind: Reaction::Invincible,
            since: ticks,
            until: ticks + config.invincible_time,
        });
    }

    pub fn give_fast_feet(&mut self, ticks: u32, config: &MovementConfig) {
        self.fast_feet_until = ticks + config.fast_feet_time;
    }

    /// Raise the shield to `strength` if that is stronger than the current one.
    pub fn give_shield(&mut self, strength: u8) {
        self.shield = self.shield.max(strength.min(ORANGE_SHIELD));
    }

    /// Schedule a jump to another cell once the warp delay has passed.
    pub fn warp(&mut self, target: GridPos, ticks: u32, config: &MovementConfig) {
        self.warp = Some(Warp {
            target,
            at: ticks + config.warp_time,
        });
    }

    /// Start interacting with the event in `grid`.
    pub fn set_event(&mut self, grid: GridPos, event_type: &EventType, config: &MovementConfig) {
        let speed = event_type.multi_a as i32 * -F20;
        let kind = match event_type.behavior {
            EventBehavior::Spring => {
                self.jump_target = Some(self.body.y() - event_type.multi_a as i32 * (F20 + F1));
                ActiveEventKind::Spring { speed }
            }
            EventBehavior::Float => {
                self.jump_target = Some(self.body.y() - config.float_lift);
                ActiveEventKind::Float { speed }
            }
            EventBehavior::Platform | EventBehavior::Bridge => ActiveEventKind::Platform,
            _ => return,
        };
        self.event = Some(ActiveEvent { grid, kind });
    }

    /// Stop interacting with the event in `grid`, if that is the active one.
    pub fn clear_event(&mut self, grid: GridPos) {
        if self.has_event(grid) {
            self.event = None;
        }
    }

    pub fn has_event(&self, grid: GridPos) -> bool {
        self.event.is_some_and(|event| event.grid == grid)
    }

    fn on_platform_event(&self) -> bool {
        matches!(self.event, Some(ActiveEvent { kind: ActiveEventKind::Platform, .. }))
    }

    /// Grow the flock at the player's position, or shrink it from the tail.
    pub fn set_birds(&mut self, count: usize) {
        self.birds.truncate(count);
        while self.birds.len() < count {
            self.birds.push_back(Bird::new(self.body.x(), self.body.y()));
        }
    }

    /// Cell the pending warp leads to, if one is pending.
    pub fn pending_warp(&self) -> Option<GridPos> {
        self.warp.map(|warp| warp.target)
    }

    fn apply_warp(&mut self, ticks: u32) {
        if let Some(warp) = self.warp.filter(|warp| ticks >= warp.at) {
            self.warp = None;
            self.body = Movable::at(ttof(warp.target.x as i32), ttof(warp.target.y as i32 + 1));
            self.event = None;
            self.jump_target = None;
            debug!(player = self.id.0, target = ?warp.target, "warped");
        }
    }
}
