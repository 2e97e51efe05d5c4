//! Player animation selection.

use serde::{Deserialize, Serialize};

use crate::anim::{AnimId, Facing};
use crate::canvas::PaletteId;

/// What the player is doing, independent of facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerPhase {
    #[default]
    Stand,
    Walk,
    Run,
    /// Braking against the direction of motion.
    Stop,
    Jump,
    Spring,
    Fall,
    Float,
    Swim,
    LookUp,
    Crouch,
    LookDown,
    Shoot,
    /// Teetering over a ledge on the facing side.
    Edge,
    Hurt,
    Die,
}

impl PlayerPhase {
    pub const COUNT: usize = 16;
}

/// A player animation: phase and facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerAnim {
    pub facing: Facing,
    pub phase: PlayerPhase,
}

impl PlayerAnim {
    pub fn new(facing: Facing, phase: PlayerPhase) -> Self {
        Self { facing, phase }
    }

    /// Slot in [`PlayerAnimSet::slots`]: left and right variants side by side.
    pub fn slot(self) -> usize {
        self.phase as usize * 2 + self.facing.is_right() as usize
    }
}

/// The animations a player is drawn with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAnimSet {
    pub slots: [Option<AnimId>; PlayerPhase::COUNT * 2],
    pub bird_left: AnimId,
    pub bird_right: AnimId,
    /// Drawn for shields weaker than orange.
    pub shield_yellow: AnimId,
    pub shield_orange: AnimId,
    /// Orbits the player while invincible.
    pub stars: AnimId,
    pub palette: PaletteId,
}

impl Default for PlayerAnimSet {
    fn default() -> Self {
        Self {
            slots: [None; PlayerPhase::COUNT * 2],
            bird_left: AnimId(51),
            bird_right: AnimId(52),
            shield_yellow: AnimId(50),
            shield_orange: AnimId(59),
            stars: AnimId(60),
            palette: PaletteId::default(),
        }
    }
}

impl PlayerAnimSet {
    pub fn get(&self, anim: PlayerAnim) -> Option<AnimId> {
        self.slots[anim.slot()]
    }

    pub fn set(&mut self, anim: PlayerAnim, id: AnimId) {
        self.slots[anim.slot()] = Some(id);
    }
}
