//! Event type properties.

use serde::{Deserialize, Serialize};

use crate::anim::{AnimId, Facing};
use crate::frame_event::SoundId;

/// How an event interacts with players and bullets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventBehavior {
    /// Decoration. Does nothing.
    #[default]
    Scenery,
    /// Hurts on contact, can be shot, is targeted by birds. May fire back.
    Enemy,
    /// Hurts on contact.
    Hazard,
    /// Can be shot but is harmless.
    Destructible,
    /// Launches a descending player upward.
    Spring,
    /// Lifts players while they are inside it.
    Float,
    /// Moves along a path, carrying players standing on it.
    Platform,
    /// A walkable span that sags under players.
    Bridge,
}

/// Which of an event's animations is showing, independent of facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventPhase {
    #[default]
    Normal,
    Shoot,
    /// Played once while the event is being destroyed.
    Finish,
}

/// An event's animation selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventAnim {
    pub facing: Facing,
    pub phase: EventPhase,
}

impl EventAnim {
    pub fn new(facing: Facing, phase: EventPhase) -> Self {
        Self { facing, phase }
    }

    /// Slot in [`EventType::anims`].
    pub fn slot(self) -> usize {
        let phase = match self.phase {
            EventPhase::Normal => 0,
            EventPhase::Shoot => 2,
            EventPhase::Finish => 4,
        };
        phase + self.facing.is_right() as usize
    }
}

/// The property set shared by every grid cell holding this event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub behavior: EventBehavior,
    /// Hits needed to destroy. Zero means it cannot be shot.
    pub strength: u8,
    /// Spring power, float speed, platform horizontal range or bridge pieces.
    pub multi_a: i8,
    /// Platform vertical range or bridge height offset in pixels.
    pub multi_b: i8,
    /// Bridge piece width in units of 4 pixels.
    pub piece_size: u8,
    pub anim_speed: u8,
    pub sound: Option<SoundId>,
    /// Animation ids for left, right, left shoot, right shoot, left finish
    /// and right finish. Zero is "none"; the top bit is ignored.
    pub anims: [u8; 6],
    /// Bullet type fired at players, if any.
    pub bullet: Option<u8>,
    pub fire_interval: u32,
}

impl EventType {
    pub fn new(behavior: EventBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn is_enemy(&self) -> bool {
        self.strength > 0 && self.behavior == EventBehavior::Enemy
    }

    /// Whether the event has any regular animation to show.
    pub fn is_visible(&self) -> bool {
        self.anims[0] != 0 || self.anims[1] != 0
    }

    fn slot(&self, slot: usize) -> Option<AnimId> {
        match self.anims[slot] & 0x7F {
            0 => None,
            id => Some(AnimId(id as u16)),
        }
    }

    /// Animation for `anim`. A missing shoot animation falls back to the
    /// regular one.
    pub fn anim(&self, anim: EventAnim) -> Option<AnimId> {
        let id = self.slot(anim.slot());
        if id.is_none() && anim.phase == EventPhase::Shoot {
            return self.slot(EventAnim::new(anim.facing, EventPhase::Normal).slot());
        }
        id
    }

    /// Milliseconds each animation frame lasts while being destroyed.
    pub fn finish_frame_time(&self) -> u32 {
        (self.anim_speed.max(1) as u32) << 3
    }

    /// Milliseconds each animation frame lasts normally.
    pub fn frame_time(&self) -> u32 {
        (self.anim_speed.max(1) as u32) << 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_and_fallback() {
        let mut event_type = EventType::new(EventBehavior::Enemy);
        event_type.anims = [3, 4, 0, 0x80 | 6, 7, 0];

        let left = |phase| event_type.anim(EventAnim::new(Facing::Left, phase));
        let right = |phase| event_type.anim(EventAnim::new(Facing::Right, phase));
        assert_eq!(left(EventPhase::Normal), Some(AnimId(3)));
        assert_eq!(right(EventPhase::Normal), Some(AnimId(4)));
        assert_eq!(left(EventPhase::Shoot), Some(AnimId(3)));
        assert_eq!(right(EventPhase::Shoot), Some(AnimId(6)));
        assert_eq!(left(EventPhase::Finish), Some(AnimId(7)));
        assert_eq!(right(EventPhase::Finish), None);
    }

    #[test]
    fn enemy_needs_strength() {
        let mut event_type = EventType::new(EventBehavior::Enemy);
        assert!(!event_type.is_enemy());
        event_type.strength = 2;
        assert!(event_type.is_enemy());
        event_type.behavior = EventBehavior::Destructible;
        assert!(!event_type.is_enemy());
    }
}
