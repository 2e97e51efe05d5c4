//! Things that happened during a step, for the host to react to.
//!
//! The simulation produces no audio and keeps no scores; it records sound
//! requests and notable transitions here and the host drains them after each
//! step.

use glam::IVec2;
use hopper_physics::GridPos;
use serde::{Deserialize, Serialize};

use crate::anim::AnimId;
use crate::player::{PlayerId, Reaction};

/// A sound effect owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    Sound(SoundId),
    EventDestroyed { grid: GridPos, by: Option<PlayerId> },
    PlayerHit { player: PlayerId, by: Option<PlayerId> },
    PlayerKilled { player: PlayerId, by: Option<PlayerId> },
    ReactionEnded { player: PlayerId, reaction: Reaction },
    /// A bullet burst against scenery at a fixed-point position.
    BulletFinished { pos: IVec2, anim: Option<AnimId> },
}

/// Queue a sound if there is one.
pub(crate) fn play(out: &mut Vec<FrameEvent>, sound: Option<SoundId>) {
    if let Some(sound) = sound {
        out.push(FrameEvent::Sound(sound));
    }
}
