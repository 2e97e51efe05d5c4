//! Network message types.

use hopper_game::{ControlState, LevelPlayer, PlayerId, SnapshotError};
use serde::{Deserialize, Serialize};

/// Unique identifier for a peer in the network.
pub type PeerId = u8;

/// Step number in the simulation.
pub type FrameNumber = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMessage {
    /// Control state for a single step.
    Input(InputMessage),

    /// Control states for consecutive steps.
    InputBatch(InputBatchMessage),

    /// Snapshot of the sender's player after a step.
    PlayerState(PlayerStateMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMessage {
    pub peer_id: PeerId,
    pub frame: FrameNumber,
    pub input: ControlState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBatchMessage {
    pub peer_id: PeerId,
    pub start_frame: FrameNumber,
    pub inputs: Vec<ControlState>,
}

/// A player snapshot as produced by [`LevelPlayer::send`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStateMessage {
    pub peer_id: PeerId,
    pub frame: FrameNumber,
    pub player: PlayerId,
    pub snapshot: Vec<u8>,
}

impl PlayerStateMessage {
    pub fn capture(peer_id: PeerId, frame: FrameNumber, player: &LevelPlayer) -> Result<Self, SnapshotError> {
        Ok(Self {
            peer_id,
            frame,
            player: player.id(),
            snapshot: player.send()?,
        })
    }

    /// Mirror the snapshot onto the local copy of the remote player.
    pub fn apply(&self, player: &mut LevelPlayer) -> Result<(), SnapshotError> {
        player.receive(&self.snapshot)
    }
}
