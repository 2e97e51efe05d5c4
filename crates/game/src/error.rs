//! Errors at the simulation's construction and serialization boundaries.
//!
//! Stepping itself never fails; bad situations degrade to "nothing happens".

use hopper_physics::{GridPos, MaskError};
use thiserror::Error;

/// Errors building a level.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("event grid is {grid:?} tiles but the mask is {mask:?}")]
    SizeMismatch { grid: (u16, u16), mask: (u16, u16) },

    #[error("event type {id} at {pos:?} is not defined")]
    UnknownEventType { pos: GridPos, id: u8 },

    #[error("grid cell {pos:?} is outside the level")]
    OutsideLevel { pos: GridPos },

    #[error("level already holds {0} players")]
    TooManyPlayers(usize),

    #[error(transparent)]
    Mask(#[from] MaskError),
}

/// Errors encoding or decoding a player snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}
