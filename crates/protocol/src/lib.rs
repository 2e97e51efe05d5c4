//! Network protocol for Hopper.
//!
//! Defines the messages exchanged between peers during play: control states
//! for lockstep stepping, and player snapshots for mirroring remote players.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
