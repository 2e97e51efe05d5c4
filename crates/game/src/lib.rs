//! Hopper Game Logic
//!
//! This crate contains the platformer simulation:
//!
//! - Animation playback and the animation bank
//! - Player control, movement against the tile mask and animation choice
//! - Level events (scenery, enemies, hazards, springs, bridges, platforms)
//! - Bullets and bird companions
//! - Player snapshots for netcode
//!
//! # Architecture
//!
//! The simulation is deterministic: all state changes are driven by control
//! states and explicit step times, so peers running the same inputs stay in
//! lockstep. Drawing is a separate pass that only reads state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Level::step                           │
//! │  ┌──────────┐    ┌───────────┐    ┌───────────────────────┐  │
//! │  │ Control  │───►│ Movement  │───►│ Events, then bullets  │  │
//! │  │ states   │    │ (players, │    │ (front to back)       │  │
//! │  └──────────┘    │  birds)   │    └───────────────────────┘  │
//! │                  └───────────┘                               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod anim;
pub mod bullet;
pub mod canvas;
pub mod chain;
pub mod config;
pub mod error;
pub mod event;
pub mod frame_event;
pub mod input;
pub mod level;
pub mod player;

// Re-export main types
pub use anim::{Anim, AnimBank, AnimId, Facing};
pub use bullet::{Bullet, BulletKind, BulletType};
pub use canvas::{Canvas, DrawCall, PaletteId, RecordingCanvas, SpriteRef};
pub use chain::Chain;
pub use config::{MovementConfig, SimulationConfig};
pub use error::{LevelError, SnapshotError};
pub use event::{Event, EventBehavior, EventType};
pub use frame_event::{FrameEvent, SoundId};
pub use input::ControlState;
pub use level::{Level, Stage, Viewport};
pub use player::{LevelPlayer, PlayerId, PlayerSnapshot};
