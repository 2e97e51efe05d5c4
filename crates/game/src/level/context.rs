//! Per-step views of the level handed to entities.

use hopper_physics::fixed::{ttof, Fixed};
use hopper_physics::TileMask;
use serde::{Deserialize, Serialize};

use super::Viewport;
use crate::anim::AnimBank;
use crate::bullet::BulletType;
use crate::config::SimulationConfig;

/// Progress of the level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Normal,
    /// The level has been completed. Nothing can be hurt or killed.
    End,
}

/// Read-only level state for one simulation step.
#[derive(Clone, Copy)]
pub struct StepContext<'a> {
    /// Absolute time of this step in milliseconds.
    pub ticks: u32,
    /// Duration of this step in milliseconds.
    pub msps: i32,
    pub mask: &'a dyn TileMask,
    pub anims: &'a AnimBank,
    pub bullet_types: &'a [BulletType],
    pub config: &'a SimulationConfig,
    pub water_level: Fixed,
    pub viewport: Viewport,
    pub stage: Stage,
}

impl StepContext<'_> {
    /// Level width in fixed pixels.
    pub fn level_width(&self) -> Fixed {
        ttof(self.mask.size().0 as i32)
    }

    /// Level height in fixed pixels.
    pub fn level_height(&self) -> Fixed {
        ttof(self.mask.size().1 as i32)
    }

    pub fn has_ended(&self) -> bool {
        self.stage == Stage::End
    }
}

/// Timing for one draw pass.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext {
    pub ticks: u32,
    /// Milliseconds since the last step, for interpolation.
    pub change: i32,
    pub viewport: Viewport,
}
