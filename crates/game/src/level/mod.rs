//! The level: owns every entity and runs the step and draw passes.
//!
//! A step runs in a fixed order so repeated runs with the same inputs end in
//! the same state:
//!
//! 1. Expire reactions and clear destroyed grid cells.
//! 2. Bring events near the viewport to life.
//! 3. Player control, then movement, then each player's birds.
//! 4. Events, front to back.
//! 5. Bullets, front to back.
//!
//! Everything entities can observe about the outside world arrives through a
//! [`StepContext`] built here. What the host should react to (sounds, hits,
//! deaths) is queued as [`FrameEvent`]s and drained once per frame.

mod context;
mod grid;
mod viewport;

pub mod fixture;

pub use context::{DrawContext, Stage, StepContext};
pub use grid::EventGrid;
pub use viewport::{TileRect, Viewport};

use hopper_physics::fixed::{ttof, Fixed};
use hopper_physics::{GridPos, TileMask};
use tracing::{debug, info};

use crate::anim::AnimBank;
use crate::bullet::{Bullet, BulletType};
use crate::canvas::Canvas;
use crate::chain::Chain;
use crate::config::SimulationConfig;
use crate::error::LevelError;
use crate::event::Event;
use crate::frame_event::FrameEvent;
use crate::input::ControlState;
use crate::player::{LevelPlayer, PlayerAnimSet, PlayerId, Reaction};

/// Most players a level holds.
pub const MAX_PLAYERS: usize = 4;

/// Water level of a level without water.
pub const NO_WATER: Fixed = Fixed::MAX;

pub struct Level {
    mask: Box<dyn TileMask>,
    grid: EventGrid,
    anims: AnimBank,
    bullet_types: Vec<BulletType>,
    config: SimulationConfig,
    players: Vec<LevelPlayer>,
    starts: Vec<GridPos>,
    events: Chain<Event>,
    bullets: Chain<Bullet>,
    viewport: Viewport,
    water_level: Fixed,
    stage: Stage,
    ticks: u32,
    frame_events: Vec<FrameEvent>,
}

impl Level {
    /// Create a level. The event grid must cover the mask exactly.
    pub fn new(
        mask: impl TileMask + 'static,
        grid: EventGrid,
        anims: AnimBank,
        bullet_types: Vec<BulletType>,
        config: SimulationConfig,
    ) -> Result<Self, LevelError> {
        if grid.size() != mask.size() {
            return Err(LevelError::SizeMismatch {
                grid: grid.size(),
                mask: mask.size(),
            });
        }
        Ok(Self {
            mask: Box::new(mask),
            grid,
            anims,
            bullet_types,
            config,
            players: Vec::new(),
            starts: Vec::new(),
            events: Chain::new(),
            bullets: Chain::new(),
            viewport: Viewport::new(320, 200),
            water_level: NO_WATER,
            stage: Stage::Normal,
            ticks: 0,
            frame_events: Vec::new(),
        })
    }

    /// Add a player standing on the floor of grid cell `start`.
    pub fn add_player(&mut self, anims: PlayerAnimSet, start: GridPos) -> Result<PlayerId, LevelError> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(LevelError::TooManyPlayers(self.players.len()));
        }
        let (width, height) = self.mask.size();
        if start.x >= width || start.y >= height {
            return Err(LevelError::OutsideLevel { pos: start });
        }
        let id = PlayerId(self.players.len() as u8);
        self.players.push(LevelPlayer::new(id, anims, ttof(start.x as i32), ttof(start.y as i32 + 1)));
        self.starts.push(start);
        debug!(player = id.0, ?start, "player added");
        Ok(id)
    }

    /// Bring a player back at its starting cell.
    pub fn respawn(&mut self, id: PlayerId) {
        let index = id.0 as usize;
        let (Some(player), Some(start)) = (self.players.get_mut(index), self.starts.get(index)) else {
            return;
        };
        player.reset(ttof(start.x as i32), ttof(start.y as i32 + 1));
        info!(player = id.0, "player respawned");
    }

    pub fn players(&self) -> &[LevelPlayer] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&LevelPlayer> {
        self.players.get(id.0 as usize)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut LevelPlayer> {
        self.players.get_mut(id.0 as usize)
    }

    pub fn events(&self) -> &Chain<Event> {
        &self.events
    }

    pub fn bullets(&self) -> &Chain<Bullet> {
        &self.bullets
    }

    pub fn grid(&self) -> &EventGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn water_level(&self) -> Fixed {
        self.water_level
    }

    pub fn set_water_level(&mut self, water_level: Fixed) {
        self.water_level = water_level;
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        if stage != self.stage {
            info!(?stage, "level stage changed");
        }
        self.stage = stage;
    }

    /// Time of the last step.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Take everything that happened since the last drain.
    pub fn drain_frame_events(&mut self) -> Vec<FrameEvent> {
        std::mem::take(&mut self.frame_events)
    }

    /// Spawn events for every populated cell near the viewport that has no
    /// live entity.
    fn activate_events(&mut self, ticks: u32) {
        let (width, height) = self.grid.size();
        if width == 0 || height == 0 {
            return;
        }
        let area = self.viewport.tiles().expand(self.config.activation_margin);
        let (left, right) = (area.left.max(0), area.right.min(width as i32 - 1));
        let (top, bottom) = (area.top.max(0), area.bottom.min(height as i32 - 1));

        for y in top..=bottom {
            for x in left..=right {
                let pos = GridPos::new(x as u16, y as u16);
                if self.grid.is_active(pos) {
                    continue;
                }
                let Some(event_type) = self.grid.event_type(pos) else {
                    continue;
                };
                debug!(grid = ?pos, behavior = ?event_type.behavior, "event activated");
                self.events.push_front(Event::new(pos, event_type, ticks));
                self.grid.set_active(pos, true);
            }
        }
    }

    /// Advance the level to `ticks`, `msps` milliseconds after the last step.
    ///
    /// `inputs` holds one control state per player, in player order. Missing
    /// entries count as nothing held.
    pub fn step(&mut self, ticks: u32, msps: i32, inputs: &[ControlState]) {
        self.ticks = ticks;

        for player in &mut self.players {
            if let Some(reaction) = player.reacted(ticks) {
                self.frame_events.push(FrameEvent::ReactionEnded {
                    player: player.id(),
                    reaction,
                });
                if reaction == Reaction::Killed {
                    debug!(player = player.id().0, "death finished");
                }
            }
        }
        self.grid.expire(ticks);
        self.activate_events(ticks);

        let ctx = StepContext {
            ticks,
            msps,
            mask: self.mask.as_ref(),
            anims: &self.anims,
            bullet_types: &self.bullet_types,
            config: &self.config,
            water_level: self.water_level,
            viewport: self.viewport,
            stage: self.stage,
        };
        let out = &mut self.frame_events;

        for (index, player) in self.players.iter_mut().enumerate() {
            let controls = inputs.get(index).copied().unwrap_or_default();
            player.control(controls, &ctx, &mut self.bullets, out);
        }
        for player in &mut self.players {
            player.movement(&ctx, out);
        }
        for player in &mut self.players {
            player.step_birds(&ctx, &self.events, &mut self.bullets, out);
        }

        let (grid, players, bullets) = (&mut self.grid, &mut self.players, &mut self.bullets);
        self.events.retain_mut(|event| {
            let keep = event.step(&ctx, grid, players, bullets, out);
            if !keep {
                grid.set_active(event.grid(), false);
            }
            keep
        });

        let events = &mut self.events;
        self.bullets.retain_mut(|bullet| bullet.step(&ctx, grid, players, events, out));
    }

    /// Move the viewport to follow a player and return it.
    ///
    /// `mspf` is the frame time and `change` the milliseconds since the last
    /// step.
    pub fn view(&mut self, id: PlayerId, mspf: i32, change: i32) -> Viewport {
        if let Some(player) = self.players.get(id.0 as usize) {
            let mut viewport = player.view(&self.viewport, self.ticks, mspf, change, &self.config.movement);
            let (width, height) = self.mask.size();
            viewport.clamp_to(ttof(width as i32), ttof(height as i32));
            self.viewport = viewport;
        }
        self.viewport
    }

    /// Draw events, then bullets, then players.
    pub fn draw(&mut self, change: i32, canvas: &mut dyn Canvas) {
        let dc = DrawContext {
            ticks: self.ticks,
            change,
            viewport: self.viewport,
        };
        for event in self.events.iter() {
            event.draw(&dc, &self.grid, &mut self.anims, canvas);
        }
        for bullet in self.bullets.iter() {
            bullet.draw(&dc, &self.bullet_types, canvas);
        }
        for player in &self.players {
            player.draw(&dc, &mut self.anims, canvas);
        }
    }
}
