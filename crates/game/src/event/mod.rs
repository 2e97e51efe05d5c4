//! Level events: the interactive objects that live in grid cells.
//!
//! An event entity is brought to life when its cell comes near the viewport
//! and dropped again once both it and its cell are well out of view. Every
//! kind of event shares one [`Event`] struct; behaviour specific to springs,
//! bridges, platforms and the rest is selected by the [`EventKind`] payload
//! and dispatched from [`Event::step`] and [`Event::draw`].
//!
//! # Lifecycle
//!
//! 1. Created from a cell's [`EventType`]
//! 2. Stepped every simulation step while its cell keeps an event type
//! 3. Destroyed when shot down: plays its finish animation while the grid
//!    counts down to clearing the cell
//! 4. Removed once the cell is cleared or it is culled off screen

mod bridge;
mod kind;
mod platform;

pub use bridge::BridgeSag;
pub use kind::{EventAnim, EventBehavior, EventPhase, EventType};
pub use platform::PlatformMotion;

use glam::IVec2;
use hopper_physics::fixed::{itof, ttof, Fixed, F32};
use hopper_physics::{GridPos, Movable};
use tracing::{debug, trace};

use crate::anim::{Anim, AnimBank, Facing};
use crate::bullet::{Bullet, Heading};
use crate::canvas::Canvas;
use crate::chain::Chain;
use crate::frame_event::{play, FrameEvent};
use crate::level::{DrawContext, EventGrid, StepContext};
use crate::player::{footprint, LevelPlayer, PlayerId};

/// Colour index a hit event flashes in.
const FLASH_COLOUR: u8 = 0;

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Scenery,
    Enemy { fire_time: u32, shoot_until: u32 },
    Hazard,
    Destructible,
    Spring,
    Float,
    Platform(PlatformMotion),
    Bridge(BridgeSag),
}

/// The axis-aligned box an event occupies, in fixed pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: Fixed,
    pub top: Fixed,
    pub width: Fixed,
    pub height: Fixed,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub body: Movable,
    grid: GridPos,
    anim: Option<EventAnim>,
    enemy: bool,
    flash_until: u32,
    finish_start: Option<u32>,
    width: Fixed,
    height: Fixed,
    /// Events that place their own anchor measure overlaps from the
    /// animation's offset.
    self_anchored: bool,
    anchor_offset: Fixed,
    kind: EventKind,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
    }
}

impl Event {
    /// Bring the event in cell `grid` to life.
    pub fn new(grid: GridPos, event_type: &EventType, ticks: u32) -> Self {
        let (gx, gy) = (grid.x as i32, grid.y as i32);
        let mut body = Movable::at(ttof(gx), ttof(gy + 1));
        let mut self_anchored = false;
        let kind = match event_type.behavior {
            EventBehavior::Scenery => EventKind::Scenery,
            EventBehavior::Enemy => EventKind::Enemy {
                fire_time: ticks + event_type.fire_interval,
                shoot_until: 0,
            },
            EventBehavior::Hazard => EventKind::Hazard,
            EventBehavior::Destructible => EventKind::Destructible,
            EventBehavior::Spring => EventKind::Spring,
            EventBehavior::Float => EventKind::Float,
            EventBehavior::Platform => EventKind::Platform(PlatformMotion::new(body.pos, grid, event_type)),
            EventBehavior::Bridge => {
                body.pos.y = ttof(gy) + itof(event_type.multi_b as i32);
                self_anchored = true;
                EventKind::Bridge(BridgeSag::new(event_type))
            }
        };
        let anim = event_type
            .is_visible()
            .then(|| EventAnim::new(Facing::Left, EventPhase::Normal));

        Self {
            body,
            grid,
            anim,
            enemy: event_type.is_enemy(),
            flash_until: 0,
            finish_start: None,
            width: F32,
            height: F32,
            self_anchored,
            anchor_offset: 0,
            kind,
        }
    }

    /// The cell this event came from.
    pub fn grid(&self) -> GridPos {
        self.grid
    }

    pub fn is_from(&self, grid: GridPos) -> bool {
        self.grid == grid
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn anim(&self) -> Option<EventAnim> {
        self.anim
    }

    pub fn is_enemy(&self) -> bool {
        self.enemy
    }

    /// Whether the event is playing its destruction.
    pub fn is_finishing(&self) -> bool {
        self.finish_start.is_some()
    }

    pub fn width(&self) -> Fixed {
        self.width
    }

    pub fn height(&self) -> Fixed {
        self.height
    }

    fn current_anim<'a>(&self, event_type: &EventType, anims: &'a AnimBank) -> Option<&'a Anim> {
        self.anim
            .and_then(|anim| event_type.anim(anim))
            .and_then(|id| anims.get(id))
    }

    /// Refresh the cached size from the current animation frame.
    fn calc_dimensions(&mut self, event_type: &EventType, anims: &AnimBank) {
        if self.anim.is_none() {
            self.width = F32;
            self.height = F32;
            self.anchor_offset = 0;
            return;
        }
        let anim = self.current_anim(event_type, anims);
        let (width, height) = anim.map_or((0, 0), |anim| (anim.width(), anim.height()));
        // A single-pixel sprite stands in for an invisible tile-sized event
        self.width = if width == 1 && height == 1 { F32 } else { itof(width) };
        self.height = itof(height);
        self.anchor_offset = match (self.self_anchored, anim) {
            (true, Some(anim)) => anim.offset(),
            _ => 0,
        };
        if let EventKind::Bridge(sag) = &self.kind {
            self.width = sag.length();
        }
    }

    pub fn bounds(&self) -> Bounds {
        let bottom = self.body.y() + self.anchor_offset;
        Bounds {
            left: self.body.x(),
            top: bottom - self.height,
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the event's box touches the given box.
    pub fn overlap(&self, left: Fixed, top: Fixed, width: Fixed, height: Fixed) -> bool {
        let bottom = self.body.y() + self.anchor_offset;
        self.body.x() + self.width >= left
            && self.body.x() < left + width
            && bottom >= top
            && bottom - self.height < top + height
    }

    /// Decide whether the event survives this step. Returns its type if so.
    fn prepare_step(&self, ctx: &StepContext, grid: &EventGrid) -> Option<EventType> {
        let event_type = *grid.event_type(self.grid)?;
        if !self.is_finishing() && ctx.viewport.is_far(self.body.pos, self.grid) {
            trace!(grid = ?self.grid, "event culled");
            return None;
        }
        Some(event_type)
    }

    /// Advance the event by one step. Returns false when it should be removed.
    pub fn step(
        &mut self,
        ctx: &StepContext,
        grid: &mut EventGrid,
        players: &mut [LevelPlayer],
        bullets: &mut Chain<Bullet>,
        out: &mut Vec<FrameEvent>,
    ) -> bool {
        let Some(event_type) = self.prepare_step(ctx, grid) else {
            return false;
        };
        self.calc_dimensions(&event_type, ctx.anims);

        let finishing = self.is_finishing();
        let bounds = self.bounds();
        let cell = self.grid;
        let touching = |player: &LevelPlayer| {
            !finishing && player.overlap(bounds.left, bounds.top, bounds.width, bounds.height)
        };

        match &mut self.kind {
            EventKind::Scenery | EventKind::Destructible => {}
            EventKind::Hazard => {
                for player in players.iter_mut().filter(|player| touching(&**player)) {
                    player.hit(None, ctx, out);
                }
            }
            EventKind::Enemy { fire_time, shoot_until } => {
                for player in players.iter_mut().filter(|player| touching(&**player)) {
                    player.hit(None, ctx, out);
                }
                if let Some(anim) = self.anim.as_mut() {
                    if anim.phase == EventPhase::Shoot && ctx.ticks > *shoot_until {
                        anim.phase = EventPhase::Normal;
                    }
                }
                if let Some(bullet_type) = event_type.bullet {
                    if !finishing && ctx.ticks > *fire_time {
                        *fire_time = ctx.ticks + event_type.fire_interval;
                        *shoot_until = ctx.ticks + event_type.fire_interval / 2;
                        let centre = bounds.left + (bounds.width >> 1);
                        if let Some(facing) = nearest_player_side(players, centre) {
                            self.anim = Some(EventAnim::new(facing, EventPhase::Shoot));
                            let anim = self
                                .anim
                                .and_then(|anim| event_type.anim(anim))
                                .and_then(|id| ctx.anims.get(id));
                            let origin = anim.map_or(self.body.pos, |anim| {
                                self.body.pos + IVec2::new(anim.shoot_x(), anim.shoot_y() - anim.offset())
                            });
                            let heading = Heading::from_facing(facing, false);
                            if let Some(bullet) = Bullet::from_event(origin, heading, bullet_type, ctx, out) {
                                bullets.push_back(bullet);
                            }
                        }
                    }
                }
            }
            EventKind::Spring => {
                for player in players.iter_mut().filter(|player| touching(&**player)) {
                    if player.body.vel.y >= 0 && !player.has_event(cell) {
                        player.set_event(cell, &event_type, &ctx.config.movement);
                        play(out, event_type.sound);
                    }
                }
            }
            EventKind::Float => {
                for player in players.iter_mut().filter(|player| touching(&**player)) {
                    player.set_event(cell, &event_type, &ctx.config.movement);
                }
            }
            EventKind::Platform(motion) => {
                let delta = motion.step(&mut self.body, ctx);
                let top = self.body.y() + self.anchor_offset - self.height;
                for player in players.iter_mut() {
                    if motion.carries(player, self.body.x(), top, self.width) {
                        player.set_event(cell, &event_type, &ctx.config.movement);
                        player.set_position(player.body.x() + delta.x, top);
                    } else {
                        player.clear_event(cell);
                    }
                }
            }
            EventKind::Bridge(sag) => {
                sag.step(&self.body, cell, &event_type, ctx, players);
            }
        }
        true
    }

    /// A bullet or explosion struck the event.
    ///
    /// Returns whether the hit registered.
    pub fn hit(
        &mut self,
        source: Option<PlayerId>,
        ctx: &StepContext,
        grid: &mut EventGrid,
        out: &mut Vec<FrameEvent>,
    ) -> bool {
        if self.is_finishing() || ctx.ticks < self.flash_until {
            return false;
        }
        let remaining = grid.hit(self.grid, source);
        if remaining < 0 {
            return false;
        }
        if remaining == 0 {
            self.destroy(ctx, grid, out);
            out.push(FrameEvent::EventDestroyed { grid: self.grid, by: source });
        }
        self.flash_until = ctx.ticks + ctx.config.event_flash_time;
        true
    }

    /// Start the finish animation and schedule the cell to be cleared once
    /// it has played.
    fn destroy(&mut self, ctx: &StepContext, grid: &mut EventGrid, out: &mut Vec<FrameEvent>) {
        let Some(event_type) = grid.event_type(self.grid).copied() else {
            return;
        };
        let facing = self.anim.map_or(Facing::Left, |anim| anim.facing);
        self.anim = Some(EventAnim::new(facing, EventPhase::Finish));
        self.finish_start = Some(ctx.ticks);

        let frames = self
            .current_anim(&event_type, ctx.anims)
            .map_or(0, Anim::frame_count) as u32;
        grid.set_clear_time(self.grid, ctx.ticks + frames * event_type.finish_frame_time());
        play(out, event_type.sound);
        debug!(grid = ?self.grid, frames, "event destroyed");
    }

    pub fn draw(&self, dc: &DrawContext, grid: &EventGrid, anims: &mut AnimBank, canvas: &mut dyn Canvas) {
        let Some(event_type) = grid.event_type(self.grid) else {
            return;
        };
        if let EventKind::Bridge(sag) = &self.kind {
            sag.draw(&self.body, self.grid, self.anim, event_type, dc, anims, canvas);
            return;
        }
        let Some(anim) = self
            .anim
            .and_then(|anim| event_type.anim(anim))
            .and_then(|id| anims.get_mut(id))
        else {
            return;
        };

        match self.finish_start {
            Some(start) => anim.set_frame(dc.ticks.saturating_sub(start) / event_type.finish_frame_time(), false),
            None => anim.set_frame(
                dc.ticks / event_type.frame_time() + self.grid.x as u32 + self.grid.y as u32,
                true,
            ),
        }

        let x = self.body.draw_x(dc.change, dc.viewport.x);
        let y = self.body.draw_y(dc.change, dc.viewport.y);
        if dc.ticks < self.flash_until {
            anim.draw_flashed(canvas, x, y, FLASH_COLOUR);
        } else {
            anim.draw(canvas, x, y);
        }
    }
}

/// Which side of `centre` the nearest living player is on.
fn nearest_player_side(players: &[LevelPlayer], centre: Fixed) -> Option<Facing> {
    players
        .iter()
        .filter(|player| player.is_alive())
        .map(|player| player.body.x() + footprint::X_MID - centre)
        .min_by_key(|offset| offset.abs())
        .map(|offset| if offset < 0 { Facing::Left } else { Facing::Right })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::level::fixture::{self, TestLevel};
    use crate::player::{ActiveEvent, ActiveEventKind};
    use hopper_physics::fixed::{F1, F16, F8};

    fn enemy_type(strength: u8) -> EventType {
        let mut event_type = EventType::new(EventBehavior::Enemy);
        event_type.strength = strength;
        event_type.anim_speed = 4;
        event_type.anims = [
            fixture::ENEMY_ANIM,
            fixture::ENEMY_ANIM,
            0,
            0,
            fixture::FINISH_ANIM,
            fixture::FINISH_ANIM,
        ];
        event_type
    }

    fn level_with(event_type: EventType, at: GridPos) -> TestLevel {
        let mut level = TestLevel::flat(vec![event_type]);
        level.grid.place(at, 0).unwrap();
        level
    }

    #[test]
    fn created_on_the_cell_floor() {
        let event = Event::new(GridPos::new(3, 5), &enemy_type(1), 0);
        assert_eq!(event.body.pos, IVec2::new(ttof(3), ttof(6)));
        assert!(event.is_enemy());
        assert_eq!(event, Event::new(GridPos::new(3, 5), &EventType::default(), 0));
    }

    #[test]
    fn invisible_events_are_tile_sized() {
        let level = TestLevel::flat(vec![]);
        let float = EventType::new(EventBehavior::Float);
        let mut event = Event::new(GridPos::new(4, 4), &float, 0);
        event.calc_dimensions(&float, &level.env.anims);
        assert!(event.anim().is_none());
        assert_eq!((event.width(), event.height()), (F32, F32));
    }

    #[test]
    fn missing_animation_has_no_size() {
        let level = TestLevel::flat(vec![]);
        let mut event_type = enemy_type(1);
        event_type.anims[0] = 0x7F;
        let mut event = Event::new(GridPos::new(2, 2), &event_type, 0);
        event.calc_dimensions(&event_type, &level.env.anims);
        assert_eq!((event.width(), event.height()), (0, 0));
    }

    #[test]
    fn overlap_measures_up_from_the_anchor() {
        let level = TestLevel::flat(vec![]);
        let event_type = enemy_type(1);
        let mut event = Event::new(GridPos::new(2, 2), &event_type, 0);
        event.calc_dimensions(&event_type, &level.env.anims);

        assert!(event.overlap(ttof(2) + F8, ttof(2) + F8, F1, F1));
        assert!(!event.overlap(ttof(3) + F8, ttof(2) + F8, F1, F1));
        assert!(!event.overlap(ttof(2), ttof(3) + F16, F1, F1));
    }

    #[test]
    fn hit_flashes_then_destroys() {
        let at = GridPos::new(5, 5);
        let mut level = level_with(enemy_type(2), at);
        let mut event = Event::new(at, &enemy_type(2), 0);
        let mut out = Vec::new();

        let ctx = level.env.ctx(1000);
        assert!(event.hit(Some(PlayerId(0)), &ctx, &mut level.grid, &mut out));
        // Still flashing
        let ctx = level.env.ctx(1050);
        assert!(!event.hit(Some(PlayerId(0)), &ctx, &mut level.grid, &mut out));
        let ctx = level.env.ctx(1100);
        assert!(event.hit(Some(PlayerId(0)), &ctx, &mut level.grid, &mut out));

        assert!(event.is_finishing());
        assert_eq!(event.anim().map(|anim| anim.phase), Some(EventPhase::Finish));
        assert!(out.contains(&FrameEvent::EventDestroyed { grid: at, by: Some(PlayerId(0)) }));

        let ctx = level.env.ctx(5000);
        assert!(!event.hit(None, &ctx, &mut level.grid, &mut out));
    }

    #[test]
    fn destruction_clears_the_cell_after_the_finish_animation() {
        let at = GridPos::new(5, 5);
        let mut level = level_with(enemy_type(1), at);
        let mut event = Event::new(at, &enemy_type(1), 0);
        let mut out = Vec::new();
        let ctx = level.env.ctx(2000);
        assert!(event.hit(None, &ctx, &mut level.grid, &mut out));

        // Three finish frames of 4 << 3 ms each
        level.grid.expire(2000 + 3 * 32 - 1);
        assert!(level.grid.event_type(at).is_some());
        level.grid.expire(2000 + 3 * 32);
        assert!(level.grid.event_type(at).is_none());

        let ctx = level.env.ctx(2100);
        let mut bullets = Chain::new();
        assert!(!event.step(&ctx, &mut level.grid, &mut [], &mut bullets, &mut out));
    }

    #[test]
    fn unhittable_events_reject_hits() {
        let at = GridPos::new(5, 5);
        let mut level = level_with(enemy_type(0), at);
        let mut event = Event::new(at, &enemy_type(0), 0);
        let ctx = level.env.ctx(100);
        let mut out = Vec::new();
        assert!(!event.hit(None, &ctx, &mut level.grid, &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn far_events_are_culled() {
        let at = GridPos::new(40, 5);
        let scenery = EventType::new(EventBehavior::Scenery);
        let mut level = level_with(scenery, at);
        let mut event = Event::new(at, &scenery, 0);
        let ctx = level.env.ctx(0);
        let mut bullets = Chain::new();
        assert!(!event.step(&ctx, &mut level.grid, &mut [], &mut bullets, &mut Vec::new()));
    }

    #[test]
    fn hazards_hurt_touching_players() {
        let at = GridPos::new(4, 6);
        let hazard = EventType::new(EventBehavior::Hazard);
        let mut level = level_with(hazard, at);
        let mut players = vec![level.env.player_at(GridPos::new(4, 6))];
        let mut event = Event::new(at, &hazard, 0);
        let mut out = Vec::new();
        let ctx = level.env.ctx(500);
        let mut bullets = Chain::new();

        assert!(event.step(&ctx, &mut level.grid, &mut players, &mut bullets, &mut out));
        assert_eq!(players[0].energy(), 3);
        assert!(out.contains(&FrameEvent::PlayerHit { player: PlayerId(0), by: None }));
    }

    fn bridge_type() -> EventType {
        let mut bridge = EventType::new(EventBehavior::Bridge);
        bridge.multi_a = 8;
        bridge.multi_b = 40;
        bridge.piece_size = 4;
        bridge.anim_speed = 4;
        bridge.anims[0] = fixture::BRIDGE_ANIM;
        bridge
    }

    fn sag(event: &Event) -> BridgeSag {
        match event.kind() {
            EventKind::Bridge(sag) => sag.clone(),
            other => panic!("not a bridge: {other:?}"),
        }
    }

    fn drawn_ys(level: &mut TestLevel, event: &Event, ticks: u32) -> Vec<(i32, i32)> {
        let dc = DrawContext {
            ticks,
            change: 0,
            viewport: level.env.viewport,
        };
        let mut canvas = RecordingCanvas::new();
        event.draw(&dc, &level.grid, &mut level.env.anims, &mut canvas);
        canvas.sprites().map(|(_, x, y)| (x, y)).collect()
    }

    #[test]
    fn bridge_carries_and_sags_under_its_rider() {
        let at = GridPos::new(2, 5);
        let bridge = bridge_type();
        let mut level = level_with(bridge, at);
        let mut event = Event::new(at, &bridge, 0);
        assert_eq!(event.body.pos, IVec2::new(ttof(2), itof(200)));

        // Halfway along the span, feet just above the surface
        let mut players = vec![level.env.player_at(GridPos::new(3, 5))];
        players[0].set_position(itof(112), itof(197));
        let mut bullets = Chain::new();
        let mut out = Vec::new();

        let ctx = level.env.ctx(20);
        assert!(event.step(&ctx, &mut level.grid, &mut players, &mut bullets, &mut out));
        let rider = &players[0];
        assert!(matches!(
            rider.event(),
            Some(ActiveEvent { grid, kind: ActiveEventKind::Platform }) if grid == at
        ));
        // Pinned one pixel above the dipped surface
        assert_eq!(rider.body.y(), itof(199));
        let loaded = sag(&event);
        assert!(loaded.is_loaded());
        assert_eq!((loaded.left_dip(), loaded.right_dip()), (itof(64), itof(64)));
        assert_eq!(loaded.piece_dip(itof(64)), F8);

        // Once the rider walks off, the sag only ever shrinks
        players[0].set_position(itof(400), itof(197));
        let mut depth = loaded.piece_dip(itof(64));
        for step in 2..30 {
            let ctx = level.env.ctx(step * 20);
            assert!(event.step(&ctx, &mut level.grid, &mut players, &mut bullets, &mut out));
            assert!(players[0].event().is_none());
            let relaxing = sag(&event);
            let next = relaxing.piece_dip((relaxing.left_dip() + relaxing.right_dip()) >> 1);
            assert!(next <= depth);
            depth = next;
        }
        let relaxed = sag(&event);
        assert_eq!((relaxed.left_dip(), relaxed.right_dip()), (relaxed.length(), 0));
        assert_eq!(depth, 0);
    }

    #[test]
    fn bridge_pieces_follow_the_sag() {
        let at = GridPos::new(2, 5);
        let bridge = bridge_type();
        let mut level = level_with(bridge, at);
        let mut event = Event::new(at, &bridge, 0);

        // Relaxed: eight pieces level with the walking surface
        let flat = drawn_ys(&mut level, &event, 0);
        let xs: Vec<i32> = (0..8).map(|piece| 64 + piece * 16 + 1).collect();
        assert_eq!(flat, xs.iter().map(|&x| (x, 192)).collect::<Vec<_>>());

        let mut players = vec![level.env.player_at(GridPos::new(3, 5))];
        players[0].set_position(itof(112), itof(197));
        let ctx = level.env.ctx(20);
        event.step(&ctx, &mut level.grid, &mut players, &mut Chain::new(), &mut Vec::new());

        let sagging = drawn_ys(&mut level, &event, 20);
        let dips = [0, 2, 4, 6, 8, 6, 4, 2];
        assert_eq!(sagging, xs.iter().zip(dips).map(|(&x, dip)| (x, 192 + dip)).collect::<Vec<_>>());
    }

    #[test]
    fn enemies_fire_at_the_nearest_player() {
        let at = GridPos::new(6, 6);
        let mut event_type = enemy_type(1);
        event_type.bullet = Some(fixture::ENEMY_BULLET);
        event_type.fire_interval = 400;
        let mut level = level_with(event_type, at);
        let mut players = vec![level.env.player_at(GridPos::new(2, 6))];
        let mut event = Event::new(at, &event_type, 0);
        let mut bullets = Chain::new();
        let mut out = Vec::new();

        let ctx = level.env.ctx(100);
        event.step(&ctx, &mut level.grid, &mut players, &mut bullets, &mut out);
        assert!(bullets.is_empty());

        let ctx = level.env.ctx(401);
        event.step(&ctx, &mut level.grid, &mut players, &mut bullets, &mut out);
        assert_eq!(bullets.len(), 1);
        assert_eq!(event.anim(), Some(EventAnim::new(Facing::Left, EventPhase::Shoot)));
        let bullet = bullets.front().unwrap();
        assert!(bullet.source().is_none());
        assert!(bullet.body.vel.x < 0);
    }
}
