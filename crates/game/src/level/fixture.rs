//! Ready-made levels and assets.
//!
//! Unit tests across the crate step entities inside the flat test level
//! built here, and the headless runner plays the demo level. Sprite ids
//! encode their animation and frame so recorded draw calls can be traced
//! back to what drew them.

use hopper_physics::fixed::{ttof, Fixed};
use hopper_physics::{GridPos, MaskError, MaskGrid, TileFlags, TileShape};

use super::{EventGrid, Level};
use crate::anim::{Anim, AnimBank, AnimData, AnimFrame, AnimId};
use crate::bullet::{BulletBehaviour, BulletType, Heading, TNT_TYPE};
use crate::canvas::{PaletteId, SpriteRef};
use crate::config::SimulationConfig;
use crate::error::LevelError;
use crate::event::{EventBehavior, EventType};
use crate::frame_event::SoundId;
use crate::player::{PlayerAnimSet, PlayerPhase, TNT_SLOT};

/// Level size in tiles.
pub const WIDTH: u16 = 64;
pub const HEIGHT: u16 = 12;

/// First solid row; everything from here down is ground.
pub const GROUND_ROW: u16 = 10;

/// Step length the test level runs at.
pub const STEP_MS: i32 = 20;

pub const SHOT_SOUND: SoundId = SoundId(10);
pub const BURST_SOUND: SoundId = SoundId(11);
pub const SPRING_SOUND: SoundId = SoundId(12);
pub const CRASH_SOUND: SoundId = SoundId(13);

// Bullet types
pub const ENEMY_BULLET: u8 = 1;
pub const BOUNCER: u8 = 3;
pub const BULLET_TYPES: usize = 31;

// Event animations, as stored in event type slots
pub const ENEMY_ANIM: u8 = 20;
pub const FINISH_ANIM: u8 = 21;
pub const BURST_ANIM: u8 = 22;
pub const BRIDGE_ANIM: u8 = 23;
pub const PLATFORM_ANIM: u8 = 24;

// Demo event types
pub const SPRING_EVENT: u8 = 0;
pub const ENEMY_EVENT: u8 = 1;
pub const CRATE_EVENT: u8 = 2;
pub const BRIDGE_EVENT: u8 = 3;
pub const PLATFORM_EVENT: u8 = 4;
pub const FLOAT_EVENT: u8 = 5;

/// Player animation slot `n` is stored under this id plus `n`.
pub const PLAYER_ANIM_BASE: u16 = 200;
pub const PLAYER_FRAMES: usize = 4;
pub const STAR_FRAMES: usize = 4;
pub const PLAYER_PALETTE: PaletteId = PaletteId(3);

const BULLET_SPRITE_BASE: u32 = 1 << 16;

/// The sprite showing `frame` of animation `anim`.
pub fn frame_sprite(anim: AnimId, frame: u32) -> SpriteRef {
    SpriteRef::new(anim.0 as u32 * 16 + frame, 32, 32)
}

/// Animation a sprite from [`frame_sprite`] belongs to.
pub fn anim_of(sprite: SpriteRef) -> AnimId {
    AnimId((sprite.id / 16) as u16)
}

pub fn frame_of(sprite: SpriteRef) -> u32 {
    sprite.id % 16
}

fn strip(id: AnimId, frames: usize) -> Anim {
    Anim::with_frames(
        (0..frames as u32)
            .map(|frame| AnimFrame {
                sprite: frame_sprite(id, frame),
                x_offset: 0,
                y_offset: 0,
            })
            .collect(),
    )
}

fn event_anim(id: u8) -> AnimId {
    AnimId(id as u16)
}

pub fn player_anim_id(slot: usize) -> AnimId {
    AnimId(PLAYER_ANIM_BASE + slot as u16)
}

pub fn player_anims() -> PlayerAnimSet {
    let mut set = PlayerAnimSet {
        palette: PLAYER_PALETTE,
        ..PlayerAnimSet::default()
    };
    for (slot, id) in set.slots.iter_mut().enumerate() {
        *id = Some(player_anim_id(slot));
    }
    set
}

/// Every animation the test and demo levels use.
pub fn anim_bank() -> AnimBank {
    let mut bank = AnimBank::new();

    // === PLAYER ===
    for slot in 0..PlayerPhase::COUNT * 2 {
        let id = player_anim_id(slot);
        let mut anim = strip(id, PLAYER_FRAMES);
        anim.set_data(AnimData {
            frame_count: PLAYER_FRAMES,
            shoot_x: 24,
            shoot_y: 16,
            accessory_x: 6,
            accessory_y: 16,
            accessory: None,
            y_offset: 0,
        });
        bank.insert(id, anim);
    }
    let set = PlayerAnimSet::default();
    bank.insert(set.bird_left, strip(set.bird_left, 2));
    bank.insert(set.bird_right, strip(set.bird_right, 2));
    bank.insert(set.shield_yellow, strip(set.shield_yellow, 1));
    bank.insert(set.shield_orange, strip(set.shield_orange, 1));
    bank.insert(set.stars, strip(set.stars, STAR_FRAMES));

    // === EVENTS ===
    bank.insert(event_anim(ENEMY_ANIM), strip(event_anim(ENEMY_ANIM), 1));
    bank.insert(event_anim(FINISH_ANIM), strip(event_anim(FINISH_ANIM), 3));
    bank.insert(event_anim(BURST_ANIM), strip(event_anim(BURST_ANIM), 3));
    bank.insert(
        event_anim(BRIDGE_ANIM),
        Anim::with_frames(vec![AnimFrame {
            sprite: SpriteRef::new(event_anim(BRIDGE_ANIM).0 as u32 * 16, 16, 8),
            x_offset: 0,
            y_offset: 0,
        }]),
    );
    bank.insert(
        event_anim(PLATFORM_ANIM),
        Anim::with_frames(vec![AnimFrame {
            sprite: SpriteRef::new(event_anim(PLATFORM_ANIM).0 as u32 * 16, 64, 16),
            x_offset: 0,
            y_offset: 0,
        }]),
    );
    bank
}

fn bullet_sprite(index: u8, heading: Heading) -> SpriteRef {
    SpriteRef::new(BULLET_SPRITE_BASE + index as u32 * 4 + heading.index() as u32, 8, 8)
}

/// A bullet type flying level to the left or right.
fn straight(index: u8, speed: i8) -> BulletType {
    BulletType {
        sprites: [
            Some(bullet_sprite(index, Heading::Left)),
            Some(bullet_sprite(index, Heading::Right)),
            None,
            None,
        ],
        speed_x: [-speed, speed, 0, 0],
        ..BulletType::default()
    }
}

/// Bullet types by index: the blaster, one type per ammo slot, TNT and the
/// bird bullet. Unused indices are left empty.
pub fn bullet_types() -> Vec<BulletType> {
    let mut types = vec![BulletType::default(); BULLET_TYPES];
    types[0] = BulletType {
        start_sound: Some(SHOT_SOUND),
        finish_sound: Some(BURST_SOUND),
        finish_anim: Some(event_anim(BURST_ANIM)),
        ..straight(0, 12)
    };
    types[ENEMY_BULLET as usize] = straight(ENEMY_BULLET, 8);
    types[2] = straight(2, 16);
    types[BOUNCER as usize] = BulletType {
        sprites: [
            Some(bullet_sprite(BOUNCER, Heading::Left)),
            Some(bullet_sprite(BOUNCER, Heading::Right)),
            Some(bullet_sprite(BOUNCER, Heading::LowerLeft)),
            Some(bullet_sprite(BOUNCER, Heading::LowerRight)),
        ],
        speed_x: [-8, 8, -6, 6],
        speed_y: [0, 0, 4, 4],
        gravity: 2,
        behaviour: BulletBehaviour::Bounce,
        ..BulletType::default()
    };
    types[TNT_TYPE as usize] = BulletType {
        finish_sound: Some(BURST_SOUND),
        ..straight(TNT_TYPE, 0)
    };
    let bird_bullet = SimulationConfig::default().bird_bullet;
    types[bird_bullet as usize] = straight(bird_bullet, 10);
    types
}

/// A level-wide floor from [`GROUND_ROW`] down and open air above.
pub fn flat_mask() -> Result<MaskGrid, MaskError> {
    let mut mask = MaskGrid::new(WIDTH, HEIGHT);
    mask.fill(0, GROUND_ROW, WIDTH - 1, HEIGHT - 1, TileShape::SOLID)?;
    Ok(mask)
}

/// Event types used by the demo level, indexed by the `*_EVENT` constants.
pub fn demo_event_types() -> Vec<EventType> {
    let mut spring = EventType::new(EventBehavior::Spring);
    spring.multi_a = 5;
    spring.sound = Some(SPRING_SOUND);

    let mut enemy = EventType::new(EventBehavior::Enemy);
    enemy.strength = 2;
    enemy.anim_speed = 4;
    enemy.anims = [ENEMY_ANIM, ENEMY_ANIM, 0, 0, FINISH_ANIM, FINISH_ANIM];
    enemy.bullet = Some(ENEMY_BULLET);
    enemy.fire_interval = 1200;
    enemy.sound = Some(CRASH_SOUND);

    let mut crate_box = EventType::new(EventBehavior::Destructible);
    crate_box.strength = 1;
    crate_box.anim_speed = 2;
    crate_box.anims = [ENEMY_ANIM, ENEMY_ANIM, 0, 0, FINISH_ANIM, FINISH_ANIM];
    crate_box.sound = Some(CRASH_SOUND);

    let mut bridge = EventType::new(EventBehavior::Bridge);
    bridge.multi_a = 8;
    bridge.multi_b = 40;
    bridge.piece_size = 4;
    bridge.anims[0] = BRIDGE_ANIM;

    let mut platform = EventType::new(EventBehavior::Platform);
    platform.multi_a = 3;
    platform.anim_speed = 16;
    platform.anims[0] = PLATFORM_ANIM;

    let mut float = EventType::new(EventBehavior::Float);
    float.multi_a = 4;

    vec![spring, enemy, crate_box, bridge, platform, float]
}

/// A short course: a ramp up onto a step, a spring, an armed enemy, a crate,
/// a bridge over a pit, a moving platform and an updraft.
pub fn demo_level() -> Result<Level, LevelError> {
    let mut mask = flat_mask()?;

    // === WALLS AND STEPS ===
    mask.fill(0, 0, 0, GROUND_ROW - 1, TileShape::SOLID)?;
    mask.set_tile(14, GROUND_ROW - 1, TileShape::ramp_right())?;
    mask.fill(15, GROUND_ROW - 1, 18, GROUND_ROW - 1, TileShape::SOLID)?;

    // === HAZARDS ===
    mask.set_flags(24, GROUND_ROW, TileFlags::HAZARD)?;

    // === PIT ===
    mask.fill(30, GROUND_ROW, 33, HEIGHT - 1, TileShape::EMPTY)?;

    // === ONE-WAY LEDGE ===
    mask.fill(40, 6, 44, 6, TileShape::floor(2))?;
    for x in 40..=44 {
        mask.set_flags(x, 6, TileFlags::ONE_WAY)?;
    }

    let mut grid = EventGrid::new(WIDTH, HEIGHT, demo_event_types());
    grid.place(GridPos::new(8, GROUND_ROW - 1), SPRING_EVENT)?;
    grid.place(GridPos::new(21, GROUND_ROW - 1), ENEMY_EVENT)?;
    grid.place(GridPos::new(26, GROUND_ROW - 1), CRATE_EVENT)?;
    grid.place(GridPos::new(30, GROUND_ROW - 1), BRIDGE_EVENT)?;
    grid.place(GridPos::new(48, 7), PLATFORM_EVENT)?;
    grid.place(GridPos::new(56, GROUND_ROW - 1), FLOAT_EVENT)?;

    let mut level = Level::new(mask, grid, anim_bank(), bullet_types(), SimulationConfig::default())?;
    let id = level.add_player(player_anims(), GridPos::new(2, GROUND_ROW - 1))?;
    if let Some(player) = level.player_mut(id) {
        player.arsenal_mut().add_ammo(BOUNCER - 1, 10);
        player.arsenal_mut().add_ammo(TNT_SLOT, 2);
        player.arsenal_mut().set_fire_speed(4);
        player.set_birds(2);
    }
    Ok(level)
}

/// Bare level state for stepping single entities in tests.
#[cfg(test)]
pub struct TestEnv {
    pub mask: MaskGrid,
    pub anims: AnimBank,
    pub bullet_types: Vec<BulletType>,
    pub config: SimulationConfig,
    pub viewport: super::Viewport,
    pub water_level: Fixed,
    pub stage: super::Stage,
}

#[cfg(test)]
impl TestEnv {
    pub fn flat() -> Self {
        Self {
            mask: flat_mask().unwrap(),
            anims: anim_bank(),
            bullet_types: bullet_types(),
            config: SimulationConfig::default(),
            viewport: super::Viewport::new(320, 200),
            water_level: super::NO_WATER,
            stage: super::Stage::Normal,
        }
    }

    pub fn ctx(&self, ticks: u32) -> super::StepContext<'_> {
        super::StepContext {
            ticks,
            msps: STEP_MS,
            mask: &self.mask,
            anims: &self.anims,
            bullet_types: &self.bullet_types,
            config: &self.config,
            water_level: self.water_level,
            viewport: self.viewport,
            stage: self.stage,
        }
    }

    /// A fresh player standing on the floor of cell `grid`.
    pub fn player_at(&self, grid: GridPos) -> crate::player::LevelPlayer {
        crate::player::LevelPlayer::new(
            crate::player::PlayerId(0),
            player_anims(),
            ttof(grid.x as i32),
            ttof(grid.y as i32 + 1),
        )
    }
}

/// A [`TestEnv`] with an event grid the same size as its mask.
#[cfg(test)]
pub struct TestLevel {
    pub env: TestEnv,
    pub grid: EventGrid,
}

#[cfg(test)]
impl TestLevel {
    pub fn flat(types: Vec<EventType>) -> Self {
        Self {
            env: TestEnv::flat(),
            grid: EventGrid::new(WIDTH, HEIGHT, types),
        }
    }
}
