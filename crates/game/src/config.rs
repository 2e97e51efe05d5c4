//! Simulation tuning.
//!
//! Every speed, acceleration and timer the simulation reads lives here so a
//! host can tweak them without touching logic. Defaults reproduce the classic
//! feel. Velocities are fixed pixels per second, accelerations are applied
//! per millisecond of step time, timers are milliseconds.

use hopper_physics::fixed::{itof, Fixed};
use serde::{Deserialize, Serialize};

/// Player movement and reaction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    // ========================================================================
    // Speeds
    // ========================================================================
    /// Walking speed.
    pub walk_speed: Fixed,

    /// Running speed, the horizontal cap.
    pub run_speed: Fixed,

    /// Terminal falling speed.
    pub fall_speed: Fixed,

    /// Terminal sinking speed under water.
    pub sink_speed: Fixed,

    /// Upward speed while jumping (negative).
    pub jump_speed: Fixed,

    // ========================================================================
    // Accelerations (per millisecond)
    // ========================================================================
    /// Turning against the current direction of motion.
    pub reverse_accel: i32,

    /// Braking with no direction held.
    pub stop_accel: i32,

    /// Speeding up below walking speed.
    pub walk_accel: i32,

    /// Speeding up between walking and running speed.
    pub run_accel: i32,

    /// Gravity.
    pub gravity: i32,

    /// Sinking under water.
    pub sink_accel: i32,

    // ========================================================================
    // Jumping
    // ========================================================================
    /// Height of a standing jump.
    pub jump_height: Fixed,

    /// Lift target above the player when entering a float-up zone.
    pub float_lift: Fixed,

    // ========================================================================
    // Timers (milliseconds)
    // ========================================================================
    /// Hurt reaction duration.
    pub hurt_time: u32,

    /// Part of the hurt reaction that shows the hurt animation.
    pub hurt_anim_time: u32,

    /// Death reaction duration.
    pub killed_time: u32,

    /// Invincibility duration.
    pub invincible_time: u32,

    /// Fast feet boost duration.
    pub fast_feet_time: u32,

    /// Delay between entering a warp and arriving.
    pub warp_time: u32,

    /// Holding up or down this long shifts the view.
    pub look_delay: u32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Speeds
            walk_speed: itof(300),
            run_speed: itof(325),
            fall_speed: itof(350),
            sink_speed: itof(150),
            jump_speed: itof(-350),

            // Accelerations
            reverse_accel: 1800,
            stop_accel: 1000,
            walk_accel: 1000,
            run_accel: 200,
            gravity: 2750,
            sink_accel: 1000,

            // Jumping
            jump_height: itof(92),
            float_lift: itof(80),

            // Timers
            hurt_time: 1000,
            hurt_anim_time: 200,
            killed_time: 2000,
            invincible_time: 10000,
            fast_feet_time: 25000,
            warp_time: 1000,
            look_delay: 1000,
        }
    }
}

/// Level-wide simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub movement: MovementConfig,

    // ========================================================================
    // Events
    // ========================================================================
    /// How long a hit event flashes and ignores further hits.
    pub event_flash_time: u32,

    /// Tiles around the viewport in which events are brought to life.
    pub activation_margin: i32,

    /// Bridge sag recovery per millisecond.
    pub bridge_relax_rate: i32,

    // ========================================================================
    // Bullets
    // ========================================================================
    /// Lifetime of an ordinary bullet.
    pub bullet_time: u32,

    /// Fuse of a TNT charge.
    pub tnt_time: u32,

    // ========================================================================
    // Birds
    // ========================================================================
    /// Minimum time between two bird shots.
    pub bird_fire_interval: u32,

    /// Bullet type fired by birds.
    pub bird_bullet: u8,

    /// Bird acceleration toward its leader, per millisecond.
    pub bird_accel: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            event_flash_time: 100,
            activation_margin: 5,
            bridge_relax_rate: 320,
            bullet_time: 1000,
            tnt_time: 300,
            bird_fire_interval: 500,
            bird_bullet: 30,
            bird_accel: 400,
        }
    }
}
