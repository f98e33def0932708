//! Worm Boss - A segmented boss encounter for a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic encounter simulation (phase machine, patterns, registry)
//! - `world`: Explicit entity registry that hosts the encounter headlessly
//! - `room`: Room spawn sequencing and clear detection
//! - `driver`: Fixed-timestep loop tying world, room and boss together
//! - `settings`: Data-driven encounter configuration

pub mod driver;
pub mod error;
pub mod room;
pub mod settings;
pub mod sim;
pub mod world;

pub use driver::{EncounterDriver, EncounterOutcome};
pub use error::ConfigError;
pub use settings::EncounterSettings;

use glam::Vec2;

/// Encounter tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Delay between waking up and the first wander (seconds)
    pub const AWAKEN_DELAY: f32 = 2.0;
    /// Delay between the killing blow and the follow-on spawns (seconds)
    pub const DEATH_DELAY: f32 = 1.0;
    /// Time between beats in the Rings and Turrets phases (seconds)
    pub const BEAT_INTERVAL: f32 = 1.0;
    /// Upper bound of the rolled wander cooldown, as a multiple of the base
    pub const COOLDOWN_SPREAD: f32 = 1.2;

    /// Projectiles per ring
    pub const RING_PROJECTILES: u32 = 16;
    /// Launch speed of ring projectiles
    pub const RING_SPEED: f32 = 10.0;
    /// Ring rotation added per firing segment (degrees)
    pub const RING_ROTATION_STEP: f32 = 180.0;

    /// Projectiles per line-burst
    pub const LINE_PROJECTILES: u32 = 8;
    /// First line-burst front speed, grows by `LINE_START_SPEED_STEP` per burst
    pub const LINE_START_SPEED: f32 = 10.0;
    pub const LINE_START_SPEED_STEP: f32 = 2.5;
    /// First line-burst tail speed, grows by `LINE_END_SPEED_STEP` per burst
    pub const LINE_END_SPEED: f32 = 3.0;
    pub const LINE_END_SPEED_STEP: f32 = 0.5;
    /// Inter-burst delay is `min(LINE_DELAY_NUMERATOR / fired, LINE_DELAY_CAP)`
    pub const LINE_DELAY_NUMERATOR: f32 = 1.5;
    pub const LINE_DELAY_CAP: f32 = 0.75;

    /// Turrets never spawn closer than this to the arena edge
    pub const ARENA_MARGIN: f32 = 3.0;
    /// Follow-on spawns sit above the arena center by these fractions of its height
    pub const PORTAL_OFFSET: f32 = 0.6;
    pub const PAGE_OFFSET: f32 = 0.4;

    /// Seconds an enemy projectile lives before expiring
    pub const PROJECTILE_LIFETIME: f32 = 6.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Velocity of a projectile launched at `angle` degrees (counter-clockwise from +x)
#[inline]
pub fn launch_velocity(angle: f32, speed: f32) -> Vec2 {
    let theta = angle.to_radians();
    Vec2::new(speed * theta.cos(), speed * theta.sin())
}

/// Angle in degrees pointing from `from` toward `to`
#[inline]
pub fn aim_degrees(from: Vec2, to: Vec2) -> f32 {
    let dir = to - from;
    dir.y.atan2(dir.x).to_degrees()
}
