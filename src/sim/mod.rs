//! Deterministic encounter simulation
//!
//! All boss logic lives here. This module must stay pure and deterministic:
//! - Time is supplied by the caller each tick
//! - Seeded RNG only
//! - No rendering, physics or platform dependencies; the host traits in
//!   `host` are the only way out

pub mod entity;
pub mod host;
pub mod pattern;
pub mod registry;
pub mod state;
pub mod tick;

pub use entity::{Aftermath, Combatant, DamageOutcome, Grunt, Segment, Turret, Vitals};
pub use host::{
    AiMode, EncounterHost, EncounterId, EntityId, EntitySpawner, FollowOn, Movement,
    PlayerSighting, Presentation, ProjectileSpawn, ProjectileSpawner, Team, WorldQuery,
};
pub use pattern::{LaunchVector, arc, double_ring, line_burst, ring};
pub use registry::{BodySegment, SpawnRegistry};
pub use state::{EncounterClock, Phase, PhaseState, WormBoss};
pub use tick::{PhaseChange, TickInput, tick};
