//! Collaborator seams
//!
//! The encounter never touches physics, pathing, rendering or animation
//! directly. It talks to its host through these traits, one per concern.
//! Notifications are fire-and-forget; spawners may refuse (return `None`),
//! in which case the encounter skips that beat and tries again later.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pattern::LaunchVector;

/// Handle to any entity living in the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Handle to a boss encounter; sub-entities keep this instead of a pointer to their creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EncounterId(pub u32);

/// Result of a player proximity query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSighting {
    pub id: EntityId,
    pub position: Vec2,
}

/// Tracking behaviour of the movement controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiMode {
    /// Close in on the target
    Melee,
    /// Hold a standoff distance from the target
    Ranged,
}

/// Which side a projectile hurts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

/// One projectile to create
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub origin: Vec2,
    pub launch: LaunchVector,
    pub team: Team,
    /// Entity credited with the damage
    pub source: EntityId,
}

/// Fixed world objects left behind when the boss falls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowOn {
    /// Exit to the next area
    Portal,
    /// Collectible page item
    Page,
}

/// Spatial lookups into the host world
pub trait WorldQuery {
    /// Nearest player within `radius` of `origin`
    fn nearest_player(&self, origin: Vec2, radius: f32) -> Option<PlayerSighting>;
    /// Current position of an entity, `None` if it no longer exists
    fn position_of(&self, id: EntityId) -> Option<Vec2>;
}

/// Pathing controller attached to a mover
pub trait Movement {
    fn set_move_target(&mut self, mover: EntityId, target: EntityId);
    fn set_max_speed(&mut self, mover: EntityId, speed: f32);
    fn set_ai_mode(&mut self, mover: EntityId, mode: AiMode);
}

/// Animation/visual parameters, one-way
pub trait Presentation {
    fn set_indicator(&mut self, entity: EntityId, name: &str, value: i32);
    fn set_flag(&mut self, entity: EntityId, name: &str, value: bool);
    fn trigger_cue(&mut self, entity: EntityId, cue: &str);
}

/// Projectile factory; owns each projectile's lifetime after launch
pub trait ProjectileSpawner {
    fn spawn_projectile(&mut self, shot: ProjectileSpawn);
}

/// Sub-entity factory and removal
pub trait EntitySpawner {
    /// Body segment `index`, mechanically linked to `linked_to`
    fn spawn_segment(
        &mut self,
        owner: EncounterId,
        index: usize,
        position: Vec2,
        linked_to: EntityId,
    ) -> Option<EntityId>;
    fn spawn_turret(&mut self, owner: EncounterId, position: Vec2) -> Option<EntityId>;
    fn spawn_follow_on(&mut self, kind: FollowOn, position: Vec2) -> Option<EntityId>;
    /// Remove without death side effects (no drops, score, cues or owner notification)
    fn quiet_remove(&mut self, id: EntityId);
    /// Remove an entity that has finished dying
    fn despawn(&mut self, id: EntityId);
}

/// Everything an encounter needs from its host
pub trait EncounterHost: WorldQuery + Movement + Presentation + ProjectileSpawner + EntitySpawner {}

impl<T> EncounterHost for T where
    T: WorldQuery + Movement + Presentation + ProjectileSpawner + EntitySpawner
{
}
