//! Headless world
//!
//! Explicit registry of every live entity, keyed by id and iterated in id
//! order. It implements all the encounter host traits, so the boss can run
//! without an engine: movers walk straight at their targets, body segments
//! trail their predecessor, projectiles fly in a straight line until they
//! expire.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::PROJECTILE_LIFETIME;
use crate::sim::{
    Aftermath, AiMode, Combatant, DamageOutcome, EncounterId, EntityId, EntitySpawner, FollowOn,
    Grunt, Movement, PlayerSighting, Presentation, ProjectileSpawn, ProjectileSpawner, Segment,
    Team, Turret, Vitals, WorldQuery,
};

/// Distance kept between neighbouring body segments
pub const SEGMENT_SPACING: f32 = 1.2;
/// Melee movers stop this close to their target
pub const MELEE_REACH: f32 = 0.5;
/// Ranged movers hold this distance from their target
pub const RANGED_STANDOFF: f32 = 8.0;
/// Turret health when the world is built without settings
pub const DEFAULT_TURRET_HEALTH: f32 = 60.0;

/// A projectile in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub team: Team,
    pub source: EntityId,
    pub velocity: Vec2,
    /// Seconds since launch
    pub age: f32,
}

/// What an entity is
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player,
    /// Head of a worm; its health lives in the encounter
    Boss { encounter: EncounterId },
    Segment(Segment),
    Turret(Turret),
    Grunt(Grunt),
    Projectile(Projectile),
    FollowOn(FollowOn),
}

impl EntityKind {
    /// Damage capability of this variant, if it has one
    pub fn as_combatant_mut(&mut self) -> Option<&mut dyn Combatant> {
        match self {
            EntityKind::Segment(segment) => Some(segment),
            EntityKind::Turret(turret) => Some(turret),
            EntityKind::Grunt(grunt) => Some(grunt),
            EntityKind::Player
            | EntityKind::Boss { .. }
            | EntityKind::Projectile(_)
            | EntityKind::FollowOn(_) => None,
        }
    }
}

/// A live entity
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub position: Vec2,
    pub kind: EntityKind,
}

/// Pathing state for an entity that moves on its own
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    pub target: Option<EntityId>,
    pub max_speed: f32,
    pub mode: AiMode,
}

impl Default for Mover {
    fn default() -> Self {
        Self {
            target: None,
            max_speed: 0.0,
            mode: AiMode::Melee,
        }
    }
}

/// Result of hitting a world entity
#[derive(Debug, Clone, PartialEq)]
pub struct DamageReport {
    pub outcome: DamageOutcome,
    /// Present when the hit killed; already applied to the world
    pub aftermath: Option<Aftermath>,
}

impl DamageReport {
    fn ignored() -> Self {
        Self {
            outcome: DamageOutcome::Ignored,
            aftermath: None,
        }
    }
}

/// The explicit entity registry
#[derive(Debug, Clone)]
pub struct World {
    entities: BTreeMap<EntityId, Entity>,
    movers: BTreeMap<EntityId, Mover>,
    indicators: BTreeMap<(EntityId, String), i32>,
    flags: BTreeMap<(EntityId, String), bool>,
    /// Every cue fired, oldest first
    cues: Vec<(EntityId, String)>,
    /// Every projectile launched, oldest first
    launched: Vec<ProjectileSpawn>,
    /// Non-projectile entities removed since the last drain
    removed: Vec<EntityId>,
    turret_health: f32,
    next_id: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            movers: BTreeMap::new(),
            indicators: BTreeMap::new(),
            flags: BTreeMap::new(),
            cues: Vec::new(),
            launched: Vec::new(),
            removed: Vec::new(),
            turret_health: DEFAULT_TURRET_HEALTH,
            next_id: 1,
        }
    }

    pub fn with_turret_health(mut self, health: f32) -> Self {
        self.turret_health = health;
        self
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, position: Vec2, kind: impl FnOnce(EntityId) -> EntityKind) -> EntityId {
        let id = self.next_entity_id();
        self.entities.insert(
            id,
            Entity {
                id,
                position,
                kind: kind(id),
            },
        );
        id
    }

    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        self.insert(position, |_| EntityKind::Player)
    }

    pub fn spawn_boss(&mut self, encounter: EncounterId, position: Vec2) -> EntityId {
        let id = self.insert(position, |_| EntityKind::Boss { encounter });
        self.movers.insert(id, Mover::default());
        id
    }

    pub fn spawn_grunt(&mut self, position: Vec2, health: f32) -> EntityId {
        self.insert(position, |id| {
            EntityKind::Grunt(Grunt {
                id,
                vitals: Vitals::new(health),
            })
        })
    }

    /// Teleport an entity; false if it does not exist
    pub fn move_entity(&mut self, id: EntityId, position: Vec2) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.position = position;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    fn count(&self, pred: impl Fn(&EntityKind) -> bool) -> usize {
        self.entities.values().filter(|e| pred(&e.kind)).count()
    }

    pub fn turret_count(&self) -> usize {
        self.count(|k| matches!(k, EntityKind::Turret(_)))
    }

    pub fn projectile_count(&self) -> usize {
        self.count(|k| matches!(k, EntityKind::Projectile(_)))
    }

    pub fn grunt_count(&self) -> usize {
        self.count(|k| matches!(k, EntityKind::Grunt(_)))
    }

    pub fn turrets(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| matches!(e.kind, EntityKind::Turret(_)))
            .map(|e| e.id)
            .collect()
    }

    /// First follow-on object of the given kind
    pub fn follow_on(&self, kind: FollowOn) -> Option<EntityId> {
        self.entities
            .values()
            .find(|e| e.kind == EntityKind::FollowOn(kind))
            .map(|e| e.id)
    }

    pub fn indicator(&self, entity: EntityId, name: &str) -> Option<i32> {
        self.indicators.get(&(entity, name.to_string())).copied()
    }

    pub fn flag(&self, entity: EntityId, name: &str) -> Option<bool> {
        self.flags.get(&(entity, name.to_string())).copied()
    }

    pub fn cues(&self) -> &[(EntityId, String)] {
        &self.cues
    }

    pub fn launched(&self) -> &[ProjectileSpawn] {
        &self.launched
    }

    pub fn move_target(&self, mover: EntityId) -> Option<EntityId> {
        self.movers.get(&mover).and_then(|m| m.target)
    }

    pub fn max_speed(&self, mover: EntityId) -> Option<f32> {
        self.movers.get(&mover).map(|m| m.max_speed)
    }

    pub fn ai_mode(&self, mover: EntityId) -> Option<AiMode> {
        self.movers.get(&mover).map(|m| m.mode)
    }

    /// Entities removed since the last call
    pub fn drain_removed(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.removed)
    }

    /// Hit an entity; a lethal hit runs its death and applies the aftermath
    pub fn damage(&mut self, id: EntityId, amount: f32) -> DamageReport {
        let Some(combatant) = self
            .entities
            .get_mut(&id)
            .and_then(|e| e.kind.as_combatant_mut())
        else {
            return DamageReport::ignored();
        };

        let outcome = combatant.take_damage(amount);
        let aftermath = (outcome == DamageOutcome::Lethal).then(|| combatant.die());
        if let Some(aftermath) = &aftermath {
            aftermath.apply(self);
        }
        DamageReport { outcome, aftermath }
    }

    /// Reset every combatant in the world to its spawn-time state
    pub fn reset_all(&mut self) -> usize {
        let aftermaths: Vec<Aftermath> = self
            .entities
            .values_mut()
            .filter_map(|e| e.kind.as_combatant_mut())
            .map(|c| c.reset())
            .collect();
        for aftermath in &aftermaths {
            aftermath.apply(self);
        }
        aftermaths.len()
    }

    fn remove(&mut self, id: EntityId) {
        let Some(entity) = self.entities.remove(&id) else {
            return;
        };
        self.movers.remove(&id);

        match entity.kind {
            EntityKind::Projectile(_) => return,
            EntityKind::Boss { encounter } => {
                // The body goes down with its head
                let body: Vec<EntityId> = self
                    .entities
                    .values()
                    .filter(|e| matches!(&e.kind, EntityKind::Segment(s) if s.owner == encounter))
                    .map(|e| e.id)
                    .collect();
                for segment in body {
                    self.entities.remove(&segment);
                    self.removed.push(segment);
                }
            }
            _ => {}
        }
        self.removed.push(id);
    }

    /// Advance movement and projectiles by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.step_movers(dt);
        self.step_segments();
        self.step_projectiles(dt);
    }

    fn step_movers(&mut self, dt: f32) {
        let plans: Vec<(EntityId, Vec2, Mover)> = self
            .movers
            .iter()
            .filter_map(|(&id, &mover)| {
                let target = self.entities.get(&mover.target?)?.position;
                Some((id, target, mover))
            })
            .collect();

        for (id, target, mover) in plans {
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            let offset = entity.position - target;
            let goal = match mover.mode {
                AiMode::Melee => target + offset.clamp_length_max(MELEE_REACH),
                AiMode::Ranged => target + offset.normalize_or_zero() * RANGED_STANDOFF,
            };
            let to_goal = goal - entity.position;
            let reach = mover.max_speed * dt;
            entity.position += to_goal.clamp_length_max(reach);
        }
    }

    fn step_segments(&mut self) {
        let links: Vec<(EntityId, EntityId)> = self
            .entities
            .values()
            .filter_map(|e| match &e.kind {
                EntityKind::Segment(s) => Some((e.id, s.linked_to)),
                _ => None,
            })
            .collect();

        // Id order is chain order, so each link sees its predecessor's new position
        for (id, link) in links {
            let Some(anchor) = self.entities.get(&link).map(|e| e.position) else {
                continue;
            };
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            let offset = entity.position - anchor;
            if offset.length() > SEGMENT_SPACING {
                entity.position = anchor + offset.normalize_or_zero() * SEGMENT_SPACING;
            }
        }
    }

    fn step_projectiles(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for entity in self.entities.values_mut() {
            if let EntityKind::Projectile(projectile) = &mut entity.kind {
                entity.position += projectile.velocity * dt;
                projectile.age += dt;
                if projectile.age >= PROJECTILE_LIFETIME {
                    expired.push(entity.id);
                }
            }
        }
        for id in expired {
            self.remove(id);
        }
    }
}

impl WorldQuery for World {
    fn nearest_player(&self, origin: Vec2, radius: f32) -> Option<PlayerSighting> {
        let radius_sq = radius * radius;
        self.entities
            .values()
            .filter(|e| e.kind == EntityKind::Player)
            .map(|e| (e, e.position.distance_squared(origin)))
            .filter(|&(_, d)| d <= radius_sq)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(e, _)| PlayerSighting {
                id: e.id,
                position: e.position,
            })
    }

    fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.entities.get(&id).map(|e| e.position)
    }
}

impl Movement for World {
    fn set_move_target(&mut self, mover: EntityId, target: EntityId) {
        self.movers.entry(mover).or_default().target = Some(target);
    }

    fn set_max_speed(&mut self, mover: EntityId, speed: f32) {
        self.movers.entry(mover).or_default().max_speed = speed;
    }

    fn set_ai_mode(&mut self, mover: EntityId, mode: AiMode) {
        self.movers.entry(mover).or_default().mode = mode;
    }
}

impl Presentation for World {
    fn set_indicator(&mut self, entity: EntityId, name: &str, value: i32) {
        self.indicators.insert((entity, name.to_string()), value);
    }

    fn set_flag(&mut self, entity: EntityId, name: &str, value: bool) {
        self.flags.insert((entity, name.to_string()), value);
    }

    fn trigger_cue(&mut self, entity: EntityId, cue: &str) {
        self.cues.push((entity, cue.to_string()));
    }
}

impl ProjectileSpawner for World {
    fn spawn_projectile(&mut self, shot: ProjectileSpawn) {
        self.insert(shot.origin, |_| {
            EntityKind::Projectile(Projectile {
                team: shot.team,
                source: shot.source,
                velocity: shot.launch.velocity(),
                age: 0.0,
            })
        });
        self.launched.push(shot);
    }
}

impl EntitySpawner for World {
    fn spawn_segment(
        &mut self,
        owner: EncounterId,
        index: usize,
        position: Vec2,
        linked_to: EntityId,
    ) -> Option<EntityId> {
        let id = self.insert(position, |id| {
            EntityKind::Segment(Segment {
                id,
                owner,
                index,
                linked_to,
                vitals: Vitals::new(1.0),
            })
        });
        Some(id)
    }

    fn spawn_turret(&mut self, owner: EncounterId, position: Vec2) -> Option<EntityId> {
        let health = self.turret_health;
        Some(self.insert(position, |id| EntityKind::Turret(Turret::new(id, owner, health))))
    }

    fn spawn_follow_on(&mut self, kind: FollowOn, position: Vec2) -> Option<EntityId> {
        Some(self.insert(position, |_| EntityKind::FollowOn(kind)))
    }

    fn quiet_remove(&mut self, id: EntityId) {
        let aftermath = self
            .entities
            .get_mut(&id)
            .and_then(|e| e.kind.as_combatant_mut())
            .map(|c| c.quiet_die());
        match aftermath {
            Some(aftermath) => aftermath.apply(self),
            None => self.remove(id),
        }
    }

    fn despawn(&mut self, id: EntityId) {
        self.remove(id);
    }
}
