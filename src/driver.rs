//! Encounter driver
//!
//! Owns the world, the boss and its room, and runs them on a fixed timestep.
//! Combat from outside (player shots, scripted hits) comes in through
//! [`EncounterDriver::damage`].

use glam::Vec2;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::room::{Room, RoomEvent, SpawnSequence};
use crate::settings::EncounterSettings;
use crate::sim::{
    Combatant, DamageOutcome, EncounterId, EntityId, Phase, PhaseChange, TickInput, WormBoss,
    WorldQuery, tick,
};
use crate::world::World;

/// Longest frame the accumulator accepts (seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// Whether the encounter is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterOutcome {
    InProgress,
    /// Boss and room members dead, the area is unlocked
    Cleared,
    /// Torn down without a fight; nothing unlocked, no rewards
    Dismissed,
}

/// Runs one boss encounter inside one room
#[derive(Debug, Clone)]
pub struct EncounterDriver {
    world: World,
    boss: WormBoss,
    room: Room,
    accumulator: f32,
    now: f32,
    score: u32,
    /// Attack phases entered so far
    attacks: u32,
    outcome: EncounterOutcome,
}

impl EncounterDriver {
    /// Place the boss at `origin` in a room with no extra spawns
    pub fn new(settings: EncounterSettings, origin: Vec2) -> Self {
        Self::with_room(settings, origin, SpawnSequence::default())
    }

    pub fn with_room(settings: EncounterSettings, origin: Vec2, sequence: SpawnSequence) -> Self {
        let mut world = World::new().with_turret_health(settings.turret_health);
        let id = EncounterId(1);
        let head = world.spawn_boss(id, origin);
        let boss = WormBoss::spawn(id, head, origin, settings, &mut world);

        let mut room = Room::new(sequence);
        room.add_member(head);

        Self {
            world,
            boss,
            room,
            accumulator: 0.0,
            now: 0.0,
            score: 0,
            attacks: 0,
            outcome: EncounterOutcome::InProgress,
        }
    }

    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        self.world.spawn_player(position)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn boss(&self) -> &WormBoss {
        &self.boss
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn attacks(&self) -> u32 {
        self.attacks
    }

    pub fn outcome(&self) -> EncounterOutcome {
        self.outcome
    }

    /// Feed one rendered frame; returns the substeps run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// One fixed simulation step
    pub fn step(&mut self) -> Option<PhaseChange> {
        self.now += SIM_DT;

        let input = TickInput {
            player_position: self
                .boss
                .target()
                .and_then(|player| self.world.position_of(player)),
        };
        let change = tick(&mut self.boss, self.now, &input, &mut self.world);
        match change {
            Some(PhaseChange {
                to: Phase::Awakening,
                ..
            }) => {
                self.room.lock(self.now);
            }
            Some(PhaseChange { to, .. }) if to.is_attack() => self.attacks += 1,
            _ => {}
        }

        self.world.step(SIM_DT);

        if let Some(RoomEvent::Cleared) = self.room.step(&mut self.world, self.now) {
            self.outcome = EncounterOutcome::Cleared;
            log::info!(
                "Encounter cleared at {:.2}s, score {}",
                self.now,
                self.score
            );
        }
        change
    }

    /// Hit an entity; body segments pass the hit on to the head
    pub fn damage(&mut self, id: EntityId, amount: f32) -> DamageOutcome {
        if id == self.boss.entity() {
            return self.damage_boss(amount);
        }

        let report = self.world.damage(id, amount);
        if let DamageOutcome::Forward(owner) = report.outcome {
            if owner == self.boss.id() {
                return self.damage_boss(amount);
            }
        }
        if let Some(aftermath) = report.aftermath {
            if aftermath.notify_owner == Some(self.boss.id()) {
                self.boss.on_turret_destroyed(id);
            }
            self.score += aftermath.score;
        }
        report.outcome
    }

    fn damage_boss(&mut self, amount: f32) -> DamageOutcome {
        let outcome = self.boss.take_damage(amount);
        if outcome == DamageOutcome::Lethal {
            let aftermath = self.boss.die();
            aftermath.apply(&mut self.world);
            self.score += aftermath.score;
        }
        outcome
    }

    /// Put the boss back to sleep and restore every combatant
    ///
    /// Enemies the room already released are removed, so they spawn again on
    /// the next wake-up. Only an encounter in progress resets.
    pub fn reset(&mut self) {
        if self.outcome != EncounterOutcome::InProgress {
            return;
        }
        let aftermath = self.boss.reset();
        aftermath.apply(&mut self.world);
        self.room.reset(&mut self.world);
        self.world.reset_all();
        log::info!("Encounter reset at {:.2}s", self.now);
    }

    /// Remove the boss, its turrets and the room's enemies without rewards,
    /// e.g. when the area unloads mid-fight
    pub fn dismiss(&mut self) {
        if self.outcome != EncounterOutcome::InProgress {
            return;
        }
        let aftermath = self.boss.quiet_die();
        aftermath.apply(&mut self.world);
        self.room.reset(&mut self.world);
        self.outcome = EncounterOutcome::Dismissed;
        log::info!("Encounter dismissed at {:.2}s", self.now);
    }
}
