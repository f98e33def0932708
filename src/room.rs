//! Room spawn sequencing and clear detection
//!
//! A room sits idle until the fight starts, releases its spawn groups one
//! after another, then waits for every member to die before unlocking the
//! way on.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{EntityId, EntitySpawner};
use crate::world::World;

/// Seconds between consecutive spawn groups
pub const GROUP_INTERVAL: f32 = 1.0;

/// One enemy placed by a spawn group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub position: Vec2,
    pub health: f32,
}

/// Enemies that arrive together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    pub entries: Vec<SpawnEntry>,
}

/// Pending spawn groups, released in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnSequence {
    groups: Vec<SpawnGroup>,
    next: usize,
}

impl SpawnSequence {
    pub fn new(groups: Vec<SpawnGroup>) -> Self {
        Self { groups, next: 0 }
    }

    /// Take the next group, if any remain
    pub fn next_group(&mut self) -> Option<&SpawnGroup> {
        let group = self.groups.get(self.next)?;
        self.next += 1;
        Some(group)
    }

    pub fn remaining(&self) -> usize {
        self.groups.len() - self.next
    }

    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

/// Room lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    /// Waiting for the fight to start
    Idle,
    /// Releasing spawn groups
    Spawning,
    /// Everything spawned, waiting for the members to die
    Fighting,
    /// All members dead, area unlocked
    Cleared,
}

/// Something the room did during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    Locked,
    Spawned { group: usize, count: usize },
    Fighting,
    Cleared,
}

/// A lockable arena and the enemies that must die to clear it
#[derive(Debug, Clone)]
pub struct Room {
    state: RoomState,
    sequence: SpawnSequence,
    members: BTreeSet<EntityId>,
    /// Members this room spawned itself, oldest first
    released: Vec<EntityId>,
    groups_spawned: usize,
    next_group_at: f32,
}

impl Room {
    pub fn new(sequence: SpawnSequence) -> Self {
        Self {
            state: RoomState::Idle,
            sequence,
            members: BTreeSet::new(),
            released: Vec::new(),
            groups_spawned: 0,
            next_group_at: 0.0,
        }
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.members.iter().copied()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_cleared(&self) -> bool {
        self.state == RoomState::Cleared
    }

    /// Start the fight; only an idle room locks
    pub fn lock(&mut self, now: f32) -> Option<RoomEvent> {
        if self.state != RoomState::Idle {
            return None;
        }
        self.state = RoomState::Spawning;
        self.next_group_at = now;
        log::info!(
            "Room locked, {} spawn groups pending",
            self.sequence.remaining()
        );
        Some(RoomEvent::Locked)
    }

    pub fn add_member(&mut self, id: EntityId) {
        self.members.insert(id);
    }

    /// Returns false if `id` was not a member
    pub fn remove_member(&mut self, id: EntityId) -> bool {
        self.members.remove(&id)
    }

    /// Collect deaths from the world and move the room along
    pub fn step(&mut self, world: &mut World, now: f32) -> Option<RoomEvent> {
        for id in world.drain_removed() {
            self.remove_member(id);
        }

        match self.state {
            RoomState::Idle | RoomState::Cleared => None,
            RoomState::Spawning => {
                if now < self.next_group_at {
                    return None;
                }
                let Some(group) = self.sequence.next_group() else {
                    self.state = RoomState::Fighting;
                    log::info!("Room fighting, {} members", self.members.len());
                    return Some(RoomEvent::Fighting);
                };
                let spawned: Vec<EntityId> = group
                    .entries
                    .iter()
                    .map(|entry| world.spawn_grunt(entry.position, entry.health))
                    .collect();
                let count = spawned.len();
                self.members.extend(spawned.iter().copied());
                self.released.extend(spawned);

                let group = self.groups_spawned;
                self.groups_spawned += 1;
                self.next_group_at = now + GROUP_INTERVAL;
                log::debug!("Room spawned group {} ({} enemies)", group, count);
                Some(RoomEvent::Spawned { group, count })
            }
            RoomState::Fighting => {
                if !self.members.is_empty() {
                    return None;
                }
                self.state = RoomState::Cleared;
                log::info!("Room cleared, area unlocked");
                Some(RoomEvent::Cleared)
            }
        }
    }

    /// Back to idle with the spawn sequence rewound
    ///
    /// Enemies the room released and that are still alive are removed quietly,
    /// so the next lock spawns every group exactly once.
    pub fn reset(&mut self, world: &mut World) {
        for id in world.drain_removed() {
            self.remove_member(id);
        }
        for id in self.released.drain(..) {
            if self.members.remove(&id) {
                world.quiet_remove(id);
            }
        }
        world.drain_removed();
        self.state = RoomState::Idle;
        self.sequence.rewind();
        self.groups_spawned = 0;
        self.next_group_at = 0.0;
    }
}
