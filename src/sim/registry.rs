//! Spawn registry for the sub-entities a boss owns
//!
//! Body segments form a fixed chain built once at spawn; turrets come and go.
//! Only turret membership is mutable, and `add`/`remove`/`count` refer to it.

use serde::{Deserialize, Serialize};

use super::host::EntityId;

/// One link of the boss body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySegment {
    /// Position in the chain, 0 is the head
    pub index: usize,
    pub entity: EntityId,
    /// Predecessor this segment is jointed to (`None` for the head)
    pub linked_to: Option<EntityId>,
}

/// Owned sub-entities of one encounter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRegistry {
    /// Body chain, head first
    segments: Vec<BodySegment>,
    /// Live turrets in spawn order
    turrets: Vec<EntityId>,
}

impl SpawnRegistry {
    /// Registry whose chain starts with the pre-existing head
    pub fn new(head: EntityId) -> Self {
        Self {
            segments: vec![BodySegment {
                index: 0,
                entity: head,
                linked_to: None,
            }],
            turrets: Vec::new(),
        }
    }

    /// Append a segment jointed to the current tail
    pub fn attach_segment(&mut self, entity: EntityId) -> BodySegment {
        let tail = self.tail();
        let segment = BodySegment {
            index: self.segments.len(),
            entity,
            linked_to: Some(tail),
        };
        self.segments.push(segment);
        segment
    }

    /// Last segment of the chain
    pub fn tail(&self) -> EntityId {
        // The head is inserted at construction, so the chain is never empty
        self.segments[self.segments.len() - 1].entity
    }

    pub fn segments(&self) -> &[BodySegment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&BodySegment> {
        self.segments.get(index)
    }

    /// Whole body length including the head
    pub fn body_len(&self) -> usize {
        self.segments.len()
    }

    /// Register a turret. Returns false if it was already registered.
    pub fn add(&mut self, turret: EntityId) -> bool {
        if self.turrets.contains(&turret) {
            return false;
        }
        self.turrets.push(turret);
        true
    }

    /// Deregister a turret. Removing an absent turret is a no-op returning false.
    pub fn remove(&mut self, turret: EntityId) -> bool {
        match self.turrets.iter().position(|&t| t == turret) {
            Some(i) => {
                self.turrets.remove(i);
                true
            }
            None => false,
        }
    }

    /// Number of live turrets
    pub fn count(&self) -> usize {
        self.turrets.len()
    }

    pub fn contains(&self, turret: EntityId) -> bool {
        self.turrets.contains(&turret)
    }

    pub fn turrets(&self) -> &[EntityId] {
        &self.turrets
    }

    /// Take every turret out of the registry, newest first
    pub fn drain_turrets(&mut self) -> Vec<EntityId> {
        let mut drained: Vec<EntityId> = self.turrets.drain(..).collect();
        drained.reverse();
        drained
    }
}
