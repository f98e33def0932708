//! Damage and death for everything that can be hurt
//!
//! Each entity variant implements [`Combatant`]. Death never reaches into the
//! world directly: it returns an [`Aftermath`] that the owner of the world
//! applies once the entity is no longer borrowed.

use serde::{Deserialize, Serialize};

use super::host::{EncounterHost, EncounterId, EntityId};

/// Health and hit-state flags
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub max_health: f32,
    /// Hits land but deal no damage
    pub invulnerable: bool,
    /// Hits pass straight through
    pub intangible: bool,
    /// Touching this entity hurts the player
    pub contact_damage: bool,
    pub alive: bool,
}

impl Vitals {
    /// A fighting-fit entity
    pub fn new(health: f32) -> Self {
        Self {
            health,
            max_health: health,
            invulnerable: false,
            intangible: false,
            contact_damage: true,
            alive: true,
        }
    }

    /// An entity that cannot be hit or hurt yet
    pub fn dormant(health: f32) -> Self {
        Self {
            invulnerable: true,
            intangible: true,
            contact_damage: false,
            ..Self::new(health)
        }
    }

    /// Apply a hit and report what it did
    pub fn apply_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive || self.intangible {
            return DamageOutcome::Ignored;
        }
        if self.invulnerable {
            return DamageOutcome::Absorbed;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            DamageOutcome::Lethal
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Back to full health, alive
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.alive = true;
    }
}

/// What a hit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Passed through (intangible or already dead)
    Ignored,
    /// Landed without effect (invulnerable)
    Absorbed,
    /// Health reduced
    Wounded,
    /// Health reached zero; the caller must invoke `die`
    Lethal,
    /// This body part takes no damage itself; route the hit to the boss
    Forward(EncounterId),
}

impl DamageOutcome {
    /// The hit connected (used to stop piercing projectiles)
    pub fn landed(self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

/// Side effects of a death or reset, applied by whoever owns the world
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aftermath {
    /// Encounter that must deregister the dead entity
    pub notify_owner: Option<EncounterId>,
    /// Entities to remove without their own death effects
    pub quiet_remove: Vec<EntityId>,
    /// Mover whose speed drops to zero
    pub halt: Option<EntityId>,
    /// Integer animation parameter to set
    pub indicator: Option<(EntityId, &'static str, i32)>,
    /// Animation trigger to fire
    pub cue: Option<(EntityId, &'static str)>,
    /// Points awarded
    pub score: u32,
    /// Entity to remove from the world right away
    pub despawn: Option<EntityId>,
}

impl Aftermath {
    /// Carry out the world-facing part; owner notification and score stay with the caller
    pub fn apply<H: EncounterHost>(&self, host: &mut H) {
        for &id in &self.quiet_remove {
            host.quiet_remove(id);
        }
        if let Some(mover) = self.halt {
            host.set_max_speed(mover, 0.0);
        }
        if let Some((entity, name, value)) = self.indicator {
            host.set_indicator(entity, name, value);
        }
        if let Some((entity, cue)) = self.cue {
            host.trigger_cue(entity, cue);
        }
        if let Some(id) = self.despawn {
            host.despawn(id);
        }
    }
}

/// Capability shared by every entity that can be hurt
pub trait Combatant {
    fn vitals(&self) -> &Vitals;
    fn vitals_mut(&mut self) -> &mut Vitals;

    fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        self.vitals_mut().apply_damage(amount)
    }

    /// Normal death with drops, score and cues
    fn die(&mut self) -> Aftermath;

    /// Removal without any death side effects
    fn quiet_die(&mut self) -> Aftermath;

    /// Return to the spawn-time state
    fn reset(&mut self) -> Aftermath;
}

/// Points for destroying a turret
pub const TURRET_SCORE: u32 = 50;

/// A stationary gun spawned by the boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    pub id: EntityId,
    /// Creator to notify on death; a lookup key, not ownership
    pub owner: EncounterId,
    pub vitals: Vitals,
}

impl Turret {
    pub fn new(id: EntityId, owner: EncounterId, health: f32) -> Self {
        Self {
            id,
            owner,
            vitals: Vitals::new(health),
        }
    }
}

impl Combatant for Turret {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        Aftermath {
            notify_owner: Some(self.owner),
            cue: Some((self.id, "Die")),
            score: TURRET_SCORE,
            despawn: Some(self.id),
            ..Default::default()
        }
    }

    fn quiet_die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        Aftermath {
            despawn: Some(self.id),
            ..Default::default()
        }
    }

    fn reset(&mut self) -> Aftermath {
        self.vitals.restore();
        Aftermath::default()
    }
}

/// One trailing link of the boss body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: EntityId,
    pub owner: EncounterId,
    pub index: usize,
    /// Predecessor this link is jointed to
    pub linked_to: EntityId,
    pub vitals: Vitals,
}

impl Combatant for Segment {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    /// The body shares the head's health pool
    fn take_damage(&mut self, _amount: f32) -> DamageOutcome {
        if !self.vitals.alive {
            return DamageOutcome::Ignored;
        }
        DamageOutcome::Forward(self.owner)
    }

    fn die(&mut self) -> Aftermath {
        // Segments only ever go down together with the head
        self.quiet_die()
    }

    fn quiet_die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        Aftermath {
            despawn: Some(self.id),
            ..Default::default()
        }
    }

    fn reset(&mut self) -> Aftermath {
        self.vitals.restore();
        Aftermath::default()
    }
}

/// Points for a generic room enemy
pub const GRUNT_SCORE: u32 = 10;

/// Generic room enemy with no behaviour of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grunt {
    pub id: EntityId,
    pub vitals: Vitals,
}

impl Combatant for Grunt {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        Aftermath {
            cue: Some((self.id, "Die")),
            score: GRUNT_SCORE,
            despawn: Some(self.id),
            ..Default::default()
        }
    }

    fn quiet_die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        Aftermath {
            despawn: Some(self.id),
            ..Default::default()
        }
    }

    fn reset(&mut self) -> Aftermath {
        self.vitals.restore();
        Aftermath::default()
    }
}
