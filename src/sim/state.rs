//! Boss encounter state and core types
//!
//! Everything the phase machine reads or writes between ticks lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::Vitals;
use super::host::{EncounterHost, EncounterId, EntityId};
use super::registry::SpawnRegistry;
use crate::consts::{ARENA_MARGIN, COOLDOWN_SPREAD};
use crate::settings::EncounterSettings;

/// Boss behaviour phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Before a player comes close, does nothing
    Sleep,
    /// Intro between being spotted and the first wander
    Awakening,
    /// Roams and picks the next attack when its cooldown runs out
    Wander,
    /// Each segment fires a ring in turn, head first
    Rings,
    /// Drops turrets around the arena
    Turrets,
    /// Head fires line-bursts at the player
    Lines,
    /// Death sequence, terminal
    Death,
}

impl Phase {
    /// Value of the "Phase" animation parameter while in this phase
    pub fn anim_state(self) -> i32 {
        match self {
            Phase::Sleep | Phase::Awakening => 0,
            Phase::Death => -1,
            Phase::Wander | Phase::Rings | Phase::Turrets | Phase::Lines => 1,
        }
    }

    pub fn is_attack(self) -> bool {
        matches!(self, Phase::Rings | Phase::Turrets | Phase::Lines)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Sleep => "Sleep",
            Phase::Awakening => "Awakening",
            Phase::Wander => "Wander",
            Phase::Rings => "Rings",
            Phase::Turrets => "Turrets",
            Phase::Lines => "Lines",
            Phase::Death => "Death",
        }
    }
}

/// Current phase together with the progress counters that only it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseState {
    Sleep,
    Awakening,
    Wander,
    /// `firing_index` is the segment that fires next
    Rings { firing_index: usize },
    /// Turrets spawned during this phase instance
    Turrets { spawned: u32 },
    /// Line-bursts fired during this phase instance
    Lines { fired: u32 },
    Death,
}

impl PhaseState {
    /// Fresh state for entering `phase`, counters at zero
    pub fn enter(phase: Phase) -> Self {
        match phase {
            Phase::Sleep => PhaseState::Sleep,
            Phase::Awakening => PhaseState::Awakening,
            Phase::Wander => PhaseState::Wander,
            Phase::Rings => PhaseState::Rings { firing_index: 0 },
            Phase::Turrets => PhaseState::Turrets { spawned: 0 },
            Phase::Lines => PhaseState::Lines { fired: 0 },
            Phase::Death => PhaseState::Death,
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            PhaseState::Sleep => Phase::Sleep,
            PhaseState::Awakening => Phase::Awakening,
            PhaseState::Wander => Phase::Wander,
            PhaseState::Rings { .. } => Phase::Rings,
            PhaseState::Turrets { .. } => Phase::Turrets,
            PhaseState::Lines { .. } => Phase::Lines,
            PhaseState::Death => Phase::Death,
        }
    }
}

/// Encounter timers, all in seconds on the host's clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncounterClock {
    /// Latest time seen; never moves backwards
    pub now: f32,
    pub phase_entered_at: f32,
    /// Next beat of the current phase (also the intro and death timers)
    pub next_attack_at: f32,
    /// When Wander picks the next attack
    pub next_phase_decision_at: f32,
    /// Base wander cooldown
    pub phase_cooldown: f32,
    /// Cooldown rolled on the latest Wander entry
    pub rolled_cooldown: f32,
}

impl EncounterClock {
    pub fn new(phase_cooldown: f32) -> Self {
        Self {
            now: 0.0,
            phase_entered_at: 0.0,
            next_attack_at: 0.0,
            next_phase_decision_at: phase_cooldown,
            phase_cooldown,
            rolled_cooldown: phase_cooldown,
        }
    }

    /// Move to `now`; earlier times are ignored
    pub fn advance(&mut self, now: f32) {
        if now > self.now {
            self.now = now;
        }
    }

    pub fn mark_phase_entry(&mut self) {
        self.phase_entered_at = self.now;
    }

    pub fn schedule_attack(&mut self, delay: f32) {
        self.next_attack_at = self.now + delay;
    }

    /// Strictly past the scheduled beat
    pub fn attack_due(&self) -> bool {
        self.now > self.next_attack_at
    }

    /// At or past the scheduled beat
    pub fn attack_ready(&self) -> bool {
        self.now >= self.next_attack_at
    }

    /// Roll this wander's cooldown in `[phase_cooldown, 1.2 * phase_cooldown]`
    pub fn roll_cooldown(&mut self, rng: &mut Pcg32) {
        let low = self.phase_cooldown;
        let high = low * COOLDOWN_SPREAD;
        self.rolled_cooldown = if high > low {
            rng.random_range(low..=high)
        } else {
            low
        };
        self.next_phase_decision_at = self.phase_entered_at + self.rolled_cooldown;
    }

    pub fn decision_due(&self) -> bool {
        self.now > self.next_phase_decision_at
    }
}

/// The worm boss encounter
#[derive(Debug, Clone)]
pub struct WormBoss {
    pub(crate) id: EncounterId,
    /// Head entity in the host world
    pub(crate) entity: EntityId,
    pub(crate) settings: EncounterSettings,
    pub(crate) state: PhaseState,
    pub(crate) clock: EncounterClock,
    pub(crate) registry: SpawnRegistry,
    pub(crate) vitals: Vitals,
    /// Where the boss woke up; turrets and rewards are placed around it
    pub(crate) arena_center: Vec2,
    /// Player being hunted
    pub(crate) target: Option<EntityId>,
    pub(crate) rng: Pcg32,
    /// Death sequence complete and the head despawned
    pub(crate) finished: bool,
}

impl WormBoss {
    /// Set up the encounter for a head entity already placed at `origin`
    ///
    /// Spawns the trailing body segments, each jointed to its predecessor.
    pub fn spawn<H: EncounterHost>(
        id: EncounterId,
        entity: EntityId,
        origin: Vec2,
        settings: EncounterSettings,
        host: &mut H,
    ) -> Self {
        let mut registry = SpawnRegistry::new(entity);
        for index in 1..=settings.segment_count as usize {
            let link = registry.tail();
            match host.spawn_segment(id, index, origin, link) {
                Some(segment) => {
                    registry.attach_segment(segment);
                }
                None => log::warn!("Worm {}: segment {} refused by host", id.0, index),
            }
        }

        host.set_indicator(entity, "Phase", Phase::Sleep.anim_state());
        host.set_flag(entity, "Blue", settings.blue_mode);

        log::info!(
            "Worm {} spawned at ({:.1}, {:.1}) with {} segments",
            id.0,
            origin.x,
            origin.y,
            registry.body_len() - 1
        );

        Self {
            id,
            entity,
            state: PhaseState::Sleep,
            clock: EncounterClock::new(settings.phase_cooldown),
            registry,
            vitals: Vitals::dormant(settings.boss_health),
            arena_center: origin,
            target: None,
            rng: Pcg32::seed_from_u64(settings.seed),
            finished: false,
            settings,
        }
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn clock(&self) -> &EncounterClock {
        &self.clock
    }

    pub fn registry(&self) -> &SpawnRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EncounterSettings {
        &self.settings
    }

    pub fn arena_center(&self) -> Vec2 {
        self.arena_center
    }

    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Uniform point inside the arena, kept `ARENA_MARGIN` away from its edges
    pub(crate) fn random_point_in_arena(&mut self) -> Vec2 {
        let half = self.settings.arena_size - Vec2::splat(ARENA_MARGIN);
        let center = self.arena_center;
        let mut axis = |c: f32, h: f32| {
            if h > 0.0 {
                self.rng.random_range((c - h)..=(c + h))
            } else {
                c
            }
        };
        let x = axis(center.x, half.x);
        let y = axis(center.y, half.y);
        Vec2::new(x, y)
    }
}
