//! Per-frame boss update
//!
//! One call to [`tick`] per rendered frame advances the phase machine. Every
//! transition resolves inside the call; spawns and shots happen immediately
//! through the host. Attack phases only ever exit back to Wander, and Wander
//! is the only phase that picks an attack.

use glam::Vec2;
use rand::Rng;

use super::entity::{Aftermath, Combatant, Vitals};
use super::host::{AiMode, EncounterHost, EntityId, FollowOn, ProjectileSpawn, Team};
use super::pattern::{self, LaunchVector};
use super::state::{Phase, PhaseState, WormBoss};
use crate::aim_degrees;
use crate::consts::*;

/// Per-frame input for the encounter
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Live position of the hunted player, if it still exists
    pub player_position: Option<Vec2>,
}

/// A transition that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// Advance the encounter to time `now`
///
/// Returns the phase change made during this tick, if any.
pub fn tick<H: EncounterHost>(
    boss: &mut WormBoss,
    now: f32,
    input: &TickInput,
    host: &mut H,
) -> Option<PhaseChange> {
    if boss.finished {
        return None;
    }
    boss.clock.advance(now);
    let before = boss.phase();

    match boss.state {
        PhaseState::Sleep => look_for_player(boss, host),
        PhaseState::Awakening => {
            if boss.clock.attack_due() {
                boss.awaken(host);
            }
        }
        PhaseState::Wander => {
            if boss.clock.decision_due() {
                let next = boss.pick_phase();
                boss.enter(next, host);
            }
        }
        PhaseState::Rings { firing_index } => fire_ring(boss, firing_index, host),
        PhaseState::Turrets { spawned } => place_turret(boss, spawned, host),
        PhaseState::Lines { fired } => fire_line(boss, fired, input, host),
        PhaseState::Death => finish_death(boss, host),
    }

    let after = boss.phase();
    (after != before).then_some(PhaseChange {
        from: before,
        to: after,
    })
}

/// Sleep: wake up when a player comes into range
fn look_for_player<H: EncounterHost>(boss: &mut WormBoss, host: &mut H) {
    let Some(origin) = host.position_of(boss.entity) else {
        log::warn!("Worm {}: head missing from world", boss.id.0);
        return;
    };
    let Some(player) = host.nearest_player(origin, boss.settings.detection_radius) else {
        return;
    };

    boss.arena_center = origin;
    boss.target = Some(player.id);
    host.set_move_target(boss.entity, player.id);
    boss.enter(Phase::Awakening, host);
    for segment in boss.registry.segments() {
        host.trigger_cue(segment.entity, "Awaken");
    }
}

/// Rings: one ring per beat from each segment in turn, head first
fn fire_ring<H: EncounterHost>(boss: &mut WormBoss, firing_index: usize, host: &mut H) {
    if !boss.clock.attack_due() {
        return;
    }
    let Some(segment) = boss.registry.segment(firing_index).copied() else {
        boss.enter(Phase::Wander, host);
        return;
    };
    let Some(origin) = host.position_of(segment.entity) else {
        log::warn!("Worm {}: segment {} missing, ring skipped", boss.id.0, firing_index);
        return;
    };

    let rotation = RING_ROTATION_STEP * firing_index as f32;
    let shots = pattern::ring(RING_PROJECTILES, rotation, RING_SPEED);
    launch(boss.entity, origin, &shots, host);
    log::debug!("Worm {}: ring from segment {}", boss.id.0, firing_index);

    boss.state = PhaseState::Rings {
        firing_index: firing_index + 1,
    };
    boss.clock.schedule_attack(BEAT_INTERVAL);
}

/// Turrets: one turret per beat until the cap is reached
fn place_turret<H: EncounterHost>(boss: &mut WormBoss, spawned: u32, host: &mut H) {
    if boss.registry.count() >= boss.settings.max_turrets as usize {
        boss.enter(Phase::Wander, host);
        return;
    }
    if !boss.clock.attack_due() {
        return;
    }

    let position = boss.random_point_in_arena();
    let Some(turret) = host.spawn_turret(boss.id, position) else {
        log::warn!("Worm {}: turret refused by host", boss.id.0);
        return;
    };
    boss.registry.add(turret);
    log::debug!(
        "Worm {}: turret {} at ({:.1}, {:.1}), {} alive",
        boss.id.0,
        turret.0,
        position.x,
        position.y,
        boss.registry.count()
    );

    boss.state = PhaseState::Turrets {
        spawned: spawned + 1,
    };
    boss.clock.schedule_attack(BEAT_INTERVAL);
}

/// Lines: aimed, slowing line-bursts that speed up and come faster each time
fn fire_line<H: EncounterHost>(boss: &mut WormBoss, fired: u32, input: &TickInput, host: &mut H) {
    if !boss.clock.attack_ready() {
        return;
    }
    let Some(player) = input.player_position else {
        return;
    };
    let Some(origin) = host.position_of(boss.entity) else {
        return;
    };

    let angle = aim_degrees(origin, player);
    let start_speed = LINE_START_SPEED + fired as f32 * LINE_START_SPEED_STEP;
    let end_speed = LINE_END_SPEED + fired as f32 * LINE_END_SPEED_STEP;
    let shots = pattern::line_burst(LINE_PROJECTILES, start_speed, end_speed, angle);
    launch(boss.entity, origin, &shots, host);

    let fired = fired + 1;
    log::debug!("Worm {}: line-burst {} at {:.0} deg", boss.id.0, fired, angle);
    boss.state = PhaseState::Lines { fired };
    boss.clock
        .schedule_attack((LINE_DELAY_NUMERATOR / fired as f32).min(LINE_DELAY_CAP));

    if fired >= boss.settings.line_count {
        boss.enter(Phase::Wander, host);
    }
}

/// Death: after the delay, leave the rewards behind and remove the head
fn finish_death<H: EncounterHost>(boss: &mut WormBoss, host: &mut H) {
    if !boss.clock.attack_due() {
        return;
    }

    let (portal_offset, page_offset) = boss.settings.follow_on_offsets();
    if boss.settings.spawn_portal {
        host.spawn_follow_on(FollowOn::Portal, boss.arena_center + portal_offset);
    }
    if boss.settings.spawn_page {
        host.spawn_follow_on(FollowOn::Page, boss.arena_center + page_offset);
    }
    host.despawn(boss.entity);
    boss.finished = true;
    log::info!("Worm {}: defeated", boss.id.0);
}

fn launch<H: EncounterHost>(source: EntityId, origin: Vec2, shots: &[LaunchVector], host: &mut H) {
    for &launch in shots {
        host.spawn_projectile(ProjectileSpawn {
            origin,
            launch,
            team: Team::Enemy,
            source,
        });
    }
}

impl WormBoss {
    /// Enter `phase`: reset its counters, arm its timers, tell the collaborators
    pub(crate) fn enter<H: EncounterHost>(&mut self, phase: Phase, host: &mut H) {
        let from = self.phase();
        self.state = PhaseState::enter(phase);
        self.clock.mark_phase_entry();

        match phase {
            Phase::Awakening => self.clock.schedule_attack(AWAKEN_DELAY),
            Phase::Wander => {
                self.clock.roll_cooldown(&mut self.rng);
                host.set_max_speed(self.entity, self.settings.wander_speed);
            }
            Phase::Turrets => self.clock.schedule_attack(BEAT_INTERVAL),
            Phase::Death => self.clock.schedule_attack(DEATH_DELAY),
            Phase::Sleep | Phase::Rings | Phase::Lines => {}
        }
        host.set_indicator(self.entity, "Phase", phase.anim_state());

        log::info!(
            "Worm {}: {} -> {} at {:.2}s",
            self.id.0,
            from.as_str(),
            phase.as_str(),
            self.clock.now
        );
    }

    /// End of the intro: become hittable and start hunting
    pub(crate) fn awaken<H: EncounterHost>(&mut self, host: &mut H) {
        self.vitals.contact_damage = true;
        self.vitals.invulnerable = false;
        self.vitals.intangible = false;
        host.set_ai_mode(self.entity, AiMode::Melee);
        self.enter(Phase::Wander, host);
    }

    /// Choose the attack that follows a wander
    ///
    /// The draw is always taken, so the RNG stream does not depend on the
    /// turret count. With no turrets alive the answer is always Turrets. A
    /// draw of 1 enters Turrets even when the cap is reached (that phase then
    /// exits on its first tick) unless `strict_turret_cap` is set.
    pub(crate) fn pick_phase(&mut self) -> Phase {
        let draw: u32 = self.rng.random_range(0..3);
        log::debug!("Worm {}: phase draw {}", self.id.0, draw);

        if self.registry.count() == 0 {
            return Phase::Turrets;
        }
        match draw {
            0 => Phase::Rings,
            1 => {
                let capped = self.registry.count() >= self.settings.max_turrets as usize;
                if capped && self.settings.strict_turret_cap {
                    Phase::Rings
                } else {
                    Phase::Turrets
                }
            }
            _ => Phase::Lines,
        }
    }

    /// A turret this boss created was destroyed
    pub fn on_turret_destroyed(&mut self, turret: EntityId) {
        if self.registry.remove(turret) {
            log::debug!(
                "Worm {}: turret {} destroyed, {} left",
                self.id.0,
                turret.0,
                self.registry.count()
            );
        }
    }
}

impl Combatant for WormBoss {
    fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    /// Enter the death sequence and quietly clear every turret
    ///
    /// A boss already dying ignores further calls.
    fn die(&mut self) -> Aftermath {
        if self.phase() == Phase::Death {
            return Aftermath::default();
        }
        let from = self.phase();

        self.vitals.contact_damage = false;
        self.vitals.intangible = true;
        self.vitals.alive = false;
        self.state = PhaseState::Death;
        self.clock.mark_phase_entry();
        self.clock.schedule_attack(DEATH_DELAY);

        let turrets = self.registry.drain_turrets();
        log::info!(
            "Worm {}: {} -> Death at {:.2}s, clearing {} turrets",
            self.id.0,
            from.as_str(),
            self.clock.now,
            turrets.len()
        );

        Aftermath {
            quiet_remove: turrets,
            halt: Some(self.entity),
            indicator: Some((self.entity, "Phase", Phase::Death.anim_state())),
            ..Default::default()
        }
    }

    /// Vanish at once: no death sequence, no rewards
    fn quiet_die(&mut self) -> Aftermath {
        self.vitals.alive = false;
        self.vitals.contact_damage = false;
        self.vitals.intangible = true;
        self.state = PhaseState::Death;
        self.finished = true;
        Aftermath {
            quiet_remove: self.registry.drain_turrets(),
            despawn: Some(self.entity),
            ..Default::default()
        }
    }

    /// Back to sleep at full health, turrets cleared quietly
    fn reset(&mut self) -> Aftermath {
        if self.finished {
            return Aftermath::default();
        }
        self.vitals = Vitals::dormant(self.settings.boss_health);
        self.state = PhaseState::Sleep;
        self.clock.mark_phase_entry();
        self.target = None;
        Aftermath {
            quiet_remove: self.registry.drain_turrets(),
            halt: Some(self.entity),
            indicator: Some((self.entity, "Phase", Phase::Sleep.anim_state())),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EncounterSettings;
    use crate::sim::host::{EncounterId, EntitySpawner, WorldQuery};
    use crate::world::World;

    const BOSS_AT: Vec2 = Vec2::new(0.0, 0.0);

    fn settings() -> EncounterSettings {
        EncounterSettings {
            segment_count: 3,
            max_turrets: 2,
            line_count: 3,
            phase_cooldown: 5.0,
            ..Default::default()
        }
    }

    fn setup(settings: EncounterSettings) -> (World, WormBoss) {
        let mut world = World::new();
        let id = EncounterId(1);
        let head = world.spawn_boss(id, BOSS_AT);
        let boss = WormBoss::spawn(id, head, BOSS_AT, settings, &mut world);
        (world, boss)
    }

    /// Boss that has already woken and is wandering at t = 3
    fn awake(settings: EncounterSettings) -> (World, WormBoss) {
        let (mut world, mut boss) = setup(settings);
        world.spawn_player(Vec2::new(5.0, 0.0));
        tick(&mut boss, 0.5, &TickInput::default(), &mut world);
        tick(&mut boss, 3.0, &TickInput::default(), &mut world);
        assert_eq!(boss.phase(), Phase::Wander);
        (world, boss)
    }

    fn run(boss: &mut WormBoss, world: &mut World, now: f32) -> Option<PhaseChange> {
        tick(boss, now, &TickInput::default(), world)
    }

    #[test]
    fn test_spawn_builds_linked_body() {
        let (world, boss) = setup(settings());
        assert_eq!(boss.phase(), Phase::Sleep);
        assert_eq!(boss.registry().body_len(), 4);
        for pair in boss.registry().segments().windows(2) {
            assert_eq!(pair[1].linked_to, Some(pair[0].entity));
        }
        assert_eq!(world.indicator(boss.entity(), "Phase"), Some(0));
        assert_eq!(world.flag(boss.entity(), "Blue"), Some(false));
        assert!(boss.vitals().intangible && boss.vitals().invulnerable);
    }

    #[test]
    fn test_sleeps_until_player_in_range() {
        let (mut world, mut boss) = setup(settings());
        world.spawn_player(Vec2::new(100.0, 0.0));
        assert_eq!(run(&mut boss, &mut world, 0.5), None);
        assert_eq!(boss.phase(), Phase::Sleep);
    }

    #[test]
    fn test_detection_starts_intro() {
        let (mut world, mut boss) = setup(settings());
        let player = world.spawn_player(Vec2::new(5.0, 0.0));

        let change = run(&mut boss, &mut world, 0.5);
        assert_eq!(
            change,
            Some(PhaseChange {
                from: Phase::Sleep,
                to: Phase::Awakening
            })
        );
        assert_eq!(boss.target(), Some(player));
        assert_eq!(boss.clock().next_attack_at, 2.5);
        assert_eq!(world.move_target(boss.entity()), Some(player));

        let awakened = world.cues().iter().filter(|(_, cue)| cue == "Awaken").count();
        assert_eq!(awakened, boss.registry().body_len());
    }

    #[test]
    fn test_awaken_after_intro() {
        let (mut world, mut boss) = setup(settings());
        world.spawn_player(Vec2::new(5.0, 0.0));
        run(&mut boss, &mut world, 0.5);

        run(&mut boss, &mut world, 2.5);
        assert_eq!(boss.phase(), Phase::Awakening);

        let change = run(&mut boss, &mut world, 2.6);
        assert_eq!(change.map(|c| c.to), Some(Phase::Wander));
        assert!(boss.vitals().contact_damage);
        assert!(!boss.vitals().invulnerable && !boss.vitals().intangible);
        assert_eq!(world.ai_mode(boss.entity()), Some(AiMode::Melee));
        assert_eq!(world.max_speed(boss.entity()), Some(10.0));
        assert_eq!(world.indicator(boss.entity(), "Phase"), Some(1));

        let rolled = boss.clock().rolled_cooldown;
        assert!((5.0..=6.0).contains(&rolled));
        assert_eq!(boss.clock().next_phase_decision_at, 2.6 + rolled);
    }

    #[test]
    fn test_first_attack_is_turrets_without_turrets() {
        for seed in 0..20 {
            let (mut world, mut boss) = awake(EncounterSettings {
                seed,
                ..settings()
            });
            let decision = boss.clock().next_phase_decision_at;
            run(&mut boss, &mut world, decision);
            assert_eq!(boss.phase(), Phase::Wander, "decision is strictly after the cooldown");
            run(&mut boss, &mut world, decision + 0.01);
            assert_eq!(boss.phase(), Phase::Turrets);
        }
    }

    #[test]
    fn test_pick_phase_fallthrough_enters_turrets_at_cap() {
        let (mut world, mut boss) = awake(settings());
        for _ in 0..2 {
            let t = world.spawn_turret(boss.id(), Vec2::ZERO);
            boss.registry.add(t.unwrap());
        }
        let mut saw_turrets = false;
        for _ in 0..60 {
            let phase = boss.pick_phase();
            assert_ne!(phase, Phase::Wander);
            saw_turrets |= phase == Phase::Turrets;
        }
        assert!(saw_turrets, "a draw of 1 still picks Turrets at the cap");

        // Capped Turrets exits on its first tick
        boss.enter(Phase::Turrets, &mut world);
        let now = boss.clock().now + 0.1;
        let change = run(&mut boss, &mut world, now);
        assert_eq!(change.map(|c| c.to), Some(Phase::Wander));
        assert_eq!(boss.registry().count(), 2);
    }

    #[test]
    fn test_strict_cap_never_picks_turrets_at_cap() {
        let (mut world, mut boss) = awake(EncounterSettings {
            strict_turret_cap: true,
            ..settings()
        });
        for _ in 0..2 {
            let t = world.spawn_turret(boss.id(), Vec2::ZERO);
            boss.registry.add(t.unwrap());
        }
        for _ in 0..60 {
            let phase = boss.pick_phase();
            assert!(matches!(phase, Phase::Rings | Phase::Lines));
        }
    }

    #[test]
    fn test_turrets_fill_to_cap_then_wander() {
        let (mut world, mut boss) = awake(settings());
        boss.enter(Phase::Turrets, &mut world);
        let start = boss.clock().now;

        // First turret only after the one-second beat
        run(&mut boss, &mut world, start + 0.5);
        assert_eq!(boss.registry().count(), 0);
        run(&mut boss, &mut world, start + 1.1);
        assert_eq!(boss.registry().count(), 1);
        run(&mut boss, &mut world, start + 1.5);
        assert_eq!(boss.registry().count(), 1);
        run(&mut boss, &mut world, start + 2.2);
        assert_eq!(boss.registry().count(), 2);
        assert_eq!(boss.state(), PhaseState::Turrets { spawned: 2 });

        let change = run(&mut boss, &mut world, start + 2.3);
        assert_eq!(change.map(|c| c.to), Some(Phase::Wander));
        assert_eq!(boss.registry().count(), 2);
        assert_eq!(world.turret_count(), 2);

        // Every turret sits inside the inset arena
        let half = boss.settings().arena_size - Vec2::splat(ARENA_MARGIN);
        for &t in boss.registry().turrets() {
            let p = world.position_of(t).unwrap() - boss.arena_center();
            assert!(p.x.abs() <= half.x + 1e-4 && p.y.abs() <= half.y + 1e-4);
        }
    }

    #[test]
    fn test_rings_fire_from_every_segment_then_wander() {
        let (mut world, mut boss) = awake(settings());
        boss.enter(Phase::Rings, &mut world);
        let start = boss.clock().now;
        let before = world.projectile_count();

        let mut t = start;
        let mut rings = 0;
        for expected_index in 0..4 {
            assert_eq!(
                boss.state(),
                PhaseState::Rings {
                    firing_index: expected_index
                }
            );
            t += 1.01;
            run(&mut boss, &mut world, t);
            rings += 1;
        }
        assert_eq!(world.projectile_count() - before, rings * RING_PROJECTILES as usize);
        assert_eq!(boss.phase(), Phase::Rings);

        t += 1.01;
        let change = run(&mut boss, &mut world, t);
        assert_eq!(change.map(|c| c.to), Some(Phase::Wander));
        assert_eq!(world.projectile_count() - before, 4 * RING_PROJECTILES as usize);
    }

    #[test]
    fn test_ring_rotation_alternates_per_segment() {
        let (mut world, mut boss) = awake(settings());
        boss.enter(Phase::Rings, &mut world);
        let t = boss.clock().now;
        run(&mut boss, &mut world, t + 0.01);
        run(&mut boss, &mut world, t + 1.1);

        let shots = world.launched();
        let n = RING_PROJECTILES as usize;
        let head_ring = &shots[shots.len() - 2 * n..shots.len() - n];
        let second_ring = &shots[shots.len() - n..];
        assert!(head_ring[0].launch.angle.abs() < 1e-3);
        assert!((second_ring[0].launch.angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_lines_schedule() {
        let (mut world, mut boss) = awake(settings());
        let player = Vec2::new(0.0, 10.0);
        let input = TickInput {
            player_position: Some(player),
        };
        boss.enter(Phase::Lines, &mut world);
        let start = boss.clock().now;

        // Fires straight away
        tick(&mut boss, start, &input, &mut world);
        assert_eq!(boss.state(), PhaseState::Lines { fired: 1 });
        let burst = &world.launched()[world.launched().len() - LINE_PROJECTILES as usize..];
        assert!(burst.iter().all(|s| (s.launch.angle - 90.0).abs() < 1e-3));
        assert_eq!(burst[0].launch.speed, 10.0);
        assert_eq!(boss.clock().next_attack_at, start + 0.75);

        tick(&mut boss, start + 0.75, &input, &mut world);
        assert_eq!(boss.state(), PhaseState::Lines { fired: 2 });
        let burst = &world.launched()[world.launched().len() - LINE_PROJECTILES as usize..];
        assert_eq!(burst[0].launch.speed, 12.5);
        assert_eq!(boss.clock().next_attack_at, start + 1.5);

        let change = tick(&mut boss, start + 1.5, &input, &mut world);
        assert_eq!(change.map(|c| c.to), Some(Phase::Wander));
    }

    #[test]
    fn test_lines_hold_fire_without_target() {
        let (mut world, mut boss) = awake(settings());
        boss.enter(Phase::Lines, &mut world);
        let before = world.projectile_count();
        let now = boss.clock().now + 1.0;
        run(&mut boss, &mut world, now);
        assert_eq!(world.projectile_count(), before);
        assert_eq!(boss.state(), PhaseState::Lines { fired: 0 });
    }

    #[test]
    fn test_reentry_resets_counters() {
        let (mut world, mut boss) = awake(settings());
        boss.state = PhaseState::Rings { firing_index: 3 };
        boss.enter(Phase::Rings, &mut world);
        assert_eq!(boss.state(), PhaseState::Rings { firing_index: 0 });

        boss.state = PhaseState::Lines { fired: 2 };
        boss.enter(Phase::Lines, &mut world);
        assert_eq!(boss.state(), PhaseState::Lines { fired: 0 });

        boss.state = PhaseState::Turrets { spawned: 5 };
        boss.enter(Phase::Turrets, &mut world);
        assert_eq!(boss.state(), PhaseState::Turrets { spawned: 0 });
    }

    #[test]
    fn test_death_from_every_phase() {
        for phase in [
            Phase::Sleep,
            Phase::Awakening,
            Phase::Wander,
            Phase::Rings,
            Phase::Turrets,
            Phase::Lines,
        ] {
            let (mut world, mut boss) = match phase {
                Phase::Sleep => setup(settings()),
                Phase::Awakening => {
                    let (mut world, mut boss) = setup(settings());
                    world.spawn_player(Vec2::new(5.0, 0.0));
                    run(&mut boss, &mut world, 0.5);
                    (world, boss)
                }
                _ => {
                    let (mut world, mut boss) = awake(settings());
                    boss.enter(phase, &mut world);
                    (world, boss)
                }
            };
            assert_eq!(boss.phase(), phase);
            for _ in 0..2 {
                let t = world.spawn_turret(boss.id(), Vec2::ZERO);
                boss.registry.add(t.unwrap());
            }

            let aftermath = boss.die();
            aftermath.apply(&mut world);

            assert_eq!(boss.phase(), Phase::Death, "dying from {:?}", phase);
            assert!(!boss.vitals().contact_damage);
            assert!(boss.vitals().intangible);
            assert_eq!(world.max_speed(boss.entity()), Some(0.0));
            assert_eq!(boss.registry().count(), 0);
            assert_eq!(world.turret_count(), 0);
            assert_eq!(world.indicator(boss.entity(), "Phase"), Some(-1));
            // Quiet removal: no death cues for turrets
            assert!(!world.cues().iter().any(|(_, cue)| cue == "Die"));

            let died_at = boss.clock().now;
            run(&mut boss, &mut world, died_at + 1.01);
            assert!(boss.is_finished());
        }
    }

    #[test]
    fn test_quiet_die_removes_everything_without_rewards() {
        let (mut world, mut boss) = awake(settings());
        let t = world.spawn_turret(boss.id(), Vec2::ZERO).unwrap();
        boss.registry.add(t);
        let body: Vec<EntityId> = boss.registry().segments().iter().map(|s| s.entity).collect();

        boss.quiet_die().apply(&mut world);
        assert!(boss.is_finished());
        assert_eq!(boss.registry().count(), 0);
        assert!(body.iter().all(|&id| !world.contains(id)));
        assert!(!world.contains(t));
        assert!(!world.cues().iter().any(|(_, cue)| cue == "Die"));

        assert_eq!(run(&mut boss, &mut world, 10.0), None);
        assert!(world.follow_on(FollowOn::Portal).is_none());
        assert!(world.follow_on(FollowOn::Page).is_none());
    }

    #[test]
    fn test_death_sequence_leaves_rewards() {
        let (mut world, mut boss) = awake(settings());
        let died_at = boss.clock().now;
        boss.die().apply(&mut world);

        run(&mut boss, &mut world, died_at + 1.0);
        assert!(!boss.is_finished());

        run(&mut boss, &mut world, died_at + 1.01);
        assert!(boss.is_finished());
        assert!(!world.contains(boss.entity()));

        let center = boss.arena_center();
        let height = boss.settings().arena_size.y;
        let portal = world.follow_on(FollowOn::Portal).unwrap();
        let page = world.follow_on(FollowOn::Page).unwrap();
        assert_eq!(world.position_of(portal), Some(center + Vec2::new(0.0, height * 0.6)));
        assert_eq!(world.position_of(page), Some(center + Vec2::new(0.0, height * 0.4)));

        // Finished encounters ignore further ticks
        assert_eq!(run(&mut boss, &mut world, died_at + 5.0), None);
    }

    #[test]
    fn test_second_die_is_ignored() {
        let (mut world, mut boss) = awake(settings());
        boss.die().apply(&mut world);
        let scheduled = boss.clock().next_attack_at;
        run(&mut boss, &mut world, scheduled - 0.5);
        assert_eq!(boss.die(), Aftermath::default());
        assert_eq!(boss.clock().next_attack_at, scheduled);
    }

    #[test]
    fn test_turret_destroyed_deregisters_once() {
        let (mut world, mut boss) = awake(settings());
        let t = world.spawn_turret(boss.id(), Vec2::ZERO).unwrap();
        boss.registry.add(t);
        boss.on_turret_destroyed(t);
        boss.on_turret_destroyed(t);
        assert_eq!(boss.registry().count(), 0);
    }

    #[test]
    fn test_reset_puts_boss_back_to_sleep() {
        let (mut world, mut boss) = awake(settings());
        let t = world.spawn_turret(boss.id(), Vec2::ZERO).unwrap();
        boss.registry.add(t);

        boss.reset().apply(&mut world);
        assert_eq!(boss.phase(), Phase::Sleep);
        assert_eq!(boss.target(), None);
        assert_eq!(boss.registry().count(), 0);
        assert!(!world.contains(t));
        assert!(boss.vitals().intangible);
    }

    #[test]
    fn test_same_seed_same_encounter() {
        let script = |seed| {
            let (mut world, mut boss) = awake(EncounterSettings {
                seed,
                ..settings()
            });
            let mut phases = Vec::new();
            let mut t = 3.0;
            while t < 60.0 {
                t += SIM_DT;
                if let Some(change) = run(&mut boss, &mut world, t) {
                    phases.push(change.to);
                }
            }
            (phases, world.launched().len())
        };
        assert_eq!(script(7), script(7));
    }
}
