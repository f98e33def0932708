//! Worm Boss - headless demo
//!
//! Runs one seeded encounter against a scripted player and logs how it went.
//! Pass a settings JSON path as the first argument to override the defaults.
//! Set `RUST_LOG=debug` to see every beat.

use std::process::ExitCode;

use glam::Vec2;
use worm_boss::consts::SIM_DT;
use worm_boss::sim::{EntityId, Phase, WorldQuery};
use worm_boss::{EncounterDriver, EncounterOutcome, EncounterSettings};

/// Give up after this much simulated time (seconds)
const TIME_LIMIT: f32 = 300.0;
/// Scripted player walking speed
const PLAYER_SPEED: f32 = 6.0;
/// Distance the player keeps from the head
const PLAYER_RANGE: f32 = 9.0;
/// Seconds between player shots
const SHOT_INTERVAL: f32 = 0.25;
const SHOT_DAMAGE: f32 = 12.0;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = match std::env::args().nth(1) {
        Some(path) => match EncounterSettings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Failed to load settings: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => EncounterSettings::default(),
    };
    log::info!("Worm Boss demo starting (seed {:#x})", settings.seed);

    let mut driver = EncounterDriver::new(settings, Vec2::ZERO);
    let player = driver.spawn_player(Vec2::new(40.0, 0.0));
    let mut next_shot = 0.0;
    let mut shots = 0u32;

    while driver.outcome() == EncounterOutcome::InProgress && driver.now() < TIME_LIMIT {
        walk_player(&mut driver, player);

        if driver.now() >= next_shot && driver.boss().phase() != Phase::Sleep {
            if let Some(target) = pick_target(&driver, player) {
                driver.damage(target, SHOT_DAMAGE);
                shots += 1;
            }
            next_shot = driver.now() + SHOT_INTERVAL;
        }

        driver.advance(SIM_DT);
    }

    let world = driver.world();
    log::info!(
        "Finished at {:.1}s: {:?}, boss phase {}, {} attacks, {} shots, score {}, {} projectiles launched",
        driver.now(),
        driver.outcome(),
        driver.boss().phase().as_str(),
        driver.attacks(),
        shots,
        driver.score(),
        world.launched().len()
    );

    match driver.outcome() {
        EncounterOutcome::Cleared => ExitCode::SUCCESS,
        EncounterOutcome::InProgress | EncounterOutcome::Dismissed => {
            log::warn!("Encounter did not finish within {}s", TIME_LIMIT);
            ExitCode::FAILURE
        }
    }
}

/// Close in on the head until within shooting range
fn walk_player(driver: &mut EncounterDriver, player: EntityId) {
    let world = driver.world();
    let (Some(me), Some(head)) = (
        world.position_of(player),
        world.position_of(driver.boss().entity()),
    ) else {
        return;
    };
    let offset = head - me;
    let gap = offset.length() - PLAYER_RANGE;
    if gap <= 0.0 {
        return;
    }
    let stride = (PLAYER_SPEED * SIM_DT).min(gap);
    let next = me + offset.normalize_or_zero() * stride;
    driver.world_mut().move_entity(player, next);
}

/// Turrets first, nearest one, then the head
fn pick_target(driver: &EncounterDriver, player: EntityId) -> Option<EntityId> {
    let world = driver.world();
    let me = world.position_of(player)?;
    let nearest_turret = world
        .turrets()
        .into_iter()
        .filter_map(|id| Some((id, world.position_of(id)?.distance_squared(me))))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);

    nearest_turret.or_else(|| {
        let head = driver.boss().entity();
        world.contains(head).then_some(head)
    })
}
