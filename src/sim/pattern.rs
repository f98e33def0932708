//! Projectile pattern generation
//!
//! Stateless geometry: each function turns one attack beat into a list of
//! launch vectors. Angles are in degrees, counter-clockwise from +x, and are
//! normalized to [0, 360). Spawning the projectiles is the caller's business.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{launch_velocity, normalize_degrees};

/// Launch parameters for a single projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchVector {
    /// Launch angle in degrees
    pub angle: f32,
    /// Launch speed (units per second)
    pub speed: f32,
}

impl LaunchVector {
    pub fn new(angle: f32, speed: f32) -> Self {
        Self {
            angle: normalize_degrees(angle),
            speed,
        }
    }

    /// Initial velocity for this launch
    pub fn velocity(&self) -> Vec2 {
        launch_velocity(self.angle, self.speed)
    }
}

/// Evenly spaced ring of `count` projectiles, rotated by `rotation_offset` degrees
pub fn ring(count: u32, rotation_offset: f32, speed: f32) -> Vec<LaunchVector> {
    if count == 0 {
        return Vec::new();
    }
    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| LaunchVector::new(rotation_offset + i as f32 * step, speed))
        .collect()
}

/// Two concentric rings of `count` projectiles spaced `step` degrees apart
///
/// The second ring is turned by half a step and flies at half `speed`, so its
/// shots fill the gaps left by the first.
pub fn double_ring(count: u32, step: f32, rotation_offset: f32, speed: f32) -> Vec<LaunchVector> {
    let mut shots = Vec::with_capacity(2 * count as usize);
    let mut offset = rotation_offset;
    for k in 1..=2u32 {
        let ring_speed = speed / k as f32;
        shots.extend((0..count).map(|i| LaunchVector::new(offset + i as f32 * step, ring_speed)));
        offset += step / 2.0;
    }
    shots
}

/// Line of `count` projectiles along `angle`, slowing from `start_speed` toward `end_speed`
///
/// Projectile `i` gets `start_speed - i * (start_speed - end_speed) / count`, so the
/// schedule would reach `end_speed` at `i == count`; the last launched projectile
/// is one step faster than that.
pub fn line_burst(count: u32, start_speed: f32, end_speed: f32, angle: f32) -> Vec<LaunchVector> {
    if count == 0 {
        return Vec::new();
    }
    let step = (start_speed - end_speed) / count as f32;
    (0..count)
        .map(|i| LaunchVector::new(angle, start_speed - i as f32 * step))
        .collect()
}

/// Fan of `count` projectiles starting at `start_angle`
///
/// Known quirk: the angular step is `start_angle - end_angle / count`, with only
/// `end_angle` divided. Enemies tuned against this spread depend on it.
pub fn arc(count: u32, start_angle: f32, end_angle: f32, speed: f32) -> Vec<LaunchVector> {
    if count == 0 {
        return Vec::new();
    }
    let step = start_angle - end_angle / count as f32;
    (0..count)
        .map(|i| LaunchVector::new(start_angle + i as f32 * step, speed))
        .collect()
}
