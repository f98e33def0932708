//! Encounter settings
//!
//! Per-boss tuning that designers change between arenas. Fixed balance
//! numbers shared by every worm live in [`crate::consts`].

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_MARGIN, COOLDOWN_SPREAD};
use crate::error::{ConfigError, Result};

/// Configuration for one worm boss encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterSettings {
    // === Arena ===
    /// Half extents of the arena around the boss's wake-up position
    pub arena_size: Vec2,
    /// Radius in which a player wakes the boss
    pub detection_radius: f32,

    // === Body ===
    /// Body segments behind the head
    pub segment_count: u32,
    /// Boss health pool
    pub boss_health: f32,
    /// Movement speed while wandering
    pub wander_speed: f32,
    /// Alternate palette
    pub blue_mode: bool,

    // === Attacks ===
    /// Base wander time between attacks (rolled up to 1.2x)
    pub phase_cooldown: f32,
    /// Turrets alive at once
    pub max_turrets: u32,
    /// Health of each turret
    pub turret_health: f32,
    /// Line-bursts per Lines phase
    pub line_count: u32,
    /// When the draw picks Turrets while the cap is already reached, pick Rings
    /// instead. Off by default: the draw then still enters Turrets, which exits
    /// on its first tick.
    pub strict_turret_cap: bool,

    // === Rewards ===
    /// Leave a portal to the next area on death
    pub spawn_portal: bool,
    /// Leave a page item on death
    pub spawn_page: bool,

    /// RNG seed for cooldowns, phase draws and turret placement
    pub seed: u64,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            arena_size: Vec2::new(18.0, 12.0),
            detection_radius: 20.0,

            segment_count: 6,
            boss_health: 1500.0,
            wander_speed: 10.0,
            blue_mode: false,

            phase_cooldown: 10.0,
            max_turrets: 4,
            turret_health: 60.0,
            line_count: 6,
            strict_turret_cap: false,

            spawn_portal: true,
            spawn_page: true,

            seed: 0x5EED,
        }
    }
}

impl EncounterSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded encounter settings from {}", path.display());
        Ok(settings)
    }

    /// Check that the encounter can run with these values
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        // Turret placement samples across the whole arena width
        if !(self.arena_size * 2.0).is_finite() {
            return Err(invalid("arena_size", "must be finite"));
        }
        if self.arena_size.x <= ARENA_MARGIN || self.arena_size.y <= ARENA_MARGIN {
            return Err(invalid(
                "arena_size",
                format!(
                    "half extents {:?} must exceed the spawn margin {}",
                    self.arena_size, ARENA_MARGIN
                ),
            ));
        }
        if !(self.detection_radius > 0.0) || !self.detection_radius.powi(2).is_finite() {
            return Err(invalid("detection_radius", "must be positive and finite"));
        }
        if !(self.phase_cooldown >= 0.0) || !(self.phase_cooldown * COOLDOWN_SPREAD).is_finite() {
            return Err(invalid("phase_cooldown", "must be finite and not negative"));
        }
        if !(self.wander_speed >= 0.0) || !self.wander_speed.is_finite() {
            return Err(invalid("wander_speed", "must be finite and not negative"));
        }
        if self.max_turrets == 0 {
            return Err(invalid("max_turrets", "at least one turret is required"));
        }
        if self.line_count == 0 {
            return Err(invalid("line_count", "at least one line-burst is required"));
        }
        if !(self.boss_health > 0.0) || !self.boss_health.is_finite() {
            return Err(invalid("boss_health", "must be positive and finite"));
        }
        if !(self.turret_health > 0.0) || !self.turret_health.is_finite() {
            return Err(invalid("turret_health", "must be positive and finite"));
        }
        Ok(())
    }

    /// Portal and page positions relative to the arena center
    pub fn follow_on_offsets(&self) -> (Vec2, Vec2) {
        use crate::consts::{PAGE_OFFSET, PORTAL_OFFSET};
        (
            Vec2::new(0.0, self.arena_size.y * PORTAL_OFFSET),
            Vec2::new(0.0, self.arena_size.y * PAGE_OFFSET),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(EncounterSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            EncounterSettings::from_json(r#"{ "max_turrets": 2, "arena_size": [10.0, 8.0] }"#)
                .unwrap();
        assert_eq!(settings.max_turrets, 2);
        assert_eq!(settings.arena_size, Vec2::new(10.0, 8.0));
        assert_eq!(settings.line_count, 6);
        assert_eq!(settings.phase_cooldown, 10.0);
    }

    #[test]
    fn test_rejects_tiny_arena() {
        let err = EncounterSettings::from_json(r#"{ "arena_size": [3.0, 10.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "arena_size", .. }));
    }

    #[test]
    fn test_rejects_overflowing_arena() {
        // 1e39 does not fit in an f32 and parses as infinity
        let err = EncounterSettings::from_json(r#"{ "arena_size": [1e39, 10.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "arena_size", .. }));

        let err = EncounterSettings::from_json(r#"{ "arena_size": [3e38, 10.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "arena_size", .. }));
    }

    #[test]
    fn test_rejects_non_finite_timings_and_health() {
        let cases = [
            (r#"{ "phase_cooldown": 3e38 }"#, "phase_cooldown"),
            (r#"{ "phase_cooldown": 1e39 }"#, "phase_cooldown"),
            (r#"{ "detection_radius": 1e39 }"#, "detection_radius"),
            (r#"{ "wander_speed": 1e39 }"#, "wander_speed"),
            (r#"{ "wander_speed": -1.0 }"#, "wander_speed"),
            (r#"{ "boss_health": 1e39 }"#, "boss_health"),
            (r#"{ "turret_health": 1e39 }"#, "turret_health"),
        ];
        for (json, want) in cases {
            match EncounterSettings::from_json(json) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, want, "{json}"),
                other => panic!("{json} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_zero_turret_cap() {
        let err = EncounterSettings::from_json(r#"{ "max_turrets": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_turrets", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = EncounterSettings::from_json("{ max_turrets: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EncounterSettings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_follow_on_offsets() {
        let settings = EncounterSettings {
            arena_size: Vec2::new(20.0, 10.0),
            ..Default::default()
        };
        let (portal, page) = settings.follow_on_offsets();
        assert_eq!(portal, Vec2::new(0.0, 6.0));
        assert_eq!(page, Vec2::new(0.0, 4.0));
    }
}
