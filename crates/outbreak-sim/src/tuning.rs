//! Gameplay tuning parameters.
//!
//! Provides the tunable numbers for movement, combat, and abilities as a
//! single structure that can be loaded from and saved to a TOML file.
//! Values not present in the file fall back to their defaults; unknown
//! keys are rejected so typos surface instead of silently doing nothing.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::steering::SteeringLimits;

/// Tuning file name.
const TUNING_FILE: &str = "outbreak.toml";

/// Errors that can occur when loading or saving tuning files.
#[derive(Debug, Error)]
pub enum TuningError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents were not valid TOML for this structure
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Structure could not be serialized
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl From<TuningError> for outbreak_common::OutbreakError {
    fn from(err: TuningError) -> Self {
        match err {
            TuningError::Io(inner) => Self::Io(inner),
            other => Self::Config(other.to_string()),
        }
    }
}

/// Gameplay tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    // === Base survivor attributes (scaled by role multipliers) ===
    /// Base maximum health before the role health multiplier
    pub base_health: i32,
    /// Base attack damage before the role damage multiplier
    pub base_attack_damage: i32,
    /// Base movement speed before the role speed multiplier, world units/s
    pub base_speed: f32,

    // === Survivor combat ===
    /// Maximum distance at which a survivor attack can land, world units
    pub survivor_hit_range: f32,
    /// Minimum time between survivor hits, seconds
    pub survivor_hit_cooldown: f32,
    /// How long the attack pose is held after the attack signal, seconds
    pub attack_window: f32,

    // === Zombie attributes ===
    /// Zombie maximum health
    pub zombie_max_health: i32,
    /// Zombie attack damage
    pub zombie_attack_damage: i32,
    /// Zombie movement speed, world units/s
    pub zombie_speed: f32,
    /// Maximum distance at which a zombie attack can land, world units
    pub zombie_hit_range: f32,
    /// Minimum time between zombie hits, seconds
    pub zombie_hit_cooldown: f32,

    // === Abilities ===
    /// Speed added by the athlete ability, world units/s
    pub ability_speed_bonus: f32,
    /// Damage multiplier applied by the artist ability
    pub ability_damage_multiplier: i32,

    // === Steering ===
    /// Velocity and acceleration limits for steering-driven movement
    pub steering: SteeringLimits,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_health: 100,
            base_attack_damage: 10,
            base_speed: 120.0,

            survivor_hit_range: 50.0,
            survivor_hit_cooldown: 0.2,
            attack_window: 0.5,

            zombie_max_health: 60,
            zombie_attack_damage: 5,
            zombie_speed: 80.0,
            zombie_hit_range: 30.0,
            zombie_hit_cooldown: 1.0,

            ability_speed_bonus: 40.0,
            ability_damage_multiplier: 2,

            steering: SteeringLimits::default(),
        }
    }
}

impl Tuning {
    /// Creates tuning with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads tuning from the default file in the given directory.
    ///
    /// Falls back to defaults (and logs a warning) if the file is missing.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(TUNING_FILE);
        match Self::load(&path) {
            Ok(tuning) => {
                info!(path = %path.display(), "loaded tuning");
                tuning
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "tuning unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Loads tuning from a specific TOML file.
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves tuning to a specific TOML file.
    pub fn save(&self, path: &Path) -> Result<(), TuningError> {
        let contents = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let tuning = Tuning::new();
        assert!(tuning.base_health > 0);
        assert!(tuning.base_speed > 0.0);
        assert!(tuning.survivor_hit_range > 0.0);
        assert!(tuning.zombie_hit_range > 0.0);
        assert!(tuning.survivor_hit_cooldown < tuning.zombie_hit_cooldown);
    }

    #[test]
    fn test_toml_round_trip() {
        let tuning = Tuning::new();
        let text = toml::to_string_pretty(&tuning).expect("serialize");
        let back: Tuning = toml::from_str(&text).expect("parse");
        assert_eq!(tuning, back);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let partial = "base_health = 250\n";
        let tuning: Tuning = toml::from_str(partial).expect("parse");
        assert_eq!(tuning.base_health, 250);
        assert_eq!(tuning.zombie_speed, Tuning::default().zombie_speed);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let bogus = "base_healht = 250\n";
        assert!(toml::from_str::<Tuning>(bogus).is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tuning.toml");

        let mut tuning = Tuning::new();
        tuning.zombie_speed = 99.0;
        tuning.save(&path).expect("save");

        let loaded = Tuning::load(&path).expect("load");
        assert_eq!(loaded, tuning);
    }

    #[test]
    fn test_load_or_default_with_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tuning = Tuning::load_or_default(dir.path());
        assert_eq!(tuning, Tuning::default());
    }
}
