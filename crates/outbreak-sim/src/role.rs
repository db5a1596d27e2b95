//! Roles, stat multipliers, and timed abilities.
//!
//! Each human role is paired with a zombie counterpart; switching maps a
//! role to its partner and back (an involution over the three pairs).
//! A role's stat row scales the base attributes, and each role family
//! carries exactly one ability effect: the effects are mutually
//! exclusive, so a character is never immune and damage-boosted at once.

use serde::{Deserialize, Serialize};

/// How long an ability effect lasts, simulated seconds.
pub const ABILITY_DURATION: f64 = 2.0;

/// A character's role. Three human roles, each with a zombie counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Human: strong attacks, fragile
    Scholar,
    /// Human: fast and sturdy, weak attacks
    Athlete,
    /// Human: balanced
    Artist,
    /// Zombie counterpart of the scholar
    ZombieScholar,
    /// Zombie counterpart of the athlete
    ZombieAthlete,
    /// Zombie counterpart of the artist
    ZombieArtist,
}

/// Stat multipliers applied on top of the base attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleStats {
    /// Attack damage multiplier
    pub damage_mult: f32,
    /// Maximum health multiplier
    pub health_mult: f32,
    /// Movement speed multiplier
    pub speed_mult: f32,
}

/// The single ability effect a role family carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Speed increase for the duration
    SpeedBoost,
    /// Damage immunity for the duration
    Immunity,
    /// Damage multiplier for the duration
    DamageBoost,
}

/// Which sprite set external rendering should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppearanceMode {
    /// Normal pose
    Normal,
    /// Attack pose, held briefly after an attack
    Attacking,
}

impl Role {
    /// All roles, human first.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Scholar,
            Self::Athlete,
            Self::Artist,
            Self::ZombieScholar,
            Self::ZombieAthlete,
            Self::ZombieArtist,
        ]
    }

    /// Returns whether this is a zombie role.
    #[must_use]
    pub const fn is_zombie(self) -> bool {
        matches!(
            self,
            Self::ZombieScholar | Self::ZombieAthlete | Self::ZombieArtist
        )
    }

    /// Maps a zombie role to the human role of its pair; identity on
    /// human roles. Stats and abilities are shared within a pair.
    #[must_use]
    pub const fn human(self) -> Self {
        match self {
            Self::Scholar | Self::ZombieScholar => Self::Scholar,
            Self::Athlete | Self::ZombieAthlete => Self::Athlete,
            Self::Artist | Self::ZombieArtist => Self::Artist,
        }
    }

    /// Returns the paired role: human to zombie counterpart and back.
    #[must_use]
    pub const fn counterpart(self) -> Self {
        match self {
            Self::Scholar => Self::ZombieScholar,
            Self::Athlete => Self::ZombieAthlete,
            Self::Artist => Self::ZombieArtist,
            Self::ZombieScholar => Self::Scholar,
            Self::ZombieAthlete => Self::Athlete,
            Self::ZombieArtist => Self::Artist,
        }
    }

    /// Returns the stat multiplier row for this role. Zombie roles reuse
    /// their human pair's row.
    #[must_use]
    pub const fn stats(self) -> RoleStats {
        match self.human() {
            Self::Scholar => RoleStats {
                damage_mult: 1.5,
                health_mult: 0.8,
                speed_mult: 0.8,
            },
            Self::Athlete => RoleStats {
                damage_mult: 0.8,
                health_mult: 1.2,
                speed_mult: 1.5,
            },
            _ => RoleStats {
                damage_mult: 1.2,
                health_mult: 1.0,
                speed_mult: 1.0,
            },
        }
    }

    /// Returns the ability effect for this role family.
    #[must_use]
    pub const fn ability(self) -> AbilityKind {
        match self.human() {
            Self::Scholar => AbilityKind::Immunity,
            Self::Athlete => AbilityKind::SpeedBoost,
            _ => AbilityKind::DamageBoost,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Scholar => "Scholar",
            Self::Athlete => "Athlete",
            Self::Artist => "Artist",
            Self::ZombieScholar => "Zombie Scholar",
            Self::ZombieAthlete => "Zombie Athlete",
            Self::ZombieArtist => "Zombie Artist",
        }
    }

    /// Parses a role name as stored in level data.
    ///
    /// Unrecognized names fall back to [`Role::Artist`] rather than
    /// failing; level data predating a role rename still loads.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "scholar" => Self::Scholar,
            "athlete" => Self::Athlete,
            "artist" => Self::Artist,
            "zombie_scholar" => Self::ZombieScholar,
            "zombie_athlete" => Self::ZombieAthlete,
            "zombie_artist" => Self::ZombieArtist,
            _ => Self::Artist,
        }
    }
}

/// Gate state for a character's once-per-arming ability.
///
/// `armed` means the ability is available and untriggered; `used` means
/// an effect is mid-flight or has just ended and is waiting for the next
/// attribute refresh. Re-arming is an external, per-stage action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    /// Ability is available to trigger
    armed: bool,
    /// Ability has been triggered and not yet cleaned up
    used: bool,
    /// Simulation clock reading at trigger time, seconds
    triggered_at: f64,
}

impl Default for AbilityState {
    fn default() -> Self {
        Self::armed()
    }
}

impl AbilityState {
    /// A fresh, armed ability.
    #[must_use]
    pub const fn armed() -> Self {
        Self {
            armed: true,
            used: false,
            triggered_at: 0.0,
        }
    }

    /// Returns whether the ability can currently be triggered.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Returns whether an effect is pending cleanup.
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }

    /// Attempts to trigger at the given simulation clock reading.
    /// Returns false if the ability was not armed.
    pub fn trigger(&mut self, clock: f64) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.used = true;
        self.triggered_at = clock;
        true
    }

    /// Returns whether the effect has outlived its duration.
    #[must_use]
    pub fn should_expire(&self, clock: f64) -> bool {
        self.used && clock > self.triggered_at + ABILITY_DURATION
    }

    /// Clears the used flag; called from the attribute refresh.
    pub fn clear_used(&mut self) {
        self.used = false;
    }

    /// Re-arms the ability for a new activation window.
    pub fn rearm(&mut self) {
        self.armed = true;
        self.used = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_is_an_involution() {
        for role in Role::all() {
            assert_eq!(role.counterpart().counterpart(), role);
        }
    }

    #[test]
    fn test_counterpart_flips_zombie_flag() {
        for role in Role::all() {
            assert_ne!(role.is_zombie(), role.counterpart().is_zombie());
        }
    }

    #[test]
    fn test_pairs_share_stats_and_ability() {
        for role in Role::all() {
            assert_eq!(role.stats(), role.counterpart().stats());
            assert_eq!(role.ability(), role.counterpart().ability());
        }
    }

    #[test]
    fn test_each_family_has_a_distinct_ability() {
        assert_eq!(Role::Scholar.ability(), AbilityKind::Immunity);
        assert_eq!(Role::Athlete.ability(), AbilityKind::SpeedBoost);
        assert_eq!(Role::Artist.ability(), AbilityKind::DamageBoost);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        assert_eq!(Role::from_name("athlete"), Role::Athlete);
        assert_eq!(Role::from_name("cheerleader"), Role::Artist);
        assert_eq!(Role::from_name(""), Role::Artist);
    }

    #[test]
    fn test_ability_trigger_once() {
        let mut ability = AbilityState::armed();
        assert!(ability.trigger(1.0));
        assert!(!ability.trigger(1.5));
        assert!(ability.is_used());
    }

    #[test]
    fn test_ability_expires_after_duration() {
        let mut ability = AbilityState::armed();
        ability.trigger(10.0);

        assert!(!ability.should_expire(10.0));
        assert!(!ability.should_expire(10.0 + ABILITY_DURATION));
        assert!(ability.should_expire(10.0 + ABILITY_DURATION + 0.01));
    }

    #[test]
    fn test_ability_needs_rearm_after_use() {
        let mut ability = AbilityState::armed();
        ability.trigger(0.0);
        ability.clear_used();

        assert!(!ability.trigger(5.0));
        ability.rearm();
        assert!(ability.trigger(5.0));
    }
}
