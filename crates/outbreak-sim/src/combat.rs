//! Combat resolution: attack gating, damage, immunity.
//!
//! An attack lands only when the target is inside the attacker's facing
//! arc and hit range, the attacker's cooldown has elapsed, and the
//! external attack signal is set. Resolution itself is pure; callers
//! mutate cooldowns and health from the returned outcome.

use serde::{Deserialize, Serialize};

use outbreak_common::Vec2;

use crate::proximity;

/// Angular tolerance for an attack, radians either side of the facing.
pub const ATTACK_ARC: f32 = 0.8;

/// Everything the resolver needs to know about an attacker.
#[derive(Debug, Clone, Copy)]
pub struct AttackerView {
    /// Bearing origin (sprite center)
    pub sprite_center: Vec2,
    /// Collision center used for the range check
    pub center: Vec2,
    /// Facing, radians in `[0, 2π)`
    pub orientation: f32,
    /// Damage dealt on a hit, multipliers already applied
    pub damage: i32,
    /// Maximum hit distance for this attacker's role
    pub hit_range: f32,
    /// Minimum seconds between hits for this attacker's role
    pub cooldown: f32,
    /// Seconds accumulated since the last hit
    pub hit_refresh: f32,
    /// External attack signal
    pub attacking: bool,
}

/// Result of resolving one attack attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// All gates passed; apply this much damage and reset the cooldown
    Hit {
        /// Damage to apply to the target
        damage: i32,
    },
    /// Target's center is beyond the hit range
    OutOfRange,
    /// Target is outside the facing arc
    OutOfArc,
    /// Not enough time since the last hit
    OnCooldown,
    /// The external attack signal is not set
    NotAttacking,
}

impl AttackOutcome {
    /// Returns whether the attack landed.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit { .. })
    }
}

/// Resolves one attack attempt against a target collision center.
///
/// Gates are checked in range, arc, cooldown, signal order; the first
/// failing gate names the outcome.
#[must_use]
pub fn resolve_attack(attacker: &AttackerView, target_center: Vec2) -> AttackOutcome {
    if attacker.center.distance(target_center) >= attacker.hit_range {
        return AttackOutcome::OutOfRange;
    }

    let bearing = proximity::bearing(attacker.sprite_center, target_center);
    if (bearing - attacker.orientation).abs() >= ATTACK_ARC {
        return AttackOutcome::OutOfArc;
    }

    if attacker.hit_refresh <= attacker.cooldown {
        return AttackOutcome::OnCooldown;
    }

    if !attacker.attacking {
        return AttackOutcome::NotAttacking;
    }

    AttackOutcome::Hit {
        damage: attacker.damage,
    }
}

/// Applies damage to a health pool unless the target is immune.
///
/// Health is clamped at zero: death is an externally observed condition
/// when health reaches 0, not a negative pool. (The lower-bound clamp is
/// a deliberate choice here; see DESIGN.md.) Returns the damage actually
/// applied.
pub fn apply_damage(health: &mut i32, amount: i32, immune: bool) -> i32 {
    if immune {
        return 0;
    }
    let applied = amount.min(*health);
    *health -= applied;
    applied
}

/// Restores health, clamped at the maximum.
pub fn apply_heal(health: &mut i32, max_health: i32, amount: i32) {
    *health = (*health + amount).min(max_health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Attacker at the origin facing straight down (-y), everything in
    /// range and off cooldown.
    fn attacker() -> AttackerView {
        AttackerView {
            sprite_center: Vec2::ZERO,
            center: Vec2::ZERO,
            orientation: PI,
            damage: 15,
            hit_range: 50.0,
            cooldown: 0.2,
            hit_refresh: 1.0,
            attacking: true,
        }
    }

    #[test]
    fn test_attack_lands_when_all_gates_pass() {
        let target = Vec2::new(0.0, -5.0);
        assert_eq!(
            resolve_attack(&attacker(), target),
            AttackOutcome::Hit { damage: 15 }
        );
    }

    #[test]
    fn test_attack_fails_out_of_range() {
        let target = Vec2::new(0.0, -80.0);
        assert_eq!(resolve_attack(&attacker(), target), AttackOutcome::OutOfRange);
    }

    #[test]
    fn test_attack_fails_outside_arc() {
        // Target straight up (+y, bearing 0) while facing down (pi).
        let target = Vec2::new(0.0, 5.0);
        assert_eq!(resolve_attack(&attacker(), target), AttackOutcome::OutOfArc);
    }

    #[test]
    fn test_attack_fails_on_cooldown() {
        let mut view = attacker();
        view.hit_refresh = 0.0;
        let target = Vec2::new(0.0, -5.0);
        assert_eq!(resolve_attack(&view, target), AttackOutcome::OnCooldown);
    }

    #[test]
    fn test_attack_fails_without_signal() {
        let mut view = attacker();
        view.attacking = false;
        let target = Vec2::new(0.0, -5.0);
        assert_eq!(resolve_attack(&view, target), AttackOutcome::NotAttacking);
    }

    #[test]
    fn test_arc_edge_is_exclusive() {
        let mut view = attacker();
        view.orientation = PI - ATTACK_ARC;
        let target = Vec2::new(0.0, -5.0);
        assert_eq!(resolve_attack(&view, target), AttackOutcome::OutOfArc);
    }

    #[test]
    fn test_damage_reduces_health() {
        let mut health = 100;
        let applied = apply_damage(&mut health, 20, false);
        assert_eq!(applied, 20);
        assert_eq!(health, 80);
    }

    #[test]
    fn test_immune_target_takes_no_damage() {
        let mut health = 100;
        let applied = apply_damage(&mut health, 20, true);
        assert_eq!(applied, 0);
        assert_eq!(health, 100);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut health = 10;
        let applied = apply_damage(&mut health, 25, false);
        assert_eq!(applied, 10);
        assert_eq!(health, 0);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut health = 90;
        apply_heal(&mut health, 100, 25);
        assert_eq!(health, 100);
    }
}
