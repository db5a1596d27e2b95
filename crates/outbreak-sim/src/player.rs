//! Human-controlled character behavior.
//!
//! Holds the combat and ability state for a player-controlled character:
//! input-driven movement requests, the attack display window, role
//! attribute refresh, role switching, and the once-per-arming ability.

use serde::{Deserialize, Serialize};
use tracing::debug;

use outbreak_common::{CharacterId, Vec2};

use crate::character::CharacterState;
use crate::events::{EventBus, SimEvent};
use crate::input::PlayerInput;
use crate::role::{AbilityKind, AbilityState, AppearanceMode, Role};
use crate::tuning::Tuning;

/// Control state for a player-driven character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivorControl {
    /// Current role (may be a zombie role after a switch)
    role: Role,
    /// Attack damage recomputed from the role table
    attack_damage: i32,
    /// Temporary damage multiplier, 1 when no boost is active
    damage_multiplier: i32,
    /// Damage immunity flag
    immune: bool,
    /// Once-per-arming ability gate
    ability: AbilityState,
    /// External attack signal as of the last tick
    attack_signal: bool,
    /// Seconds left on the attack display window
    attack_window_remaining: f32,
    /// Whether attacks can currently land
    attacking: bool,
    /// Pose external rendering should draw
    appearance: AppearanceMode,
}

impl SurvivorControl {
    /// Creates control state for a role and initializes the character's
    /// attributes from the role table.
    #[must_use]
    pub fn new(role: Role, state: &mut CharacterState, tuning: &Tuning) -> Self {
        let mut control = Self {
            role,
            attack_damage: 0,
            damage_multiplier: 1,
            immune: false,
            ability: AbilityState::armed(),
            attack_signal: false,
            attack_window_remaining: 0.0,
            attacking: false,
            appearance: AppearanceMode::Normal,
        };
        control.refresh_attributes(state, tuning);
        control
    }

    /// Returns the current role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the attack damage before the temporary multiplier.
    #[must_use]
    pub const fn attack_damage(&self) -> i32 {
        self.attack_damage
    }

    /// Returns the temporary damage multiplier.
    #[must_use]
    pub const fn damage_multiplier(&self) -> i32 {
        self.damage_multiplier
    }

    /// Returns whether the character currently ignores damage.
    #[must_use]
    pub const fn is_immune(&self) -> bool {
        self.immune
    }

    /// Returns whether attacks can currently land.
    #[must_use]
    pub const fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Returns the pose external rendering should draw.
    #[must_use]
    pub const fn appearance(&self) -> AppearanceMode {
        self.appearance
    }

    /// Returns the ability gate state.
    #[must_use]
    pub const fn ability(&self) -> &AbilityState {
        &self.ability
    }

    /// Sets immunity directly (power-up hook).
    pub fn set_immune(&mut self, immune: bool) {
        self.immune = immune;
    }

    /// Sets the damage multiplier directly (power-up hook).
    pub fn set_damage_boost(&mut self, multiplier: i32) {
        self.damage_multiplier = multiplier.max(1);
    }

    /// Re-arms the ability for a new activation window (per-stage hook).
    pub fn rearm_ability(&mut self) {
        self.ability.rearm();
    }

    /// Feeds the external attack signal. The display window opens on the
    /// rising edge.
    pub fn set_attack_signal(&mut self, signal: bool, tuning: &Tuning) {
        if signal && !self.attack_signal {
            self.attack_window_remaining = tuning.attack_window;
        }
        self.attack_signal = signal;
    }

    /// Recomputes attributes from the role table.
    ///
    /// Health refills only while the ability is still armed, so a
    /// mid-flight or spent effect never refills the pool for free.
    /// Clears immunity, the damage multiplier, and the used flag,
    /// reverting any expired ability effect.
    pub fn refresh_attributes(&mut self, state: &mut CharacterState, tuning: &Tuning) {
        let stats = self.role.stats();

        state.max_health = (tuning.base_health as f32 * stats.health_mult) as i32;
        if self.ability.is_armed() {
            state.health = state.max_health;
        }
        state.speed = tuning.base_speed * stats.speed_mult;

        self.attack_damage = (tuning.base_attack_damage as f32 * stats.damage_mult) as i32;
        self.damage_multiplier = 1;
        self.immune = false;
        self.ability.clear_used();
    }

    /// Switches to the paired role, preserving position, and re-runs the
    /// attribute refresh. Returns the new role.
    pub fn switch_role(&mut self, state: &mut CharacterState, tuning: &Tuning) -> Role {
        self.role = self.role.counterpart();
        self.refresh_attributes(state, tuning);
        self.role
    }

    /// Triggers the role ability if it is armed. Returns the effect that
    /// was applied.
    pub fn trigger_ability(
        &mut self,
        state: &mut CharacterState,
        tuning: &Tuning,
        clock: f64,
    ) -> Option<AbilityKind> {
        if !self.ability.trigger(clock) {
            return None;
        }

        let kind = self.role.ability();
        match kind {
            AbilityKind::SpeedBoost => state.speed += tuning.ability_speed_bonus,
            AbilityKind::Immunity => self.immune = true,
            AbilityKind::DamageBoost => self.damage_multiplier = tuning.ability_damage_multiplier,
        }
        debug!(role = self.role.display_name(), ?kind, "ability triggered");
        Some(kind)
    }

    /// Runs one control tick. Returns the movement request in world
    /// units/s; the caller applies it as an impulse or sets it as the
    /// velocity depending on the movement path.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        id: CharacterId,
        state: &mut CharacterState,
        input: Option<&PlayerInput>,
        clock: f64,
        delta: f32,
        tuning: &Tuning,
        events: &EventBus,
    ) -> Vec2 {
        let mut movement = Vec2::ZERO;

        if let Some(input) = input {
            // Face the aim point.
            if let Some(aim) = input.aim {
                state.orientation = state.bearing_to(aim);
            }

            movement = input.movement.scale(state.speed);

            if input.ability {
                if let Some(kind) = self.trigger_ability(state, tuning, clock) {
                    events.publish(SimEvent::AbilityTriggered { id, effect: kind });
                }
            }

            self.set_attack_signal(input.attack, tuning);
        }

        // An armed ability waits for input; a spent one reverts once its
        // duration has elapsed.
        if self.ability.should_expire(clock) {
            self.refresh_attributes(state, tuning);
            events.publish(SimEvent::AbilityExpired { id });
        }

        // Attack pose holds while the signal is set and the window is open.
        if self.attack_signal && self.attack_window_remaining > 0.0 {
            self.attacking = true;
            self.appearance = AppearanceMode::Attacking;
        } else {
            self.attacking = false;
            self.appearance = AppearanceMode::Normal;
        }
        self.attack_window_remaining = (self.attack_window_remaining - delta).max(0.0);

        movement
    }
}
