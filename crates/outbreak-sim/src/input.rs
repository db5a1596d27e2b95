//! Input abstraction for player-controlled characters.
//!
//! The simulation never polls a keyboard or mouse; the embedding layer
//! samples its input devices once per frame and hands the result in here.

use serde::{Deserialize, Serialize};

use outbreak_common::Vec2;

/// One frame of input for a player-controlled character.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement axes, each component in [-1, 1]
    pub movement: Vec2,
    /// Attack signal (mouse button / gamepad trigger held)
    pub attack: bool,
    /// Ability trigger pressed this frame
    pub ability: bool,
    /// World-space point the player is aiming at, if any
    pub aim: Option<Vec2>,
}

impl PlayerInput {
    /// Creates an empty input frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the movement axes.
    #[must_use]
    pub fn with_movement(mut self, x: f32, y: f32) -> Self {
        self.movement = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        self
    }

    /// Sets the attack signal.
    #[must_use]
    pub fn with_attack(mut self, attack: bool) -> Self {
        self.attack = attack;
        self
    }

    /// Sets the ability trigger.
    #[must_use]
    pub fn with_ability(mut self, ability: bool) -> Self {
        self.ability = ability;
        self
    }

    /// Sets the aim point.
    #[must_use]
    pub fn with_aim(mut self, aim: Vec2) -> Self {
        self.aim = Some(aim);
        self
    }

    /// Returns whether any movement is requested.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.movement != Vec2::ZERO
    }
}
