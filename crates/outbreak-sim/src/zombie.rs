//! AI chase behavior for zombie characters.
//!
//! A zombie has a single state: chasing. Every tick it recomputes a
//! normalized direction toward its target player, scales it by its speed
//! to get the desired velocity, and faces the bearing toward the target.
//! The target is the assigned player if one is set, otherwise the
//! nearest survivor in the level snapshot.

use serde::{Deserialize, Serialize};

use outbreak_common::{CharacterId, Vec2};

use crate::character::{CharacterKind, CharacterSnapshot, CharacterState};
use crate::proximity;

/// Control state for an AI-chasing character.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChaseControl {
    /// Pinned target; when unset the nearest survivor is chased
    target: Option<CharacterId>,
}

impl ChaseControl {
    /// Creates a chase control with no pinned target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the chase to one character, or clears the pin.
    pub fn set_target(&mut self, target: Option<CharacterId>) {
        self.target = target;
    }

    /// Returns the pinned target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<CharacterId> {
        self.target
    }

    /// Picks the collision center to chase out of a level snapshot.
    #[must_use]
    pub fn pick_target_center(
        &self,
        self_id: CharacterId,
        self_center: Vec2,
        others: &[CharacterSnapshot],
    ) -> Option<Vec2> {
        if let Some(target) = self.target {
            return others
                .iter()
                .find(|snap| snap.id == target)
                .map(|snap| snap.center);
        }

        others
            .iter()
            .filter(|snap| snap.id != self_id && snap.kind == CharacterKind::Survivor)
            .min_by(|a, b| {
                let da = a.center.distance_squared(self_center);
                let db = b.center.distance_squared(self_center);
                da.total_cmp(&db)
            })
            .map(|snap| snap.center)
    }

    /// Runs one chase tick: sets the desired velocity and orientation
    /// toward the target. Returns the chased center so the caller can
    /// feed it to the steering target.
    ///
    /// With no target in the level, the zombie stands still.
    pub fn update(
        &mut self,
        self_id: CharacterId,
        state: &mut CharacterState,
        others: &[CharacterSnapshot],
    ) -> Option<Vec2> {
        let Some(target_center) = self.pick_target_center(self_id, state.center(), others) else {
            state.velocity = Vec2::ZERO;
            return None;
        };

        let origin = state.sprite_center();
        state.velocity = proximity::direction_to(origin, target_center).scale(state.speed);
        state.orientation = proximity::bearing(origin, target_center);

        Some(target_center)
    }
}
