//! Level surface: character registry and per-frame update fan-out.
//!
//! The level owns the live characters and the simulation clock. The
//! physics world itself is a shared external resource handed into each
//! operation; every character exclusively owns its body, and despawning
//! destroys the body synchronously before the character is dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

use outbreak_common::{CharacterId, Vec2};

use crate::character::{Character, CharacterKind, CharacterSnapshot};
use crate::combat::AttackOutcome;
use crate::events::{EventBus, SimEvent};
use crate::input::PlayerInput;
use crate::physics::{PhysicsBackend, PhysicsError};
use crate::role::Role;
use crate::tuning::Tuning;

/// Errors that can occur in level operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// No character with the given ID is alive
    #[error("character not found: {0:?}")]
    CharacterNotFound(CharacterId),

    /// An operation named the same character twice
    #[error("character cannot target itself: {0:?}")]
    SelfTarget(CharacterId),

    /// Physics backend failure
    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;

impl From<LevelError> for outbreak_common::OutbreakError {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::CharacterNotFound(id) => Self::CharacterNotFound(id),
            LevelError::SelfTarget(_) => Self::Simulation(err.to_string()),
            LevelError::Physics(inner) => Self::Physics(inner.to_string()),
        }
    }
}

/// Spawn layout for a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    /// Where the player starts
    pub player_spawn: Vec2,
    /// Candidate zombie spawn locations
    pub zombie_spawn_points: Vec<Vec2>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            player_spawn: Vec2::ZERO,
            zombie_spawn_points: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 50.0),
                Vec2::new(50.0, 50.0),
                Vec2::new(50.0, 0.0),
            ],
        }
    }
}

/// Per-frame inputs keyed by character.
pub type PlayerInputs = HashMap<CharacterId, PlayerInput>;

/// The live character registry and simulation driver surface.
#[derive(Debug)]
pub struct Level {
    /// Live characters by ID
    characters: HashMap<CharacterId, Character>,
    /// Spawn order, kept for deterministic update iteration
    order: Vec<CharacterId>,
    /// Gameplay tuning
    tuning: Tuning,
    /// Outgoing event bus
    events: EventBus,
    /// Accumulated simulation time, seconds
    clock: f64,
}

impl Default for Level {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl Level {
    /// Creates an empty level with the given tuning.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            characters: HashMap::new(),
            order: Vec::new(),
            tuning,
            events: EventBus::default(),
            clock: 0.0,
        }
    }

    /// Returns the tuning in force.
    #[must_use]
    pub const fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Returns the accumulated simulation time in seconds.
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Returns the number of live characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Returns whether the level has no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Gets a character by ID.
    pub fn get(&self, id: CharacterId) -> LevelResult<&Character> {
        self.characters
            .get(&id)
            .ok_or(LevelError::CharacterNotFound(id))
    }

    /// Gets a mutable character by ID.
    pub fn get_mut(&mut self, id: CharacterId) -> LevelResult<&mut Character> {
        self.characters
            .get_mut(&id)
            .ok_or(LevelError::CharacterNotFound(id))
    }

    /// Iterates live characters in spawn order.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.order.iter().filter_map(|id| self.characters.get(id))
    }

    /// Iterates live characters of one kind in spawn order.
    pub fn characters_of_kind(&self, kind: CharacterKind) -> impl Iterator<Item = &Character> {
        self.characters().filter(move |c| c.kind() == kind)
    }

    fn register(&mut self, character: Character) -> CharacterId {
        let id = character.id();
        self.order.push(id);
        self.characters.insert(id, character);
        self.events.publish(SimEvent::CharacterSpawned { id });
        debug!(?id, "character spawned");
        id
    }

    /// Spawns a physics-backed, player-driven character.
    pub fn spawn_survivor<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        role: Role,
        spawn: Vec2,
    ) -> LevelResult<CharacterId> {
        let character = Character::survivor_with_body(backend, role, spawn, &self.tuning)?;
        Ok(self.register(character))
    }

    /// Spawns a player-driven character on the legacy movement path.
    pub fn spawn_survivor_legacy(&mut self, role: Role, spawn: Vec2) -> CharacterId {
        let character = Character::survivor(role, spawn, &self.tuning);
        self.register(character)
    }

    /// Spawns a physics-backed zombie.
    pub fn spawn_zombie<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        spawn: Vec2,
    ) -> LevelResult<CharacterId> {
        let character = Character::zombie_with_body(backend, spawn, &self.tuning)?;
        Ok(self.register(character))
    }

    /// Spawns a zombie on the legacy movement path.
    pub fn spawn_zombie_legacy(&mut self, spawn: Vec2) -> CharacterId {
        let character = Character::zombie(spawn, &self.tuning);
        self.register(character)
    }

    /// Spawns the player and one zombie per configured spawn point.
    /// Returns the player's ID.
    pub fn populate<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        config: &LevelConfig,
        role: Role,
    ) -> LevelResult<CharacterId> {
        let player = self.spawn_survivor(backend, role, config.player_spawn)?;
        for &point in &config.zombie_spawn_points {
            self.spawn_zombie(backend, point)?;
        }
        info!(
            zombies = config.zombie_spawn_points.len(),
            "level populated"
        );
        Ok(player)
    }

    /// Removes a character, destroying its physics body synchronously
    /// before the character is dropped.
    pub fn despawn<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        id: CharacterId,
    ) -> LevelResult<()> {
        let mut character = self
            .characters
            .remove(&id)
            .ok_or(LevelError::CharacterNotFound(id))?;
        self.order.retain(|other| *other != id);

        character.dispose(backend)?;
        self.events.publish(SimEvent::CharacterDespawned { id });
        debug!(?id, "character despawned");
        Ok(())
    }

    /// Despawns every character, releasing all physics bodies.
    pub fn dispose_all<B: PhysicsBackend>(&mut self, backend: &mut B) -> LevelResult<()> {
        for id in std::mem::take(&mut self.order) {
            if let Some(mut character) = self.characters.remove(&id) {
                character.dispose(backend)?;
                self.events.publish(SimEvent::CharacterDespawned { id });
            }
        }
        Ok(())
    }

    /// Builds the read-only world view used during one frame.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CharacterSnapshot> {
        self.characters().map(Character::snapshot).collect()
    }

    /// Advances the whole level by one simulation tick.
    ///
    /// Every character updates exactly once against a snapshot taken at
    /// the start of the frame; the external driver steps the physics
    /// world separately, after the forces queued here.
    pub fn update<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        delta: f32,
        inputs: &PlayerInputs,
    ) -> LevelResult<()> {
        let snapshots = self.snapshot();

        for index in 0..self.order.len() {
            let id = self.order[index];
            let Some(character) = self.characters.get_mut(&id) else {
                continue;
            };
            character.update(
                backend,
                delta,
                self.clock,
                inputs.get(&id),
                &snapshots,
                &self.tuning,
                &self.events,
            )?;
        }

        self.clock += f64::from(delta);
        Ok(())
    }

    /// Resolves one attack attempt between two characters, publishing
    /// the combat events that fall out of it.
    pub fn attack(
        &mut self,
        attacker_id: CharacterId,
        target_id: CharacterId,
        delta: f32,
    ) -> LevelResult<AttackOutcome> {
        if attacker_id == target_id {
            return Err(LevelError::SelfTarget(attacker_id));
        }

        let mut attacker = self
            .characters
            .remove(&attacker_id)
            .ok_or(LevelError::CharacterNotFound(attacker_id))?;

        let outcome = match self.characters.get_mut(&target_id) {
            Some(target) => {
                let before = target.health();
                let outcome = attacker.attack(target, delta, &self.tuning);

                if let AttackOutcome::Hit { damage } = outcome {
                    self.events.publish(SimEvent::AttackLanded {
                        attacker: attacker_id,
                        target: target_id,
                        damage,
                    });
                    self.events.publish(SimEvent::Damaged {
                        target: target_id,
                        amount: before - target.health(),
                        source: Some(attacker_id),
                    });
                    if target.is_dead() && before > 0 {
                        self.events.publish(SimEvent::CharacterDied { id: target_id });
                        info!(?target_id, "character died");
                    }
                }
                Ok(outcome)
            }
            None => Err(LevelError::CharacterNotFound(target_id)),
        };

        self.characters.insert(attacker_id, attacker);
        outcome
    }

    /// Applies direct damage (traps, environment), publishing events.
    pub fn damage(&mut self, id: CharacterId, amount: i32) -> LevelResult<i32> {
        let character = self
            .characters
            .get_mut(&id)
            .ok_or(LevelError::CharacterNotFound(id))?;

        let before = character.health();
        let applied = character.take_damage(amount);
        if applied > 0 {
            let died = character.is_dead() && before > 0;
            self.events.publish(SimEvent::Damaged {
                target: id,
                amount: applied,
                source: None,
            });
            if died {
                self.events.publish(SimEvent::CharacterDied { id });
                info!(?id, "character died");
            }
        }
        Ok(applied)
    }

    /// Switches a player-driven character to its paired role.
    pub fn switch_role(&mut self, id: CharacterId) -> LevelResult<Option<Role>> {
        let character = self
            .characters
            .get_mut(&id)
            .ok_or(LevelError::CharacterNotFound(id))?;

        let switched = character.switch_role(&self.tuning);
        if let Some(role) = switched {
            self.events.publish(SimEvent::RoleSwitched { id, role });
            debug!(?id, role = role.display_name(), "role switched");
        }
        Ok(switched)
    }
}
