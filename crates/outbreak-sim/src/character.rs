//! Character entity state and the per-tick update pipeline.
//!
//! A character is a flat state record plus a controller strategy: either
//! player-driven ([`SurvivorControl`]) or AI-chasing ([`ChaseControl`]).
//! Movement runs through an exclusively-owned physics body when one is
//! bound, or through the legacy integrate-and-revert path when not.

use serde::{Deserialize, Serialize};

use outbreak_common::{CharacterId, Vec2};

use crate::combat::{self, AttackOutcome, AttackerView};
use crate::events::EventBus;
use crate::input::PlayerInput;
use crate::physics::{BodyBinding, PhysicsBackend, PhysicsResult};
use crate::player::SurvivorControl;
use crate::proximity;
use crate::role::{AbilityKind, AppearanceMode, Role};
use crate::steering::{SteeringController, SteeringMode};
use crate::tuning::Tuning;
use crate::zombie::ChaseControl;

/// Visual footprint edge length shared by all character sprites, world
/// units. Footprints are square.
pub const CHARACTER_FOOTPRINT: f32 = 32.0;

/// Whether a character is player-driven or AI-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterKind {
    /// Player-controlled (possibly wearing a zombie role)
    Survivor,
    /// AI-controlled chaser
    Zombie,
}

/// The mutable per-entity simulation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterState {
    /// Sprite draw origin, world units
    pub position: Vec2,
    /// Velocity used by the legacy movement path, world units/s
    pub velocity: Vec2,
    /// Facing, radians in `[0, 2π)`
    pub orientation: f32,
    /// Current health, `0 ≤ health ≤ max_health`
    pub health: i32,
    /// Maximum health
    pub max_health: i32,
    /// Movement speed, world units/s
    pub speed: f32,
    /// Visual footprint width, world units
    pub width: f32,
    /// Visual footprint height, world units
    pub height: f32,
}

impl CharacterState {
    /// Creates a state record at a spawn position. Attributes are filled
    /// in by the controller that adopts the record.
    #[must_use]
    pub fn new(position: Vec2, width: f32, height: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            orientation: 0.0,
            health: 0,
            max_health: 0,
            speed: 0.0,
            width,
            height,
        }
    }

    /// Returns the collision center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        proximity::center(self.position, self.width, self.height)
    }

    /// Returns the sprite center used as the bearing origin.
    #[must_use]
    pub fn sprite_center(&self) -> Vec2 {
        proximity::sprite_center(self.position, self.width, self.height)
    }

    /// Returns the bearing from this character toward a point.
    #[must_use]
    pub fn bearing_to(&self, target: Vec2) -> f32 {
        proximity::bearing(self.sprite_center(), target)
    }

    /// Returns a normalized direction from this character toward a point.
    #[must_use]
    pub fn direction_to(&self, target: Vec2) -> Vec2 {
        proximity::direction_to(self.sprite_center(), target)
    }
}

/// Per-instance behavior strategy.
#[derive(Debug)]
pub enum Controller {
    /// Player-driven control
    Survivor(SurvivorControl),
    /// AI chase control
    Chaser(ChaseControl),
}

/// Read-only view of one character used for target selection and legacy
/// overlap rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterSnapshot {
    /// Character ID
    pub id: CharacterId,
    /// Player-driven or AI-driven
    pub kind: CharacterKind,
    /// Sprite draw origin
    pub position: Vec2,
    /// Collision center
    pub center: Vec2,
}

/// A simulated character: state record, controller strategy, optional
/// physics body, and steering.
#[derive(Debug)]
pub struct Character {
    /// Unique ID
    id: CharacterId,
    /// Flat state record
    state: CharacterState,
    /// Exclusively-owned physics body, when physics-backed
    body: Option<BodyBinding>,
    /// Steering state for AI navigation
    steering: SteeringController,
    /// Behavior strategy
    controller: Controller,
    /// Seconds accumulated since the last landed hit. Starts warm so a
    /// fresh character can swing immediately.
    hit_refresh: f32,
    /// Whether external rendering should draw this character
    visible: bool,
}

/// Initial cooldown accumulator; larger than every role's cooldown.
const INITIAL_HIT_REFRESH: f32 = 2.0;

impl Character {
    fn assemble(
        state: CharacterState,
        body: Option<BodyBinding>,
        steering: SteeringController,
        controller: Controller,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            state,
            body,
            steering,
            controller,
            hit_refresh: INITIAL_HIT_REFRESH,
            visible: true,
        }
    }

    /// Creates a player-driven character on the legacy movement path.
    #[must_use]
    pub fn survivor(role: Role, spawn: Vec2, tuning: &Tuning) -> Self {
        let mut state = CharacterState::new(spawn, CHARACTER_FOOTPRINT, CHARACTER_FOOTPRINT);
        let control = SurvivorControl::new(role, &mut state, tuning);
        Self::assemble(
            state,
            None,
            SteeringController::new(tuning.steering),
            Controller::Survivor(control),
        )
    }

    /// Creates a player-driven character backed by a physics body.
    pub fn survivor_with_body<B: PhysicsBackend>(
        backend: &mut B,
        role: Role,
        spawn: Vec2,
        tuning: &Tuning,
    ) -> PhysicsResult<Self> {
        let mut character = Self::survivor(role, spawn, tuning);
        character.bind_body(backend)?;
        Ok(character)
    }

    /// Creates an AI-chasing zombie on the legacy movement path.
    #[must_use]
    pub fn zombie(spawn: Vec2, tuning: &Tuning) -> Self {
        let mut state = CharacterState::new(spawn, CHARACTER_FOOTPRINT, CHARACTER_FOOTPRINT);
        state.health = tuning.zombie_max_health;
        state.max_health = tuning.zombie_max_health;
        state.speed = tuning.zombie_speed;

        Self::assemble(
            state,
            None,
            SteeringController::new(tuning.steering),
            Controller::Chaser(ChaseControl::new()),
        )
    }

    /// Creates an AI-chasing zombie backed by a physics body, steering in
    /// seek mode toward its chase target.
    pub fn zombie_with_body<B: PhysicsBackend>(
        backend: &mut B,
        spawn: Vec2,
        tuning: &Tuning,
    ) -> PhysicsResult<Self> {
        let mut character = Self::zombie(spawn, tuning);
        character.bind_body(backend)?;
        character.steering.set_mode(SteeringMode::Seek);
        Ok(character)
    }

    fn bind_body<B: PhysicsBackend>(&mut self, backend: &mut B) -> PhysicsResult<()> {
        let mut body = BodyBinding::create(
            backend,
            self.state.width,
            self.state.height,
            self.state.position,
        )?;
        body.set_world_position(backend, self.state.position)?;
        self.state.position = body.cached_position();
        self.body = Some(body);
        Ok(())
    }

    /// Returns the character ID.
    #[must_use]
    pub const fn id(&self) -> CharacterId {
        self.id
    }

    /// Returns whether this character is player-driven or AI-driven.
    #[must_use]
    pub const fn kind(&self) -> CharacterKind {
        match self.controller {
            Controller::Survivor(_) => CharacterKind::Survivor,
            Controller::Chaser(_) => CharacterKind::Zombie,
        }
    }

    /// Returns the state record.
    #[must_use]
    pub const fn state(&self) -> &CharacterState {
        &self.state
    }

    /// Returns the sprite draw origin, world units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.state.position
    }

    /// Returns the collision center.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.state.center()
    }

    /// Returns current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.state.health
    }

    /// Returns maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.state.max_health
    }

    /// Returns whether health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.state.health == 0
    }

    /// Returns the facing in radians.
    #[must_use]
    pub const fn orientation(&self) -> f32 {
        self.state.orientation
    }

    /// Returns whether a physics body is bound.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Returns the steering state.
    #[must_use]
    pub const fn steering(&self) -> &SteeringController {
        &self.steering
    }

    /// Returns mutable steering state.
    pub fn steering_mut(&mut self) -> &mut SteeringController {
        &mut self.steering
    }

    /// Returns the survivor control state, if player-driven.
    #[must_use]
    pub const fn survivor_control(&self) -> Option<&SurvivorControl> {
        match &self.controller {
            Controller::Survivor(control) => Some(control),
            Controller::Chaser(_) => None,
        }
    }

    /// Returns mutable survivor control state, if player-driven.
    pub fn survivor_control_mut(&mut self) -> Option<&mut SurvivorControl> {
        match &mut self.controller {
            Controller::Survivor(control) => Some(control),
            Controller::Chaser(_) => None,
        }
    }

    /// Returns mutable chase control state, if AI-driven.
    pub fn chase_control_mut(&mut self) -> Option<&mut ChaseControl> {
        match &mut self.controller {
            Controller::Survivor(_) => None,
            Controller::Chaser(control) => Some(control),
        }
    }

    /// Returns whether external rendering should draw this character.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets the visibility flag.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Returns the pose external rendering should draw.
    #[must_use]
    pub fn appearance(&self) -> AppearanceMode {
        match &self.controller {
            Controller::Survivor(control) => control.appearance(),
            Controller::Chaser(_) => AppearanceMode::Normal,
        }
    }

    /// Feeds the external attack signal (player-driven characters only).
    pub fn set_attacking(&mut self, attacking: bool, tuning: &Tuning) {
        if let Controller::Survivor(control) = &mut self.controller {
            control.set_attack_signal(attacking, tuning);
        }
    }

    /// Faces a world-space point.
    pub fn look(&mut self, target: Vec2) {
        self.state.orientation = self.state.bearing_to(target);
    }

    /// Tests circle overlap with another character.
    #[must_use]
    pub fn collides_with(&self, other: &Character) -> bool {
        proximity::collides(self.center(), other.center())
    }

    /// Applies damage unless immune; health clamps at zero. Returns the
    /// damage actually applied.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let immune = matches!(&self.controller, Controller::Survivor(c) if c.is_immune());
        combat::apply_damage(&mut self.state.health, amount, immune)
    }

    /// Restores health, clamped at the maximum.
    pub fn heal(&mut self, amount: i32) {
        combat::apply_heal(&mut self.state.health, self.state.max_health, amount);
    }

    /// Repositions the character and refills health.
    pub fn respawn<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        spawn: Vec2,
    ) -> PhysicsResult<()> {
        if let Some(body) = &mut self.body {
            body.set_world_position(backend, spawn)?;
            self.state.position = body.cached_position();
        } else {
            self.state.position = spawn;
        }
        self.state.health = self.state.max_health;
        Ok(())
    }

    /// Builds the resolver's view of this character as an attacker.
    #[must_use]
    pub fn attacker_view(&self, tuning: &Tuning) -> AttackerView {
        let (damage, hit_range, cooldown, attacking) = match &self.controller {
            Controller::Survivor(control) => (
                control.attack_damage() * control.damage_multiplier(),
                tuning.survivor_hit_range,
                tuning.survivor_hit_cooldown,
                control.is_attacking(),
            ),
            Controller::Chaser(_) => (
                tuning.zombie_attack_damage,
                tuning.zombie_hit_range,
                tuning.zombie_hit_cooldown,
                true,
            ),
        };

        AttackerView {
            sprite_center: self.state.sprite_center(),
            center: self.state.center(),
            orientation: self.state.orientation,
            damage,
            hit_range,
            cooldown,
            hit_refresh: self.hit_refresh,
            attacking,
        }
    }

    /// Attempts to attack a target character.
    ///
    /// On a hit the target takes the damage and the attacker's cooldown
    /// accumulator resets; otherwise the accumulator grows by the frame
    /// delta.
    pub fn attack(&mut self, target: &mut Character, delta: f32, tuning: &Tuning) -> AttackOutcome {
        let view = self.attacker_view(tuning);
        let outcome = combat::resolve_attack(&view, target.center());

        if let AttackOutcome::Hit { damage } = outcome {
            target.take_damage(damage);
            self.hit_refresh = 0.0;
        } else {
            self.hit_refresh += delta;
        }
        outcome
    }

    /// Switches a player-driven character to its paired role. Returns
    /// the new role, or `None` for AI-driven characters.
    pub fn switch_role(&mut self, tuning: &Tuning) -> Option<Role> {
        match &mut self.controller {
            Controller::Survivor(control) => Some(control.switch_role(&mut self.state, tuning)),
            Controller::Chaser(_) => None,
        }
    }

    /// Triggers the role ability if armed. Returns the applied effect.
    pub fn trigger_ability(&mut self, tuning: &Tuning, clock: f64) -> Option<AbilityKind> {
        match &mut self.controller {
            Controller::Survivor(control) => {
                control.trigger_ability(&mut self.state, tuning, clock)
            }
            Controller::Chaser(_) => None,
        }
    }

    /// Releases the physics body back to the world. Idempotent; must run
    /// before the character is discarded.
    pub fn dispose<B: PhysicsBackend>(&mut self, backend: &mut B) -> PhysicsResult<()> {
        if let Some(body) = self.body.take() {
            body.destroy(backend)?;
        }
        Ok(())
    }

    /// Produces the read-only view used by other characters this frame.
    #[must_use]
    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            kind: self.kind(),
            position: self.state.position,
            center: self.state.center(),
        }
    }

    /// Advances this character by one simulation tick.
    ///
    /// Order per frame: physics transform read-back (or legacy
    /// integration with overlap rejection), then the controller, then
    /// steering.
    #[allow(clippy::too_many_arguments)]
    pub fn update<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        delta: f32,
        clock: f64,
        input: Option<&PlayerInput>,
        others: &[CharacterSnapshot],
        tuning: &Tuning,
        events: &EventBus,
    ) -> PhysicsResult<()> {
        // Movement: read the body transform back, or integrate the legacy
        // velocity and revert the whole move on any overlap.
        if let Some(body) = &mut self.body {
            self.state.position = body.refresh(backend)?;
        } else {
            let old_position = self.state.position;
            self.state.position += self.state.velocity.scale(delta);

            let moved_center = self.state.center();
            let overlaps = others
                .iter()
                .any(|other| other.id != self.id && proximity::collides(moved_center, other.center));
            if overlaps {
                self.state.position = old_position;
            }
        }

        // Controller.
        match &mut self.controller {
            Controller::Survivor(control) => {
                let request =
                    control.update(self.id, &mut self.state, input, clock, delta, tuning, events);
                match &self.body {
                    Some(body) => {
                        if request != Vec2::ZERO {
                            body.apply_impulse(backend, request)?;
                        }
                    }
                    None => self.state.velocity = request,
                }
            }
            Controller::Chaser(control) => {
                let target = control.update(self.id, &mut self.state, others);
                if self.body.is_some() {
                    if let Some(center) = target {
                        self.steering.set_target_world(center);
                    }
                }
            }
        }

        // Steering.
        if let Some(body) = &self.body {
            if let Some(derived) =
                self.steering
                    .apply(backend, body.handle(), self.state.orientation, delta)?
            {
                self.state.orientation = derived;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MockPhysics;
    use crate::role::Role;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_survivor_takes_damage() {
        let tuning = tuning();
        let mut survivor = Character::survivor(Role::Artist, Vec2::ZERO, &tuning);
        survivor.state.health = 100;
        survivor.state.max_health = 100;

        let applied = survivor.take_damage(20);
        assert_eq!(applied, 20);
        assert_eq!(survivor.health(), 80);
    }

    #[test]
    fn test_immune_survivor_ignores_damage() {
        let tuning = tuning();
        let mut survivor = Character::survivor(Role::Artist, Vec2::ZERO, &tuning);
        survivor.state.health = 100;
        survivor.state.max_health = 100;
        survivor
            .survivor_control_mut()
            .expect("survivor")
            .set_immune(true);

        let applied = survivor.take_damage(20);
        assert_eq!(applied, 0);
        assert_eq!(survivor.health(), 100);
    }

    #[test]
    fn test_health_never_goes_negative() {
        let tuning = tuning();
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);

        zombie.take_damage(10_000);
        assert_eq!(zombie.health(), 0);
        assert!(zombie.is_dead());
    }

    #[test]
    fn test_heal_respects_max_health() {
        let tuning = tuning();
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);
        zombie.take_damage(20);

        zombie.heal(10_000);
        assert_eq!(zombie.health(), zombie.max_health());
    }

    #[test]
    fn test_attack_hits_then_cools_down() {
        let tuning = tuning();
        let mut survivor = Character::survivor(Role::Artist, Vec2::new(0.0, 5.0), &tuning);
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);

        // Warm the cooldown past the threshold, face the target, signal.
        survivor.hit_refresh = 1.0;
        survivor.look(zombie.center());
        survivor.set_attacking(true, &tuning);
        let events = EventBus::default();
        let mut world = MockPhysics::new();
        survivor
            .update(&mut world, 0.016, 0.0, None, &[], &tuning, &events)
            .expect("update");

        let expected = survivor.survivor_control().expect("survivor").attack_damage();
        let before = zombie.health();

        let outcome = survivor.attack(&mut zombie, 0.016, &tuning);
        assert!(outcome.is_hit());
        assert_eq!(zombie.health(), before - expected);

        // Same instant, cooldown just reset: the second swing fails.
        let outcome = survivor.attack(&mut zombie, 0.016, &tuning);
        assert_eq!(outcome, AttackOutcome::OnCooldown);
        assert_eq!(zombie.health(), before - expected);
    }

    #[test]
    fn test_damage_multiplier_scales_attack() {
        let tuning = tuning();
        let mut survivor = Character::survivor(Role::Artist, Vec2::new(0.0, 5.0), &tuning);
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);

        survivor.hit_refresh = 1.0;
        survivor.look(zombie.center());
        survivor.set_attacking(true, &tuning);
        let events = EventBus::default();
        let mut world = MockPhysics::new();
        survivor
            .update(&mut world, 0.016, 0.0, None, &[], &tuning, &events)
            .expect("update");
        survivor
            .survivor_control_mut()
            .expect("survivor")
            .set_damage_boost(3);

        let damage = survivor.survivor_control().expect("survivor").attack_damage();
        let before = zombie.health();
        let outcome = survivor.attack(&mut zombie, 0.016, &tuning);

        assert_eq!(outcome, AttackOutcome::Hit { damage: damage * 3 });
        assert_eq!(zombie.health(), before - damage * 3);
    }

    #[test]
    fn test_missed_attack_accumulates_cooldown() {
        let tuning = tuning();
        let mut survivor = Character::survivor(Role::Artist, Vec2::ZERO, &tuning);
        let mut zombie = Character::zombie(Vec2::new(500.0, 500.0), &tuning);

        let before = survivor.hit_refresh;
        assert_eq!(
            survivor.attack(&mut zombie, 0.1, &tuning),
            AttackOutcome::OutOfRange
        );
        assert!((survivor.hit_refresh - (before + 0.1)).abs() < 1e-6);
    }

    #[test]
    fn test_collides_with_is_symmetric() {
        let tuning = tuning();
        let a = Character::survivor(Role::Artist, Vec2::ZERO, &tuning);
        let b = Character::zombie(Vec2::new(4.0, 4.0), &tuning);

        assert!(a.collides_with(&b));
        assert_eq!(a.collides_with(&b), b.collides_with(&a));
    }

    #[test]
    fn test_legacy_move_reverts_on_overlap() {
        let tuning = tuning();
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);
        let blocker = Character::zombie(Vec2::new(8.0, 0.0), &tuning);
        // Stand a target far away so the chase pulls straight +x.
        let runner = Character::survivor(Role::Artist, Vec2::new(500.0, 0.0), &tuning);

        let snapshots = [blocker.snapshot(), runner.snapshot()];
        let events = EventBus::default();
        let mut world = MockPhysics::new();

        // First tick sets the chase velocity; second tick would move into
        // the blocker and must revert.
        zombie
            .update(&mut world, 0.1, 0.0, None, &snapshots, &tuning, &events)
            .expect("update");
        let before = zombie.position();
        zombie
            .update(&mut world, 0.1, 0.1, None, &snapshots, &tuning, &events)
            .expect("update");

        assert_eq!(zombie.position(), before);
    }

    #[test]
    fn test_dispose_releases_body_once() {
        let tuning = tuning();
        let mut world = MockPhysics::new();
        let mut survivor =
            Character::survivor_with_body(&mut world, Role::Scholar, Vec2::ZERO, &tuning)
                .expect("create");
        assert!(survivor.has_body());
        assert_eq!(world.body_count(), 1);

        survivor.dispose(&mut world).expect("dispose");
        assert!(!survivor.has_body());
        assert_eq!(world.body_count(), 0);

        // Idempotent.
        survivor.dispose(&mut world).expect("dispose again");
    }

    #[test]
    fn test_body_backed_update_reads_transform_back() {
        let tuning = tuning();
        let mut world = MockPhysics::new();
        let mut survivor =
            Character::survivor_with_body(&mut world, Role::Athlete, Vec2::new(100.0, 100.0), &tuning)
                .expect("create");

        let input = PlayerInput::new().with_movement(1.0, 0.0);
        let events = EventBus::default();
        let before = survivor.position();

        survivor
            .update(&mut world, 1.0 / 60.0, 0.0, Some(&input), &[], &tuning, &events)
            .expect("update");
        world.step(1.0 / 60.0);
        survivor
            .update(&mut world, 1.0 / 60.0, 0.0, Some(&input), &[], &tuning, &events)
            .expect("update");

        assert!(survivor.position().x > before.x);
    }

    #[test]
    fn test_zombie_with_body_seeks_by_default() {
        let tuning = tuning();
        let mut world = MockPhysics::new();
        let zombie = Character::zombie_with_body(&mut world, Vec2::ZERO, &tuning).expect("create");
        assert_eq!(zombie.steering().mode(), SteeringMode::Seek);
    }

    #[test]
    fn test_respawn_refills_health_and_moves() {
        let tuning = tuning();
        let mut world = MockPhysics::new();
        let mut zombie = Character::zombie(Vec2::ZERO, &tuning);
        zombie.take_damage(30);

        zombie
            .respawn(&mut world, Vec2::new(50.0, 60.0))
            .expect("respawn");
        assert_eq!(zombie.health(), zombie.max_health());
        assert_eq!(zombie.position(), Vec2::new(50.0, 60.0));
    }
}
