//! Steering-driven movement for AI-controlled characters.
//!
//! Turns a high-level navigation intent (wander, seek, arrive) into
//! bounded forces applied through the physics backend. Behaviors are
//! pluggable: anything implementing [`SteeringBehavior`] against the
//! [`Steerable`] accessor contract can drive an agent, without the
//! character knowing which algorithm is active.
//!
//! All quantities in this module are physics units; conversion from
//! world draw coordinates happens at the controller boundary.

use serde::{Deserialize, Serialize};

use outbreak_common::{BodyHandle, Vec2};

use crate::physics::{PhysicsBackend, PhysicsResult, PIXELS_PER_METER};

/// Velocity and acceleration limits for a steering agent, physics units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SteeringLimits {
    /// Maximum linear speed, m/s
    pub max_linear_speed: f32,
    /// Maximum linear acceleration, m/s²
    pub max_linear_acceleration: f32,
    /// Maximum angular speed, rad/s
    pub max_angular_speed: f32,
    /// Maximum angular acceleration, rad/s²
    pub max_angular_acceleration: f32,
    /// Squared speeds below this are treated as stationary when deriving
    /// orientation from velocity, avoiding jitter at near-zero speed
    pub zero_linear_speed_threshold: f32,
}

impl Default for SteeringLimits {
    fn default() -> Self {
        Self {
            max_linear_speed: 2.0,
            max_linear_acceleration: 10.0,
            max_angular_speed: 5.0,
            max_angular_acceleration: 10.0,
            zero_linear_speed_threshold: 0.001,
        }
    }
}

/// Linear and angular acceleration produced by a steering behavior.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SteeringOutput {
    /// Linear acceleration
    pub linear: Vec2,
    /// Angular acceleration
    pub angular: f32,
}

impl SteeringOutput {
    /// Output that requests no acceleration at all.
    pub const NONE: Self = Self {
        linear: Vec2::ZERO,
        angular: 0.0,
    };

    /// Returns whether this output requests any acceleration.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.linear == Vec2::ZERO && self.angular == 0.0
    }
}

/// Accessor contract a steering behavior reads its agent through.
pub trait Steerable {
    /// Agent position
    fn position(&self) -> Vec2;
    /// Agent orientation in radians
    fn orientation(&self) -> f32;
    /// Agent linear velocity
    fn linear_velocity(&self) -> Vec2;
    /// Agent angular velocity
    fn angular_velocity(&self) -> f32;
    /// Agent limits
    fn limits(&self) -> &SteeringLimits;
}

/// Snapshot of an agent's kinematic state read from the backend.
#[derive(Debug, Clone, Copy)]
pub struct AgentState {
    /// Position, physics units
    pub position: Vec2,
    /// Orientation in radians
    pub orientation: f32,
    /// Linear velocity, physics units
    pub linear_velocity: Vec2,
    /// Angular velocity in rad/s
    pub angular_velocity: f32,
    /// Limits in force at the time of the read
    pub limits: SteeringLimits,
}

impl AgentState {
    /// Reads a body's state out of the backend.
    pub fn read<B: PhysicsBackend>(
        backend: &B,
        body: BodyHandle,
        orientation: f32,
        limits: SteeringLimits,
    ) -> PhysicsResult<Self> {
        Ok(Self {
            position: backend.position(body)?,
            orientation,
            linear_velocity: backend.linear_velocity(body)?,
            angular_velocity: backend.angular_velocity(body)?,
            limits,
        })
    }
}

impl Steerable for AgentState {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn orientation(&self) -> f32 {
        self.orientation
    }

    fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    fn limits(&self) -> &SteeringLimits {
        &self.limits
    }
}

/// Converts a non-zero velocity into the orientation it points along.
///
/// Zero orientation points along +y and the angle grows clockwise,
/// matching the bearing convention used by the proximity queries.
#[must_use]
pub fn vector_to_angle(v: Vec2) -> f32 {
    (-v.x).atan2(v.y)
}

/// Converts an orientation back into a unit direction vector.
#[must_use]
pub fn angle_to_vector(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// A pluggable steering algorithm.
pub trait SteeringBehavior {
    /// Computes the acceleration request for one tick.
    fn steer(&mut self, agent: &dyn Steerable, target: Option<Vec2>) -> SteeringOutput;
}

/// Accelerates at full power straight toward the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Seek;

impl SteeringBehavior for Seek {
    fn steer(&mut self, agent: &dyn Steerable, target: Option<Vec2>) -> SteeringOutput {
        let Some(target) = target else {
            return SteeringOutput::NONE;
        };

        let direction = (target - agent.position()).normalized();
        SteeringOutput {
            linear: direction.scale(agent.limits().max_linear_acceleration),
            angular: 0.0,
        }
    }
}

/// Seeks the target but decelerates inside a slowing radius so the agent
/// comes to rest on it instead of orbiting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Arrive {
    /// Distance at which the agent counts as arrived
    pub arrival_tolerance: f32,
    /// Distance at which deceleration begins
    pub deceleration_radius: f32,
    /// Time horizon for matching the desired velocity, seconds
    pub time_to_target: f32,
}

impl Default for Arrive {
    fn default() -> Self {
        Self {
            arrival_tolerance: 0.01,
            deceleration_radius: 0.5,
            time_to_target: 0.1,
        }
    }
}

impl SteeringBehavior for Arrive {
    fn steer(&mut self, agent: &dyn Steerable, target: Option<Vec2>) -> SteeringOutput {
        let Some(target) = target else {
            return SteeringOutput::NONE;
        };

        let to_target = target - agent.position();
        let distance = to_target.length();
        if distance <= self.arrival_tolerance {
            return SteeringOutput::NONE;
        }

        let limits = agent.limits();
        let mut target_speed = limits.max_linear_speed;
        if distance <= self.deceleration_radius {
            target_speed *= distance / self.deceleration_radius;
        }

        let desired_velocity = to_target.normalized().scale(target_speed);
        let mut linear =
            (desired_velocity - agent.linear_velocity()).scale(1.0 / self.time_to_target);
        if linear.length() > limits.max_linear_acceleration {
            linear = linear.normalized().scale(limits.max_linear_acceleration);
        }

        SteeringOutput {
            linear,
            angular: 0.0,
        }
    }
}

/// Meanders by chasing a point on a circle projected ahead of the agent,
/// jittering the point a little every tick.
#[derive(Debug, Clone)]
pub struct Wander {
    /// Distance of the wander circle center ahead of the agent
    pub wander_offset: f32,
    /// Radius of the wander circle
    pub wander_radius: f32,
    /// Maximum orientation jitter per tick, radians
    pub wander_rate: f32,
    /// Current angle of the wander target on the circle
    wander_orientation: f32,
    /// Deterministic RNG state
    rng_state: u64,
}

impl Default for Wander {
    fn default() -> Self {
        Self::new(12345)
    }
}

impl Wander {
    /// Creates a wander behavior with the given RNG seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            wander_offset: 1.0,
            wander_radius: 0.8,
            wander_rate: 0.4,
            wander_orientation: 0.0,
            rng_state: seed.max(1),
        }
    }

    /// Generates a pseudo-random value in [0, 1).
    fn next_random(&mut self) -> f32 {
        // Simple xorshift
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 17;
        self.rng_state ^= self.rng_state << 5;
        (self.rng_state as f32) / (u64::MAX as f32)
    }

    /// Random value in [-1, 1] biased toward zero.
    fn random_binomial(&mut self) -> f32 {
        self.next_random() - self.next_random()
    }
}

impl SteeringBehavior for Wander {
    fn steer(&mut self, agent: &dyn Steerable, _target: Option<Vec2>) -> SteeringOutput {
        self.wander_orientation += self.random_binomial() * self.wander_rate;
        let target_orientation = self.wander_orientation + agent.orientation();

        let circle_center = agent.position()
            + angle_to_vector(agent.orientation()).scale(self.wander_offset);
        let wander_target =
            circle_center + angle_to_vector(target_orientation).scale(self.wander_radius);

        let direction = (wander_target - agent.position()).normalized();
        SteeringOutput {
            linear: direction.scale(agent.limits().max_linear_acceleration),
            angular: 0.0,
        }
    }
}

/// High-level navigation intent consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SteeringMode {
    /// Meander with no particular destination
    Wander,
    /// Head straight for the target at full acceleration
    Seek,
    /// Head for the target and stop on it
    Arrive,
    /// Steering disabled
    #[default]
    None,
}

/// Per-character steering state: active mode, target, and facing policy.
#[derive(Debug)]
pub struct SteeringController {
    /// Active navigation intent
    mode: SteeringMode,
    /// Steering target, physics units
    target: Option<Vec2>,
    /// Facing policy: torque-driven when true, velocity-derived otherwise
    independent_facing: bool,
    /// Limits shared by all behaviors on this agent
    limits: SteeringLimits,
    seek: Seek,
    arrive: Arrive,
    wander: Wander,
}

impl SteeringController {
    /// Creates a controller with steering disabled.
    #[must_use]
    pub fn new(limits: SteeringLimits) -> Self {
        Self {
            mode: SteeringMode::None,
            target: None,
            independent_facing: false,
            limits,
            seek: Seek,
            arrive: Arrive::default(),
            wander: Wander::default(),
        }
    }

    /// Returns the active steering mode.
    #[must_use]
    pub const fn mode(&self) -> SteeringMode {
        self.mode
    }

    /// Sets the active steering mode.
    pub fn set_mode(&mut self, mode: SteeringMode) {
        self.mode = mode;
    }

    /// Returns the current target, physics units.
    #[must_use]
    pub const fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Sets the target in physics units.
    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    /// Sets the target from world draw coordinates.
    pub fn set_target_world(&mut self, target: Vec2) {
        self.target = Some(target.scale(1.0 / PIXELS_PER_METER));
    }

    /// Sets the facing policy.
    pub fn set_independent_facing(&mut self, independent: bool) {
        self.independent_facing = independent;
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> &SteeringLimits {
        &self.limits
    }

    /// Runs one steering tick against the backend.
    ///
    /// Computes the behavior output, applies it as force/torque, updates
    /// facing, then clamps: linear speed by rescaling the velocity
    /// vector, angular speed by clamping the scalar. Returns the new
    /// orientation when one was derived from the velocity heading.
    pub fn apply<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        body: BodyHandle,
        orientation: f32,
        delta: f32,
    ) -> PhysicsResult<Option<f32>> {
        if self.mode == SteeringMode::None {
            return Ok(None);
        }

        let agent = AgentState::read(backend, body, orientation, self.limits)?;
        let output = match self.mode {
            SteeringMode::Seek => self.seek.steer(&agent, self.target),
            SteeringMode::Arrive => self.arrive.steer(&agent, self.target),
            SteeringMode::Wander => self.wander.steer(&agent, self.target),
            SteeringMode::None => SteeringOutput::NONE,
        };

        let mut derived_orientation = None;

        if output.linear != Vec2::ZERO {
            backend.apply_force(body, output.linear)?;
        }

        if self.independent_facing {
            if output.angular != 0.0 {
                backend.apply_torque(body, output.angular)?;
            }
        } else {
            // Face the way we are moving, unless effectively stationary.
            let velocity = agent.linear_velocity;
            if velocity.length_squared() > self.limits.zero_linear_speed_threshold {
                let new_orientation = vector_to_angle(velocity);
                backend
                    .set_angular_velocity(body, (new_orientation - orientation) * delta)?;
                derived_orientation = Some(new_orientation);
            }
        }

        // Cap linear speed by rescaling the velocity vector; cap angular
        // speed by clamping the scalar.
        let velocity = backend.linear_velocity(body)?;
        if velocity.length() > self.limits.max_linear_speed {
            backend.set_linear_velocity(
                body,
                velocity.normalized().scale(self.limits.max_linear_speed),
            )?;
        }
        let angular = backend.angular_velocity(body)?;
        let clamped = angular.clamp(-self.limits.max_angular_speed, self.limits.max_angular_speed);
        if (clamped - angular).abs() > 0.0 {
            backend.set_angular_velocity(body, clamped)?;
        }

        Ok(derived_orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyBinding, MockPhysics};
    use proptest::prelude::*;
    use std::f32::consts::PI;

    fn agent_at(position: Vec2, velocity: Vec2) -> AgentState {
        AgentState {
            position,
            orientation: 0.0,
            linear_velocity: velocity,
            angular_velocity: 0.0,
            limits: SteeringLimits::default(),
        }
    }

    #[test]
    fn test_angle_vector_round_trip() {
        for angle in [0.0, PI / 3.0, -PI / 2.0, 2.5] {
            let v = angle_to_vector(angle);
            let back = vector_to_angle(v);
            assert!((back - angle).abs() < 1e-5, "angle {angle} came back as {back}");
        }
    }

    #[test]
    fn test_vector_to_angle_matches_bearing_convention() {
        // +y is zero; -y is pi.
        assert!((vector_to_angle(Vec2::new(0.0, 1.0))).abs() < 1e-6);
        assert!((vector_to_angle(Vec2::new(0.0, -1.0)).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_seek_accelerates_toward_target() {
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);
        let out = Seek.steer(&agent, Some(Vec2::new(0.0, 10.0)));

        assert!(out.linear.y > 0.0);
        assert!((out.linear.x).abs() < 1e-6);
        assert!(
            (out.linear.length() - agent.limits.max_linear_acceleration).abs() < 1e-4
        );
    }

    #[test]
    fn test_seek_without_target_is_inert() {
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);
        assert!(Seek.steer(&agent, None).is_none());
    }

    #[test]
    fn test_arrive_slows_inside_deceleration_radius() {
        let mut arrive = Arrive::default();
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);

        let far = arrive.steer(&agent, Some(Vec2::new(10.0, 0.0)));
        let near = arrive.steer(&agent, Some(Vec2::new(0.1, 0.0)));
        assert!(near.linear.length() < far.linear.length());
    }

    #[test]
    fn test_arrive_stops_at_target() {
        let mut arrive = Arrive::default();
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);
        let out = arrive.steer(&agent, Some(Vec2::new(0.001, 0.0)));
        assert!(out.is_none());
    }

    #[test]
    fn test_wander_is_deterministic_for_a_seed() {
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);

        let mut a = Wander::new(7);
        let mut b = Wander::new(7);
        for _ in 0..10 {
            assert_eq!(a.steer(&agent, None), b.steer(&agent, None));
        }
    }

    #[test]
    fn test_wander_respects_acceleration_limit() {
        let agent = agent_at(Vec2::ZERO, Vec2::ZERO);
        let mut wander = Wander::new(99);
        for _ in 0..50 {
            let out = wander.steer(&agent, None);
            assert!(out.linear.length() <= agent.limits.max_linear_acceleration + 1e-4);
        }
    }

    #[test]
    fn test_controller_derives_orientation_from_velocity() {
        let mut world = MockPhysics::new();
        let binding = BodyBinding::create(&mut world, 32.0, 32.0, Vec2::ZERO).expect("create");
        let body = binding.handle();

        world
            .set_linear_velocity(body, Vec2::new(0.0, -1.0))
            .expect("set velocity");

        let mut controller = SteeringController::new(SteeringLimits::default());
        controller.set_mode(SteeringMode::Seek);
        controller.set_target(Some(Vec2::new(0.0, -10.0)));

        let derived = controller
            .apply(&mut world, body, 0.0, 1.0 / 60.0)
            .expect("apply");
        let orientation = derived.expect("moving agent derives orientation");
        assert!((orientation.abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn test_controller_skips_facing_below_zero_threshold() {
        let mut world = MockPhysics::new();
        let binding = BodyBinding::create(&mut world, 32.0, 32.0, Vec2::ZERO).expect("create");
        let body = binding.handle();

        world
            .set_linear_velocity(body, Vec2::new(0.0, 0.01))
            .expect("set velocity");

        let mut controller = SteeringController::new(SteeringLimits::default());
        controller.set_mode(SteeringMode::Seek);
        controller.set_target(Some(Vec2::new(0.0, 10.0)));

        let derived = controller
            .apply(&mut world, body, 1.0, 1.0 / 60.0)
            .expect("apply");
        assert!(derived.is_none());
    }

    #[test]
    fn test_controller_disabled_mode_is_inert() {
        let mut world = MockPhysics::new();
        let binding = BodyBinding::create(&mut world, 32.0, 32.0, Vec2::ZERO).expect("create");
        let body = binding.handle();

        let mut controller = SteeringController::new(SteeringLimits::default());
        controller
            .apply(&mut world, body, 0.0, 1.0 / 60.0)
            .expect("apply");

        assert_eq!(world.linear_velocity(body).expect("velocity"), Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_speed_clamped_after_apply(
            vx in -50.0f32..50.0, vy in -50.0f32..50.0,
            tx in -10.0f32..10.0, ty in -10.0f32..10.0,
        ) {
            let mut world = MockPhysics::new();
            let binding = BodyBinding::create(&mut world, 32.0, 32.0, Vec2::ZERO)
                .expect("create");
            let body = binding.handle();
            world.set_linear_velocity(body, Vec2::new(vx, vy)).expect("set velocity");

            let limits = SteeringLimits::default();
            let mut controller = SteeringController::new(limits);
            controller.set_mode(SteeringMode::Seek);
            controller.set_target(Some(Vec2::new(tx, ty)));
            controller.apply(&mut world, body, 0.0, 1.0 / 60.0).expect("apply");

            let speed = world.linear_velocity(body).expect("velocity").length();
            prop_assert!(speed <= limits.max_linear_speed + 1e-3);
        }
    }
}
