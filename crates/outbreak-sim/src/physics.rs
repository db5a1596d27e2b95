//! Physics body binding.
//!
//! This module wraps the external rigid-body world behind a backend trait
//! so the steering and combat layers never touch raw physics types:
//! - `PhysicsBackend`: create/destroy bodies, apply impulse/force/torque,
//!   read and write transforms (all in physics units)
//! - `BodyBinding`: one character's owned body plus the world-unit <->
//!   physics-unit conversion
//! - `MockPhysics`: deterministic reference backend for tests and
//!   headless simulation
//!
//! The solver itself (broad phase, narrow phase, integration order) is an
//! external collaborator; this core only issues commands and reads back
//! transforms.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use outbreak_common::{BodyHandle, Vec2};

/// World draw units per physics meter.
pub const PIXELS_PER_METER: f32 = 100.0;

/// Linear damping applied to character bodies. High damping gives
/// responsive, non-sliding movement under impulse control.
pub const BODY_LINEAR_DAMPING: f32 = 50.0;

/// Fixture density for character bodies.
pub const BODY_DENSITY: f32 = 1.0;

/// Errors that can occur in the physics binding.
#[derive(Debug, Clone, Error)]
pub enum PhysicsError {
    /// The physics world is missing or not initialized. Body creation
    /// against an invalid world is a fatal precondition violation and is
    /// reported at construction time, never deferred.
    #[error("physics world unavailable")]
    WorldUnavailable,

    /// A handle referred to a body the backend no longer knows
    #[error("body not found: {0:?}")]
    BodyNotFound(BodyHandle),
}

/// Result type for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Definition of a rigid body to create. All lengths are physics units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    /// Initial position of the body center
    pub position: Vec2,
    /// Half extents of the box fixture
    pub half_extents: Vec2,
    /// Linear damping coefficient
    pub linear_damping: f32,
    /// Whether the body resists all rotation
    pub fixed_rotation: bool,
    /// Fixture density
    pub density: f32,
}

/// Backend interface to the external physics world.
///
/// Implementations queue force/impulse commands within a frame; the
/// world step that consumes them runs outside this core, once per frame.
pub trait PhysicsBackend {
    /// Creates a dynamic body. Fails if the world is unavailable.
    fn create_body(&mut self, def: &BodyDef) -> PhysicsResult<BodyHandle>;

    /// Destroys a body and any owned fixture resources.
    fn destroy_body(&mut self, handle: BodyHandle) -> PhysicsResult<()>;

    /// Returns the body center position.
    fn position(&self, handle: BodyHandle) -> PhysicsResult<Vec2>;

    /// Returns the body angle in radians.
    fn angle(&self, handle: BodyHandle) -> PhysicsResult<f32>;

    /// Sets the body transform.
    fn set_transform(&mut self, handle: BodyHandle, position: Vec2, angle: f32)
        -> PhysicsResult<()>;

    /// Returns the body linear velocity.
    fn linear_velocity(&self, handle: BodyHandle) -> PhysicsResult<Vec2>;

    /// Sets the body linear velocity.
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()>;

    /// Returns the body angular velocity.
    fn angular_velocity(&self, handle: BodyHandle) -> PhysicsResult<f32>;

    /// Sets the body angular velocity.
    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: f32) -> PhysicsResult<()>;

    /// Applies a linear impulse at the body center.
    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> PhysicsResult<()>;

    /// Applies a force at the body center, consumed by the next step.
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()>;

    /// Applies a torque, consumed by the next step.
    fn apply_torque(&mut self, handle: BodyHandle, torque: f32) -> PhysicsResult<()>;
}

/// A character's exclusively-owned rigid body plus the conversion between
/// world draw coordinates and physics coordinates.
///
/// `world_position` multiplies the physics position by the scale constant
/// and offsets by the half footprint so the body center lines up with the
/// sprite draw origin; `set_world_position` only divides by the scale
/// (asymmetry preserved from the original movement code).
#[derive(Debug, Clone)]
pub struct BodyBinding {
    /// Handle into the external world
    handle: BodyHandle,
    /// Visual footprint width, world units
    width: f32,
    /// Visual footprint height, world units
    height: f32,
    /// World-space position cached at the last transform read/write
    cached_position: Vec2,
}

impl BodyBinding {
    /// Creates a dynamic, fixed-rotation body sized from the visual
    /// footprint and binds it.
    pub fn create<B: PhysicsBackend>(
        backend: &mut B,
        width: f32,
        height: f32,
        spawn: Vec2,
    ) -> PhysicsResult<Self> {
        let def = BodyDef {
            position: spawn.scale(1.0 / PIXELS_PER_METER),
            half_extents: Vec2::new(
                width / 2.0 / PIXELS_PER_METER,
                height / 2.0 / PIXELS_PER_METER,
            ),
            linear_damping: BODY_LINEAR_DAMPING,
            fixed_rotation: true,
            density: BODY_DENSITY,
        };
        let handle = backend.create_body(&def)?;

        let mut binding = Self {
            handle,
            width,
            height,
            cached_position: Vec2::ZERO,
        };
        binding.refresh(backend)?;
        Ok(binding)
    }

    /// Returns the body handle.
    #[must_use]
    pub const fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Returns the footprint as (width, height).
    #[must_use]
    pub const fn footprint(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Returns the last cached world-space position.
    #[must_use]
    pub const fn cached_position(&self) -> Vec2 {
        self.cached_position
    }

    /// Reads the body transform and returns the world-space draw position.
    pub fn world_position<B: PhysicsBackend>(&self, backend: &B) -> PhysicsResult<Vec2> {
        let physics = backend.position(self.handle)?;
        Ok(Vec2::new(
            physics.x * PIXELS_PER_METER - self.width / 2.0,
            physics.y * PIXELS_PER_METER - self.height / 2.0,
        ))
    }

    /// Moves the body to a world-space position and refreshes the cache.
    pub fn set_world_position<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        world: Vec2,
    ) -> PhysicsResult<()> {
        let angle = backend.angle(self.handle)?;
        backend.set_transform(self.handle, world.scale(1.0 / PIXELS_PER_METER), angle)?;
        self.refresh(backend)?;
        Ok(())
    }

    /// Re-reads the transform into the cached world position.
    pub fn refresh<B: PhysicsBackend>(&mut self, backend: &B) -> PhysicsResult<Vec2> {
        self.cached_position = self.world_position(backend)?;
        Ok(self.cached_position)
    }

    /// Applies a linear impulse at the body center.
    pub fn apply_impulse<B: PhysicsBackend>(
        &self,
        backend: &mut B,
        impulse: Vec2,
    ) -> PhysicsResult<()> {
        backend.apply_impulse(self.handle, impulse)
    }

    /// Applies a force at the body center.
    pub fn apply_force<B: PhysicsBackend>(&self, backend: &mut B, force: Vec2) -> PhysicsResult<()> {
        backend.apply_force(self.handle, force)
    }

    /// Applies a torque.
    pub fn apply_torque<B: PhysicsBackend>(&self, backend: &mut B, torque: f32) -> PhysicsResult<()> {
        backend.apply_torque(self.handle, torque)
    }

    /// Destroys the bound body, releasing it back to the world.
    pub fn destroy<B: PhysicsBackend>(self, backend: &mut B) -> PhysicsResult<()> {
        backend.destroy_body(self.handle)
    }
}

/// A body simulated by [`MockPhysics`].
#[derive(Debug, Clone)]
struct MockBody {
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    pending_force: Vec2,
    pending_torque: f32,
    linear_damping: f32,
    fixed_rotation: bool,
}

/// Deterministic reference backend.
///
/// Integrates unit-mass bodies with semi-implicit Euler and proportional
/// linear damping. Pending forces and torques accumulate between steps
/// and are consumed by the next [`MockPhysics::step`], matching the
/// apply-before-step contract of the real world.
#[derive(Debug, Default)]
pub struct MockPhysics {
    /// Bodies by handle
    bodies: HashMap<BodyHandle, MockBody>,
    /// Next raw handle value
    next_handle: u64,
    /// Whether the world accepts new bodies
    available: bool,
}

impl MockPhysics {
    /// Creates a new, initialized mock world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            next_handle: 1,
            available: true,
        }
    }

    /// Creates a mock world that rejects body creation, for exercising
    /// the invalid-world precondition.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            bodies: HashMap::new(),
            next_handle: 1,
            available: false,
        }
    }

    /// Returns the number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advances all bodies by one step, consuming pending forces.
    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            // Unit mass: force integrates directly into velocity.
            body.linear_velocity += body.pending_force.scale(dt);
            body.linear_velocity =
                body.linear_velocity.scale(1.0 / (1.0 + body.linear_damping * dt));
            body.position += body.linear_velocity.scale(dt);

            if !body.fixed_rotation {
                body.angular_velocity += body.pending_torque * dt;
                body.angle += body.angular_velocity * dt;
            }

            body.pending_force = Vec2::ZERO;
            body.pending_torque = 0.0;
        }
    }

    fn body(&self, handle: BodyHandle) -> PhysicsResult<&MockBody> {
        self.bodies
            .get(&handle)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> PhysicsResult<&mut MockBody> {
        self.bodies
            .get_mut(&handle)
            .ok_or(PhysicsError::BodyNotFound(handle))
    }
}

impl PhysicsBackend for MockPhysics {
    fn create_body(&mut self, def: &BodyDef) -> PhysicsResult<BodyHandle> {
        if !self.available {
            return Err(PhysicsError::WorldUnavailable);
        }
        let handle = BodyHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            MockBody {
                position: def.position,
                angle: 0.0,
                linear_velocity: Vec2::ZERO,
                angular_velocity: 0.0,
                pending_force: Vec2::ZERO,
                pending_torque: 0.0,
                linear_damping: def.linear_damping,
                fixed_rotation: def.fixed_rotation,
            },
        );
        Ok(handle)
    }

    fn destroy_body(&mut self, handle: BodyHandle) -> PhysicsResult<()> {
        self.bodies
            .remove(&handle)
            .map(|_| ())
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    fn position(&self, handle: BodyHandle) -> PhysicsResult<Vec2> {
        Ok(self.body(handle)?.position)
    }

    fn angle(&self, handle: BodyHandle) -> PhysicsResult<f32> {
        Ok(self.body(handle)?.angle)
    }

    fn set_transform(
        &mut self,
        handle: BodyHandle,
        position: Vec2,
        angle: f32,
    ) -> PhysicsResult<()> {
        let body = self.body_mut(handle)?;
        body.position = position;
        body.angle = angle;
        Ok(())
    }

    fn linear_velocity(&self, handle: BodyHandle) -> PhysicsResult<Vec2> {
        Ok(self.body(handle)?.linear_velocity)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> PhysicsResult<()> {
        self.body_mut(handle)?.linear_velocity = velocity;
        Ok(())
    }

    fn angular_velocity(&self, handle: BodyHandle) -> PhysicsResult<f32> {
        Ok(self.body(handle)?.angular_velocity)
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: f32) -> PhysicsResult<()> {
        self.body_mut(handle)?.angular_velocity = velocity;
        Ok(())
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) -> PhysicsResult<()> {
        // Unit mass: impulse lands in velocity immediately.
        let body = self.body_mut(handle)?;
        body.linear_velocity += impulse;
        Ok(())
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) -> PhysicsResult<()> {
        let body = self.body_mut(handle)?;
        body.pending_force += force;
        Ok(())
    }

    fn apply_torque(&mut self, handle: BodyHandle, torque: f32) -> PhysicsResult<()> {
        let body = self.body_mut(handle)?;
        body.pending_torque += torque;
        Ok(())
    }
}
