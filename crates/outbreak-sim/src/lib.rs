//! # Outbreak Sim
//!
//! Real-time character simulation core for Outbreak.
//!
//! This crate provides the frame-stepped entity layer:
//! - Character state with role-based attributes and abilities
//! - Physics body binding behind a swappable backend trait
//! - Steering-driven AI navigation (wander, seek, arrive)
//! - Circle-based proximity and range queries
//! - Combat resolution with cooldowns and immunity
//! - Level registry driving one update per character per tick
//! - Event bus for side effects owned by external collaborators
//!
//! Rendering, asset loading, input polling, map loading, and the physics
//! solver itself are external collaborators.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod character;
pub mod combat;
pub mod events;
pub mod input;
pub mod level;
pub mod physics;
pub mod player;
pub mod proximity;
pub mod role;
pub mod steering;
pub mod tuning;
pub mod zombie;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::character::*;
    pub use crate::combat::*;
    pub use crate::events::*;
    pub use crate::input::*;
    pub use crate::level::*;
    pub use crate::physics::*;
    pub use crate::player::*;
    pub use crate::proximity::*;
    pub use crate::role::*;
    pub use crate::steering::*;
    pub use crate::tuning::*;
    pub use crate::zombie::*;
}

pub use prelude::*;
