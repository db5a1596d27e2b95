//! # Outbreak Common
//!
//! Common types and shared abstractions for the Outbreak simulation.
//!
//! This crate provides foundational types used across all subsystems:
//! - 2D vector math for positions, velocities, and directions
//! - ID types (`CharacterId`)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod vec;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::vec::*;
}

pub use prelude::*;
