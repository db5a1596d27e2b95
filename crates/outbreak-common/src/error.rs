//! Error types for the Outbreak simulation.

use thiserror::Error;

use crate::ids::CharacterId;

/// Top-level error type aggregating subsystem failures.
///
/// Subsystem crates define their own error enums and convert into this
/// type at the embedding boundary.
#[derive(Debug, Error)]
pub enum OutbreakError {
    /// Physics backend errors
    #[error("physics error: {0}")]
    Physics(String),

    /// Simulation-level errors other than a missing character
    #[error("simulation error: {0}")]
    Simulation(String),

    /// Character registry errors
    #[error("character not found: {0:?}")]
    CharacterNotFound(CharacterId),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
