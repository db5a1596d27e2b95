//! ID types for characters and resources.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for character IDs.
static CHARACTER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a character in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(u64);

impl CharacterId {
    /// Creates a new unique character ID.
    #[must_use]
    pub fn new() -> Self {
        Self(CHARACTER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a character ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Null/invalid character ID.
    pub const NULL: Self = Self(0);

    /// Checks if this is a valid (non-null) character ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a rigid body owned by the physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(u64);

impl BodyHandle {
    /// Creates a body handle from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_ids_are_unique() {
        let ids: Vec<CharacterId> = (0..100).map(|_| CharacterId::new()).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_null_id_is_invalid() {
        assert!(!CharacterId::NULL.is_valid());
        assert!(CharacterId::new().is_valid());
    }

    #[test]
    fn test_from_raw_round_trip() {
        let id = CharacterId::from_raw(42);
        assert_eq!(id.raw(), 42);

        let body = BodyHandle::from_raw(7);
        assert_eq!(body.raw(), 7);
    }
}
