//! Event bus for simulation-to-collaborator communication.
//!
//! Side effects that belong to external collaborators (sound playback,
//! visual feedback, stage progression) are published here instead of
//! being performed by the core.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use outbreak_common::CharacterId;

use crate::role::{AbilityKind, Role};

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Character spawned into the level
    CharacterSpawned {
        /// Character ID
        id: CharacterId,
    },
    /// Character removed from the level
    CharacterDespawned {
        /// Character ID
        id: CharacterId,
    },
    /// Character took damage
    Damaged {
        /// Character that was hurt
        target: CharacterId,
        /// Damage amount actually applied
        amount: i32,
        /// Attacking character, if any
        source: Option<CharacterId>,
    },
    /// An attack landed; subscribers play hit feedback
    AttackLanded {
        /// Attacking character
        attacker: CharacterId,
        /// Character that was hit
        target: CharacterId,
        /// Damage dealt
        damage: i32,
    },
    /// Character health reached zero
    CharacterDied {
        /// Character that died
        id: CharacterId,
    },
    /// A role ability was activated
    AbilityTriggered {
        /// Character that triggered it
        id: CharacterId,
        /// Which effect was applied
        effect: AbilityKind,
    },
    /// A role ability effect expired and attributes were restored
    AbilityExpired {
        /// Character whose effect ended
        id: CharacterId,
    },
    /// Character switched between a human role and its zombie counterpart
    RoleSwitched {
        /// Character that switched
        id: CharacterId,
        /// Role after the switch
        role: Role,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<SimEvent>,
    /// Receiver for collecting events
    receiver: Receiver<SimEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: SimEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<SimEvent> {
        self.sender.clone()
    }
}
