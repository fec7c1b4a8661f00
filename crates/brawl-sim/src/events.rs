//! Event bus for simulation side effects.
//!
//! Everything the core does that a host might react to (audio cues, UI
//! counters, analytics) is published here. The host drains the bus once per
//! frame; the core never reads it back.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use brawl_common::{Actor, NpcId, Vec3};

use crate::npc::NpcKind;

/// Event types published by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// NPC claimed a pool slot
    Spawned {
        /// NPC handle
        id: NpcId,
        /// NPC kind
        kind: NpcKind,
        /// Spawn position
        position: Vec3,
    },
    /// NPC took damage
    Damaged {
        /// NPC handle
        id: NpcId,
        /// Damage amount actually removed
        amount: f32,
        /// Damage source (if any)
        source: Option<Actor>,
    },
    /// NPC health reached zero
    Died {
        /// NPC handle
        id: NpcId,
        /// Who landed the killing blow
        killer: Option<Actor>,
    },
    /// Dead NPC returned its slot to the pool
    Despawned {
        /// NPC handle (now stale)
        id: NpcId,
    },
    /// NPC went limp
    RagdollEntered {
        /// NPC handle
        id: NpcId,
        /// Speed at the moment of entry
        impact_speed: f32,
    },
    /// NPC recovered from ragdoll
    RagdollExited {
        /// NPC handle
        id: NpcId,
    },
    /// Ragdoll landed hard
    Impact {
        /// NPC handle
        id: NpcId,
        /// Landing position
        position: Vec3,
        /// Vertical landing speed
        speed: f32,
    },
    /// Two bodies collided hard enough to shake the screen
    CollisionShake {
        /// First body
        a: NpcId,
        /// Second body
        b: NpcId,
        /// Shake intensity
        intensity: f32,
    },
    /// Combo streak forced a panic
    PanicStarted {
        /// NPC handle
        id: NpcId,
    },
    /// HEAVY turned dizzy after repeated punches
    DizzyStarted {
        /// NPC handle
        id: NpcId,
    },
    /// Hard hit opened a vengeance window
    FuriaStarted {
        /// NPC handle
        id: NpcId,
        /// Who the NPC is after
        attacker: Actor,
    },
    /// Area ability started charging
    BlastCharging {
        /// Epicenter
        epicenter: Vec3,
    },
    /// Area ability went off
    BlastExecuted {
        /// Epicenter
        epicenter: Vec3,
        /// Number of NPCs launched
        launched: usize,
    },
}

/// Event bus for broadcasting simulation events to the host.
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
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: SimEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
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

    /// Creates a new receiver handle; receivers compete for events.
    #[must_use]
    pub fn receiver(&self) -> Receiver<SimEvent> {
        self.receiver.clone()
    }
}
