//! Handle types for pooled NPCs and combat participants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generational handle to an NPC pool slot.
///
/// The slot index is stable for the lifetime of the pool; the generation is
/// bumped every time the slot is claimed by a spawn, so a handle held across
/// a despawn/respawn cycle no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpcId {
    slot: u32,
    generation: u32,
}

impl NpcId {
    /// Creates a handle from a slot and generation.
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Returns the pool slot index.
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// Returns the slot index as a `usize` for indexing.
    #[must_use]
    pub const fn index(self) -> usize {
        self.slot as usize
    }

    /// Returns the generation counter.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns the handle the same slot gets on its next spawn.
    #[must_use]
    pub const fn next_generation(self) -> Self {
        Self {
            slot: self.slot,
            generation: self.generation.wrapping_add(1),
        }
    }

    /// Generation 0 is never handed out by a spawn.
    #[must_use]
    pub const fn is_spawned(self) -> bool {
        self.generation != 0
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npc#{}.{}", self.slot, self.generation)
    }
}

/// A combat participant: either the player or a pooled NPC.
///
/// Used for targets, attackers, and damage sources. Being an enum, a target
/// can never reference the player and an NPC at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// The player character
    Player,
    /// A pooled NPC
    Npc(NpcId),
}

impl Actor {
    /// Returns the NPC handle if this actor is an NPC.
    #[must_use]
    pub const fn npc(self) -> Option<NpcId> {
        match self {
            Self::Npc(id) => Some(id),
            Self::Player => None,
        }
    }

    /// Returns whether this actor is the player.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }
}

impl From<NpcId> for Actor {
    fn from(id: NpcId) -> Self {
        Self::Npc(id)
    }
}
