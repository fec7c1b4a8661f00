//! Behavior states and their transition table.

use serde::{Deserialize, Serialize};

/// Behavior state of an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NpcState {
    /// Walking in a random direction
    #[default]
    Wander,
    /// Standing still until the next direction change
    Idle,
    /// Closing in on a target
    Chase,
    /// In melee range, swinging on cooldown
    Attack,
    /// Running away from the player
    Flee,
    /// Terminal until despawn
    Dead,
}

/// Something that happened to an NPC that may change its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Committed to a target (aggro, retaliation, opportunistic chaos)
    Engage,
    /// Scared off by the player or by panic
    Scare,
    /// Target came within melee reach
    InReach,
    /// Target left melee reach
    OutOfReach,
    /// Target despawned, died or vanished
    TargetLost,
    /// Got far enough away from the threat
    Disengage,
    /// Decided to rest at a direction change
    Rest,
    /// Decided to walk at a direction change
    Roam,
    /// Ragdoll ended; resume the state saved on entry
    Resume(NpcState),
    /// Health reached zero
    Killed,
}

impl NpcState {
    /// Applies a trigger and returns the resulting state.
    ///
    /// Triggers that do not apply to the current state leave it unchanged.
    /// `Dead` absorbs everything.
    #[must_use]
    pub fn on(self, trigger: Trigger) -> Self {
        use NpcState::{Attack, Chase, Dead, Flee, Idle, Wander};

        match (self, trigger) {
            (Dead, _) => Dead,
            (_, Trigger::Killed) => Dead,
            (_, Trigger::Engage) => Chase,
            (_, Trigger::Scare) => Flee,
            (_, Trigger::Resume(Dead)) => self,
            (_, Trigger::Resume(saved)) => saved,
            (Chase, Trigger::InReach) => Attack,
            (Attack, Trigger::OutOfReach) => Chase,
            (Chase | Attack, Trigger::TargetLost) => Wander,
            (Flee, Trigger::Disengage) => Wander,
            (Wander, Trigger::Rest) => Idle,
            (Idle, Trigger::Roam) => Wander,
            (state, _) => state,
        }
    }

    /// Whether the NPC is still alive.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        !matches!(self, Self::Dead)
    }

    /// Whether the state pursues a target.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Chase | Self::Attack)
    }

    /// Whether the state is aimless (wandering or resting).
    #[must_use]
    pub const fn is_roaming(self) -> bool {
        matches!(self, Self::Wander | Self::Idle)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wander => "WANDER",
            Self::Idle => "IDLE",
            Self::Chase => "CHASE",
            Self::Attack => "ATTACK",
            Self::Flee => "FLEE",
            Self::Dead => "DEAD",
        }
    }
}

impl std::fmt::Display for NpcState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
