//! # Brawl Sim
//!
//! Emergent-combat simulation core for Project Brawl.
//!
//! This crate owns a fixed-capacity pool of NPCs and advances them one tick
//! at a time:
//! - Behavior state machine (wander, idle, chase, attack, flee)
//! - Combat modifiers (panic, dizzy, furia)
//! - Ragdoll-lite physics with mid-air suspension
//! - Capsule collision between NPCs and against buildings
//! - The gravity blast area ability
//! - Event bus and optional presentation sinks
//!
//! The simulation is single-threaded and deterministic for a given seed.
//! Rendering, audio and input stay on the host side; the host reads
//! [`npc::NpcSnapshot`]s and drains [`events::SimEvent`]s.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ability;
pub mod behavior;
pub mod collision;
pub mod combat;
pub mod config;
pub mod events;
pub mod feedback;
pub mod npc;
pub mod pool;
pub mod ragdoll;
pub mod state;
pub mod world;

#[cfg(test)]
mod e2e_tests;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::ability::{BlastHit, BlastPhase, GravityBlast};
    pub use crate::combat::{Hit, HitOutcome};
    pub use crate::config::SimConfig;
    pub use crate::events::{EventBus, SimEvent};
    pub use crate::feedback::{DecalSink, DustSink, FeedbackSink, RecordingHandle, Sinks, TrailSink};
    pub use crate::npc::{Npc, NpcKind, NpcSnapshot};
    pub use crate::pool::{NpcPool, PoolStats, SpawnOptions, TickReport};
    pub use crate::state::NpcState;
    pub use crate::world::{Aabb, DummyPlayer, FlatTerrain, PlayerHandle, Terrain, World};
    pub use brawl_common::{Actor, BrawlError, BrawlResult, NpcId, Vec3};
}
