//! # Brawl Common
//!
//! Common types, utilities, and shared abstractions for Project Brawl.
//!
//! This crate provides foundational types used across all Brawl subsystems:
//! - Generational NPC handles and actor references
//! - Horizontal-plane vector helpers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod planar;

pub use glam::{Vec2, Vec3};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::planar::*;
    pub use glam::{Vec2, Vec3};
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_generations_differ() {
        let first = NpcId::new(3, 1);
        let reused = first.next_generation();
        assert_eq!(first.slot(), reused.slot());
        assert_ne!(first, reused);
    }

    #[test]
    fn test_actor_npc_accessor() {
        let id = NpcId::new(0, 1);
        assert_eq!(Actor::Npc(id).npc(), Some(id));
        assert_eq!(Actor::Player.npc(), None);
    }

    #[test]
    fn test_flat_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -5.0, 4.0);
        assert!((flat_distance(a, b) - 5.0).abs() < 1e-5);
    }
}
