//! Collaborator interfaces the simulation reads from.
//!
//! Terrain and buildings are injected once at construction; the player is
//! owned by the host and lent to each tick.

use brawl_common::Vec3;
use serde::{Deserialize, Serialize};

/// Terrain height query.
///
/// Must be a pure function of `(x, z)`; it is sampled every tick for every
/// grounded entity and for ragdoll landings.
pub trait Terrain {
    /// Height of the ground surface at `(x, z)`.
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Perfectly flat terrain at a fixed height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatTerrain {
    /// Ground height
    pub height: f32,
}

impl FlatTerrain {
    /// Creates flat terrain at the given height.
    #[must_use]
    pub const fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Terrain for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.height
    }
}

impl<F> Terrain for F
where
    F: Fn(f32, f32) -> f32,
{
    fn height_at(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Axis-aligned bounding box used for static building colliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB from its corners; the corners are sorted per axis.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates an AABB from center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Closest point inside the box to `p`.
    #[must_use]
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Checks if a point lies inside the box (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Checks if this AABB overlaps with another.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && self.max.cmpgt(other.min).all()
    }
}

/// Static world geometry handed to the pool at construction.
pub struct World {
    /// Terrain height source
    pub terrain: Box<dyn Terrain>,
    /// Building colliders, in resolution order
    pub buildings: Vec<Aabb>,
}

impl World {
    /// Creates a world from terrain and buildings.
    #[must_use]
    pub fn new(terrain: Box<dyn Terrain>, buildings: Vec<Aabb>) -> Self {
        Self { terrain, buildings }
    }

    /// Flat ground at height 0 with no buildings.
    #[must_use]
    pub fn flat() -> Self {
        Self::new(Box::new(FlatTerrain::default()), Vec::new())
    }

    /// Adds a building collider.
    #[must_use]
    pub fn with_building(mut self, building: Aabb) -> Self {
        self.buildings.push(building);
        self
    }

    /// Terrain height at a world position.
    #[must_use]
    pub fn ground_at(&self, position: Vec3) -> f32 {
        self.terrain.height_at(position.x, position.z)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("buildings", &self.buildings.len())
            .finish_non_exhaustive()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::flat()
    }
}

/// The player as seen by the simulation.
pub trait PlayerHandle {
    /// Current world position.
    fn position(&self) -> Vec3;

    /// Applies damage pushed along `direction` (unit, horizontal).
    fn take_damage(&mut self, amount: f32, direction: Vec3);

    /// Whether the player still has health left.
    fn is_alive(&self) -> bool;
}

/// Player state captured at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    /// Position at the start of the tick
    pub position: Vec3,
    /// Liveness at the start of the tick
    pub alive: bool,
}

impl PlayerView {
    /// Captures the current player state.
    #[must_use]
    pub fn capture(player: &dyn PlayerHandle) -> Self {
        Self {
            position: player.position(),
            alive: player.is_alive(),
        }
    }

    /// Position of a live player, or `None` when dead.
    #[must_use]
    pub fn live_position(&self) -> Option<Vec3> {
        self.alive.then_some(self.position)
    }
}

/// Minimal player for tests and headless drivers.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyPlayer {
    /// World position
    pub position: Vec3,
    /// Remaining health
    pub health: f32,
    /// Total damage received
    pub damage_taken: f32,
    /// Number of hits received
    pub hits: u32,
}

impl DummyPlayer {
    /// Creates a player with the given position and health.
    #[must_use]
    pub fn new(position: Vec3, health: f32) -> Self {
        Self {
            position,
            health,
            damage_taken: 0.0,
            hits: 0,
        }
    }
}

impl PlayerHandle for DummyPlayer {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn take_damage(&mut self, amount: f32, _direction: Vec3) {
        self.health = (self.health - amount).max(0.0);
        self.damage_taken += amount;
        self.hits += 1;
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}
