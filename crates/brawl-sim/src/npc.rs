//! NPC entity record.
//!
//! One [`Npc`] lives in each pool slot for the whole session. Spawning
//! rebuilds the record from scratch, so no transient field survives a
//! despawn/respawn cycle.

use brawl_common::{Actor, NpcId, Vec3};
use serde::{Deserialize, Serialize};

use crate::state::{NpcState, Trigger};

/// Where inactive slots are parked, far below the map.
pub const PARKED_POSITION: Vec3 = Vec3::new(0.0, -1000.0, 0.0);

/// Timers at or below this count as expired.
pub const TIMER_EPSILON: f32 = 1e-4;

/// Body type of an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NpcKind {
    /// Regular brawler
    #[default]
    Basic,
    /// Big, slow, tough; goes dizzy after repeated punches
    Heavy,
}

impl NpcKind {
    /// Capsule radius.
    #[must_use]
    pub const fn radius(self) -> f32 {
        match self {
            Self::Basic => 0.55,
            Self::Heavy => 0.85,
        }
    }

    /// Capsule height (feet to head).
    #[must_use]
    pub const fn height(self) -> f32 {
        match self {
            Self::Basic => 1.8,
            Self::Heavy => 2.4,
        }
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(self) -> f32 {
        match self {
            Self::Basic => 60.0,
            Self::Heavy => 150.0,
        }
    }

    /// Visual/mass-like scale relative to BASIC.
    #[must_use]
    pub const fn scale(self) -> f32 {
        match self {
            Self::Basic => 1.0,
            Self::Heavy => 1.4,
        }
    }

    /// Damage of one melee swing.
    #[must_use]
    pub const fn melee_damage(self) -> f32 {
        match self {
            Self::Basic => 8.0,
            Self::Heavy => 14.0,
        }
    }

    /// Impulse magnitude reported with a melee swing.
    #[must_use]
    pub const fn melee_impulse(self) -> f32 {
        match self {
            Self::Basic => 5.0,
            Self::Heavy => 9.0,
        }
    }

    /// Knockback speed a melee swing adds to the victim.
    #[must_use]
    pub const fn melee_knockback(self) -> f32 {
        match self {
            Self::Basic => 3.0,
            Self::Heavy => 5.0,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Heavy => "HEAVY",
        }
    }
}

/// Simulation record for one pool slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    // === Identity ===
    /// Generational handle of the current occupant
    pub id: NpcId,
    /// Whether the slot is in use
    pub active: bool,
    /// Body type
    pub kind: NpcKind,

    // === Kinematics ===
    /// Feet position in world space
    pub position: Vec3,
    /// Rotation around +Y (radians)
    pub yaw: f32,
    /// Velocity; Y is vertical
    pub velocity: Vec3,

    // === Vitals ===
    /// Current health in `[0, max_health]`
    pub health: f32,
    /// Health cap, set by `kind`
    pub max_health: f32,

    // === Behavior ===
    /// Behavior state
    pub state: NpcState,
    /// Aggression bias in `[0, 1]`; low is aggressive
    pub mood: f32,
    /// Unit XZ direction wandering walks along
    pub desired_direction: Vec3,
    /// Countdown to the next wander direction change
    pub time_to_change_direction: f32,
    /// Current target
    pub target: Option<Actor>,

    // === Combat ===
    /// Countdown until the next melee swing
    pub attack_cooldown: f32,
    /// Simulation time of the last hit taken
    pub last_damage_time: Option<f32>,
    /// Who hit this NPC last
    pub last_attacker: Option<Actor>,
    /// Vengeance window countdown
    pub furia_timer: f32,
    /// Length of the current combo streak
    pub consecutive_hits: u32,
    /// Combo counter of the last combo hit
    pub last_combo_count: u32,
    /// Forced flee active
    pub is_panic: bool,
    /// Panic countdown
    pub panic_timer: f32,
    /// Dizzy (HEAVY weakness window) active
    pub is_dizzy: bool,
    /// Dizzy countdown
    pub dizzy_timer: f32,
    /// Melee punches counted toward dizzy
    pub punches_received: u32,

    // === Physics overrides ===
    /// Ragdoll active; AI is bypassed
    pub is_ragdoll: bool,
    /// Ragdoll countdown
    pub ragdoll_timer: f32,
    /// State to resume when the ragdoll ends
    pub saved_state: Option<NpcState>,
    /// Speed at ragdoll entry
    pub impact_speed: f32,
    /// Horizontal motion frozen
    pub is_suspended: bool,
    /// Suspension countdown
    pub suspension_timer: f32,
    /// Horizontal velocity to restore when suspension ends
    pub saved_horizontal_velocity: Vec3,

    // === Feedback throttles ===
    /// Countdown before this body can shake the screen again
    pub collision_shake_cooldown: f32,
    /// Countdown before this body can leave another decal
    pub decal_cooldown: f32,

    // === Death ===
    /// Seconds since death
    pub death_timer: f32,
    /// Countdown to despawn once dead
    pub despawn_timer: f32,

    // === Presentation ===
    /// Body tilt (radians) for the renderer
    pub tilt: f32,
    /// Squash intensity from the last hit
    pub squash: f32,
    /// Hit flash countdown
    pub flash_timer: f32,
    /// Dizzy wobble phase (radians)
    pub dizzy_phase: f32,
}

impl Npc {
    /// Creates an inactive record parked off-map.
    #[must_use]
    pub fn parked(slot: u32) -> Self {
        Self {
            id: NpcId::new(slot, 0),
            active: false,
            kind: NpcKind::Basic,
            position: PARKED_POSITION,
            yaw: 0.0,
            velocity: Vec3::ZERO,
            health: 0.0,
            max_health: NpcKind::Basic.max_health(),
            state: NpcState::Wander,
            mood: 0.5,
            desired_direction: Vec3::Z,
            time_to_change_direction: 0.0,
            target: None,
            attack_cooldown: 0.0,
            last_damage_time: None,
            last_attacker: None,
            furia_timer: 0.0,
            consecutive_hits: 0,
            last_combo_count: 0,
            is_panic: false,
            panic_timer: 0.0,
            is_dizzy: false,
            dizzy_timer: 0.0,
            punches_received: 0,
            is_ragdoll: false,
            ragdoll_timer: 0.0,
            saved_state: None,
            impact_speed: 0.0,
            is_suspended: false,
            suspension_timer: 0.0,
            saved_horizontal_velocity: Vec3::ZERO,
            collision_shake_cooldown: 0.0,
            decal_cooldown: 0.0,
            death_timer: 0.0,
            despawn_timer: 0.0,
            tilt: 0.0,
            squash: 0.0,
            flash_timer: 0.0,
            dizzy_phase: 0.0,
        }
    }

    /// Claims the slot for a new occupant, resetting every transient field.
    ///
    /// Returns the new handle.
    pub fn activate(&mut self, kind: NpcKind, position: Vec3, mood: f32, direction: Vec3) -> NpcId {
        let id = self.id.next_generation();
        let id = if id.is_spawned() { id } else { id.next_generation() };

        *self = Self {
            id,
            active: true,
            kind,
            position,
            health: kind.max_health(),
            max_health: kind.max_health(),
            mood: mood.clamp(0.0, 1.0),
            desired_direction: direction,
            ..Self::parked(id.slot())
        };
        id
    }

    /// Returns the slot to the inactive pool, parked off-map.
    ///
    /// The generation is kept so the next spawn hands out a fresh handle.
    pub fn deactivate(&mut self) {
        let id = self.id;
        *self = Self::parked(id.slot());
        self.id = id;
    }

    /// Capsule radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.kind.radius()
    }

    /// Capsule height.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.kind.height()
    }

    /// Whether the NPC is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Active and alive: a valid target, attacker and collision body.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.active && self.state.is_alive()
    }

    /// Whether `id` still refers to this live occupant.
    #[must_use]
    pub fn is_live_handle(&self, id: NpcId) -> bool {
        self.id == id && self.is_live()
    }

    /// Health as a fraction of the maximum.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            (self.health / self.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Applies a state trigger through the transition table.
    pub fn transition(&mut self, trigger: Trigger) {
        self.state = self.state.on(trigger);
    }

    /// Centers of the bottom and top spheres of the capsule.
    #[must_use]
    pub fn capsule_points(&self) -> [Vec3; 2] {
        let r = self.radius();
        let top = (self.height() - r).max(r);
        [self.position + Vec3::Y * r, self.position + Vec3::Y * top]
    }

    /// Decays the cooldowns that must keep running even when culled.
    pub fn decay_cooldowns(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);
        self.time_to_change_direction = (self.time_to_change_direction - dt).max(0.0);
        self.collision_shake_cooldown = (self.collision_shake_cooldown - dt).max(0.0);
        self.decal_cooldown = (self.decal_cooldown - dt).max(0.0);
    }

    /// Captures the presentation-facing view of this record.
    #[must_use]
    pub fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            yaw: self.yaw,
            tilt: self.tilt,
            scale: self.kind.scale(),
            squash: self.squash,
            flashing: self.flash_timer > 0.0,
            wobble: if self.is_dizzy { self.dizzy_phase.sin() * 0.25 } else { 0.0 },
            state: self.state,
            is_ragdoll: self.is_ragdoll,
            is_panic: self.is_panic,
            health_fraction: self.health_fraction(),
        }
    }
}

/// Per-frame view of an NPC for renderers and UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcSnapshot {
    /// NPC handle
    pub id: NpcId,
    /// Body type
    pub kind: NpcKind,
    /// Feet position
    pub position: Vec3,
    /// Facing (radians)
    pub yaw: f32,
    /// Body tilt (radians)
    pub tilt: f32,
    /// Model scale
    pub scale: f32,
    /// Squash intensity
    pub squash: f32,
    /// Hit flash active
    pub flashing: bool,
    /// Dizzy wobble angle (radians)
    pub wobble: f32,
    /// Behavior state
    pub state: NpcState,
    /// Ragdolling
    pub is_ragdoll: bool,
    /// Panicking
    pub is_panic: bool,
    /// Health fraction in `[0, 1]`
    pub health_fraction: f32,
}
