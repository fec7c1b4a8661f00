//! Simulation configuration.
//!
//! Every tunable the simulation reads lives here and is supplied once at
//! construction. Groups are nested so a TOML file can override a single
//! section without restating the rest.

use serde::{Deserialize, Serialize};

/// Top-level construction-time configuration for an [`NpcPool`](crate::pool::NpcPool).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Pool ===
    /// Number of pre-allocated NPC slots (never changes at runtime)
    pub capacity: usize,
    /// Seconds between auto-repopulation checks
    pub spawn_interval: f32,
    /// Repopulate while active population is below this fraction of capacity
    pub repopulate_threshold: f32,
    /// Maximum replacements spawned per repopulation check
    pub repopulate_batch: usize,
    /// Scatter radius around an explicit spawn position
    pub spawn_scatter_radius: f32,
    /// Chance a randomly-typed spawn is HEAVY
    pub heavy_spawn_chance: f32,

    // === World ===
    /// Side length of the square map, centered on the origin
    pub map_size: f32,
    /// Random spawns keep out of this radius around the origin
    pub protected_center_radius: f32,
    /// Beyond this distance from the viewer NPCs only decay cooldowns
    pub ai_culling_distance: f32,

    // === Groups ===
    /// Behavior state machine tuning
    pub behavior: BehaviorTuning,
    /// Ragdoll-lite integrator tuning
    pub physics: PhysicsTuning,
    /// Collision resolver tuning
    pub collision: CollisionTuning,
    /// Damage and combat modifier tuning
    pub combat: CombatTuning,
    /// Area-impulse ability tuning
    pub ability: AbilityTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            spawn_interval: 4.0,
            repopulate_threshold: 0.6,
            repopulate_batch: 3,
            spawn_scatter_radius: 2.0,
            heavy_spawn_chance: 0.2,

            map_size: 120.0,
            protected_center_radius: 12.0,
            ai_culling_distance: 60.0,

            behavior: BehaviorTuning::default(),
            physics: PhysicsTuning::default(),
            collision: CollisionTuning::default(),
            combat: CombatTuning::default(),
            ability: AbilityTuning::default(),
        }
    }
}

impl SimConfig {
    /// Creates a default configuration with the given pool capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.capacity = self.capacity.max(1);
        self.spawn_interval = self.spawn_interval.max(0.1);
        self.repopulate_threshold = self.repopulate_threshold.clamp(0.0, 1.0);
        self.spawn_scatter_radius = self.spawn_scatter_radius.max(0.0);
        self.heavy_spawn_chance = self.heavy_spawn_chance.clamp(0.0, 1.0);

        self.map_size = self.map_size.max(1.0);
        self.protected_center_radius = self
            .protected_center_radius
            .clamp(0.0, self.map_size * 0.45);
        self.ai_culling_distance = self.ai_culling_distance.max(0.0);

        self.behavior.validate();
        self.physics.validate();
        self.collision.validate();
        self.combat.validate();
        self.ability.validate();
    }

    /// Returns a validated copy.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.validate();
        self
    }
}

/// Behavior state machine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorTuning {
    /// Radius inside which NPCs notice other NPCs and the player
    pub detection_radius: f32,
    /// Melee reach; CHASE turns into ATTACK inside it
    pub attack_radius: f32,
    /// ATTACK falls back to CHASE beyond `attack_radius * attack_exit_factor`
    pub attack_exit_factor: f32,
    /// Player closer than this triggers the proximity roll
    pub flee_player_radius: f32,
    /// Moods below this are aggressive
    pub aggressive_mood: f32,
    /// Chance an aggressive NPC chases rather than flees a close player
    pub proximity_chase_chance: f32,
    /// Per-frame (60 FPS) chance of committing to CHASE on aggro escalation
    pub aggro_commit_chance: f32,
    /// Mood drift bound per direction change
    pub mood_drift: f32,
    /// Chance of resting (IDLE) at a direction change
    pub idle_chance: f32,
    /// Direction change interval lower bound (seconds)
    pub direction_interval_min: f32,
    /// Direction change interval upper bound (seconds)
    pub direction_interval_max: f32,
    /// Attack cooldown lower bound (seconds)
    pub attack_cooldown_min: f32,
    /// Attack cooldown upper bound (seconds)
    pub attack_cooldown_max: f32,
    /// Wander acceleration
    pub wander_accel: f32,
    /// Chase acceleration
    pub chase_accel: f32,
    /// Flee acceleration
    pub flee_accel: f32,
    /// Furia acceleration toward the attacker
    pub furia_accel: f32,
    /// Lateral strafe acceleration while attacking
    pub strafe_accel: f32,
    /// Lateral jitter added to the flee direction
    pub flee_jitter: f32,
    /// Max horizontal speed while wandering/idle
    pub wander_max_speed: f32,
    /// Max horizontal speed while chasing/attacking (and under furia)
    pub chase_max_speed: f32,
    /// Max horizontal speed while fleeing
    pub flee_max_speed: f32,
    /// Flee speed multiplier while panicking
    pub panic_speed_multiplier: f32,
    /// FLEE disengages beyond `flee_player_radius * flee_disengage_factor`
    pub flee_disengage_factor: f32,
    /// Extra disengage distance multiplier while panicking
    pub panic_disengage_multiplier: f32,
    /// Grounded velocity damping per 1/60 s
    pub damping: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            detection_radius: 14.0,
            attack_radius: 1.6,
            attack_exit_factor: 1.25,
            flee_player_radius: 4.0,
            aggressive_mood: 0.35,
            proximity_chase_chance: 0.45,
            aggro_commit_chance: 0.10,
            mood_drift: 0.2,
            idle_chance: 0.15,
            direction_interval_min: 3.0,
            direction_interval_max: 5.0,
            attack_cooldown_min: 0.45,
            attack_cooldown_max: 0.85,
            wander_accel: 6.0,
            chase_accel: 14.0,
            flee_accel: 16.0,
            furia_accel: 22.0,
            strafe_accel: 3.0,
            flee_jitter: 0.35,
            wander_max_speed: 2.5,
            chase_max_speed: 5.0,
            flee_max_speed: 6.5,
            panic_speed_multiplier: 1.6,
            flee_disengage_factor: 2.5,
            panic_disengage_multiplier: 1.5,
            damping: 0.88,
        }
    }
}

impl BehaviorTuning {
    fn validate(&mut self) {
        self.detection_radius = self.detection_radius.max(0.0);
        self.attack_radius = self.attack_radius.max(0.1);
        self.attack_exit_factor = self.attack_exit_factor.max(1.0);
        self.flee_player_radius = self.flee_player_radius.max(0.0);
        self.aggressive_mood = self.aggressive_mood.clamp(0.0, 1.0);
        self.proximity_chase_chance = self.proximity_chase_chance.clamp(0.0, 1.0);
        self.aggro_commit_chance = self.aggro_commit_chance.clamp(0.0, 1.0);
        self.mood_drift = self.mood_drift.clamp(0.0, 1.0);
        self.idle_chance = self.idle_chance.clamp(0.0, 1.0);
        self.direction_interval_min = self.direction_interval_min.max(0.1);
        self.direction_interval_max = self.direction_interval_max.max(self.direction_interval_min);
        self.attack_cooldown_min = self.attack_cooldown_min.max(0.0);
        self.attack_cooldown_max = self.attack_cooldown_max.max(self.attack_cooldown_min);
        self.wander_max_speed = self.wander_max_speed.max(0.0);
        self.chase_max_speed = self.chase_max_speed.max(0.0);
        self.flee_max_speed = self.flee_max_speed.max(0.0);
        self.panic_speed_multiplier = self.panic_speed_multiplier.max(1.0);
        self.flee_disengage_factor = self.flee_disengage_factor.max(1.0);
        self.panic_disengage_multiplier = self.panic_disengage_multiplier.max(1.0);
        self.damping = self.damping.clamp(0.01, 1.0);
    }
}

/// Ragdoll-lite integrator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Gravity acceleration (positive = down)
    pub gravity: f32,
    /// Ragdolls fall faster than normal gameplay gravity
    pub ragdoll_gravity_multiplier: f32,
    /// Horizontal friction per 1/60 s while ragdolling
    pub ragdoll_friction: f32,
    /// Restitution of the horizontal bounce off buildings
    pub wall_bounce: f32,
    /// Height above terrain the entity origin rests at
    pub ground_offset: f32,
    /// Landing speed above which an impact event is emitted
    pub impact_threshold: f32,
    /// Grounded horizontal speed above which the entity ragdolls
    pub auto_ragdoll_speed: f32,
    /// Ragdoll duration when triggered by excess speed
    pub auto_ragdoll_duration: f32,
    /// Tilt per unit of horizontal speed (radians)
    pub tilt_per_speed: f32,
    /// Tilt clamp (radians)
    pub max_tilt: f32,
    /// Ragdoll horizontal speed above which trails are emitted
    pub trail_speed: f32,
    /// Minimum seconds between decals from one entity
    pub decal_cooldown: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            ragdoll_gravity_multiplier: 2.0,
            ragdoll_friction: 0.94,
            wall_bounce: 0.5,
            ground_offset: 0.0,
            impact_threshold: 4.0,
            auto_ragdoll_speed: 12.0,
            auto_ragdoll_duration: 1.2,
            tilt_per_speed: 0.08,
            max_tilt: 1.2,
            trail_speed: 8.0,
            decal_cooldown: 0.25,
        }
    }
}

impl PhysicsTuning {
    fn validate(&mut self) {
        self.gravity = self.gravity.max(0.0);
        self.ragdoll_gravity_multiplier = self.ragdoll_gravity_multiplier.max(0.0);
        self.ragdoll_friction = self.ragdoll_friction.clamp(0.01, 1.0);
        self.wall_bounce = self.wall_bounce.clamp(0.0, 1.0);
        self.impact_threshold = self.impact_threshold.max(0.0);
        self.auto_ragdoll_speed = self.auto_ragdoll_speed.max(0.1);
        self.auto_ragdoll_duration = self.auto_ragdoll_duration.max(0.0);
        self.tilt_per_speed = self.tilt_per_speed.max(0.0);
        self.max_tilt = self.max_tilt.max(0.0);
        self.trail_speed = self.trail_speed.max(0.0);
        self.decal_cooldown = self.decal_cooldown.max(0.0);
    }
}

/// Collision resolver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Pair-resolution passes per tick
    pub iterations: u32,
    /// Cap on each entity's correction per pass
    pub max_push_per_iteration: f32,
    /// Closing speed above which a contact shakes the screen
    pub shake_speed_threshold: f32,
    /// Shake intensity per unit of closing speed over the threshold
    pub shake_per_speed: f32,
    /// Shake intensity clamp
    pub max_shake: f32,
    /// Shake duration (seconds)
    pub shake_duration: f32,
    /// Hit-stop duration for a shaking contact (seconds)
    pub hitstop_duration: f32,
    /// Per-entity cooldown between shaking contacts
    pub shake_cooldown: f32,
    /// Damage per unit of closing speed dealt by a ragdolling body
    pub ragdoll_damage_per_speed: f32,
    /// Knockback speed per unit of closing speed from a ragdolling body
    pub ragdoll_knockback_per_speed: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            iterations: 2,
            max_push_per_iteration: 0.5,
            shake_speed_threshold: 6.0,
            shake_per_speed: 0.05,
            max_shake: 1.0,
            shake_duration: 0.2,
            hitstop_duration: 0.05,
            shake_cooldown: 0.3,
            ragdoll_damage_per_speed: 1.5,
            ragdoll_knockback_per_speed: 0.8,
        }
    }
}

impl CollisionTuning {
    fn validate(&mut self) {
        self.iterations = self.iterations.max(1);
        self.max_push_per_iteration = self.max_push_per_iteration.max(0.001);
        self.shake_speed_threshold = self.shake_speed_threshold.max(0.0);
        self.max_shake = self.max_shake.max(0.0);
        self.shake_cooldown = self.shake_cooldown.max(0.0);
        self.ragdoll_damage_per_speed = self.ragdoll_damage_per_speed.max(0.0);
        self.ragdoll_knockback_per_speed = self.ragdoll_knockback_per_speed.max(0.0);
    }
}

/// Damage application and combat modifier tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    /// Impulse above which the victim enters furia
    pub furia_impulse_threshold: f32,
    /// Furia (vengeance window) duration
    pub furia_duration: f32,
    /// Consecutive combo hits that force panic
    pub panic_hits: u32,
    /// Panic duration
    pub panic_duration: f32,
    /// Hits further apart than this break the combo streak
    pub combo_gap: f32,
    /// Melee punches on a HEAVY before it turns dizzy
    pub dizzy_hits: u32,
    /// Dizzy duration
    pub dizzy_duration: f32,
    /// Squash intensity per unit of impulse
    pub squash_per_impulse: f32,
    /// Squash decay per 1/60 s
    pub squash_decay: f32,
    /// Hit flash duration
    pub flash_duration: f32,
    /// Duration of the fall/tilt animation after death
    pub death_fall_duration: f32,
    /// Delay between death and despawn
    pub despawn_delay: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            furia_impulse_threshold: 12.0,
            furia_duration: 6.0,
            panic_hits: 3,
            panic_duration: 2.5,
            combo_gap: 1.2,
            dizzy_hits: 3,
            dizzy_duration: 3.0,
            squash_per_impulse: 0.04,
            squash_decay: 0.85,
            flash_duration: 0.12,
            death_fall_duration: 0.6,
            despawn_delay: 5.0,
        }
    }
}

impl CombatTuning {
    fn validate(&mut self) {
        self.furia_impulse_threshold = self.furia_impulse_threshold.max(0.0);
        self.furia_duration = self.furia_duration.max(0.0);
        self.panic_hits = self.panic_hits.max(1);
        self.panic_duration = self.panic_duration.max(0.0);
        self.combo_gap = self.combo_gap.max(0.0);
        self.dizzy_hits = self.dizzy_hits.max(1);
        self.dizzy_duration = self.dizzy_duration.max(0.0);
        self.squash_per_impulse = self.squash_per_impulse.max(0.0);
        self.squash_decay = self.squash_decay.clamp(0.0, 1.0);
        self.flash_duration = self.flash_duration.max(0.0);
        self.death_fall_duration = self.death_fall_duration.max(0.01);
        self.despawn_delay = self.despawn_delay.max(0.0);
    }
}

/// Area-impulse ("gravity blast") tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    /// Radius of the blast around its epicenter
    pub radius: f32,
    /// Charge time between trigger and execution
    pub charge_duration: f32,
    /// Cooldown after execution
    pub cooldown: f32,
    /// Outward impulse at the epicenter
    pub outward_force: f32,
    /// Upward impulse at the epicenter
    pub upward_force: f32,
    /// Damage at the epicenter
    pub damage: f32,
    /// Falloff floor so the rim still gets launched
    pub min_falloff: f32,
    /// Ragdoll duration for launched NPCs
    pub ragdoll_duration: f32,
    /// Anticipation hold before the launched NPC flies
    pub suspension_duration: f32,
    /// Impulse/damage/duration multiplier against dizzy NPCs
    pub dizzy_multiplier: f32,
    /// Screen shake on execution
    pub shake_intensity: f32,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            radius: 10.0,
            charge_duration: 0.8,
            cooldown: 6.0,
            outward_force: 16.0,
            upward_force: 9.0,
            damage: 20.0,
            min_falloff: 0.3,
            ragdoll_duration: 1.5,
            suspension_duration: 0.35,
            dizzy_multiplier: 2.0,
            shake_intensity: 0.8,
        }
    }
}

impl AbilityTuning {
    fn validate(&mut self) {
        self.radius = self.radius.max(0.0);
        self.charge_duration = self.charge_duration.max(0.0);
        self.cooldown = self.cooldown.max(0.0);
        self.damage = self.damage.max(0.0);
        self.min_falloff = self.min_falloff.clamp(0.0, 1.0);
        self.ragdoll_duration = self.ragdoll_duration.max(0.0);
        self.suspension_duration = self.suspension_duration.max(0.0);
        self.dizzy_multiplier = self.dizzy_multiplier.max(1.0);
        self.shake_intensity = self.shake_intensity.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.capacity, 64);
        assert_eq!(config.collision.iterations, 2);
        assert!((config.behavior.damping - 0.88).abs() < f32::EPSILON);
        assert!((config.combat.despawn_delay - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimConfig::default();

        config.capacity = 0;
        config.collision.iterations = 0;
        config.physics.ragdoll_friction = 3.0;
        config.behavior.attack_cooldown_max = 0.1;

        config.validate();

        assert_eq!(config.capacity, 1);
        assert_eq!(config.collision.iterations, 1);
        assert!((config.physics.ragdoll_friction - 1.0).abs() < f32::EPSILON);
        assert!(config.behavior.attack_cooldown_max >= config.behavior.attack_cooldown_min);
    }

    #[test]
    fn test_protected_zone_fits_map() {
        let mut config = SimConfig::default();
        config.map_size = 10.0;
        config.protected_center_radius = 50.0;
        config.validate();
        assert!(config.protected_center_radius < config.map_size * 0.5);
    }

    #[test]
    fn test_with_capacity() {
        let config = SimConfig::with_capacity(8);
        assert_eq!(config.capacity, 8);
        assert_eq!(config.behavior, BehaviorTuning::default());
    }
}
