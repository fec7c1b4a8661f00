//! Gravity blast: the player's charged area-of-effect launch.
//!
//! [`GravityBlast`] is the cooldown/charge state machine
//! (Ready -> Charging -> Cooldown -> Ready). [`blast_impulse`] computes what
//! the blast does to one NPC; the pool applies it.

use brawl_common::{flat_direction, flat_distance, random_unit_xz, NpcId, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AbilityTuning;
use crate::npc::TIMER_EPSILON;

/// Phase of the blast state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BlastPhase {
    /// Can be triggered
    #[default]
    Ready,
    /// Charging toward release at `epicenter`
    Charging {
        /// Seconds until release
        remaining: f32,
        /// Where the blast will go off
        epicenter: Vec3,
    },
    /// Recovering
    Cooldown {
        /// Seconds until ready
        remaining: f32,
    },
}

/// Charge and cooldown timing for the gravity blast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityBlast {
    phase: BlastPhase,
    charge_duration: f32,
    cooldown: f32,
}

impl GravityBlast {
    /// Creates a ready blast with the configured timings.
    #[must_use]
    pub fn new(tuning: &AbilityTuning) -> Self {
        Self {
            phase: BlastPhase::Ready,
            charge_duration: tuning.charge_duration.max(0.0),
            cooldown: tuning.cooldown.max(0.0),
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> BlastPhase {
        self.phase
    }

    /// Whether the blast can be triggered.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.phase, BlastPhase::Ready)
    }

    /// Whether the blast is charging.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self.phase, BlastPhase::Charging { .. })
    }

    /// Starts charging at `epicenter`. Returns `false` if not ready.
    pub fn trigger(&mut self, epicenter: Vec3) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.phase = BlastPhase::Charging {
            remaining: self.charge_duration,
            epicenter,
        };
        debug!("Gravity blast charging at {epicenter}");
        true
    }

    /// Advances the timers. Returns the epicenter on the tick the charge
    /// completes.
    pub fn update(&mut self, dt: f32) -> Option<Vec3> {
        match self.phase {
            BlastPhase::Ready => None,
            BlastPhase::Charging { remaining, epicenter } => {
                let remaining = remaining - dt;
                if remaining <= TIMER_EPSILON {
                    self.phase = BlastPhase::Cooldown {
                        remaining: self.cooldown,
                    };
                    Some(epicenter)
                } else {
                    self.phase = BlastPhase::Charging { remaining, epicenter };
                    None
                }
            },
            BlastPhase::Cooldown { remaining } => {
                let remaining = remaining - dt;
                self.phase = if remaining <= TIMER_EPSILON {
                    BlastPhase::Ready
                } else {
                    BlastPhase::Cooldown { remaining }
                };
                None
            },
        }
    }

    /// Charge progress in `[0, 1]`; 0 when not charging.
    #[must_use]
    pub fn charge_fraction(&self) -> f32 {
        match self.phase {
            BlastPhase::Charging { remaining, .. } if self.charge_duration > 0.0 => {
                (1.0 - remaining / self.charge_duration).clamp(0.0, 1.0)
            },
            _ => 0.0,
        }
    }

    /// Seconds of cooldown left; 0 unless cooling down.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f32 {
        match self.phase {
            BlastPhase::Cooldown { remaining } => remaining.max(0.0),
            _ => 0.0,
        }
    }
}

/// The launch one NPC received from an area impulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlastHit {
    /// Who was launched
    pub id: NpcId,
    /// Velocity the NPC was launched with
    pub impulse: Vec3,
    /// Damage dealt
    pub damage: f32,
    /// The dizzy multiplier applied
    pub dizzy: bool,
}

/// Launch computed for a single body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    /// Launch velocity
    pub impulse: Vec3,
    /// Damage to deal
    pub damage: f32,
    /// Dizzy multiplier (1.0 when not dizzy)
    pub multiplier: f32,
}

/// Computes the launch for a body at `position`, or `None` outside the radius.
///
/// Falloff is linear with distance and floored at `min_falloff`; dizzy
/// bodies take the dizzy multiplier on impulse, damage and ragdoll time. A
/// body on the epicenter is pushed in a random direction.
#[must_use]
pub fn blast_impulse(
    epicenter: Vec3,
    position: Vec3,
    dizzy: bool,
    tuning: &AbilityTuning,
    rng: &mut fastrand::Rng,
) -> Option<Launch> {
    let distance = flat_distance(epicenter, position);
    if distance > tuning.radius {
        return None;
    }

    let falloff = if tuning.radius > 0.0 {
        (1.0 - distance / tuning.radius).max(tuning.min_falloff)
    } else {
        1.0
    };
    let multiplier = if dizzy { tuning.dizzy_multiplier } else { 1.0 };
    let outward = flat_direction(epicenter, position).unwrap_or_else(|| random_unit_xz(rng));

    let base = (outward * tuning.outward_force + Vec3::Y * tuning.upward_force) * falloff;
    Some(Launch {
        impulse: base * multiplier,
        damage: tuning.damage * falloff * multiplier,
        multiplier,
    })
}
