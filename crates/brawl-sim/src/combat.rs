//! Damage intake and the combat modifiers it drives.
//!
//! A [`Hit`] is applied to one NPC with [`take_damage`]. Besides removing
//! health, a hit may:
//! - push the NPC into PANIC after a streak of combo hits
//! - make a HEAVY dizzy after repeated melee punches
//! - open a FURIA window against a hard hitter
//! - lock the NPC onto its attacker
//!
//! Modifier timers run down in [`tick_modifiers`]; dead NPCs run
//! [`tick_death`] until their slot is returned.

use std::f32::consts::FRAC_PI_2;

use brawl_common::{frame_decay, Actor, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::CombatTuning;
use crate::npc::{Npc, NpcKind, TIMER_EPSILON};
use crate::state::{NpcState, Trigger};

/// Wobble speed of the dizzy animation phase, radians per second.
const DIZZY_WOBBLE_RATE: f32 = 8.0;

/// A single incoming hit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hit {
    /// Damage amount
    pub amount: f32,
    /// Who dealt it
    pub source: Option<Actor>,
    /// Impulse magnitude carried by the hit
    pub impulse: f32,
    /// Melee punch (counts toward dizziness)
    pub is_melee: bool,
    /// Position in the attacker's combo chain
    pub combo_count: Option<u32>,
}

impl Hit {
    /// Creates a sourceless hit.
    #[must_use]
    pub fn new(amount: f32) -> Self {
        Self {
            amount,
            ..Default::default()
        }
    }

    /// Sets the damage source.
    #[must_use]
    pub fn with_source(mut self, source: Actor) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the impulse magnitude.
    #[must_use]
    pub fn with_impulse(mut self, impulse: f32) -> Self {
        self.impulse = impulse;
        self
    }

    /// Marks the hit as a melee punch.
    #[must_use]
    pub fn as_melee(mut self) -> Self {
        self.is_melee = true;
        self
    }

    /// Sets the combo chain position.
    #[must_use]
    pub fn with_combo(mut self, combo_count: u32) -> Self {
        self.combo_count = Some(combo_count);
        self
    }
}

/// What a hit did to its victim.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitOutcome {
    /// Health actually removed
    pub damage_dealt: f32,
    /// The hit was the killing blow
    pub died: bool,
    /// The hit started a panic
    pub panic_started: bool,
    /// The hit made a HEAVY dizzy
    pub dizzy_started: bool,
    /// The hit opened a furia window
    pub furia_started: bool,
}

impl HitOutcome {
    /// The hit landed on a dead or inactive record and changed nothing.
    #[must_use]
    pub fn ignored() -> Self {
        Self::default()
    }
}

/// Applies a hit at simulation time `now`.
///
/// Dead or inactive NPCs ignore hits. Health never drops below zero and the
/// hit that reaches zero kills.
pub fn take_damage(npc: &mut Npc, hit: &Hit, now: f32, tuning: &CombatTuning) -> HitOutcome {
    if !npc.is_live() {
        return HitOutcome::ignored();
    }

    let mut outcome = HitOutcome::default();

    let before = npc.health;
    npc.health = (npc.health - hit.amount.max(0.0)).clamp(0.0, npc.max_health);
    outcome.damage_dealt = before - npc.health;

    // Self-inflicted hits do not count as an attacker.
    let source = hit.source.filter(|s| s.npc() != Some(npc.id));
    let previous_hit_time = npc.last_damage_time.replace(now);
    if source.is_some() {
        npc.last_attacker = source;
    }

    if npc.health <= 0.0 {
        outcome.died = die(npc, tuning);
        return outcome;
    }

    outcome.panic_started = track_combo(npc, hit, now, previous_hit_time, tuning);

    if hit.is_melee && npc.kind == NpcKind::Heavy && !npc.is_dizzy {
        npc.punches_received += 1;
        if npc.punches_received >= tuning.dizzy_hits {
            npc.punches_received = 0;
            npc.is_dizzy = true;
            npc.dizzy_timer = tuning.dizzy_duration;
            outcome.dizzy_started = true;
        }
    }

    if let Some(attacker) = source {
        if hit.impulse > tuning.furia_impulse_threshold {
            npc.last_attacker = Some(attacker);
            npc.furia_timer = tuning.furia_duration;
            outcome.furia_started = true;
        }
    }

    npc.squash = (npc.squash + hit.impulse.max(0.0) * tuning.squash_per_impulse).min(1.0);
    npc.flash_timer = tuning.flash_duration;

    if let Some(attacker) = source {
        npc.target = Some(attacker);
        apply_trigger(npc, Trigger::Engage);
    }
    if npc.is_panic {
        apply_trigger(npc, Trigger::Scare);
    }

    outcome
}

/// Counts combo hits and starts (or refreshes) a panic at the threshold.
///
/// Returns whether a new panic started.
fn track_combo(npc: &mut Npc, hit: &Hit, now: f32, previous: Option<f32>, tuning: &CombatTuning) -> bool {
    let Some(combo) = hit.combo_count else {
        npc.consecutive_hits = 0;
        npc.last_combo_count = 0;
        return false;
    };

    let within_gap = previous.is_some_and(|t| now - t <= tuning.combo_gap);
    if within_gap && npc.consecutive_hits > 0 && combo >= npc.last_combo_count {
        npc.consecutive_hits += 1;
    } else {
        npc.consecutive_hits = 1;
    }
    npc.last_combo_count = combo;

    if npc.consecutive_hits < tuning.panic_hits {
        return false;
    }

    let started = !npc.is_panic;
    npc.is_panic = true;
    npc.panic_timer = tuning.panic_duration;
    started
}

/// State changes land on the saved state while the NPC is limp.
fn apply_trigger(npc: &mut Npc, trigger: Trigger) {
    if npc.is_ragdoll {
        let resume = npc.saved_state.unwrap_or(NpcState::Wander);
        npc.saved_state = Some(resume.on(trigger));
    } else {
        npc.transition(trigger);
    }
}

/// Kills the NPC. Returns `false` if it was already dead.
pub fn die(npc: &mut Npc, tuning: &CombatTuning) -> bool {
    if !npc.is_alive() {
        return false;
    }

    npc.health = 0.0;
    npc.transition(Trigger::Killed);
    npc.velocity = Vec3::ZERO;
    npc.target = None;
    npc.furia_timer = 0.0;
    npc.is_panic = false;
    npc.panic_timer = 0.0;
    npc.is_dizzy = false;
    npc.dizzy_timer = 0.0;
    npc.is_ragdoll = false;
    npc.ragdoll_timer = 0.0;
    npc.saved_state = None;
    npc.is_suspended = false;
    npc.suspension_timer = 0.0;
    npc.death_timer = 0.0;
    npc.despawn_timer = tuning.despawn_delay;
    true
}

/// Timers that expired during a [`tick_modifiers`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierExpiry {
    /// Panic ended
    pub panic_ended: bool,
    /// Dizziness wore off
    pub dizzy_ended: bool,
    /// Furia window closed
    pub furia_ended: bool,
}

/// Runs down panic, dizziness, furia and the hit visuals.
pub fn tick_modifiers(npc: &mut Npc, dt: f32, tuning: &CombatTuning) -> ModifierExpiry {
    let mut expiry = ModifierExpiry::default();

    if npc.is_panic {
        npc.panic_timer -= dt;
        if npc.panic_timer <= TIMER_EPSILON {
            npc.is_panic = false;
            npc.panic_timer = 0.0;
            npc.consecutive_hits = 0;
            expiry.panic_ended = true;
        }
    }

    if npc.is_dizzy {
        npc.dizzy_timer -= dt;
        npc.dizzy_phase += dt * DIZZY_WOBBLE_RATE;
        if npc.dizzy_timer <= TIMER_EPSILON {
            npc.is_dizzy = false;
            npc.dizzy_timer = 0.0;
            npc.dizzy_phase = 0.0;
            expiry.dizzy_ended = true;
        }
    }

    if npc.furia_timer > 0.0 {
        npc.furia_timer -= dt;
        if npc.furia_timer <= TIMER_EPSILON {
            npc.furia_timer = 0.0;
            expiry.furia_ended = true;
        }
    }

    npc.flash_timer = (npc.flash_timer - dt).max(0.0);
    npc.squash *= frame_decay(tuning.squash_decay, dt);

    expiry
}

/// Advances the death fall. Returns `true` once the slot should be returned.
pub fn tick_death(npc: &mut Npc, dt: f32, tuning: &CombatTuning) -> bool {
    npc.velocity = Vec3::ZERO;
    npc.death_timer += dt;
    let fall = if tuning.death_fall_duration > 0.0 {
        (npc.death_timer / tuning.death_fall_duration).min(1.0)
    } else {
        1.0
    };
    npc.tilt = fall * FRAC_PI_2;

    npc.despawn_timer -= dt;
    npc.despawn_timer <= TIMER_EPSILON
}
