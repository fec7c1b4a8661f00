//! Ragdoll and mid-air suspension.
//!
//! A ragdolling NPC skips the behavior state machine and runs free-body
//! physics until its timer runs out; the pre-ragdoll state is saved and
//! restored on exit. Suspension is a short "hang" that freezes horizontal
//! motion while gravity keeps acting.

use brawl_common::{flat, flat_speed, frame_decay, Vec3};

use crate::collision::{resolve_buildings, CollisionBehavior};
use crate::config::PhysicsTuning;
use crate::npc::{Npc, TIMER_EPSILON};
use crate::state::{NpcState, Trigger};
use crate::world::World;

/// Puts the NPC into ragdoll for at least `duration` seconds.
///
/// Re-entering keeps the originally saved state and only ever extends the
/// timer. Returns `false` for dead or inactive NPCs.
pub fn enter_ragdoll(npc: &mut Npc, duration: f32) -> bool {
    if !npc.is_live() {
        return false;
    }

    if !npc.is_ragdoll {
        npc.saved_state = Some(npc.state);
        npc.is_ragdoll = true;
    }
    npc.ragdoll_timer = npc.ragdoll_timer.max(duration);
    npc.impact_speed = npc.velocity.length();
    true
}

/// Freezes horizontal motion for `duration` seconds, remembering it.
///
/// Suspension only runs inside a ragdoll, so a grounded NPC is knocked into
/// one lasting at least as long as the hang. Returns `false` for dead or
/// inactive NPCs.
pub fn enter_suspension(npc: &mut Npc, duration: f32) -> bool {
    if !npc.is_live() {
        return false;
    }

    if !npc.is_ragdoll {
        enter_ragdoll(npc, duration);
    }

    if !npc.is_suspended {
        npc.saved_horizontal_velocity = flat(npc.velocity);
        npc.is_suspended = true;
    }
    npc.suspension_timer = npc.suspension_timer.max(duration);
    npc.velocity.x = 0.0;
    npc.velocity.z = 0.0;
    true
}

/// Ends a suspension and gives back the saved horizontal velocity.
fn release_suspension(npc: &mut Npc) {
    npc.velocity.x = npc.saved_horizontal_velocity.x;
    npc.velocity.z = npc.saved_horizontal_velocity.z;
    npc.saved_horizontal_velocity = Vec3::ZERO;
    npc.is_suspended = false;
    npc.suspension_timer = 0.0;
}

/// Leaves ragdoll and resumes the saved state.
pub fn exit_ragdoll(npc: &mut Npc) {
    if npc.is_suspended {
        release_suspension(npc);
    }
    npc.is_ragdoll = false;
    npc.ragdoll_timer = 0.0;
    npc.impact_speed = 0.0;
    npc.tilt = 0.0;

    let resume = npc.saved_state.take().unwrap_or(NpcState::Wander);
    npc.transition(Trigger::Resume(resume));
}

/// What happened during one ragdoll step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RagdollStep {
    /// Downward speed at landing, if the body touched the ground this step
    pub landing_speed: Option<f32>,
    /// A building was hit
    pub hit_wall: bool,
    /// Suspension ended this step
    pub released: bool,
    /// Ragdoll ended this step
    pub exited: bool,
}

/// Height above the ground that still counts as landed.
const GROUNDED_TOLERANCE: f32 = 0.05;

/// Advances a ragdolling NPC by `dt`.
///
/// An expired timer only ends the ragdoll once the body is back on the
/// ground; airborne bodies keep falling.
pub fn step_ragdoll(npc: &mut Npc, dt: f32, tuning: &PhysicsTuning, world: &World) -> RagdollStep {
    let mut step = RagdollStep::default();
    if !npc.is_ragdoll || !npc.is_live() {
        return step;
    }

    npc.ragdoll_timer -= dt;
    npc.velocity.y -= tuning.gravity * tuning.ragdoll_gravity_multiplier * dt;

    if npc.is_suspended {
        npc.suspension_timer -= dt;
        if npc.suspension_timer <= TIMER_EPSILON {
            release_suspension(npc);
            step.released = true;
        } else {
            npc.velocity.x = 0.0;
            npc.velocity.z = 0.0;
        }
    } else {
        let friction = frame_decay(tuning.ragdoll_friction, dt);
        npc.velocity.x *= friction;
        npc.velocity.z *= friction;
    }

    npc.position += npc.velocity * dt;

    step.hit_wall = resolve_buildings(npc, &world.buildings, CollisionBehavior::Bounce(tuning.wall_bounce));

    let ground = world.ground_at(npc.position) + tuning.ground_offset;
    let grounded = npc.position.y <= ground + GROUNDED_TOLERANCE;
    if npc.position.y <= ground {
        npc.position.y = ground;
        if npc.velocity.y < 0.0 {
            step.landing_speed = Some(-npc.velocity.y);
            npc.velocity.y = 0.0;
        }
    }

    npc.tilt = (flat_speed(npc.velocity) * tuning.tilt_per_speed).min(tuning.max_tilt);

    if npc.ragdoll_timer <= TIMER_EPSILON && grounded {
        exit_ragdoll(npc);
        step.exited = true;
    }

    step
}
