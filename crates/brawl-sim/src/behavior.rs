//! Behavior state machine.
//!
//! Each tick a grounded, non-ragdolling NPC runs [`think`] to turn what it
//! perceives into a desired velocity (and maybe a melee swing), then
//! [`integrate_grounded`] to clamp, damp and move it.
//!
//! Decision order, first match wins:
//! 1. Furia: chase and hit the last hard hitter, whatever the state
//! 2. Panic: flee the player, over a longer range, until the panic timer runs out
//! 3. Player proximity: roll between chasing and fleeing a close player
//! 4. Aggro escalation: sometimes commit to the player when provoked
//! 5. NPC-vs-NPC: aggressive, aimless NPCs pick the nearest other NPC
//! 6. The current state's own logic

use brawl_common::{
    flat_direction, flat_distance, flat_speed, frame_decay, perpendicular_xz, random_range,
    random_unit_xz, yaw_of, Actor, NpcId, Vec3,
};

use crate::config::BehaviorTuning;
use crate::npc::{Npc, TIMER_EPSILON};
use crate::state::{NpcState, Trigger};

/// Slower than this and the NPC keeps its facing.
const FACING_SPEED: f32 = 0.05;

/// Aggro escalation ring, as fractions of the detection radius.
const AGGRO_PROVOKE_FRACTION: f32 = 0.6;
const AGGRO_COMMIT_FRACTION: f32 = 0.4;

/// What an NPC knows about the world this tick.
///
/// Positions are only present for references that are still valid, so a
/// missing entry means the reference went stale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Perception {
    /// Position of the player, if present and alive
    pub player_position: Option<Vec3>,
    /// Current target and where it is
    pub target: Option<(Actor, Vec3)>,
    /// Last attacker and where it is
    pub attacker: Option<(Actor, Vec3)>,
    /// Nearest other live NPC inside the detection radius
    pub nearest_npc: Option<(NpcId, Vec3)>,
}

impl Perception {
    /// Position of an actor, if this perception knows it.
    #[must_use]
    pub fn locate(&self, actor: Actor) -> Option<Vec3> {
        if actor == Actor::Player {
            return self.player_position;
        }
        [
            self.target,
            self.attacker,
            self.nearest_npc.map(|(id, pos)| (Actor::Npc(id), pos)),
        ]
        .into_iter()
        .flatten()
        .find(|(known, _)| *known == actor)
        .map(|(_, pos)| pos)
    }
}

/// A melee swing decided this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    /// Who gets hit
    pub target: Actor,
    /// Unit horizontal direction from attacker to target
    pub direction: Vec3,
}

/// Chance that a per-frame (60 FPS) probability fires over `dt`.
#[must_use]
pub fn per_tick_chance(per_frame: f32, dt: f32) -> f32 {
    1.0 - frame_decay(1.0 - per_frame.clamp(0.0, 1.0), dt)
}

/// Runs one decision step, writing velocity intent into `npc`.
///
/// Returns the melee swing to resolve, if any. Dead or ragdolling NPCs are
/// left untouched.
pub fn think(
    npc: &mut Npc,
    seen: &Perception,
    tuning: &BehaviorTuning,
    rng: &mut fastrand::Rng,
    dt: f32,
) -> Option<Strike> {
    if !npc.is_live() || npc.is_ragdoll {
        return None;
    }

    drop_stale_references(npc, seen);

    if npc.furia_timer > 0.0 {
        return furia(npc, seen, tuning, rng, dt);
    }

    if npc.is_panic {
        let safe = flee_threat(npc, seen)
            .is_some_and(|threat| flat_distance(npc.position, threat) > disengage_distance(npc, tuning));
        if safe {
            // Calms down but engages nobody until the panic runs out.
            npc.target = None;
            npc.transition(Trigger::Scare);
            npc.transition(Trigger::Disengage);
            return act(npc, seen, tuning, rng, dt);
        }
        npc.transition(Trigger::Scare);
        flee(npc, seen, tuning, rng, dt);
        return None;
    }

    decide(npc, seen, tuning, rng, dt);
    act(npc, seen, tuning, rng, dt)
}

/// Clears targets and attackers that no longer resolve.
fn drop_stale_references(npc: &mut Npc, seen: &Perception) {
    if let Some(target) = npc.target {
        if seen.locate(target).is_none() {
            npc.target = None;
            npc.transition(Trigger::TargetLost);
        }
    }

    if let Some(attacker) = npc.last_attacker {
        if seen.locate(attacker).is_none() {
            npc.last_attacker = None;
            npc.furia_timer = 0.0;
        }
    }
}

fn engage(npc: &mut Npc, target: Actor) {
    npc.target = Some(target);
    npc.transition(Trigger::Engage);
}

fn is_after(npc: &Npc, actor: Actor) -> bool {
    npc.target == Some(actor) && npc.state.is_hostile()
}

/// Vengeance: hard override toward the attacker.
fn furia(
    npc: &mut Npc,
    seen: &Perception,
    tuning: &BehaviorTuning,
    rng: &mut fastrand::Rng,
    dt: f32,
) -> Option<Strike> {
    let attacker = npc.last_attacker?;
    let attacker_pos = seen.locate(attacker)?;

    let direction = flat_direction(npc.position, attacker_pos).unwrap_or(npc.desired_direction);
    npc.desired_direction = direction;
    npc.velocity += direction * tuning.furia_accel * dt;
    npc.yaw = yaw_of(direction);

    let in_reach = flat_distance(npc.position, attacker_pos) <= tuning.attack_radius;
    if in_reach && npc.attack_cooldown <= TIMER_EPSILON {
        npc.attack_cooldown = random_range(rng, tuning.attack_cooldown_min, tuning.attack_cooldown_max);
        return Some(Strike {
            target: attacker,
            direction,
        });
    }
    None
}

/// Rules 3 to 5: may retarget and change state.
fn decide(npc: &mut Npc, seen: &Perception, tuning: &BehaviorTuning, rng: &mut fastrand::Rng, dt: f32) {
    if let Some(player_pos) = seen.player_position {
        let distance = flat_distance(npc.position, player_pos);
        let player_hit_me = npc.last_attacker == Some(Actor::Player);

        if distance < tuning.flee_player_radius && !player_hit_me {
            let settled = npc.state == NpcState::Flee || is_after(npc, Actor::Player);
            if !settled {
                if npc.mood < tuning.aggressive_mood && rng.f32() < tuning.proximity_chase_chance {
                    engage(npc, Actor::Player);
                } else {
                    npc.target = None;
                    npc.transition(Trigger::Scare);
                }
            }
            return;
        }

        let detection = tuning.detection_radius;
        let provoked = player_hit_me || distance < detection * AGGRO_PROVOKE_FRACTION;
        if provoked
            && distance < detection * AGGRO_COMMIT_FRACTION
            && !is_after(npc, Actor::Player)
            && rng.f32() < per_tick_chance(tuning.aggro_commit_chance, dt)
        {
            engage(npc, Actor::Player);
            return;
        }
    }

    if npc.target.is_none() && npc.mood < tuning.aggressive_mood && npc.state.is_roaming() {
        if let Some((other, _)) = seen.nearest_npc {
            engage(npc, Actor::Npc(other));
        }
    }
}

/// Rule 6: the current state's own logic.
fn act(
    npc: &mut Npc,
    seen: &Perception,
    tuning: &BehaviorTuning,
    rng: &mut fastrand::Rng,
    dt: f32,
) -> Option<Strike> {
    match npc.state {
        NpcState::Wander => {
            if npc.time_to_change_direction <= TIMER_EPSILON {
                change_direction(npc, tuning, rng);
            }
            if npc.state == NpcState::Wander {
                npc.velocity += npc.desired_direction * tuning.wander_accel * dt;
            }
            None
        },
        NpcState::Idle => {
            if npc.time_to_change_direction <= TIMER_EPSILON {
                change_direction(npc, tuning, rng);
            }
            None
        },
        NpcState::Chase => {
            chase(npc, seen, tuning, dt);
            None
        },
        NpcState::Attack => attack(npc, seen, tuning, rng, dt),
        NpcState::Flee => {
            flee(npc, seen, tuning, rng, dt);
            None
        },
        NpcState::Dead => None,
    }
}

/// Picks a new wander heading and lets the mood drift.
fn change_direction(npc: &mut Npc, tuning: &BehaviorTuning, rng: &mut fastrand::Rng) {
    npc.desired_direction = random_unit_xz(rng);
    npc.time_to_change_direction =
        random_range(rng, tuning.direction_interval_min, tuning.direction_interval_max);
    npc.mood = (npc.mood + random_range(rng, -tuning.mood_drift, tuning.mood_drift)).clamp(0.0, 1.0);

    if rng.f32() < tuning.idle_chance {
        npc.transition(Trigger::Rest);
    } else {
        npc.transition(Trigger::Roam);
    }
}

fn chase(npc: &mut Npc, seen: &Perception, tuning: &BehaviorTuning, dt: f32) {
    let Some(target_pos) = npc.target.and_then(|t| seen.locate(t)) else {
        npc.target = None;
        npc.transition(Trigger::TargetLost);
        return;
    };

    if let Some(direction) = flat_direction(npc.position, target_pos) {
        npc.desired_direction = direction;
        npc.velocity += direction * tuning.chase_accel * dt;
    }

    if flat_distance(npc.position, target_pos) < tuning.attack_radius {
        npc.transition(Trigger::InReach);
    }
}

fn attack(
    npc: &mut Npc,
    seen: &Perception,
    tuning: &BehaviorTuning,
    rng: &mut fastrand::Rng,
    dt: f32,
) -> Option<Strike> {
    let target = npc.target?;
    let Some(target_pos) = seen.locate(target) else {
        npc.target = None;
        npc.transition(Trigger::TargetLost);
        return None;
    };

    if flat_distance(npc.position, target_pos) > tuning.attack_radius * tuning.attack_exit_factor {
        npc.transition(Trigger::OutOfReach);
        return None;
    }

    let direction = flat_direction(npc.position, target_pos).unwrap_or(npc.desired_direction);
    npc.desired_direction = direction;
    npc.yaw = yaw_of(direction);
    npc.velocity += perpendicular_xz(direction) * random_range(rng, -1.0, 1.0) * tuning.strafe_accel * dt;

    if npc.attack_cooldown > TIMER_EPSILON {
        return None;
    }
    npc.attack_cooldown = random_range(rng, tuning.attack_cooldown_min, tuning.attack_cooldown_max);
    Some(Strike { target, direction })
}

/// What a fleeing NPC runs from: the player, else its last attacker.
fn flee_threat(npc: &Npc, seen: &Perception) -> Option<Vec3> {
    seen.player_position
        .or_else(|| npc.last_attacker.and_then(|a| seen.locate(a)))
}

/// Distance from the threat at which FLEE gives up; panic pushes it out.
fn disengage_distance(npc: &Npc, tuning: &BehaviorTuning) -> f32 {
    let reach = if npc.is_panic { tuning.panic_disengage_multiplier } else { 1.0 };
    tuning.flee_player_radius * tuning.flee_disengage_factor * reach
}

fn flee(npc: &mut Npc, seen: &Perception, tuning: &BehaviorTuning, rng: &mut fastrand::Rng, dt: f32) {
    let Some(threat) = flee_threat(npc, seen) else {
        if !npc.is_panic {
            npc.transition(Trigger::Disengage);
        }
        return;
    };

    let away = flat_direction(threat, npc.position).unwrap_or_else(|| random_unit_xz(rng));
    let jitter = perpendicular_xz(away) * random_range(rng, -tuning.flee_jitter, tuning.flee_jitter);
    let direction = (away + jitter).normalize_or_zero();
    npc.desired_direction = direction;

    let urgency = if npc.is_panic { tuning.panic_speed_multiplier } else { 1.0 };
    npc.velocity += direction * tuning.flee_accel * urgency * dt;

    if flat_distance(npc.position, threat) > disengage_distance(npc, tuning) {
        match npc.target {
            Some(target) if !npc.is_panic && seen.locate(target).is_some() => npc.transition(Trigger::Engage),
            _ => {
                npc.target = None;
                npc.transition(Trigger::Disengage);
            },
        }
    }
}

/// Horizontal speed cap for the NPC's current state.
#[must_use]
pub fn max_speed(npc: &Npc, tuning: &BehaviorTuning) -> f32 {
    if npc.furia_timer > 0.0 {
        return tuning.chase_max_speed;
    }
    match npc.state {
        NpcState::Flee if npc.is_panic => tuning.flee_max_speed * tuning.panic_speed_multiplier,
        NpcState::Flee => tuning.flee_max_speed,
        NpcState::Chase | NpcState::Attack => tuning.chase_max_speed,
        NpcState::Wander | NpcState::Idle | NpcState::Dead => tuning.wander_max_speed,
    }
}

/// Grounded locomotion: flatten, clamp, damp, move, face.
///
/// Height is left to the caller, which snaps to terrain after collision.
pub fn integrate_grounded(npc: &mut Npc, tuning: &BehaviorTuning, dt: f32) {
    npc.velocity.y = 0.0;

    let cap = max_speed(npc, tuning);
    let speed = flat_speed(npc.velocity);
    if speed > cap && speed > 0.0 {
        npc.velocity *= cap / speed;
    }

    npc.velocity *= frame_decay(tuning.damping, dt);
    npc.position += npc.velocity * dt;

    if flat_speed(npc.velocity) > FACING_SPEED && !matches!(npc.state, NpcState::Attack) {
        npc.yaw = yaw_of(npc.velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::NpcKind;

    const DT: f32 = 1.0 / 60.0;

    fn npc_at(position: Vec3, mood: f32) -> Npc {
        let mut npc = Npc::parked(0);
        npc.activate(NpcKind::Basic, position, mood, Vec3::X);
        npc.time_to_change_direction = 4.0;
        npc
    }

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    #[test]
    fn test_per_tick_chance_at_60fps_matches_per_frame() {
        assert!((per_tick_chance(0.1, DT) - 0.1).abs() < 1e-5);
        assert!(per_tick_chance(0.1, 2.0 * DT) > 0.1);
        assert_eq!(per_tick_chance(0.0, DT), 0.0);
    }

    #[test]
    fn test_stale_target_reverts_to_wander() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.target = Some(Actor::Npc(NpcId::new(5, 1)));
        npc.state = NpcState::Chase;

        think(&mut npc, &Perception::default(), &tuning, &mut rng(), DT);

        assert!(npc.target.is_none());
        assert_eq!(npc.state, NpcState::Wander);
    }

    #[test]
    fn test_furia_overrides_movement_toward_attacker() {
        let tuning = BehaviorTuning::default();
        let attacker = Actor::Npc(NpcId::new(3, 1));
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.last_attacker = Some(attacker);
        npc.furia_timer = 2.0;
        npc.state = NpcState::Flee;

        let seen = Perception {
            attacker: Some((attacker, Vec3::new(10.0, 0.0, 0.0))),
            ..Default::default()
        };
        let strike = think(&mut npc, &seen, &tuning, &mut rng(), DT);

        assert!(strike.is_none());
        assert!(npc.velocity.x > 0.0);
        assert_eq!(npc.state, NpcState::Flee, "furia does not change the state itself");
    }

    #[test]
    fn test_furia_strikes_in_reach() {
        let tuning = BehaviorTuning::default();
        let attacker = Actor::Npc(NpcId::new(3, 1));
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.last_attacker = Some(attacker);
        npc.furia_timer = 2.0;

        let seen = Perception {
            attacker: Some((attacker, Vec3::new(1.0, 0.0, 0.0))),
            ..Default::default()
        };
        let strike = think(&mut npc, &seen, &tuning, &mut rng(), DT).expect("in reach");

        assert_eq!(strike.target, attacker);
        assert!(npc.attack_cooldown >= tuning.attack_cooldown_min);
    }

    #[test]
    fn test_furia_cleared_when_attacker_vanishes() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.last_attacker = Some(Actor::Npc(NpcId::new(3, 1)));
        npc.furia_timer = 2.0;

        think(&mut npc, &Perception::default(), &tuning, &mut rng(), DT);

        assert_eq!(npc.furia_timer, 0.0);
        assert!(npc.last_attacker.is_none());
    }

    #[test]
    fn test_calm_npc_flees_close_player() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        let seen = Perception {
            player_position: Some(Vec3::new(1.0, 0.0, 0.0)),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);

        assert_eq!(npc.state, NpcState::Flee);
        assert!(npc.velocity.x < 0.0, "runs away from the player");
    }

    #[test]
    fn test_aggressive_npcs_sometimes_chase_close_player() {
        let tuning = BehaviorTuning::default();
        let seen = Perception {
            player_position: Some(Vec3::new(1.0, 0.0, 0.0)),
            ..Default::default()
        };
        let mut rng = rng();
        let mut chased = 0;
        let mut fled = 0;
        for _ in 0..200 {
            let mut npc = npc_at(Vec3::ZERO, 0.1);
            think(&mut npc, &seen, &tuning, &mut rng, DT);
            match npc.state {
                NpcState::Chase | NpcState::Attack => chased += 1,
                NpcState::Flee => fled += 1,
                other => panic!("unexpected state {other}"),
            }
        }
        assert!(chased > 40 && fled > 40, "chased {chased}, fled {fled}");
    }

    #[test]
    fn test_opportunistic_npc_targets_nearest() {
        let tuning = BehaviorTuning::default();
        let other = NpcId::new(9, 1);
        let mut npc = npc_at(Vec3::ZERO, 0.1);
        let seen = Perception {
            nearest_npc: Some((other, Vec3::new(5.0, 0.0, 0.0))),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);

        assert_eq!(npc.target, Some(Actor::Npc(other)));
        assert_eq!(npc.state, NpcState::Chase);
        assert!(npc.velocity.x > 0.0);
    }

    #[test]
    fn test_calm_npc_ignores_nearby_npcs() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        let seen = Perception {
            nearest_npc: Some((NpcId::new(9, 1), Vec3::new(5.0, 0.0, 0.0))),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);

        assert!(npc.target.is_none());
        assert!(npc.state.is_roaming());
    }

    #[test]
    fn test_chase_enters_attack_in_reach() {
        let tuning = BehaviorTuning::default();
        let other = Actor::Npc(NpcId::new(2, 1));
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.target = Some(other);
        npc.state = NpcState::Chase;
        let seen = Perception {
            target: Some((other, Vec3::new(1.0, 0.0, 0.0))),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);
        assert_eq!(npc.state, NpcState::Attack);

        let strike = think(&mut npc, &seen, &tuning, &mut rng(), DT).expect("cooldown is ready");
        assert_eq!(strike.target, other);
        assert!(npc.attack_cooldown >= tuning.attack_cooldown_min);
        assert!(npc.attack_cooldown <= tuning.attack_cooldown_max);

        assert!(think(&mut npc, &seen, &tuning, &mut rng(), DT).is_none(), "cooldown gates the next swing");
    }

    #[test]
    fn test_attack_falls_back_to_chase_out_of_range() {
        let tuning = BehaviorTuning::default();
        let other = Actor::Npc(NpcId::new(2, 1));
        let mut npc = npc_at(Vec3::ZERO, 0.9);
        npc.target = Some(other);
        npc.state = NpcState::Attack;
        let seen = Perception {
            target: Some((other, Vec3::new(8.0, 0.0, 0.0))),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);
        assert_eq!(npc.state, NpcState::Chase);
    }

    #[test]
    fn test_wander_changes_direction_and_drifts_mood() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.5);
        npc.time_to_change_direction = 0.0;

        think(&mut npc, &Perception::default(), &tuning, &mut rng(), DT);

        assert!(npc.time_to_change_direction >= tuning.direction_interval_min);
        assert!(npc.time_to_change_direction <= tuning.direction_interval_max);
        assert!((npc.mood - 0.5).abs() <= tuning.mood_drift + 1e-6);
        assert!((npc.desired_direction.length() - 1.0).abs() < 1e-4);
    }

    fn panicked_at(x: f32) -> Npc {
        let mut npc = npc_at(Vec3::new(x, 0.0, 0.0), 0.9);
        npc.is_panic = true;
        npc.panic_timer = 1.0;
        npc.state = NpcState::Flee;
        npc
    }

    fn player_at_origin() -> Perception {
        Perception {
            player_position: Some(Vec3::ZERO),
            ..Default::default()
        }
    }

    #[test]
    fn test_panic_flees_faster_and_further() {
        let tuning = BehaviorTuning::default();
        let calm_at = tuning.flee_player_radius * tuning.flee_disengage_factor;
        let panic_at = calm_at * tuning.panic_disengage_multiplier;
        let between = (calm_at + panic_at) * 0.5;

        let mut panicked = panicked_at(between);
        think(&mut panicked, &player_at_origin(), &tuning, &mut rng(), DT);
        assert_eq!(panicked.state, NpcState::Flee);
        assert!(max_speed(&panicked, &tuning) > tuning.flee_max_speed);

        let mut calm = npc_at(Vec3::new(between, 0.0, 0.0), 0.9);
        calm.state = NpcState::Flee;
        think(&mut calm, &player_at_origin(), &tuning, &mut rng(), DT);
        assert_eq!(calm.state, NpcState::Wander);
    }

    #[test]
    fn test_panic_disengages_beyond_extended_range() {
        let tuning = BehaviorTuning::default();
        let panic_at =
            tuning.flee_player_radius * tuning.flee_disengage_factor * tuning.panic_disengage_multiplier;
        let mut npc = panicked_at(panic_at + 1.0);

        think(&mut npc, &player_at_origin(), &tuning, &mut rng(), DT);

        assert!(npc.state.is_roaming());
        assert!(npc.target.is_none());
        assert!(npc.is_panic, "the panic timer still runs");
    }

    #[test]
    fn test_panic_disengage_multiplier_matters() {
        let mut tuning = BehaviorTuning::default();
        let calm_at = tuning.flee_player_radius * tuning.flee_disengage_factor;

        tuning.panic_disengage_multiplier = 1.0;
        let mut npc = panicked_at(calm_at + 1.0);
        think(&mut npc, &player_at_origin(), &tuning, &mut rng(), DT);
        assert!(npc.state.is_roaming());

        tuning.panic_disengage_multiplier = 1000.0;
        let mut npc = panicked_at(calm_at + 1.0);
        think(&mut npc, &player_at_origin(), &tuning, &mut rng(), DT);
        assert_eq!(npc.state, NpcState::Flee);
    }

    /// Ticks a fresh NPC `x` units from the player and reports whether it
    /// ever commits to chasing the player.
    fn commits_to_player(x: f32, hit_by_player: bool) -> bool {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::new(x, 0.0, 0.0), 0.9);
        if hit_by_player {
            npc.last_attacker = Some(Actor::Player);
        }
        let seen = player_at_origin();
        let mut rng = rng();

        for _ in 0..600 {
            think(&mut npc, &seen, &tuning, &mut rng, DT);
            if npc.state == NpcState::Chase && npc.target == Some(Actor::Player) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_provoked_npc_commits_inside_aggro_ring() {
        let tuning = BehaviorTuning::default();
        let inside = tuning.detection_radius * AGGRO_COMMIT_FRACTION - 0.5;
        assert!(inside > tuning.flee_player_radius);

        assert!(commits_to_player(inside, false));
        assert!(commits_to_player(inside, true));
    }

    #[test]
    fn test_no_commit_outside_aggro_ring() {
        let tuning = BehaviorTuning::default();
        let provoked_but_far = tuning.detection_radius * AGGRO_COMMIT_FRACTION + 0.5;
        assert!(provoked_but_far < tuning.detection_radius * AGGRO_PROVOKE_FRACTION);

        assert!(!commits_to_player(provoked_but_far, false));
        assert!(!commits_to_player(tuning.detection_radius - 1.0, true));
    }

    #[test]
    fn test_flee_disengages_when_far() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::new(100.0, 0.0, 0.0), 0.9);
        npc.state = NpcState::Flee;
        let seen = Perception {
            player_position: Some(Vec3::ZERO),
            ..Default::default()
        };

        think(&mut npc, &seen, &tuning, &mut rng(), DT);
        assert_eq!(npc.state, NpcState::Wander);
    }

    #[test]
    fn test_integrate_grounded_clamps_and_damps() {
        let tuning = BehaviorTuning::default();
        let mut npc = npc_at(Vec3::ZERO, 0.5);
        npc.velocity = Vec3::new(10.0, 3.0, 0.0);

        integrate_grounded(&mut npc, &tuning, DT);

        assert_eq!(npc.velocity.y, 0.0);
        let expected = tuning.wander_max_speed * tuning.damping;
        assert!((npc.velocity.x - expected).abs() < 1e-4);
        assert!(npc.position.x > 0.0);
    }

    #[test]
    fn test_damping_is_framerate_independent() {
        let tuning = BehaviorTuning::default();
        let mut fast = npc_at(Vec3::ZERO, 0.5);
        let mut slow = npc_at(Vec3::ZERO, 0.5);
        fast.velocity = Vec3::new(2.0, 0.0, 0.0);
        slow.velocity = Vec3::new(2.0, 0.0, 0.0);

        for _ in 0..60 {
            integrate_grounded(&mut fast, &tuning, 1.0 / 60.0);
        }
        for _ in 0..30 {
            integrate_grounded(&mut slow, &tuning, 1.0 / 30.0);
        }

        assert!((fast.velocity.x - slow.velocity.x).abs() < 1e-4);
    }
}
