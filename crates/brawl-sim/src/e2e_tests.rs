//! End-to-end tests for the brawl simulation.
//!
//! These drive a full [`NpcPool`] through `update` the way a host would and
//! check the behavior that only shows up when the systems run together.

#![cfg(test)]

use brawl_common::{flat_distance, Actor, Vec3};
use proptest::prelude::*;

use crate::collision::resolve_pairs;
use crate::combat::Hit;
use crate::config::{CollisionTuning, SimConfig};
use crate::events::SimEvent;
use crate::npc::{Npc, NpcKind};
use crate::pool::{NpcPool, SpawnOptions};
use crate::state::NpcState;
use crate::world::{DummyPlayer, World};

const DT: f32 = 1.0 / 60.0;

/// Pool without repopulation, so only the NPCs a test spawns exist.
fn arena(capacity: usize) -> NpcPool {
    let config = SimConfig {
        repopulate_threshold: 0.0,
        ..SimConfig::with_capacity(capacity)
    };
    NpcPool::new(config, World::flat(), 1234)
}

fn place(pool: &mut NpcPool, kind: NpcKind, at: Vec3) -> brawl_common::NpcId {
    pool.spawn(Some(at), 1, SpawnOptions::kind(kind).exact())[0]
}

mod collision_tests {
    use super::*;

    #[test]
    fn e2e_overlapping_basic_and_heavy_are_separated() {
        let mut pool = arena(4);
        let basic = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        let heavy = place(&mut pool, NpcKind::Heavy, Vec3::new(0.5, 0.0, 0.0));

        pool.update(DT, None, Vec3::ZERO);

        let a = pool.get(basic).expect("basic alive");
        let b = pool.get(heavy).expect("heavy alive");
        let separation = flat_distance(a.position, b.position);
        assert!(
            separation >= 1.4 - 1e-3,
            "bodies should be pushed to the radius sum, got {separation}"
        );
    }

    #[test]
    fn e2e_crowd_settles_without_overlap() {
        let mut pool = arena(16);
        for i in 0..8 {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32 * 0.3;
            let id = place(&mut pool, NpcKind::Basic, Vec3::new(x, 0.0, 0.0));
            // Calm NPCs only wander, so nothing keeps pressing into the pile
            pool.get_mut(id).expect("live").mood = 1.0;
        }

        for _ in 0..60 {
            pool.update(DT, None, Vec3::ZERO);
        }

        let bodies: Vec<&Npc> = pool.all_active().collect();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                let gap = flat_distance(a.position, b.position);
                assert!(gap >= a.radius() + b.radius() - 0.1, "still overlapping: {gap}");
            }
        }
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn e2e_lethal_hit_then_despawn_after_delay() {
        let mut pool = arena(4);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);

        let outcome = pool.apply_hit(id, &Hit::new(60.0).with_source(Actor::Player)).expect("live handle");

        assert!(outcome.died);
        let corpse = pool.get(id).expect("corpse stays until despawn");
        assert_eq!(corpse.state, NpcState::Dead);
        assert!((corpse.despawn_timer - 5.0).abs() < f32::EPSILON);

        // 5.0s at 60 FPS, minus the last frame
        for _ in 0..299 {
            pool.update(DT, None, Vec3::ZERO);
        }
        assert!(pool.get(id).is_some(), "despawned early");

        pool.update(DT, None, Vec3::ZERO);
        assert!(pool.get(id).is_none(), "slot should be returned after 5s");
        assert_eq!(pool.stats().active, 0);
        assert!(pool
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::Despawned { id: gone } if *gone == id)));
    }

    #[test]
    fn e2e_ragdoll_round_trip_takes_exactly_its_timer() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        pool.get_mut(id).expect("live").state = NpcState::Chase;
        pool.enter_ragdoll(id, 1.0).expect("live");

        for tick in 0..59 {
            pool.update(DT, None, Vec3::ZERO);
            assert!(pool.get(id).expect("live").is_ragdoll, "left ragdoll early at tick {tick}");
        }
        pool.update(DT, None, Vec3::ZERO);

        let npc = pool.get(id).expect("live");
        assert!(!npc.is_ragdoll);
        assert_eq!(npc.state, NpcState::Chase, "pre-ragdoll state is restored");
    }

    #[test]
    fn e2e_ragdoll_without_saved_state_resumes_wander() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        pool.enter_ragdoll(id, 0.1).expect("live");
        pool.get_mut(id).expect("live").saved_state = None;

        for _ in 0..10 {
            pool.update(DT, None, Vec3::ZERO);
        }

        let npc = pool.get(id).expect("live");
        assert!(!npc.is_ragdoll);
        assert!(npc.state.is_roaming());
    }
}

mod furia_tests {
    use super::*;

    #[test]
    fn e2e_hard_hit_opens_furia_against_source() {
        let mut pool = arena(4);
        let victim = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        let source = place(&mut pool, NpcKind::Heavy, Vec3::new(8.0, 0.0, 0.0));

        let hit = Hit::new(5.0).with_source(Actor::Npc(source)).with_impulse(20.0);
        let outcome = pool.apply_hit(victim, &hit).expect("live");

        assert!(outcome.furia_started);
        let npc = pool.get(victim).expect("live");
        assert_eq!(npc.furia_timer, pool.config().combat.furia_duration);
        assert_eq!(npc.last_attacker, Some(Actor::Npc(source)));
    }

    #[test]
    fn e2e_furia_steers_toward_attacker_until_it_despawns() {
        let mut pool = arena(4);
        let victim = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        let source = place(&mut pool, NpcKind::Heavy, Vec3::new(8.0, 0.0, 0.0));
        pool.apply_hit(victim, &Hit::new(5.0).with_source(Actor::Npc(source)).with_impulse(20.0))
            .expect("live");

        let mut last_timer = f32::MAX;
        for _ in 0..5 {
            pool.update(DT, None, Vec3::ZERO);
            let npc = pool.get(victim).expect("live");
            let attacker = pool.get(source).expect("live");
            let toward = (attacker.position - npc.position).normalize();
            assert!(npc.velocity.dot(toward) > 0.0, "furia should move toward the attacker");
            assert!(npc.furia_timer < last_timer);
            last_timer = npc.furia_timer;
        }

        // Attacker leaves mid-furia
        pool.despawn(source).expect("live");
        pool.update(DT, None, Vec3::ZERO);

        let npc = pool.get(victim).expect("live");
        assert_eq!(npc.furia_timer, 0.0, "furia clears on the next tick");
        assert!(npc.last_attacker.is_none());
    }

    #[test]
    fn e2e_furia_lapses_after_duration() {
        let mut pool = arena(4);
        let victim = place(&mut pool, NpcKind::Heavy, Vec3::ZERO);
        let mut player = DummyPlayer::new(Vec3::new(40.0, 0.0, 0.0), 1.0e6);
        pool.apply_hit(victim, &Hit::new(1.0).with_source(Actor::Player).with_impulse(20.0))
            .expect("live");

        let duration = pool.config().combat.furia_duration;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ticks = (duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            pool.update(DT, Some(&mut player), Vec3::ZERO);
        }

        let npc = pool.get(victim).expect("live");
        assert_eq!(npc.furia_timer, 0.0);
    }
}

mod panic_tests {
    use super::*;

    fn combo(pool: &mut NpcPool, id: brawl_common::NpcId, counts: &[u32]) {
        for &count in counts {
            pool.apply_hit(id, &Hit::new(1.0).with_source(Actor::Player).with_combo(count))
                .expect("live");
        }
    }

    #[test]
    fn e2e_three_combo_hits_panic_then_recover() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        let mut player = DummyPlayer::new(Vec3::new(2.0, 0.0, 0.0), 100.0);

        combo(&mut pool, id, &[1, 2, 3]);

        let npc = pool.get(id).expect("live");
        assert!(npc.is_panic);
        assert_eq!(npc.state, NpcState::Flee);

        // panic_duration is 2.5s: 150 frames
        for _ in 0..149 {
            pool.update(DT, Some(&mut player), Vec3::ZERO);
        }
        let npc = pool.get(id).expect("live");
        assert!(npc.is_panic, "panic ended early");
        assert_eq!(npc.state, NpcState::Flee);

        pool.update(DT, Some(&mut player), Vec3::ZERO);
        assert!(!pool.get(id).expect("live").is_panic);
    }

    #[test]
    fn e2e_reset_combo_does_not_extend_streak() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);

        combo(&mut pool, id, &[1, 2, 3, 1]);

        let npc = pool.get(id).expect("live");
        assert!(npc.is_panic);
        assert_eq!(npc.consecutive_hits, 1, "the reset hit starts a new streak");
    }

    #[test]
    fn e2e_panic_flees_from_player() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::ZERO);
        let mut player = DummyPlayer::new(Vec3::new(2.0, 0.0, 0.0), 100.0);
        combo(&mut pool, id, &[1, 2, 3]);

        for _ in 0..30 {
            pool.update(DT, Some(&mut player), Vec3::ZERO);
        }

        let npc = pool.get(id).expect("live");
        assert!(npc.position.x < 0.0, "should run away from the player");
        assert_eq!(player.hits, 0, "panicking NPCs do not attack");
    }
}

mod blast_tests {
    use super::*;

    #[test]
    fn e2e_dizzy_heavy_takes_double_blast() {
        let mut pool = arena(4);
        let steady = place(&mut pool, NpcKind::Heavy, Vec3::new(3.0, 0.0, 0.0));
        let dizzy = place(&mut pool, NpcKind::Heavy, Vec3::new(-3.0, 0.0, 0.0));

        // Three punches make a HEAVY dizzy
        for _ in 0..3 {
            pool.apply_hit(dizzy, &Hit::new(1.0).as_melee()).expect("live");
        }
        assert!(pool.get(dizzy).expect("live").is_dizzy);

        let hits = pool.apply_area_impulse(Vec3::ZERO, Some(Actor::Player));
        let steady_hit = hits.iter().find(|h| h.id == steady).expect("steady in range");
        let dizzy_hit = hits.iter().find(|h| h.id == dizzy).expect("dizzy in range");

        assert!(dizzy_hit.dizzy);
        assert!(!steady_hit.dizzy);
        assert!((dizzy_hit.impulse.length() - 2.0 * steady_hit.impulse.length()).abs() < 1e-4);
        assert!((dizzy_hit.damage - 2.0 * steady_hit.damage).abs() < 1e-4);
    }

    #[test]
    fn e2e_blast_launch_suspends_then_lands() {
        let mut pool = arena(2);
        let id = place(&mut pool, NpcKind::Basic, Vec3::new(2.0, 0.0, 0.0));

        pool.apply_area_impulse(Vec3::ZERO, Some(Actor::Player));
        let npc = pool.get(id).expect("survives");
        assert!(npc.is_ragdoll);
        assert!(npc.is_suspended);
        assert_eq!(npc.velocity.x, 0.0, "horizontal launch is held during suspension");
        let start_x = npc.position.x;

        let suspension = pool.config().ability.suspension_duration;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frames = (suspension / DT).ceil() as usize + 2;
        for _ in 0..frames {
            pool.update(DT, None, Vec3::ZERO);
        }

        let npc = pool.get(id).expect("survives");
        assert!(!npc.is_suspended);
        assert!(npc.position.x > start_x, "released outward after the hang");

        // Ragdoll lasts 1.5s; give it time to land and recover
        for _ in 0..120 {
            pool.update(DT, None, Vec3::ZERO);
        }
        let npc = pool.get(id).expect("survives");
        assert!(!npc.is_ragdoll);
        assert_eq!(npc.position.y, 0.0);
    }

    #[test]
    fn e2e_blast_ignores_npcs_outside_radius() {
        let mut pool = arena(2);
        let far = place(&mut pool, NpcKind::Basic, Vec3::new(30.0, 0.0, 0.0));

        let hits = pool.apply_area_impulse(Vec3::ZERO, Some(Actor::Player));

        assert!(hits.is_empty());
        assert!(!pool.get(far).expect("live").is_ragdoll);
    }
}

mod brawl_tests {
    use super::*;

    #[test]
    fn e2e_long_run_keeps_pool_consistent() {
        let config = SimConfig::with_capacity(24);
        let mut pool = NpcPool::new(config, World::flat(), 77);
        let mut player = DummyPlayer::new(Vec3::ZERO, 1.0e9);
        pool.spawn(None, 20, SpawnOptions::default());

        for frame in 0..1200 {
            if frame % 300 == 0 {
                pool.trigger_blast(player.position);
            }
            let viewer = player.position;
            pool.update(DT, Some(&mut player), viewer);
            pool.drain_events();

            let stats = pool.stats();
            assert!(stats.active <= stats.capacity);
            for npc in pool.all_active() {
                assert!(npc.health >= 0.0 && npc.health <= npc.max_health);
                assert!(npc.position.is_finite(), "{} went non-finite", npc.id);
                assert_eq!(npc.health == 0.0, npc.state == NpcState::Dead);
            }
        }
    }
}

proptest! {
    #[test]
    fn prop_pool_never_exceeds_capacity(
        capacity in 1usize..16,
        batches in proptest::collection::vec(0usize..12, 1..12),
    ) {
        let mut pool = arena(capacity);
        let mut handed_out = Vec::new();
        for batch in batches {
            let ids = pool.spawn(None, batch, SpawnOptions::default());
            prop_assert!(ids.len() <= batch);
            handed_out.extend(ids);
            prop_assert!(pool.stats().active <= capacity);
            pool.update(DT, None, Vec3::ZERO);
        }
        handed_out.sort_by_key(|id| (id.slot(), id.generation()));
        handed_out.dedup();
        prop_assert_eq!(handed_out.len(), pool.stats().total_spawned as usize);
    }

    #[test]
    fn prop_pair_resolution_converges(
        dx in -1.0f32..1.0,
        dz in -1.0f32..1.0,
        a_heavy in any::<bool>(),
        b_heavy in any::<bool>(),
    ) {
        let kind = |heavy: bool| if heavy { NpcKind::Heavy } else { NpcKind::Basic };
        let mut a = Npc::parked(0);
        a.activate(kind(a_heavy), Vec3::ZERO, 0.5, Vec3::X);
        let mut b = Npc::parked(1);
        b.activate(kind(b_heavy), Vec3::new(dx, 0.0, dz), 0.5, Vec3::X);
        let reach = a.radius() + b.radius();
        let mut npcs = vec![a, b];
        let mut rng = fastrand::Rng::with_seed(3);

        resolve_pairs(&mut npcs, &[0, 1], &CollisionTuning::default(), &mut rng);

        let gap = flat_distance(npcs[0].position, npcs[1].position);
        prop_assert!(gap >= reach - 1e-3, "remaining penetration {}", reach - gap);
    }
}
