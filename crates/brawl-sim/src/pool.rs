//! The NPC pool and its tick loop.
//!
//! The pool preallocates `capacity` records and hands out generational
//! [`NpcId`] handles. Everything runs on the caller's thread inside
//! [`NpcPool::update`], in a fixed order:
//!
//! 1. drop inactive slots from the active list
//! 2. periodic repopulation
//! 3. the gravity blast timer (it may go off this tick)
//! 4. per-NPC: death progression, culling, combat timers, ragdoll or AI
//! 5. pairwise collision and its side effects
//! 6. terrain snapping for grounded NPCs
//! 7. melee damage queued against the player

use brawl_common::{
    flat_distance, flat_speed, random_range, random_unit_xz, yaw_of, Actor, BrawlError, BrawlResult, NpcId, Vec3,
};
use tracing::{debug, trace, warn};

use crate::ability::{blast_impulse, BlastHit, GravityBlast};
use crate::behavior::{self, Perception, Strike};
use crate::collision::{self, CollisionBehavior, PairContact};
use crate::combat::{self, Hit, HitOutcome};
use crate::config::SimConfig;
use crate::events::{EventBus, SimEvent};
use crate::feedback::Sinks;
use crate::npc::{Npc, NpcKind, NpcSnapshot};
use crate::ragdoll;
use crate::world::{PlayerHandle, PlayerView, World};

/// Attempts at rejection-sampling a spawn point outside the protected centre.
const SPAWN_ATTEMPTS: usize = 16;

/// Options for [`NpcPool::spawn`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnOptions {
    /// Force a kind; `None` rolls against the heavy spawn chance
    pub kind: Option<NpcKind>,
    /// Scatter radius around an explicit position; `None` uses the configured one
    pub scatter: Option<f32>,
}

impl SpawnOptions {
    /// Spawns the given kind.
    #[must_use]
    pub fn kind(kind: NpcKind) -> Self {
        Self {
            kind: Some(kind),
            scatter: None,
        }
    }

    /// Spawns exactly at the requested position.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.scatter = Some(0.0);
        self
    }
}

/// Pool occupancy counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Slots in use (including dead NPCs awaiting despawn)
    pub active: usize,
    /// Active NPCs that are alive
    pub alive: usize,
    /// Active NPCs currently ragdolling
    pub ragdolling: usize,
    /// Total slots
    pub capacity: usize,
    /// NPCs spawned over the pool's lifetime
    pub total_spawned: u64,
}

/// What one call to [`NpcPool::update`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// NPCs that ran AI or physics
    pub simulated: usize,
    /// NPCs skipped for being far from the viewer
    pub culled: usize,
    /// NPCs spawned by repopulation
    pub spawned: usize,
    /// NPCs returned to the pool
    pub despawned: usize,
    /// Touching body pairs
    pub contacts: usize,
    /// NPCs launched by the gravity blast
    pub launched: usize,
    /// Damage dealt to the player
    pub player_damage: f32,
}

/// Melee damage waiting to be applied to the player at the end of a tick.
#[derive(Debug, Clone, Copy)]
struct PlayerHit {
    amount: f32,
    direction: Vec3,
}

/// Fixed-capacity pool of NPC records with the simulation that drives them.
#[derive(Debug)]
pub struct NpcPool {
    config: SimConfig,
    world: World,
    sinks: Sinks,
    events: EventBus,

    /// One record per slot
    npcs: Vec<Npc>,
    /// Slots in use, in spawn order
    active: Vec<usize>,

    rng: fastrand::Rng,
    blast: GravityBlast,
    spawn_timer: f32,
    clock: f32,
    total_spawned: u64,
}

impl NpcPool {
    /// Creates a pool with every slot preallocated and parked.
    ///
    /// The configuration is validated; `seed` makes runs reproducible.
    #[must_use]
    pub fn new(config: SimConfig, world: World, seed: u64) -> Self {
        let config = config.validated();
        let capacity = config.capacity;
        let npcs = (0..capacity)
            .map(|slot| Npc::parked(u32::try_from(slot).unwrap_or(u32::MAX)))
            .collect();

        debug!("NPC pool created with {capacity} slots (seed {seed})");

        Self {
            blast: GravityBlast::new(&config.ability),
            config,
            world,
            sinks: Sinks::none(),
            events: EventBus::default(),
            npcs,
            active: Vec::with_capacity(capacity),
            rng: fastrand::Rng::with_seed(seed),
            spawn_timer: 0.0,
            clock: 0.0,
            total_spawned: 0,
        }
    }

    /// Attaches presentation sinks.
    #[must_use]
    pub fn with_sinks(mut self, sinks: Sinks) -> Self {
        self.sinks = sinks;
        self
    }

    /// Returns the (validated) configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the world geometry.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Seconds of simulation time elapsed.
    #[must_use]
    pub const fn clock(&self) -> f32 {
        self.clock
    }

    // === Spawning ===

    /// Spawns up to `count` NPCs.
    ///
    /// With a position they are scattered around it; without one each gets a
    /// random map point outside the protected centre. Slots are claimed
    /// first-fit. When the pool runs out the spawn is cut short and only the
    /// NPCs that fit are returned.
    pub fn spawn(&mut self, position: Option<Vec3>, count: usize, options: SpawnOptions) -> Vec<NpcId> {
        let mut spawned = Vec::with_capacity(count.min(self.npcs.len()));

        for _ in 0..count {
            let Some(slot) = self.npcs.iter().position(|npc| !npc.active) else {
                warn!(
                    "NPC pool exhausted: spawned {} of {count} (capacity {})",
                    spawned.len(),
                    self.npcs.len()
                );
                break;
            };

            let kind = options.kind.unwrap_or_else(|| {
                if self.rng.f32() < self.config.heavy_spawn_chance {
                    NpcKind::Heavy
                } else {
                    NpcKind::Basic
                }
            });

            let mut at = match position {
                Some(center) => {
                    let scatter = options.scatter.unwrap_or(self.config.spawn_scatter_radius).max(0.0);
                    center + random_unit_xz(&mut self.rng) * scatter * self.rng.f32().sqrt()
                },
                None => self.random_map_point(),
            };
            at.y = self.world.ground_at(at) + self.config.physics.ground_offset;

            let mood = self.rng.f32();
            let heading = random_unit_xz(&mut self.rng);
            let interval = random_range(
                &mut self.rng,
                self.config.behavior.direction_interval_min,
                self.config.behavior.direction_interval_max,
            );

            let npc = &mut self.npcs[slot];
            let id = npc.activate(kind, at, mood, heading);
            npc.yaw = yaw_of(heading);
            npc.time_to_change_direction = interval;

            self.active.push(slot);
            self.total_spawned += 1;
            self.events.publish(SimEvent::Spawned { id, kind, position: at });
            trace!("Spawned {} {id} at {at}", kind.name());
            spawned.push(id);
        }

        spawned
    }

    /// Uniform map point outside the protected centre.
    fn random_map_point(&mut self) -> Vec3 {
        let half = self.config.map_size * 0.5;
        let protected = self.config.protected_center_radius;

        for _ in 0..SPAWN_ATTEMPTS {
            let x = random_range(&mut self.rng, -half, half);
            let z = random_range(&mut self.rng, -half, half);
            if x.hypot(z) >= protected {
                return Vec3::new(x, 0.0, z);
            }
        }

        // Rejection kept failing: put it on the protected rim.
        random_unit_xz(&mut self.rng) * protected
    }

    /// Returns an NPC's slot to the pool immediately.
    pub fn despawn(&mut self, id: NpcId) -> BrawlResult<()> {
        let slot = self.slot_of(id)?;
        self.release(slot);
        Ok(())
    }

    fn release(&mut self, slot: usize) {
        let id = self.npcs[slot].id;
        self.npcs[slot].deactivate();
        self.active.retain(|&s| s != slot);
        self.events.publish(SimEvent::Despawned { id });
        trace!("Despawned {id}");
    }

    // === Handle-addressed operations ===

    /// Resolves a handle to its slot, rejecting stale and foreign handles.
    fn slot_of(&self, id: NpcId) -> BrawlResult<usize> {
        let npc = self.npcs.get(id.index()).ok_or(BrawlError::SlotOutOfRange {
            slot: id.slot(),
            capacity: self.npcs.len(),
        })?;
        if npc.active && npc.id == id {
            Ok(id.index())
        } else {
            Err(BrawlError::StaleHandle(id))
        }
    }

    /// Applies a hit to an NPC.
    ///
    /// Dead NPCs accept the call and ignore the hit.
    pub fn apply_hit(&mut self, id: NpcId, hit: &Hit) -> BrawlResult<HitOutcome> {
        let slot = self.slot_of(id)?;
        Ok(self.hit_slot(slot, hit))
    }

    /// Puts an NPC into ragdoll. Returns `Ok(false)` if it is dead.
    pub fn enter_ragdoll(&mut self, id: NpcId, duration: f32) -> BrawlResult<bool> {
        let slot = self.slot_of(id)?;
        let npc = &mut self.npcs[slot];
        let entered = ragdoll::enter_ragdoll(npc, duration);
        if entered {
            let impact_speed = npc.impact_speed;
            self.events.publish(SimEvent::RagdollEntered { id, impact_speed });
        }
        Ok(entered)
    }

    /// Suspends an NPC mid-air. Returns `Ok(false)` if it is dead.
    ///
    /// A grounded NPC is put into ragdoll for the length of the hang.
    pub fn enter_suspension(&mut self, id: NpcId, duration: f32) -> BrawlResult<bool> {
        let slot = self.slot_of(id)?;
        let npc = &mut self.npcs[slot];
        let was_ragdoll = npc.is_ragdoll;
        let entered = ragdoll::enter_suspension(npc, duration);
        if entered && !was_ragdoll {
            let impact_speed = npc.impact_speed;
            self.events.publish(SimEvent::RagdollEntered { id, impact_speed });
        }
        Ok(entered)
    }

    fn hit_slot(&mut self, slot: usize, hit: &Hit) -> HitOutcome {
        let now = self.clock;
        let npc = &mut self.npcs[slot];
        let outcome = combat::take_damage(npc, hit, now, &self.config.combat);
        let id = npc.id;
        let attacker = npc.last_attacker;

        if outcome.damage_dealt > 0.0 {
            self.events.publish(SimEvent::Damaged {
                id,
                amount: outcome.damage_dealt,
                source: hit.source,
            });
        }
        if outcome.panic_started {
            debug!("{id} panicked");
            self.events.publish(SimEvent::PanicStarted { id });
        }
        if outcome.dizzy_started {
            debug!("{id} is dizzy");
            self.events.publish(SimEvent::DizzyStarted { id });
        }
        if outcome.furia_started {
            if let Some(attacker) = attacker {
                debug!("{id} entered furia against {attacker:?}");
                self.events.publish(SimEvent::FuriaStarted { id, attacker });
            }
        }
        if outcome.died {
            debug!("{id} died");
            self.events.publish(SimEvent::Died {
                id,
                killer: hit.source,
            });
        }
        outcome
    }

    // === Gravity blast ===

    /// The blast state machine.
    #[must_use]
    pub const fn blast(&self) -> &GravityBlast {
        &self.blast
    }

    /// Starts charging the gravity blast at `epicenter`.
    ///
    /// It goes off during the `update` in which the charge completes.
    /// Returns `false` while charging or cooling down.
    pub fn trigger_blast(&mut self, epicenter: Vec3) -> bool {
        let started = self.blast.trigger(epicenter);
        if started {
            self.events.publish(SimEvent::BlastCharging { epicenter });
        }
        started
    }

    /// Launches every live NPC within the blast radius of `epicenter`.
    ///
    /// Each one takes falloff-scaled damage and velocity, then ragdolls with
    /// a brief suspension. Dizzy NPCs get the dizzy multiplier on all three.
    pub fn apply_area_impulse(&mut self, epicenter: Vec3, source: Option<Actor>) -> Vec<BlastHit> {
        let tuning = self.config.ability;
        let slots: Vec<usize> = self.active.iter().copied().filter(|&s| self.npcs[s].is_live()).collect();
        let mut hits = Vec::new();

        for slot in slots {
            let npc = &self.npcs[slot];
            let Some(launch) = blast_impulse(epicenter, npc.position, npc.is_dizzy, &tuning, &mut self.rng) else {
                continue;
            };
            let id = npc.id;
            let dizzy = npc.is_dizzy;

            self.npcs[slot].velocity = launch.impulse;
            let mut hit = Hit::new(launch.damage).with_impulse(launch.impulse.length());
            if let Some(source) = source {
                hit = hit.with_source(source);
            }
            let outcome = self.hit_slot(slot, &hit);

            if !outcome.died {
                let npc = &mut self.npcs[slot];
                ragdoll::enter_ragdoll(npc, tuning.ragdoll_duration * launch.multiplier);
                ragdoll::enter_suspension(npc, tuning.suspension_duration);
                let impact_speed = npc.impact_speed;
                self.events.publish(SimEvent::RagdollEntered { id, impact_speed });
            }

            hits.push(BlastHit {
                id,
                impulse: launch.impulse,
                damage: launch.damage,
                dizzy,
            });
        }

        hits
    }

    fn execute_blast(&mut self, epicenter: Vec3) -> usize {
        let hits = self.apply_area_impulse(epicenter, Some(Actor::Player));
        let shake = self.config.ability.shake_intensity;
        self.sinks.screen_shake(shake, self.config.collision.shake_duration * 2.0);
        self.sinks.dust(epicenter, shake);
        self.events.publish(SimEvent::BlastExecuted {
            epicenter,
            launched: hits.len(),
        });
        debug!("Gravity blast at {epicenter} launched {} NPCs", hits.len());
        hits.len()
    }

    // === Tick ===

    /// Advances the simulation by `dt` seconds.
    ///
    /// `player` is read at the start of the tick and receives melee damage
    /// at the end. NPCs further than the culling distance from `viewer` only
    /// run down their cooldowns. Non-positive or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32, player: Option<&mut dyn PlayerHandle>, viewer: Vec3) -> TickReport {
        let mut report = TickReport::default();
        if !(dt.is_finite() && dt > 0.0) {
            return report;
        }
        self.clock += dt;

        let view = player.as_deref().map(PlayerView::capture);
        let mut player_hits = Vec::new();

        self.active.retain(|&slot| self.npcs[slot].active);
        report.spawned = self.repopulate(dt);

        if let Some(epicenter) = self.blast.update(dt) {
            report.launched = self.execute_blast(epicenter);
        }

        let order = self.active.clone();
        for slot in order {
            let npc = &self.npcs[slot];
            if !npc.active {
                continue;
            }
            if !npc.is_alive() {
                if self.tick_dead(slot, dt) {
                    report.despawned += 1;
                }
                continue;
            }

            self.npcs[slot].decay_cooldowns(dt);
            if flat_distance(self.npcs[slot].position, viewer) > self.config.ai_culling_distance {
                report.culled += 1;
                continue;
            }

            report.simulated += 1;
            self.tick_live(slot, dt, view.as_ref(), &mut player_hits);
        }

        report.contacts = self.resolve_collisions();
        self.snap_grounded();
        self.active.retain(|&slot| self.npcs[slot].active);

        if let Some(player) = player {
            for hit in player_hits {
                player.take_damage(hit.amount, hit.direction);
                report.player_damage += hit.amount;
            }
        }

        report
    }

    fn repopulate(&mut self, dt: f32) -> usize {
        self.spawn_timer += dt;
        if self.spawn_timer < self.config.spawn_interval {
            return 0;
        }
        self.spawn_timer = 0.0;

        let capacity = self.npcs.len();
        let active = self.active.len();
        #[allow(clippy::cast_precision_loss)]
        let threshold = capacity as f32 * self.config.repopulate_threshold;
        #[allow(clippy::cast_precision_loss)]
        let below = (active as f32) < threshold;
        if !below {
            return 0;
        }

        let batch = self.config.repopulate_batch.min(capacity - active);
        let spawned = self.spawn(None, batch, SpawnOptions::default()).len();
        if spawned > 0 {
            debug!("Repopulated {spawned} NPCs ({} active)", self.active.len());
        }
        spawned
    }

    /// Death fall and despawn countdown. Returns `true` once despawned.
    fn tick_dead(&mut self, slot: usize, dt: f32) -> bool {
        let npc = &mut self.npcs[slot];
        npc.position.y = self.world.ground_at(npc.position) + self.config.physics.ground_offset;
        if combat::tick_death(npc, dt, &self.config.combat) {
            self.release(slot);
            true
        } else {
            false
        }
    }

    fn tick_live(&mut self, slot: usize, dt: f32, view: Option<&PlayerView>, player_hits: &mut Vec<PlayerHit>) {
        let npc = &mut self.npcs[slot];
        let expiry = combat::tick_modifiers(npc, dt, &self.config.combat);
        if expiry.panic_ended {
            trace!("{} calmed down", npc.id);
        }

        let physics = self.config.physics;
        if !npc.is_ragdoll && flat_speed(npc.velocity) > physics.auto_ragdoll_speed {
            ragdoll::enter_ragdoll(npc, physics.auto_ragdoll_duration);
            let (id, impact_speed) = (npc.id, npc.impact_speed);
            self.events.publish(SimEvent::RagdollEntered { id, impact_speed });
        }

        if self.npcs[slot].is_ragdoll {
            self.tick_ragdoll(slot, dt);
            return;
        }

        let seen = self.perceive(slot, view);
        let strike = behavior::think(&mut self.npcs[slot], &seen, &self.config.behavior, &mut self.rng, dt);
        behavior::integrate_grounded(&mut self.npcs[slot], &self.config.behavior, dt);
        collision::resolve_buildings(&mut self.npcs[slot], &self.world.buildings, CollisionBehavior::Slide);

        if let Some(strike) = strike {
            self.resolve_strike(slot, strike, player_hits);
        }
    }

    fn tick_ragdoll(&mut self, slot: usize, dt: f32) {
        let physics = self.config.physics;
        let npc = &mut self.npcs[slot];
        let step = ragdoll::step_ragdoll(npc, dt, &physics, &self.world);
        let (id, position, velocity) = (npc.id, npc.position, npc.velocity);

        if let Some(speed) = step.landing_speed.filter(|&s| s > physics.impact_threshold) {
            self.events.publish(SimEvent::Impact { id, position, speed });
            self.sinks.dust(position, (speed / (physics.impact_threshold * 4.0)).min(1.0));
            if npc.decal_cooldown <= 0.0 {
                npc.decal_cooldown = physics.decal_cooldown;
                self.sinks.decal(position, npc.radius() * 2.0);
            }
        }

        if npc.is_ragdoll && flat_speed(velocity) > physics.trail_speed {
            self.sinks.trail(position, velocity);
        }

        if step.exited {
            self.events.publish(SimEvent::RagdollExited { id });
            trace!("{id} recovered from ragdoll");
        }
    }

    /// Gathers what the NPC in `slot` can see.
    fn perceive(&self, slot: usize, view: Option<&PlayerView>) -> Perception {
        let npc = &self.npcs[slot];
        let player_position = view.and_then(PlayerView::live_position);
        let locate = |actor: Actor| -> Option<(Actor, Vec3)> {
            let position = match actor {
                Actor::Player => player_position,
                Actor::Npc(id) => self
                    .npcs
                    .get(id.index())
                    .filter(|other| id.index() != slot && other.is_live_handle(id))
                    .map(|other| other.position),
            };
            position.map(|p| (actor, p))
        };

        let looking = npc.target.is_none()
            && npc.mood < self.config.behavior.aggressive_mood
            && npc.state.is_roaming();

        Perception {
            player_position,
            target: npc.target.and_then(locate),
            attacker: npc.last_attacker.and_then(locate),
            nearest_npc: if looking { self.nearest_live(slot) } else { None },
        }
    }

    /// Nearest other live NPC within the detection radius.
    fn nearest_live(&self, slot: usize) -> Option<(NpcId, Vec3)> {
        let origin = self.npcs[slot].position;
        let radius = self.config.behavior.detection_radius;
        self.active
            .iter()
            .filter(|&&other| other != slot)
            .map(|&other| &self.npcs[other])
            .filter(|other| other.is_live())
            .map(|other| (other, flat_distance(origin, other.position)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(other, _)| (other.id, other.position))
    }

    fn resolve_strike(&mut self, slot: usize, strike: Strike, player_hits: &mut Vec<PlayerHit>) {
        let (attacker, kind) = (self.npcs[slot].id, self.npcs[slot].kind);
        match strike.target {
            Actor::Player => player_hits.push(PlayerHit {
                amount: kind.melee_damage(),
                direction: strike.direction,
            }),
            Actor::Npc(victim) => {
                let Ok(victim) = self.slot_of(victim) else {
                    return;
                };
                let hit = Hit::new(kind.melee_damage())
                    .with_source(Actor::Npc(attacker))
                    .with_impulse(kind.melee_impulse())
                    .as_melee();
                if !self.hit_slot(victim, &hit).died {
                    self.npcs[victim].velocity += strike.direction * kind.melee_knockback();
                }
            },
        }
    }

    // === Collision ===

    /// Separates bodies and applies contact side effects. Returns the number
    /// of touching pairs.
    fn resolve_collisions(&mut self) -> usize {
        let bodies: Vec<usize> = self.active.iter().copied().filter(|&s| self.npcs[s].is_live()).collect();
        let contacts = collision::resolve_pairs(&mut self.npcs, &bodies, &self.config.collision, &mut self.rng);
        for contact in &contacts {
            self.apply_contact(contact);
        }
        contacts.len()
    }

    /// Screen shake, hit-stop and ragdoll damage transfer for a hard contact.
    ///
    /// Side effects fire when at least one body is off its shake cooldown;
    /// both cooldowns then restart.
    fn apply_contact(&mut self, contact: &PairContact) {
        let tuning = self.config.collision;
        let closing = contact.closing_speed;
        if closing <= tuning.shake_speed_threshold {
            return;
        }

        let (a, b) = (contact.a, contact.b);
        if self.npcs[a].collision_shake_cooldown > 0.0 && self.npcs[b].collision_shake_cooldown > 0.0 {
            return;
        }
        self.npcs[a].collision_shake_cooldown = tuning.shake_cooldown;
        self.npcs[b].collision_shake_cooldown = tuning.shake_cooldown;

        let intensity = ((closing - tuning.shake_speed_threshold) * tuning.shake_per_speed).min(tuning.max_shake);
        self.sinks.screen_shake(intensity, tuning.shake_duration);
        self.sinks.hitstop(tuning.hitstop_duration * (1.0 + intensity));
        self.sinks.dust((self.npcs[a].position + self.npcs[b].position) * 0.5, intensity);
        self.events.publish(SimEvent::CollisionShake {
            a: self.npcs[a].id,
            b: self.npcs[b].id,
            intensity,
        });

        let (collider, victim, push) = match (self.npcs[a].is_ragdoll, self.npcs[b].is_ragdoll) {
            (true, false) => (a, b, contact.normal),
            (false, true) => (b, a, -contact.normal),
            _ => return,
        };
        let hit = Hit::new(closing * tuning.ragdoll_damage_per_speed)
            .with_source(Actor::Npc(self.npcs[collider].id))
            .with_impulse(closing);
        if !self.hit_slot(victim, &hit).died {
            self.npcs[victim].velocity += push * closing * tuning.ragdoll_knockback_per_speed;
        }
    }

    fn snap_grounded(&mut self) {
        let offset = self.config.physics.ground_offset;
        for &slot in &self.active {
            let npc = &mut self.npcs[slot];
            if npc.is_live() && !npc.is_ragdoll && !npc.is_suspended {
                npc.position.y = self.world.ground_at(npc.position) + offset;
            }
        }
    }

    // === Queries ===

    /// Looks up a live-or-dying NPC by handle; stale handles return `None`.
    #[must_use]
    pub fn get(&self, id: NpcId) -> Option<&Npc> {
        self.slot_of(id).ok().map(|slot| &self.npcs[slot])
    }

    /// Mutable lookup by handle.
    pub fn get_mut(&mut self, id: NpcId) -> Option<&mut Npc> {
        let slot = self.slot_of(id).ok()?;
        Some(&mut self.npcs[slot])
    }

    /// Live NPCs within `radius` (horizontal) of `position`.
    #[must_use]
    pub fn npcs_near(&self, position: Vec3, radius: f32) -> Vec<&Npc> {
        self.all_active()
            .filter(|npc| npc.is_alive() && flat_distance(npc.position, position) <= radius)
            .collect()
    }

    /// Every active record, dead ones included, in spawn order.
    pub fn all_active(&self) -> impl Iterator<Item = &Npc> + '_ {
        self.active.iter().map(|&slot| &self.npcs[slot]).filter(|npc| npc.active)
    }

    /// Occupancy counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut stats = PoolStats {
            capacity: self.npcs.len(),
            total_spawned: self.total_spawned,
            ..Default::default()
        };
        for npc in self.all_active() {
            stats.active += 1;
            stats.alive += usize::from(npc.is_alive());
            stats.ragdolling += usize::from(npc.is_ragdoll);
        }
        stats
    }

    /// Presentation snapshots of every active NPC.
    #[must_use]
    pub fn snapshots(&self) -> Vec<NpcSnapshot> {
        self.all_active().map(Npc::snapshot).collect()
    }

    /// Returns the event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drains pending simulation events.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }
}
