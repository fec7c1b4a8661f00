//! Headless run loop.
//!
//! Builds the arena from a [`SandboxConfig`], walks a scripted player around
//! the center, fires the gravity blast on a timer and steps the pool at a
//! fixed `dt` until the configured duration has elapsed.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use brawl_common::{Actor, Vec3};
use brawl_sim::events::SimEvent;
use brawl_sim::pool::{NpcPool, SpawnOptions};
use brawl_sim::world::{DummyPlayer, FlatTerrain, PlayerHandle, World};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::SandboxConfig;
use crate::effects::{EffectTally, HeadlessEffects};
use crate::timing::TickClock;

/// A player that walks a circle around the arena center.
#[derive(Debug, Clone)]
pub struct PatrolPlayer {
    body: DummyPlayer,
    radius: f32,
    angle: f32,
    angular_speed: f32,
}

impl PatrolPlayer {
    /// Creates a player on a circle of `radius`, walking at `speed`.
    #[must_use]
    pub fn new(radius: f32, speed: f32, health: f32) -> Self {
        let angular_speed = if radius > 0.0 { speed / radius } else { 0.0 };
        Self {
            body: DummyPlayer::new(Vec3::new(radius, 0.0, 0.0), health),
            radius,
            angle: 0.0,
            angular_speed,
        }
    }

    /// Moves along the circle; a downed player stands still.
    pub fn walk(&mut self, dt: f32) {
        if !self.body.is_alive() {
            return;
        }
        self.angle = (self.angle + self.angular_speed * dt) % std::f32::consts::TAU;
        self.body.position = Vec3::new(self.angle.cos() * self.radius, 0.0, self.angle.sin() * self.radius);
    }

    /// Remaining health.
    #[must_use]
    pub fn health(&self) -> f32 {
        self.body.health
    }

    /// Number of hits taken.
    #[must_use]
    pub fn hits(&self) -> u32 {
        self.body.hits
    }
}

impl PlayerHandle for PatrolPlayer {
    fn position(&self) -> Vec3 {
        self.body.position()
    }

    fn take_damage(&mut self, amount: f32, direction: Vec3) {
        self.body.take_damage(amount, direction);
    }

    fn is_alive(&self) -> bool {
        self.body.is_alive()
    }
}

/// Event counts by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventTally {
    /// NPCs spawned
    pub spawned: u32,
    /// Damage events
    pub damaged: u32,
    /// Deaths
    pub died: u32,
    /// Deaths credited to the player
    pub player_kills: u32,
    /// Slots returned to the pool
    pub despawned: u32,
    /// Ragdoll entries
    pub ragdolls: u32,
    /// Hard landings
    pub impacts: u32,
    /// Collision shakes
    pub collision_shakes: u32,
    /// Panics started
    pub panics: u32,
    /// Dizzy spells started
    pub dizzies: u32,
    /// Furia windows opened
    pub furias: u32,
    /// Gravity blasts that went off
    pub blasts: u32,
    /// NPCs launched by blasts
    pub launched: u32,
}

impl EventTally {
    /// Counts one event.
    pub fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Spawned { .. } => self.spawned += 1,
            SimEvent::Damaged { .. } => self.damaged += 1,
            SimEvent::Died { killer, .. } => {
                self.died += 1;
                if *killer == Some(Actor::Player) {
                    self.player_kills += 1;
                }
            },
            SimEvent::Despawned { .. } => self.despawned += 1,
            SimEvent::RagdollEntered { .. } => self.ragdolls += 1,
            SimEvent::Impact { .. } => self.impacts += 1,
            SimEvent::CollisionShake { .. } => self.collision_shakes += 1,
            SimEvent::PanicStarted { .. } => self.panics += 1,
            SimEvent::DizzyStarted { .. } => self.dizzies += 1,
            SimEvent::FuriaStarted { .. } => self.furias += 1,
            SimEvent::BlastExecuted { launched, .. } => {
                self.blasts += 1;
                self.launched += u32::try_from(*launched).unwrap_or(u32::MAX);
            },
            SimEvent::RagdollExited { .. } | SimEvent::BlastCharging { .. } => {},
        }
    }
}

/// What a finished run looked like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Seed the pool ran with
    pub seed: u64,
    /// Ticks actually simulated
    pub ticks: u64,
    /// Frames held by hit-stop
    pub held_frames: u64,
    /// Simulated seconds
    pub simulated_secs: f32,
    /// Pool capacity
    pub capacity: usize,
    /// Active slots at the end
    pub final_active: usize,
    /// Live NPCs at the end
    pub final_alive: usize,
    /// Most live NPCs at once
    pub peak_alive: usize,
    /// NPCs spawned over the run
    pub total_spawned: u64,
    /// Damage the player took
    pub player_damage: f32,
    /// Player health at the end, if a player was simulated
    pub player_health: Option<f32>,
    /// Events by kind
    pub events: EventTally,
    /// Presentation requests
    pub effects: EffectTally,
    /// Average wall-clock cost per tick
    pub average_tick_ms: f32,
}

impl RunSummary {
    /// Writes the summary as pretty JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Wrote run summary to {}", path.display());
        Ok(())
    }
}

/// The arena and everything stepping it.
#[derive(Debug)]
pub struct Sandbox {
    config: SandboxConfig,
    seed: u64,
    pool: NpcPool,
    player: Option<PatrolPlayer>,
    clock: TickClock,
    effects: HeadlessEffects,
    events: EventTally,

    blast_timer: f32,
    next_report: f32,
    ticks: u64,
    player_damage: f32,
    peak_alive: usize,
    player_down: bool,
}

impl Sandbox {
    /// Builds the arena and spawns the initial population.
    #[must_use]
    pub fn new(mut config: SandboxConfig, seed: u64) -> Self {
        config.validate();

        let world = World::new(Box::new(FlatTerrain::default()), config.buildings.clone());
        let effects = HeadlessEffects::new();
        let mut pool = NpcPool::new(config.sim.clone(), world, seed).with_sinks(effects.sinks());

        let spawned = pool.spawn(None, config.initial_npcs, SpawnOptions::default());
        info!(
            "Arena ready: {} buildings, {} of {} NPC slots filled",
            config.buildings.len(),
            spawned.len(),
            pool.stats().capacity
        );

        let player = config
            .player_enabled
            .then(|| PatrolPlayer::new(config.player_patrol_radius, config.player_speed, config.player_health));

        Self {
            clock: TickClock::new(config.fixed_dt()),
            next_report: config.report_interval,
            config,
            seed,
            pool,
            player,
            effects,
            events: EventTally::default(),
            blast_timer: 0.0,
            ticks: 0,
            player_damage: 0.0,
            peak_alive: spawned.len(),
            player_down: false,
        }
    }

    /// The NPC pool.
    #[must_use]
    pub fn pool(&self) -> &NpcPool {
        &self.pool
    }

    /// Mutable access to the NPC pool.
    pub fn pool_mut(&mut self) -> &mut NpcPool {
        &mut self.pool
    }

    /// Runs every configured frame and returns the summary.
    pub fn run(mut self) -> RunSummary {
        let frames = self.config.total_ticks();
        info!(
            "Running {frames} frames at {} Hz (seed {})",
            self.config.tick_rate, self.seed
        );

        for _ in 0..frames {
            self.step_frame();
        }

        let summary = self.summary();
        info!(
            "Run finished: {} ticks, {} deaths, {} blasts, player took {:.1} damage",
            summary.ticks, summary.events.died, summary.events.blasts, summary.player_damage
        );
        summary
    }

    /// Advances one frame. Returns `false` if the frame was held by hit-stop.
    pub fn step_frame(&mut self) -> bool {
        let Some(dt) = self.clock.advance() else {
            trace!("Frame held for hit-stop");
            return false;
        };

        if let Some(player) = self.player.as_mut() {
            player.walk(dt);
        }
        let viewer = self.player.as_ref().map_or(Vec3::ZERO, |p| p.position());
        self.scripted_blast(dt, viewer);

        let started = Instant::now();
        let player = self.player.as_mut().map(|p| p as &mut dyn PlayerHandle);
        let report = self.pool.update(dt, player, viewer);
        self.clock.record_tick(started.elapsed());

        self.clock.hold(self.effects.take_hitstop());
        self.ticks += 1;
        self.player_damage += report.player_damage;

        for event in self.pool.drain_events() {
            self.observe(&event);
        }

        let stats = self.pool.stats();
        self.peak_alive = self.peak_alive.max(stats.alive);

        if let Some(player) = self.player.as_ref() {
            if !player.is_alive() && !self.player_down {
                self.player_down = true;
                warn!("Player went down after {} hits", player.hits());
            }
        }

        if self.clock.elapsed() >= self.next_report {
            self.next_report += self.config.report_interval;
            info!(
                "t={:.1}s alive={}/{} ragdolling={} spawned={} tick={:.3}ms",
                self.clock.elapsed(),
                stats.alive,
                stats.capacity,
                stats.ragdolling,
                stats.total_spawned,
                self.clock.average_tick_ms()
            );
        }

        true
    }

    /// Triggers the blast on its interval, centered on the viewer, when
    /// anything is in range.
    fn scripted_blast(&mut self, dt: f32, viewer: Vec3) {
        if self.config.blast_interval <= 0.0 {
            return;
        }

        self.blast_timer += dt;
        if self.blast_timer < self.config.blast_interval || !self.pool.blast().is_ready() {
            return;
        }

        let in_range = self.pool.npcs_near(viewer, self.config.sim.ability.radius).len();
        if in_range > 0 && self.pool.trigger_blast(viewer) {
            debug!("Scripted blast at {viewer} ({in_range} NPCs in range)");
            self.blast_timer = 0.0;
        }
    }

    fn observe(&mut self, event: &SimEvent) {
        self.events.record(event);
        match event {
            SimEvent::Died { id, killer } => debug!("{id} died (killer: {killer:?})"),
            SimEvent::BlastExecuted { epicenter, launched } => {
                info!("Gravity blast at {epicenter} launched {launched} NPCs");
            },
            other => trace!("{other:?}"),
        }
    }

    /// Summary of the run so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        let stats = self.pool.stats();
        RunSummary {
            seed: self.seed,
            ticks: self.ticks,
            held_frames: self.clock.held_frames(),
            simulated_secs: self.pool.clock(),
            capacity: stats.capacity,
            final_active: stats.active,
            final_alive: stats.alive,
            peak_alive: self.peak_alive,
            total_spawned: stats.total_spawned,
            player_damage: self.player_damage,
            player_health: self.player.as_ref().map(PatrolPlayer::health),
            events: self.events,
            effects: self.effects.tally(),
            average_tick_ms: self.clock.average_tick_ms(),
        }
    }
}
