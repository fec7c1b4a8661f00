//! Sandbox configuration.
//!
//! Wraps the simulation's [`SimConfig`] with the settings the headless
//! driver needs: run length, seed, arena layout and the scripted player.
//! Configuration can be loaded from and saved to a TOML file.

use brawl_common::{BrawlError, BrawlResult, Vec3};
use brawl_sim::config::SimConfig;
use brawl_sim::world::Aabb;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "brawl.toml";

/// Sandbox driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    // === Run Settings ===
    /// RNG seed (None = derived from the clock)
    pub seed: Option<u64>,
    /// Simulation ticks per second
    pub tick_rate: u32,
    /// Total simulated seconds
    pub duration_secs: f32,
    /// Seconds between progress log lines
    pub report_interval: f32,
    /// Write a JSON run summary here when set
    pub summary_path: Option<PathBuf>,

    // === Arena ===
    /// NPCs spawned before the first tick
    pub initial_npcs: usize,
    /// Static building colliders
    pub buildings: Vec<Aabb>,
    /// Seconds between scripted gravity blasts (0 = never)
    pub blast_interval: f32,

    // === Player ===
    /// Simulate a player walking the arena
    pub player_enabled: bool,
    /// Player starting health
    pub player_health: f32,
    /// Radius of the player's patrol circle
    pub player_patrol_radius: f32,
    /// Player walking speed
    pub player_speed: f32,

    // === Simulation ===
    /// Tuning handed to the NPC pool
    pub sim: SimConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            // Run
            seed: None,
            tick_rate: 60,
            duration_secs: 60.0,
            report_interval: 5.0,
            summary_path: None,

            // Arena
            initial_npcs: 24,
            buildings: default_buildings(),
            blast_interval: 8.0,

            // Player
            player_enabled: true,
            player_health: 500.0,
            player_patrol_radius: 18.0,
            player_speed: 3.0,

            sim: SimConfig::default(),
        }
    }
}

/// Four blocks around the arena center.
fn default_buildings() -> Vec<Aabb> {
    [(25.0, 25.0), (-25.0, 25.0), (25.0, -25.0), (-25.0, -25.0)]
        .into_iter()
        .map(|(x, z)| Aabb::from_center(Vec3::new(x, 4.0, z), Vec3::new(5.0, 4.0, 5.0)))
        .collect()
}

impl SandboxConfig {
    /// Load configuration from the default file location.
    pub fn load() -> BrawlResult<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields defaults; an unreadable or unparsable one is an
    /// error. The result is validated.
    pub fn load_from<P: AsRef<Path>>(path: P) -> BrawlResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            BrawlError::Config(format!("{}: {e}", path.display()))
        })?;

        let mut config: Self = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config file: {e}");
            BrawlError::Config(format!("{}: {e}", path.display()))
        })?;

        config.validate();
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to the default file location.
    pub fn save(&self) -> io::Result<()> {
        self.save_to(Self::config_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path.
    ///
    /// A `brawl.toml` in the working directory wins over the per-user one.
    pub fn config_path() -> PathBuf {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return local;
        }

        if let Some(config_dir) = dirs_config_path() {
            config_dir.join("brawl").join(CONFIG_FILE)
        } else {
            local
        }
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Run
        self.tick_rate = self.tick_rate.clamp(10, 240);
        self.duration_secs = self.duration_secs.max(0.0);
        self.report_interval = self.report_interval.max(0.1);

        // Arena
        self.sim.validate();
        self.initial_npcs = self.initial_npcs.min(self.sim.capacity);
        self.blast_interval = self.blast_interval.max(0.0);

        // Player
        self.player_health = self.player_health.max(1.0);
        self.player_patrol_radius = self.player_patrol_radius.clamp(0.0, self.sim.map_size * 0.5);
        self.player_speed = self.player_speed.clamp(0.0, 20.0);
    }

    /// Fixed timestep in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of ticks the run lasts.
    #[must_use]
    pub fn total_ticks(&self) -> u64 {
        (self.duration_secs * self.tick_rate as f32).round() as u64
    }
}

/// Get platform-specific config directory.
fn dirs_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Application Support"))
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        None
    }
}
