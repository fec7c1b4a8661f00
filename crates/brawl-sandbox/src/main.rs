//! # Brawl
//!
//! Headless entry point for Project Brawl: runs the NPC crowd simulation in
//! a test arena without a renderer.
//!
//! Configuration comes from `brawl.toml` (working directory first, then the
//! per-user config directory). Log verbosity follows `RUST_LOG`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use brawl_sandbox::config::SandboxConfig;
use brawl_sandbox::driver::Sandbox;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("brawl=info".parse()?))
        .init();

    info!("Project Brawl starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = SandboxConfig::load().context("loading sandbox config")?;
    let seed = config.seed.unwrap_or_else(clock_seed);
    let summary_path = config.summary_path.clone();

    let summary = Sandbox::new(config, seed).run();

    if let Some(path) = summary_path {
        summary
            .write_json(&path)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
    }

    info!("Project Brawl shutdown complete");
    Ok(())
}

/// Seed derived from the wall clock for unseeded runs.
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}
