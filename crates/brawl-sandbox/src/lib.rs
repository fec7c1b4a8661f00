//! Brawl Sandbox - headless driver for the Brawl simulation.
//!
//! This crate loads a TOML configuration, builds a test arena around the NPC
//! pool and steps it at a fixed timestep, logging population statistics and
//! optionally writing a JSON run summary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod driver;
pub mod effects;
pub mod timing;
