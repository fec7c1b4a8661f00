//! Headless stand-ins for the presentation sinks.
//!
//! Nothing is drawn; requests are tallied for the progress log and the run
//! summary, and hit-stop requests are handed to the tick clock.

use std::cell::RefCell;
use std::rc::Rc;

use brawl_common::Vec3;
use brawl_sim::feedback::{DecalSink, DustSink, FeedbackSink, Sinks, TrailSink};
use serde::Serialize;

/// Counters for every presentation request the simulation made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EffectTally {
    /// Screen shakes requested
    pub shakes: u32,
    /// Strongest shake intensity seen
    pub max_shake: f32,
    /// Hit-stops requested
    pub hitstops: u32,
    /// Decals spawned
    pub decals: u32,
    /// Trail segments spawned
    pub trails: u32,
    /// Dust puffs emitted
    pub dust: u32,
    /// Hit-stop time not yet handed to the clock
    #[serde(skip)]
    pub pending_hitstop: f32,
}

/// Sink adapter shared between the pool and the driver.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEffects(Rc<RefCell<EffectTally>>);

impl HeadlessEffects {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sink set with this adapter in every slot.
    #[must_use]
    pub fn sinks(&self) -> Sinks {
        Sinks::none()
            .with_feedback(Box::new(self.clone()))
            .with_decals(Box::new(self.clone()))
            .with_trails(Box::new(self.clone()))
            .with_dust(Box::new(self.clone()))
    }

    /// Takes the longest hit-stop requested since the last call.
    pub fn take_hitstop(&self) -> f32 {
        std::mem::take(&mut self.0.borrow_mut().pending_hitstop)
    }

    /// Current counters.
    #[must_use]
    pub fn tally(&self) -> EffectTally {
        *self.0.borrow()
    }
}

impl FeedbackSink for HeadlessEffects {
    fn apply_screen_shake(&mut self, intensity: f32, _duration: f32) {
        let mut tally = self.0.borrow_mut();
        tally.shakes += 1;
        tally.max_shake = tally.max_shake.max(intensity);
    }

    fn apply_hitstop(&mut self, duration: f32) {
        let mut tally = self.0.borrow_mut();
        tally.hitstops += 1;
        tally.pending_hitstop = tally.pending_hitstop.max(duration);
    }
}

impl DecalSink for HeadlessEffects {
    fn spawn_decal(&mut self, _position: Vec3, _size: f32) {
        self.0.borrow_mut().decals += 1;
    }
}

impl TrailSink for HeadlessEffects {
    fn spawn_trail(&mut self, _position: Vec3, _velocity: Vec3) {
        self.0.borrow_mut().trails += 1;
    }
}

impl DustSink for HeadlessEffects {
    fn emit_dust(&mut self, _position: Vec3, _intensity: f32) {
        self.0.borrow_mut().dust += 1;
    }
}
