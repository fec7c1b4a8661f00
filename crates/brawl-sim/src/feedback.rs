//! Optional presentation sinks.
//!
//! The core pushes side effects into these and never reads anything back.
//! Every sink is optional; a missing sink disables its effect.

use brawl_common::Vec3;

/// Camera-level feedback: screen shake and hit-stop.
pub trait FeedbackSink {
    /// Requests a screen shake.
    fn apply_screen_shake(&mut self, intensity: f32, duration: f32);

    /// Requests a hit-stop (the host skips `update` for `duration`).
    fn apply_hitstop(&mut self, duration: f32);
}

/// Ground decals (impact craters, scuffs).
pub trait DecalSink {
    /// Spawns a decal at a ground position.
    fn spawn_decal(&mut self, position: Vec3, size: f32);
}

/// Motion trails behind flying bodies.
pub trait TrailSink {
    /// Spawns a trail segment.
    fn spawn_trail(&mut self, position: Vec3, velocity: Vec3);
}

/// Dust puffs on landings and collisions.
pub trait DustSink {
    /// Emits dust at a position.
    fn emit_dust(&mut self, position: Vec3, intensity: f32);
}

/// The set of optional sinks injected into the pool.
#[derive(Default)]
pub struct Sinks {
    feedback: Option<Box<dyn FeedbackSink>>,
    decals: Option<Box<dyn DecalSink>>,
    trails: Option<Box<dyn TrailSink>>,
    dust: Option<Box<dyn DustSink>>,
}

impl Sinks {
    /// No sinks attached.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Attaches a screen-shake/hit-stop sink.
    #[must_use]
    pub fn with_feedback(mut self, sink: Box<dyn FeedbackSink>) -> Self {
        self.feedback = Some(sink);
        self
    }

    /// Attaches a decal sink.
    #[must_use]
    pub fn with_decals(mut self, sink: Box<dyn DecalSink>) -> Self {
        self.decals = Some(sink);
        self
    }

    /// Attaches a trail sink.
    #[must_use]
    pub fn with_trails(mut self, sink: Box<dyn TrailSink>) -> Self {
        self.trails = Some(sink);
        self
    }

    /// Attaches a dust sink.
    #[must_use]
    pub fn with_dust(mut self, sink: Box<dyn DustSink>) -> Self {
        self.dust = Some(sink);
        self
    }

    pub(crate) fn screen_shake(&mut self, intensity: f32, duration: f32) {
        if let Some(sink) = self.feedback.as_mut() {
            sink.apply_screen_shake(intensity, duration);
        }
    }

    pub(crate) fn hitstop(&mut self, duration: f32) {
        if let Some(sink) = self.feedback.as_mut() {
            sink.apply_hitstop(duration);
        }
    }

    pub(crate) fn decal(&mut self, position: Vec3, size: f32) {
        if let Some(sink) = self.decals.as_mut() {
            sink.spawn_decal(position, size);
        }
    }

    pub(crate) fn trail(&mut self, position: Vec3, velocity: Vec3) {
        if let Some(sink) = self.trails.as_mut() {
            sink.spawn_trail(position, velocity);
        }
    }

    pub(crate) fn dust(&mut self, position: Vec3, intensity: f32) {
        if let Some(sink) = self.dust.as_mut() {
            sink.emit_dust(position, intensity);
        }
    }
}

impl std::fmt::Debug for Sinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sinks")
            .field("feedback", &self.feedback.is_some())
            .field("decals", &self.decals.is_some())
            .field("trails", &self.trails.is_some())
            .field("dust", &self.dust.is_some())
            .finish()
    }
}

/// Sink that records every request, for tests and replay tooling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    /// Recorded `(intensity, duration)` shakes
    pub shakes: Vec<(f32, f32)>,
    /// Recorded hit-stop durations
    pub hitstops: Vec<f32>,
    /// Recorded `(position, size)` decals
    pub decals: Vec<(Vec3, f32)>,
    /// Recorded trail positions
    pub trails: Vec<Vec3>,
    /// Recorded `(position, intensity)` dust puffs
    pub dust: Vec<(Vec3, f32)>,
}

/// Shared handle so a test can keep reading a sink the pool owns.
pub type SharedRecording = std::rc::Rc<std::cell::RefCell<RecordingSink>>;

/// Sink adapter writing into a [`SharedRecording`].
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle(pub SharedRecording);

impl FeedbackSink for RecordingHandle {
    fn apply_screen_shake(&mut self, intensity: f32, duration: f32) {
        self.0.borrow_mut().shakes.push((intensity, duration));
    }

    fn apply_hitstop(&mut self, duration: f32) {
        self.0.borrow_mut().hitstops.push(duration);
    }
}

impl DecalSink for RecordingHandle {
    fn spawn_decal(&mut self, position: Vec3, size: f32) {
        self.0.borrow_mut().decals.push((position, size));
    }
}

impl TrailSink for RecordingHandle {
    fn spawn_trail(&mut self, position: Vec3, _velocity: Vec3) {
        self.0.borrow_mut().trails.push(position);
    }
}

impl DustSink for RecordingHandle {
    fn emit_dust(&mut self, position: Vec3, intensity: f32) {
        self.0.borrow_mut().dust.push((position, intensity));
    }
}

impl Sinks {
    /// Attaches one recording handle to every sink slot.
    #[must_use]
    pub fn recording(handle: &RecordingHandle) -> Self {
        Self::none()
            .with_feedback(Box::new(handle.clone()))
            .with_decals(Box::new(handle.clone()))
            .with_trails(Box::new(handle.clone()))
            .with_dust(Box::new(handle.clone()))
    }
}
