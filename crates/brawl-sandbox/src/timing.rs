//! Fixed-step tick clock with hit-stop support.
//!
//! The sandbox steps the simulation at a fixed `dt`. When the simulation
//! asks for a hit-stop, whole frames are held (not simulated) until the
//! requested time has passed. Wall-clock cost per simulated tick is sampled
//! for the progress log.

use std::collections::VecDeque;
use std::time::Duration;

/// Fixed-step clock for the headless driver.
#[derive(Debug)]
pub struct TickClock {
    /// Fixed timestep delta
    fixed_dt: f32,
    /// Hit-stop time still to hold
    hitstop_remaining: f32,
    /// Frames advanced (simulated or held)
    frames: u64,
    /// Frames that were held for hit-stop
    held_frames: u64,
    /// Recent wall-clock tick costs in seconds
    tick_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl TickClock {
    /// Creates a clock stepping at `fixed_dt` seconds.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001), // Minimum 1ms
            hitstop_remaining: 0.0,
            frames: 0,
            held_frames: 0,
            tick_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Get the fixed timestep value.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Holds the simulation for at least `duration` seconds.
    ///
    /// Overlapping requests do not stack; the longer one wins.
    pub fn hold(&mut self, duration: f32) {
        if duration.is_finite() {
            self.hitstop_remaining = self.hitstop_remaining.max(duration);
        }
    }

    /// Whether a hit-stop is in progress.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.hitstop_remaining > 0.0
    }

    /// Advances one frame.
    ///
    /// Returns the `dt` to simulate, or `None` if this frame is held.
    pub fn advance(&mut self) -> Option<f32> {
        self.frames += 1;
        if self.hitstop_remaining > 0.0 {
            self.hitstop_remaining = (self.hitstop_remaining - self.fixed_dt).max(0.0);
            self.held_frames += 1;
            return None;
        }
        Some(self.fixed_dt)
    }

    /// Records the wall-clock cost of one simulated tick.
    pub fn record_tick(&mut self, cost: Duration) {
        self.tick_times.push_back(cost.as_secs_f32());
        if self.tick_times.len() > self.max_samples {
            self.tick_times.pop_front();
        }
    }

    /// Average tick cost in milliseconds over recent ticks.
    #[must_use]
    pub fn average_tick_ms(&self) -> f32 {
        if self.tick_times.is_empty() {
            return 0.0;
        }

        (self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32) * 1000.0
    }

    /// Frames advanced so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames spent in hit-stop.
    #[must_use]
    pub fn held_frames(&self) -> u64 {
        self.held_frames
    }

    /// Elapsed frame time in seconds (held frames included).
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.frames as f32 * self.fixed_dt
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}
