// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Fixed-timestep frame clock
//!
//! Rendering runs at whatever rate the display allows while the simulation
//! advances in fixed ticks. [`FixedTimestep`] accumulates wall-clock frame
//! time and drains it one tick at a time; the remainder becomes the
//! interpolation factor handed to [`Scene::pose`](crate::scene::Scene::pose).
//!
//! # Example
//!
//! ```
//! use sandbox_physics::clock::FixedTimestep;
//! use sandbox_physics::scene::Scene;
//!
//! let mut scene = Scene::new();
//! let mut clock = FixedTimestep::default();
//!
//! // A 40 ms frame holds two whole ticks at 60 Hz
//! let ticks = clock.advance(0.040, |t, dt| {
//!     scene.step(t, dt);
//! });
//! assert_eq!(ticks, 2);
//! assert!(clock.alpha() > 0.0 && clock.alpha() < 1.0);
//! ```

use crate::integration::validate_timestep;
use log::warn;

/// Default tick length: 60 Hz
pub const DEFAULT_TIMESTEP: f64 = 1.0 / 60.0;

/// Longest frame the clock will account for, in seconds
///
/// A stall longer than this is forgotten rather than replayed, so one slow
/// frame cannot trigger a growing backlog of ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator that turns variable frame times into fixed ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f64,
    max_frame_time: f64,
    accumulator: f64,
    time: f64,
    paused: bool,
}

impl FixedTimestep {
    /// Create a clock ticking every `dt` seconds
    ///
    /// # Panics
    ///
    /// Panics if `dt` is non-positive, NaN, or infinite.
    pub fn new(dt: f64) -> Self {
        if let Err(msg) = validate_timestep(dt) {
            assert!(msg.starts_with("Warning"), "{}", msg);
            warn!("{}", msg);
        }

        FixedTimestep {
            dt,
            max_frame_time: MAX_FRAME_TIME,
            accumulator: 0.0,
            time: 0.0,
            paused: false,
        }
    }

    /// Set the frame-time cap
    ///
    /// # Panics
    ///
    /// Panics if `max_frame_time` is shorter than one tick or not finite.
    pub fn with_max_frame_time(mut self, max_frame_time: f64) -> Self {
        assert!(
            max_frame_time >= self.dt && max_frame_time.is_finite(),
            "Frame-time cap must be finite and at least one tick"
        );
        self.max_frame_time = max_frame_time;
        self
    }

    /// Tick length in seconds
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulation time reached so far
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f64 {
        (self.accumulator / self.dt).clamp(0.0, 1.0)
    }

    /// Whether accumulation is suspended
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspend or resume accumulation
    ///
    /// Frame time that passes while paused is discarded.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Account for `frame_time` seconds of wall clock and run the ticks it covers
    ///
    /// `tick` receives the simulation time at the start of the tick and the
    /// tick length. Returns the number of ticks run.
    pub fn advance<F>(&mut self, frame_time: f64, mut tick: F) -> usize
    where
        F: FnMut(f64, f64),
    {
        if self.paused {
            return 0;
        }

        let frame_time = if frame_time.is_nan() || frame_time < 0.0 {
            warn!("Ignoring invalid frame time {}", frame_time);
            0.0
        } else {
            frame_time.min(self.max_frame_time)
        };
        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= self.dt {
            tick(self.time, self.dt);
            self.time += self.dt;
            self.accumulator -= self.dt;
            ticks += 1;
        }
        ticks
    }

    /// Run exactly one tick, paused or not, leaving the accumulator alone
    pub fn single_step<F>(&mut self, tick: F)
    where
        F: FnOnce(f64, f64),
    {
        tick(self.time, self.dt);
        self.time += self.dt;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        FixedTimestep::new(DEFAULT_TIMESTEP)
    }
}
