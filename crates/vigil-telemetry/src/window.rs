// Copyright 2025 eraflo
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

//! The periodic accumulate-then-emit primitive shared by every timed sampler.

use std::time::Duration;

/// What a [`MetricWindow`] hands back when its period elapses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSample {
    /// Time covered by the window (at least the threshold).
    pub elapsed: Duration,
    /// Sum of every amount accumulated during the window.
    pub accumulated: f64,
}

impl WindowSample {
    /// Accumulated amount per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.accumulated / secs
        } else {
            0.0
        }
    }
}

/// A fixed-period accumulator.
///
/// Elapsed time and an arbitrary amount are added on every call; once the
/// elapsed time reaches the threshold the window emits a [`WindowSample`] and
/// starts over from zero. Between emissions `elapsed < threshold` holds as long
/// as callers use [`MetricWindow::tick`].
#[derive(Debug, Clone)]
pub struct MetricWindow {
    elapsed: Duration,
    accumulator: f64,
    threshold: Duration,
}

impl MetricWindow {
    /// Creates an empty window with the given period.
    pub fn new(threshold: Duration) -> Self {
        debug_assert!(!threshold.is_zero(), "a metric window needs a period");
        Self {
            elapsed: Duration::ZERO,
            accumulator: 0.0,
            threshold,
        }
    }

    /// The window period.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Time accumulated since the last emission.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Amount accumulated since the last emission.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Adds time and an amount without emitting.
    pub fn accumulate(&mut self, delta: Duration, amount: f64) {
        self.elapsed += delta;
        self.accumulator += amount;
    }

    /// `true` once the period has elapsed.
    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.threshold
    }

    /// Emits and resets if the period has elapsed; otherwise leaves the window untouched.
    pub fn emit(&mut self) -> Option<WindowSample> {
        if !self.is_ready() {
            return None;
        }
        let sample = WindowSample {
            elapsed: self.elapsed,
            accumulated: self.accumulator,
        };
        self.reset();
        Some(sample)
    }

    /// Accumulates then emits if ready.
    pub fn tick(&mut self, delta: Duration, amount: f64) -> Option<WindowSample> {
        self.accumulate(delta, amount);
        self.emit()
    }

    /// Drops the partial window.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.accumulator = 0.0;
    }
}
