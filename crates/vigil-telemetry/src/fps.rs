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

//! Frame rate and frame time aggregation.

use std::time::Duration;

use crate::window::MetricWindow;

/// Tracks frame time every tick and frame rate with running bounds per window.
#[derive(Debug, Clone)]
pub struct FpsAggregator {
    window: MetricWindow,
    fps: f32,
    min_fps: f32,
    max_fps: f32,
    frametime_ms: f32,
}

impl FpsAggregator {
    /// Creates an aggregator emitting a rate every `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            window: MetricWindow::new(window),
            fps: 0.0,
            min_fps: f32::INFINITY,
            max_fps: 0.0,
            frametime_ms: 0.0,
        }
    }

    /// Records one frame of `unscaled_delta`. Returns the new rate when the window closes.
    pub fn tick(&mut self, unscaled_delta: Duration) -> Option<f32> {
        self.frametime_ms = unscaled_delta.as_secs_f32() * 1000.0;

        let sample = self.window.tick(unscaled_delta, 1.0)?;
        self.fps = sample.rate() as f32;
        self.min_fps = self.min_fps.min(self.fps);
        self.max_fps = self.max_fps.max(self.fps);
        Some(self.fps)
    }

    /// Forgets the running bounds; the next window sets both again.
    pub fn reset_bounds(&mut self) {
        self.min_fps = f32::INFINITY;
        self.max_fps = 0.0;
    }

    /// Rate of the last completed window.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Lowest window rate, `+inf` before the first window.
    pub fn min_fps(&self) -> f32 {
        self.min_fps
    }

    /// Highest window rate.
    pub fn max_fps(&self) -> f32 {
        self.max_fps
    }

    /// Duration of the last frame in milliseconds.
    pub fn frametime_ms(&self) -> f32 {
        self.frametime_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(agg: &mut FpsAggregator, frames: u32, frame: Duration) -> Option<f32> {
        let mut last = None;
        for _ in 0..frames {
            if let Some(fps) = agg.tick(frame) {
                last = Some(fps);
            }
        }
        last
    }

    #[test]
    fn test_frametime_updates_every_tick() {
        let mut agg = FpsAggregator::new(Duration::from_millis(500));
        assert!(agg.tick(Duration::from_micros(16_667)).is_none());
        assert_relative_eq!(agg.frametime_ms(), 16.667, epsilon = 1e-3);
    }

    #[test]
    fn test_first_window_sets_both_bounds() {
        let mut agg = FpsAggregator::new(Duration::from_millis(500));
        let fps = run(&mut agg, 25, Duration::from_millis(20)).unwrap();

        assert_relative_eq!(fps, 50.0, epsilon = 1e-3);
        assert_eq!(agg.min_fps(), fps);
        assert_eq!(agg.max_fps(), fps);
    }

    #[test]
    fn test_bounds_bracket_every_emission() {
        let mut agg = FpsAggregator::new(Duration::from_millis(500));
        for frame_ms in [20, 10, 50, 25] {
            run(&mut agg, 500 / frame_ms, Duration::from_millis(frame_ms as u64));
            assert!(agg.min_fps() <= agg.fps());
            assert!(agg.fps() <= agg.max_fps());
        }
        assert_relative_eq!(agg.min_fps(), 20.0, epsilon = 1e-3);
        assert_relative_eq!(agg.max_fps(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_reset_bounds_reseeds() {
        let mut agg = FpsAggregator::new(Duration::from_millis(500));
        run(&mut agg, 50, Duration::from_millis(10));
        agg.reset_bounds();
        assert!(agg.min_fps().is_infinite());

        let fps = run(&mut agg, 25, Duration::from_millis(20)).unwrap();
        assert_eq!(agg.min_fps(), fps);
        assert_eq!(agg.max_fps(), fps);
    }
}
