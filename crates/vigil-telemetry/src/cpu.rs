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

//! Process CPU utilization sampling.

use std::time::Duration;

use vigil_core::ProcessClock;

use crate::window::MetricWindow;

/// Percentage of total machine capacity consumed by `cpu_delta` over `window`.
///
/// The result is not clamped: a window closing late, or a clock that
/// over-reports, can yield more than 100.
pub fn usage_percent(cpu_delta: Duration, window: Duration, logical_cores: usize) -> f32 {
    let capacity_ms = window.as_secs_f64() * 1000.0 * logical_cores.max(1) as f64;
    if capacity_ms <= 0.0 {
        return 0.0;
    }
    let used_ms = cpu_delta.as_secs_f64() * 1000.0;
    (used_ms / capacity_ms * 100.0) as f32
}

/// Samples process CPU time once per window and turns the delta into a percentage.
///
/// The divisor is the configured window length, not the time that actually
/// elapsed, so a late emission overstates usage slightly.
pub struct CpuLoadSampler {
    clock: Box<dyn ProcessClock>,
    window: MetricWindow,
    last_cpu_time: Option<Duration>,
    usage_percent: f32,
}

impl CpuLoadSampler {
    /// Creates a sampler and takes the baseline CPU reading.
    pub fn new(mut clock: Box<dyn ProcessClock>, window: Duration) -> Self {
        let last_cpu_time = clock.total_cpu_time();
        if last_cpu_time.is_none() {
            log::debug!("Process CPU time unavailable at startup; waiting for a baseline");
        }
        Self {
            clock,
            window: MetricWindow::new(window),
            last_cpu_time,
            usage_percent: 0.0,
        }
    }

    /// Takes a fresh baseline and restarts the window.
    ///
    /// CPU time consumed before this call is excluded from the next sample.
    pub fn rebaseline(&mut self) {
        self.last_cpu_time = self.clock.total_cpu_time();
        self.window.reset();
        log::trace!("CPU baseline retaken: {:?}", self.last_cpu_time);
    }

    /// Advances the window by `delta`. Returns the new percentage when one is computed.
    pub fn tick(&mut self, delta: Duration) -> Option<f32> {
        self.window.tick(delta, 0.0)?;

        let Some(current) = self.clock.total_cpu_time() else {
            log::trace!("Process CPU time unavailable; keeping {:.1}%", self.usage_percent);
            return None;
        };

        let previous = self.last_cpu_time.replace(current);
        let Some(previous) = previous else {
            log::debug!("CPU baseline acquired");
            return None;
        };

        let cores = self.clock.logical_core_count();
        self.usage_percent = usage_percent(
            current.saturating_sub(previous),
            self.window.threshold(),
            cores,
        );
        log::trace!("CPU usage {:.1}% across {} cores", self.usage_percent, cores);
        Some(self.usage_percent)
    }

    /// The last computed percentage.
    pub fn usage(&self) -> f32 {
        self.usage_percent
    }
}

impl std::fmt::Debug for CpuLoadSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuLoadSampler")
            .field("window", &self.window)
            .field("last_cpu_time", &self.last_cpu_time)
            .field("usage_percent", &self.usage_percent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vigil_core::host::memory::ManualClock;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_usage_percent_formula() {
        assert_relative_eq!(
            usage_percent(Duration::from_millis(500), SECOND, 2),
            25.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_usage_percent_is_not_clamped() {
        let pct = usage_percent(Duration::from_millis(2500), SECOND, 2);
        assert!(pct > 100.0);
        assert_relative_eq!(pct, 125.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sampler_uses_configured_window_as_divisor() {
        let clock = ManualClock::new(2);
        clock.set_cpu_time(Duration::from_secs(10));
        let mut sampler = CpuLoadSampler::new(Box::new(clock.clone()), SECOND);

        assert!(sampler.tick(Duration::from_millis(600)).is_none());
        clock.set_cpu_time(Duration::from_millis(10_500));
        // The window closes late at 1.2 s but still divides by 1 s.
        let pct = sampler.tick(Duration::from_millis(600)).unwrap();
        assert_relative_eq!(pct, 25.0, epsilon = 1e-4);
    }

    #[test]
    fn test_unavailable_clock_keeps_previous_value() {
        let clock = ManualClock::new(1);
        let mut sampler = CpuLoadSampler::new(Box::new(clock.clone()), SECOND);

        clock.set_cpu_time(Duration::from_millis(400));
        assert_relative_eq!(sampler.tick(SECOND).unwrap(), 40.0, epsilon = 1e-4);

        clock.set_unavailable();
        assert!(sampler.tick(SECOND).is_none());
        assert_relative_eq!(sampler.usage(), 40.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rebaseline_excludes_earlier_cpu_time() {
        let clock = ManualClock::new(1);
        let mut sampler = CpuLoadSampler::new(Box::new(clock.clone()), SECOND);
        assert!(sampler.tick(Duration::from_millis(700)).is_none());

        clock.set_cpu_time(Duration::from_secs(5));
        sampler.rebaseline();

        // The 700 ms already in the window were discarded.
        assert!(sampler.tick(Duration::from_millis(700)).is_none());
        clock.set_cpu_time(Duration::from_millis(5_250));
        assert_relative_eq!(
            sampler.tick(Duration::from_millis(300)).unwrap(),
            25.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_missing_baseline_is_acquired_on_first_window() {
        let clock = ManualClock::new(1);
        clock.set_unavailable();
        let mut sampler = CpuLoadSampler::new(Box::new(clock.clone()), SECOND);

        clock.set_cpu_time(Duration::from_secs(3));
        assert!(sampler.tick(SECOND).is_none());
        assert_eq!(sampler.usage(), 0.0);

        clock.set_cpu_time(Duration::from_millis(3_250));
        assert_relative_eq!(sampler.tick(SECOND).unwrap(), 25.0, epsilon = 1e-4);
    }
}
