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

//! sysinfo-based implementation of the ProcessClock trait.

use std::time::Duration;

use sysinfo::{CpuRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use vigil_core::ProcessClock;

/// A process clock that reads the current process's accumulated CPU time
/// through the `sysinfo` crate.
#[derive(Debug)]
pub struct SysinfoProcessClock {
    system: System,
    pid: Option<Pid>,
    logical_cores: usize,
}

impl SysinfoProcessClock {
    /// Creates a clock for the current process.
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                log::warn!("Current process id unavailable, CPU usage disabled: {e}");
                None
            }
        };

        let mut system = System::new();
        system.refresh_cpu_list(CpuRefreshKind::nothing());
        let logical_cores = system.cpus().len().max(1);
        log::debug!("Process clock ready: {logical_cores} logical cores");

        Self {
            system,
            pid,
            logical_cores,
        }
    }
}

impl ProcessClock for SysinfoProcessClock {
    fn total_cpu_time(&mut self) -> Option<Duration> {
        let pid = self.pid?;
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu(),
        );
        self.system
            .process(pid)
            .map(|process| Duration::from_millis(process.accumulated_cpu_time()))
    }

    fn logical_core_count(&self) -> usize {
        self.logical_cores
    }
}

impl Default for SysinfoProcessClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_at_least_one_core() {
        let clock = SysinfoProcessClock::new();
        assert!(clock.logical_core_count() >= 1);
    }

    #[test]
    fn test_cpu_time_never_decreases() {
        let mut clock = SysinfoProcessClock::new();
        let Some(first) = clock.total_cpu_time() else {
            // Some sandboxes hide process accounting.
            return;
        };

        let mut spin = 0u64;
        for i in 0..2_000_000u64 {
            spin = spin.wrapping_add(i * i);
        }
        std::hint::black_box(spin);

        if let Some(second) = clock.total_cpu_time() {
            assert!(second >= first);
        }
    }
}
