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

//! CPU and operating system identification.

use sysinfo::{CpuRefreshKind, System};
use vigil_core::telemetry::SystemIdentity;

/// Reads the CPU brand and OS description of the running machine.
pub fn detect_system_identity() -> SystemIdentity {
    let mut system = System::new();
    system.refresh_cpu_list(CpuRefreshKind::nothing());

    let cpu_name = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let identity = SystemIdentity::from_raw(cpu_name, &raw_os_description());
    log::info!(
        "System: {} on {} ({})",
        identity.cpu_name,
        identity.os_name,
        identity.os_version
    );
    identity
}

/// `"<name> (<version>)"` in the shape [`SystemIdentity::classify_os`] expects.
///
/// On Windows the version is the kernel build number, which is what tells
/// Windows 10 and 11 apart.
fn raw_os_description() -> String {
    let name = System::name().unwrap_or_else(|| "Unknown".to_string());
    let version = if name.to_ascii_lowercase().starts_with("windows") {
        System::kernel_version()
    } else {
        System::os_version()
    };
    compose_os_description(&name, version.as_deref())
}

fn compose_os_description(name: &str, version: Option<&str>) -> String {
    match version.map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => format!("{name} ({version})"),
        None => name.to_string(),
    }
}
