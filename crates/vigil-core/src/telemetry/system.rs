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

//! Machine identification strings.

use serde::Serialize;

/// Windows builds from this number on are Windows 11.
const WINDOWS_11_FIRST_BUILD: u32 = 22000;

/// CPU and operating system identification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemIdentity {
    /// Processor brand string.
    pub cpu_name: String,
    /// Operating system product name.
    pub os_name: String,
    /// Operating system version, `Unknown` if it could not be extracted.
    pub os_version: String,
}

impl SystemIdentity {
    /// Builds an identity from a CPU brand and a raw OS description such as
    /// `"Windows 10  (10.0.22631) 64bit"`.
    pub fn from_raw(cpu_name: impl Into<String>, raw_os: &str) -> Self {
        let (os_name, os_version) = Self::classify_os(raw_os);
        Self {
            cpu_name: cpu_name.into(),
            os_name,
            os_version,
        }
    }

    /// Splits a raw OS description into `(name, version)`.
    ///
    /// The version is whatever sits between the first pair of parentheses.
    /// Windows hosts report Windows 10 even on Windows 11, so the name is
    /// derived from the build number instead of trusted.
    pub fn classify_os(raw: &str) -> (String, String) {
        let version = match (raw.find('('), raw.find(')')) {
            (Some(open), Some(close)) if close > open => raw[open + 1..close].trim().to_string(),
            _ => "Unknown".to_string(),
        };

        let is_windows = raw.trim_start().to_ascii_lowercase().starts_with("windows");
        let name = if is_windows {
            let build = Self::windows_build(&version).unwrap_or(0);
            if build >= WINDOWS_11_FIRST_BUILD {
                "Windows 11 64-bit".to_string()
            } else {
                "Windows 10 64-bit".to_string()
            }
        } else {
            let head = raw.split('(').next().unwrap_or(raw).trim();
            if head.is_empty() {
                "Unknown".to_string()
            } else {
                head.to_string()
            }
        };

        (name, version)
    }

    // "10.0.22631" carries the build in the third part; a bare "22631" is the build.
    fn windows_build(version: &str) -> Option<u32> {
        let parts: Vec<&str> = version.split('.').collect();
        match parts.len() {
            n if n >= 3 => parts[2].trim().parse().ok(),
            1 => parts[0].trim().parse().ok(),
            _ => None,
        }
    }
}

impl Default for SystemIdentity {
    fn default() -> Self {
        Self {
            cpu_name: "Unknown".to_string(),
            os_name: "Unknown".to_string(),
            os_version: "Unknown".to_string(),
        }
    }
}
