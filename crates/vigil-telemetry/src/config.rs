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

//! Configuration of the diagnostics service.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_core::FeatureKind;

use crate::probe::CapabilityDescriptor;

/// Errors raised while loading or validating a [`DiagnosticsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON was malformed or had unexpected fields.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// A window length was zero, negative, not finite or too long for a `Duration`.
    #[error("Invalid window length for '{name}': {value}")]
    InvalidWindow {
        /// The offending field.
        name: &'static str,
        /// Its value.
        value: f32,
    },
}

/// Window lengths, load behaviour and probe name overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// FPS window length in seconds.
    pub frame_window_secs: f32,
    /// Visibility window length in seconds.
    pub visibility_window_secs: f32,
    /// CPU window length in seconds.
    pub cpu_window_secs: f32,
    /// Whether `on_load` runs feature detection.
    pub detect_on_load: bool,
    /// Replacement descriptors for individual features.
    pub capability_overrides: BTreeMap<FeatureKind, CapabilityDescriptor>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            frame_window_secs: 0.5,
            visibility_window_secs: 0.5,
            cpu_window_secs: 1.0,
            detect_on_load: true,
            capability_overrides: BTreeMap::new(),
        }
    }
}

impl DiagnosticsConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("reading diagnostics config {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("loading diagnostics config {}", path.display()))?;
        log::info!("Diagnostics config loaded from {}", path.display());
        Ok(config)
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Saves as a pretty JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Rejects window lengths that are not strictly positive, or that a
    /// `Duration` cannot hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        window_duration("frame_window_secs", self.frame_window_secs)?;
        window_duration("visibility_window_secs", self.visibility_window_secs)?;
        window_duration("cpu_window_secs", self.cpu_window_secs)?;
        Ok(())
    }

    /// FPS window length. An invalid value yields the default length.
    pub fn frame_window(&self) -> Duration {
        window_duration("frame_window_secs", self.frame_window_secs)
            .unwrap_or(DEFAULT_FRAME_WINDOW)
    }

    /// Visibility window length. An invalid value yields the default length.
    pub fn visibility_window(&self) -> Duration {
        window_duration("visibility_window_secs", self.visibility_window_secs)
            .unwrap_or(DEFAULT_FRAME_WINDOW)
    }

    /// CPU window length. An invalid value yields the default length.
    pub fn cpu_window(&self) -> Duration {
        window_duration("cpu_window_secs", self.cpu_window_secs).unwrap_or(DEFAULT_CPU_WINDOW)
    }
}

const DEFAULT_FRAME_WINDOW: Duration = Duration::from_millis(500);
const DEFAULT_CPU_WINDOW: Duration = Duration::from_secs(1);

fn window_duration(name: &'static str, value: f32) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f32(value) {
        Ok(window) if !window.is_zero() => Ok(window),
        _ => Err(ConfigError::InvalidWindow { name, value }),
    }
}
