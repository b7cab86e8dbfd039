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

//! Read-only snapshots handed to the display layer.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{FeatureKind, FeatureReading, SystemIdentity};

/// Frame, visibility and CPU figures, updated every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    /// Frames per second over the last completed window.
    pub fps: f32,
    /// Lowest window rate seen so far (`+inf` before the first window).
    pub min_fps: f32,
    /// Highest window rate seen so far.
    pub max_fps: f32,
    /// Duration of the last frame, in milliseconds.
    pub frametime_ms: f32,
    /// Entities inside the primary viewpoint's frustum at the last window.
    pub visible_count: usize,
    /// Entities in the scene cache.
    pub loaded_count: usize,
    /// Process CPU utilization over the last window, unclamped.
    pub cpu_percent: f32,
}

impl Default for PerformanceSnapshot {
    fn default() -> Self {
        Self {
            fps: 0.0,
            min_fps: f32::INFINITY,
            max_fps: 0.0,
            frametime_ms: 0.0,
            visible_count: 0,
            loaded_count: 0,
            cpu_percent: 0.0,
        }
    }
}

/// One reading per [`FeatureKind`], rebuilt as a whole on every refresh.
///
/// Every kind is always present; kinds without evidence read `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphicsSettingsSnapshot {
    readings: BTreeMap<FeatureKind, FeatureReading>,
}

impl GraphicsSettingsSnapshot {
    /// A snapshot where every feature is `Unknown`.
    pub fn new() -> Self {
        Self {
            readings: FeatureKind::ALL
                .iter()
                .map(|kind| (*kind, FeatureReading::unknown()))
                .collect(),
        }
    }

    /// Builds a fresh snapshot; kinds missing from `readings` stay `Unknown`.
    pub fn from_readings(readings: impl IntoIterator<Item = (FeatureKind, FeatureReading)>) -> Self {
        let mut snapshot = Self::new();
        for (kind, reading) in readings {
            snapshot.readings.insert(kind, reading);
        }
        snapshot
    }

    /// The reading for `kind`.
    pub fn get(&self, kind: FeatureKind) -> &FeatureReading {
        // Every kind is inserted at construction.
        &self.readings[&kind]
    }

    /// Iterates in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureKind, &FeatureReading)> {
        self.readings.iter().map(|(k, v)| (*k, v))
    }
}

impl Default for GraphicsSettingsSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Quality preset and viewpoint parameters shown next to the feature readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicGraphicsInfo {
    /// Index of the active quality preset, `-1` when unknown.
    pub quality_index: i32,
    /// Name of the active quality preset.
    pub quality_name: String,
    /// Vertical field of view of the primary viewpoint, in degrees.
    pub fov_degrees: f32,
    /// Far clip distance of the primary viewpoint.
    pub draw_distance: f32,
}

impl Default for BasicGraphicsInfo {
    fn default() -> Self {
        Self {
            quality_index: -1,
            quality_name: "Unknown".to_string(),
            fov_degrees: 0.0,
            draw_distance: 0.0,
        }
    }
}

/// Static identification of the host, the loader and the machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentInfo {
    /// Name of the loaded scene, `Unknown` if the host cannot tell.
    pub scene_name: String,
    /// Version of the simulation engine.
    pub engine_version: String,
    /// Name of the graphics device.
    pub gpu_name: String,
    /// Version of the plugin loader.
    pub loader_version: String,
    /// Number of user plugins loaded.
    pub loaded_plugins: usize,
    /// CPU and operating system.
    pub system: SystemIdentity,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            scene_name: "Unknown".to_string(),
            engine_version: String::new(),
            gpu_name: String::new(),
            loader_version: String::new(),
            loaded_plugins: 0,
            system: SystemIdentity::default(),
        }
    }
}
