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

//! # Vigil Telemetry
//!
//! The sampling engine of the diagnostics overlay. Every sampler here is fed
//! from the host's frame callback through [`DiagnosticsService::tick`] and
//! publishes plain snapshots from `vigil-core`:
//!
//! - [`window::MetricWindow`]: the accumulate-then-emit primitive.
//! - [`fps::FpsAggregator`], [`visibility::VisibilityCounter`] and
//!   [`cpu::CpuLoadSampler`]: the timed samplers.
//! - [`scene_cache::SceneObjectCache`]: the lazily maintained entity list.
//! - [`probe`]: capability probing and the graphics feature detector.

#![warn(missing_docs)]

pub mod config;
pub mod cpu;
pub mod fps;
pub mod probe;
pub mod scene_cache;
pub mod service;
pub mod visibility;
pub mod window;

pub use config::{ConfigError, DiagnosticsConfig};
pub use probe::{CapabilityDescriptor, GraphicsFeatureDetector};
pub use service::{DiagnosticsService, FrameTiming};
