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

//! Provides the data structures the diagnostics overlay publishes.
//!
//! This module defines the "common language" between the samplers in
//! `vigil-telemetry` and whatever display layer reads their results: feature
//! readings, the graphics settings snapshot, the continuously updated
//! performance snapshot, and static environment identification.

pub mod reading;
pub mod snapshot;
pub mod system;

pub use self::reading::{FeatureKind, FeatureReading, FeatureState};
pub use self::snapshot::{
    BasicGraphicsInfo, EnvironmentInfo, GraphicsSettingsSnapshot, PerformanceSnapshot,
};
pub use self::system::SystemIdentity;
