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

//! # Vigil Core
//!
//! Foundational crate containing the contracts between the diagnostics overlay
//! and the simulation host it is embedded in, plus the plain data types the
//! samplers produce.
//!
//! This crate defines the abstract "what": the host collaborator traits, the
//! introspection value model, and the snapshot types. `vigil-telemetry`
//! provides the samplers and the probing engine, and `vigil-infra` provides
//! the concrete platform implementations.

#![warn(missing_docs)]

pub mod host;
pub mod math;
pub mod probe;
pub mod telemetry;

pub use host::{EntityId, HostError, HostResult, Inspect, MemberValue, ProcessClock, SceneHost};
pub use probe::Probe;
pub use telemetry::{FeatureKind, FeatureReading, FeatureState};
