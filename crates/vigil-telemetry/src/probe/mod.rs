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

//! Capability probing.
//!
//! The host's rendering extensions are unknown at compile time, so features
//! are recognised by name: member type names, accessor names and post-process
//! profile entries. [`descriptor`] holds the names, [`registry`] the lookup
//! primitives, and [`features`] the per-feature fallback chains.

pub mod descriptor;
pub mod features;
pub mod registry;

pub use self::descriptor::CapabilityDescriptor;
pub use self::features::{Extractor, GraphicsFeatureDetector};
pub use self::registry::{MemberMatch, ProbeContext};
