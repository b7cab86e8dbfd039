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

//! Contracts with the simulation host.
//!
//! The overlay runs inside a host it knows nothing about at compile time. Every
//! piece of information it samples comes through the traits in this module:
//! [`SceneHost`] for world enumeration, visibility and static identification,
//! [`Inspect`] for structural introspection of attached members whose concrete
//! type is unknown, and [`ProcessClock`] for process CPU time.

pub mod memory;
pub mod value;

use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Frustum};

pub use self::value::{Inspect, MemberValue};

/// Opaque handle to a world entity.
///
/// Handles may outlive the entity they name; every host query must tolerate a
/// stale handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A specialized `Result` type for host queries.
pub type HostResult<T> = Result<T, HostError>;

/// An error reported by the host while answering a query.
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// Enumerating the world (or an entity's members) failed or was unavailable.
    EnumerationFailed(String),
    /// The handle no longer refers to a live entity.
    InvalidEntity(EntityId),
    /// A member exists but could not be read.
    Inaccessible {
        /// Name of the member that was being read.
        member: String,
        /// Why the read failed.
        reason: String,
    },
    /// The host does not expose this information at all.
    Unsupported(&'static str),
}

impl Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::EnumerationFailed(msg) => write!(f, "Enumeration failed: {msg}"),
            HostError::InvalidEntity(id) => write!(f, "Invalid entity: {id}"),
            HostError::Inaccessible { member, reason } => {
                write!(f, "Member '{member}' is inaccessible: {reason}")
            }
            HostError::Unsupported(what) => write!(f, "Unsupported by host: {what}"),
        }
    }
}

impl std::error::Error for HostError {}

/// The broad category of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightKind {
    /// A sun-like light with parallel rays.
    Directional,
    /// An omnidirectional light.
    Point,
    /// A cone light.
    Spot,
    /// Any other host-specific light kind.
    Other,
}

/// How a light casts shadows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowMode {
    /// No shadows.
    None,
    /// Hard-edged shadows.
    Hard,
    /// Filtered shadows.
    Soft,
}

/// A light source as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    /// The light's kind.
    pub kind: LightKind,
    /// Its shadow-casting mode.
    pub shadows: ShadowMode,
}

/// Projection parameters of a viewpoint that are shown alongside the probes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewpointProjection {
    /// Vertical field of view, in degrees.
    pub fov_degrees: f32,
    /// Distance to the far clipping plane.
    pub far_clip: f32,
}

/// The host's quality preset table and the selected entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityLevels {
    /// Index of the active preset; may be out of range on a misbehaving host.
    pub current: i32,
    /// Names of all presets.
    pub names: Vec<String>,
}

/// Static identification strings supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    /// Version of the simulation engine.
    pub engine_version: String,
    /// Name of the graphics device in use.
    pub gpu_name: String,
    /// Version of the plugin loader.
    pub loader_version: String,
    /// Number of user plugins loaded.
    pub loaded_plugins: usize,
}

/// The world the overlay is embedded in.
///
/// All methods are called from the host's frame callback on a single thread.
/// Optional capabilities have default implementations reporting that the
/// host cannot answer.
pub trait SceneHost {
    /// Enumerates every live world entity, in host order.
    fn enumerate_entities(&self) -> HostResult<Vec<EntityId>>;

    /// Returns `true` if the handle still refers to a live entity.
    fn is_alive(&self, entity: EntityId) -> bool;

    /// The entity's hierarchical active flag (inactive if any ancestor is).
    fn is_active_in_hierarchy(&self, entity: EntityId) -> HostResult<bool>;

    /// World-space bounds of the entity's renderable, if it has one.
    fn renderable_bounds(&self, entity: EntityId) -> Option<Aabb>;

    /// Members attached to the entity, in host enumeration order.
    fn members(&self, entity: EntityId) -> HostResult<Vec<Arc<dyn Inspect>>>;

    /// The primary viewpoint (main camera), if one exists.
    fn primary_viewpoint(&self) -> Option<EntityId>;

    /// Frustum planes of a viewpoint. `None` if the handle is stale.
    fn frustum(&self, viewpoint: EntityId) -> Option<Frustum>;

    /// The viewpoint object itself, for generic accessor probing.
    fn viewpoint_object(&self, viewpoint: EntityId) -> Option<Arc<dyn Inspect>>;

    /// Field of view and draw distance of a viewpoint.
    fn viewpoint_projection(&self, _viewpoint: EntityId) -> Option<ViewpointProjection> {
        None
    }

    /// Every light source in the scene, in host order.
    fn lights(&self) -> HostResult<Vec<LightSource>> {
        Err(HostError::Unsupported("lights"))
    }

    /// The global antialiasing sample count (0 = disabled).
    fn antialiasing_level(&self) -> Option<u32> {
        None
    }

    /// The quality preset table.
    fn quality_levels(&self) -> HostResult<QualityLevels> {
        Err(HostError::Unsupported("quality levels"))
    }

    /// Name of the currently loaded scene.
    fn active_scene_name(&self) -> HostResult<String> {
        Err(HostError::Unsupported("scene name"))
    }

    /// Static identification strings.
    fn host_info(&self) -> HostInfo {
        HostInfo::default()
    }
}

/// Source of process-level CPU accounting.
pub trait ProcessClock {
    /// Total CPU time consumed by the process across all cores so far.
    ///
    /// `None` if the platform cannot report it right now.
    fn total_cpu_time(&mut self) -> Option<Duration>;

    /// Number of logical cores the process may run on. Never zero.
    fn logical_core_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_display() {
        assert_eq!(
            HostError::InvalidEntity(EntityId(4)).to_string(),
            "Invalid entity: #4"
        );
        assert_eq!(
            HostError::Inaccessible {
                member: "profile".to_string(),
                reason: "getter threw".to_string(),
            }
            .to_string(),
            "Member 'profile' is inaccessible: getter threw"
        );
    }
}
