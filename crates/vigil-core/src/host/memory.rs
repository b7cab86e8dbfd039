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

//! An in-memory host.
//!
//! `MemoryScene` implements every host contract over plain vectors so the
//! samplers can run without an engine attached: the sandbox drives it, and the
//! test suites build exact worlds with it. Entities can be destroyed while
//! callers still hold their handles, and enumeration can be made to fail, to
//! reproduce the invalidation paths of a real host.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use super::{
    EntityId, HostError, HostInfo, HostResult, Inspect, LightSource, MemberValue, ProcessClock,
    QualityLevels, SceneHost, ViewpointProjection,
};
use crate::math::{Aabb, Frustum, Mat4, Vec3};

#[derive(Debug, Clone)]
enum Slot {
    Value(MemberValue),
    Throws(String),
}

impl Slot {
    fn read(&self, name: &str) -> HostResult<MemberValue> {
        match self {
            Slot::Value(value) => Ok(value.clone()),
            Slot::Throws(reason) => Err(HostError::Inaccessible {
                member: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

/// A host object assembled from named properties and fields.
#[derive(Debug, Clone)]
pub struct MemoryObject {
    type_name: String,
    properties: Vec<(String, Slot)>,
    fields: Vec<(String, Slot)>,
}

impl MemoryObject {
    /// Creates an object of the given type with no members.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Adds a readable property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<MemberValue>) -> Self {
        self.properties.push((name.into(), Slot::Value(value.into())));
        self
    }

    /// Adds a public field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<MemberValue>) -> Self {
        self.fields.push((name.into(), Slot::Value(value.into())));
        self
    }

    /// Adds a nested object as a property.
    pub fn with_object_property(self, name: impl Into<String>, object: MemoryObject) -> Self {
        self.with_property(name, MemberValue::Object(Arc::new(object)))
    }

    /// Adds a nested object as a field.
    pub fn with_object_field(self, name: impl Into<String>, object: MemoryObject) -> Self {
        self.with_field(name, MemberValue::Object(Arc::new(object)))
    }

    /// Adds a property whose getter fails.
    pub fn with_throwing_property(mut self, name: impl Into<String>, reason: &str) -> Self {
        self.properties
            .push((name.into(), Slot::Throws(reason.to_string())));
        self
    }

    /// Adds a field whose read fails.
    pub fn with_throwing_field(mut self, name: impl Into<String>, reason: &str) -> Self {
        self.fields.push((name.into(), Slot::Throws(reason.to_string())));
        self
    }
}

fn read_slot(slots: &[(String, Slot)], name: &str) -> HostResult<MemberValue> {
    slots
        .iter()
        .find(|(slot_name, _)| slot_name == name)
        .ok_or_else(|| HostError::Inaccessible {
            member: name.to_string(),
            reason: "no such member".to_string(),
        })
        .and_then(|(_, slot)| slot.read(name))
}

impl Inspect for MemoryObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|(n, _)| n.clone()).collect()
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_property(&self, name: &str) -> HostResult<MemberValue> {
        read_slot(&self.properties, name)
    }

    fn read_field(&self, name: &str) -> HostResult<MemberValue> {
        read_slot(&self.fields, name)
    }
}

/// Camera parameters for [`MemoryScene::set_camera`].
#[derive(Debug, Clone)]
pub struct MemoryCamera {
    /// World-space position.
    pub eye: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Width over height.
    pub aspect_ratio: f32,
    /// Near clip distance.
    pub z_near: f32,
    /// Far clip distance (draw distance).
    pub z_far: f32,
    /// The object exposed for accessor probing (`allowHDR`, `allowMSAA`, ...).
    pub object: MemoryObject,
}

impl MemoryCamera {
    /// A 60 degree, 16:9 camera with a 1000 unit draw distance.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            fov_degrees: 60.0,
            aspect_ratio: 16.0 / 9.0,
            z_near: 0.1,
            z_far: 1000.0,
            object: MemoryObject::new("Camera"),
        }
    }

    /// Replaces the probed camera object.
    pub fn with_object(mut self, object: MemoryObject) -> Self {
        self.object = object;
        self
    }

    fn view_projection(&self) -> Option<Mat4> {
        let proj = Mat4::perspective_rh_zo(
            self.fov_degrees.to_radians(),
            self.aspect_ratio,
            self.z_near,
            self.z_far,
        )?;
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y)?;
        Some(proj * view)
    }
}

#[derive(Debug)]
struct MemoryEntity {
    id: EntityId,
    alive: bool,
    active: bool,
    bounds: Option<Aabb>,
    members: Vec<Arc<dyn Inspect>>,
}

#[derive(Debug)]
struct MemoryViewpoint {
    entity: EntityId,
    camera: MemoryCamera,
    object: Arc<dyn Inspect>,
}

/// A complete in-memory [`SceneHost`].
#[derive(Debug, Default)]
pub struct MemoryScene {
    entities: Vec<MemoryEntity>,
    next_id: u64,
    viewpoint: Option<MemoryViewpoint>,
    lights: Vec<LightSource>,
    antialiasing_level: Option<u32>,
    quality: Option<QualityLevels>,
    scene_name: Option<String>,
    info: HostInfo,
    enumeration_failing: bool,
    enumerations: Cell<usize>,
}

impl MemoryScene {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity and returns its handle.
    pub fn spawn(&mut self, active: bool, bounds: Option<Aabb>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(MemoryEntity {
            id,
            alive: true,
            active,
            bounds,
            members: Vec::new(),
        });
        id
    }

    /// Attaches a member to an entity. Ignored for unknown or destroyed entities.
    pub fn attach(&mut self, entity: EntityId, member: impl Inspect + 'static) {
        if let Some(e) = self.entity_mut(entity) {
            e.members.push(Arc::new(member));
        }
    }

    /// Destroys an entity. Existing handles become stale.
    pub fn destroy(&mut self, entity: EntityId) {
        if let Some(e) = self.entity_mut(entity) {
            e.alive = false;
        }
        if self.viewpoint.as_ref().is_some_and(|vp| vp.entity == entity) {
            self.viewpoint = None;
        }
    }

    /// Toggles an entity's active flag.
    pub fn set_active(&mut self, entity: EntityId, active: bool) {
        if let Some(e) = self.entity_mut(entity) {
            e.active = active;
        }
    }

    /// Installs the primary camera on a new entity and returns that entity.
    pub fn set_camera(&mut self, camera: MemoryCamera) -> EntityId {
        if let Some(old) = self.viewpoint.take() {
            self.destroy(old.entity);
        }
        let entity = self.spawn(true, None);
        let object: Arc<dyn Inspect> = Arc::new(camera.object.clone());
        self.viewpoint = Some(MemoryViewpoint {
            entity,
            camera,
            object,
        });
        entity
    }

    /// Adds a light source.
    pub fn add_light(&mut self, light: LightSource) {
        self.lights.push(light);
    }

    /// Sets the global antialiasing sample count.
    pub fn set_antialiasing_level(&mut self, level: u32) {
        self.antialiasing_level = Some(level);
    }

    /// Sets the quality preset table.
    pub fn set_quality_levels(&mut self, current: i32, names: &[&str]) {
        self.quality = Some(QualityLevels {
            current,
            names: names.iter().map(|n| n.to_string()).collect(),
        });
    }

    /// Sets the loaded scene's name.
    pub fn set_scene_name(&mut self, name: impl Into<String>) {
        self.scene_name = Some(name.into());
    }

    /// Sets the static identification strings.
    pub fn set_host_info(&mut self, info: HostInfo) {
        self.info = info;
    }

    /// Makes every subsequent enumeration fail until reset.
    pub fn set_enumeration_failing(&mut self, failing: bool) {
        self.enumeration_failing = failing;
    }

    /// How many times the world has been enumerated.
    pub fn enumeration_count(&self) -> usize {
        self.enumerations.get()
    }

    fn entity(&self, id: EntityId) -> Option<&MemoryEntity> {
        self.entities.iter().find(|e| e.id == id && e.alive)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut MemoryEntity> {
        self.entities.iter_mut().find(|e| e.id == id && e.alive)
    }

    fn live_viewpoint(&self, viewpoint: EntityId) -> Option<&MemoryViewpoint> {
        self.viewpoint
            .as_ref()
            .filter(|vp| vp.entity == viewpoint && self.is_alive(viewpoint))
    }
}

impl SceneHost for MemoryScene {
    fn enumerate_entities(&self) -> HostResult<Vec<EntityId>> {
        self.enumerations.set(self.enumerations.get() + 1);
        if self.enumeration_failing {
            return Err(HostError::EnumerationFailed(
                "world is being unloaded".to_string(),
            ));
        }
        Ok(self
            .entities
            .iter()
            .filter(|e| e.alive)
            .map(|e| e.id)
            .collect())
    }

    fn is_alive(&self, entity: EntityId) -> bool {
        self.entity(entity).is_some()
    }

    fn is_active_in_hierarchy(&self, entity: EntityId) -> HostResult<bool> {
        self.entity(entity)
            .map(|e| e.active)
            .ok_or(HostError::InvalidEntity(entity))
    }

    fn renderable_bounds(&self, entity: EntityId) -> Option<Aabb> {
        self.entity(entity).and_then(|e| e.bounds)
    }

    fn members(&self, entity: EntityId) -> HostResult<Vec<Arc<dyn Inspect>>> {
        self.entity(entity)
            .map(|e| e.members.clone())
            .ok_or(HostError::InvalidEntity(entity))
    }

    fn primary_viewpoint(&self) -> Option<EntityId> {
        self.viewpoint.as_ref().map(|vp| vp.entity)
    }

    fn frustum(&self, viewpoint: EntityId) -> Option<Frustum> {
        let vp = self.live_viewpoint(viewpoint)?;
        Frustum::from_view_projection(&vp.camera.view_projection()?)
    }

    fn viewpoint_object(&self, viewpoint: EntityId) -> Option<Arc<dyn Inspect>> {
        self.live_viewpoint(viewpoint).map(|vp| vp.object.clone())
    }

    fn viewpoint_projection(&self, viewpoint: EntityId) -> Option<ViewpointProjection> {
        self.live_viewpoint(viewpoint).map(|vp| ViewpointProjection {
            fov_degrees: vp.camera.fov_degrees,
            far_clip: vp.camera.z_far,
        })
    }

    fn lights(&self) -> HostResult<Vec<LightSource>> {
        Ok(self.lights.clone())
    }

    fn antialiasing_level(&self) -> Option<u32> {
        self.antialiasing_level
    }

    fn quality_levels(&self) -> HostResult<QualityLevels> {
        self.quality
            .clone()
            .ok_or(HostError::Unsupported("quality levels"))
    }

    fn active_scene_name(&self) -> HostResult<String> {
        self.scene_name
            .clone()
            .ok_or(HostError::Unsupported("scene name"))
    }

    fn host_info(&self) -> HostInfo {
        self.info.clone()
    }
}

/// A [`ProcessClock`] whose reading is set by hand.
///
/// Clones share the same reading, so a test can keep one clone and hand the
/// other to the sampler.
#[derive(Debug, Clone)]
pub struct ManualClock {
    cpu_time: Rc<Cell<Option<Duration>>>,
    cores: usize,
}

impl ManualClock {
    /// Creates a clock reading zero CPU time on `cores` logical cores.
    pub fn new(cores: usize) -> Self {
        Self {
            cpu_time: Rc::new(Cell::new(Some(Duration::ZERO))),
            cores: cores.max(1),
        }
    }

    /// Sets the accumulated process CPU time.
    pub fn set_cpu_time(&self, cpu_time: Duration) {
        self.cpu_time.set(Some(cpu_time));
    }

    /// Makes the clock report that CPU time is unavailable.
    pub fn set_unavailable(&self) {
        self.cpu_time.set(None);
    }
}

impl ProcessClock for ManualClock {
    fn total_cpu_time(&mut self) -> Option<Duration> {
        self.cpu_time.get()
    }

    fn logical_core_count(&self) -> usize {
        self.cores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ShadowMode;
    use crate::host::LightKind;

    #[test]
    fn test_destroyed_entities_leave_enumeration_but_keep_handles_stale() {
        let mut scene = MemoryScene::new();
        let a = scene.spawn(true, None);
        let b = scene.spawn(true, None);
        scene.destroy(a);

        assert_eq!(scene.enumerate_entities().unwrap(), vec![b]);
        assert!(!scene.is_alive(a));
        assert_eq!(
            scene.is_active_in_hierarchy(a),
            Err(HostError::InvalidEntity(a))
        );
        assert!(scene.members(a).is_err());
    }

    #[test]
    fn test_enumeration_failure_is_counted() {
        let mut scene = MemoryScene::new();
        scene.set_enumeration_failing(true);
        assert!(scene.enumerate_entities().is_err());
        scene.set_enumeration_failing(false);
        assert!(scene.enumerate_entities().is_ok());
        assert_eq!(scene.enumeration_count(), 2);
    }

    #[test]
    fn test_camera_is_an_entity_with_a_frustum() {
        let mut scene = MemoryScene::new();
        let cam = scene.set_camera(MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z));
        assert_eq!(scene.primary_viewpoint(), Some(cam));
        assert!(scene.frustum(cam).is_some());
        assert_eq!(
            scene.viewpoint_projection(cam).map(|p| p.far_clip),
            Some(1000.0)
        );

        scene.destroy(cam);
        assert_eq!(scene.primary_viewpoint(), None);
        assert!(scene.frustum(cam).is_none());
    }

    #[test]
    fn test_optional_capabilities() {
        let mut scene = MemoryScene::new();
        assert!(scene.quality_levels().is_err());
        assert!(scene.lights().unwrap().is_empty());

        scene.add_light(LightSource {
            kind: LightKind::Directional,
            shadows: ShadowMode::Soft,
        });
        scene.set_quality_levels(1, &["Low", "High"]);
        assert_eq!(scene.lights().unwrap().len(), 1);
        assert_eq!(scene.quality_levels().unwrap().names[1], "High");
    }

    #[test]
    fn test_manual_clock_shares_reading() {
        let clock = ManualClock::new(0);
        let mut sampler_side = clock.clone();
        clock.set_cpu_time(Duration::from_millis(1500));
        assert_eq!(
            sampler_side.total_cpu_time(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(sampler_side.logical_core_count(), 1);
        clock.set_unavailable();
        assert_eq!(sampler_side.total_cpu_time(), None);
    }
}
