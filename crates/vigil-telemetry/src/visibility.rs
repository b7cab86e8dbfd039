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

//! Frustum-based visible entity counting.

use std::time::Duration;

use vigil_core::SceneHost;

use crate::scene_cache::{SceneObjectCache, ViewpointRef};
use crate::window::MetricWindow;

/// Counts cached entities whose renderable bounds intersect the primary
/// viewpoint's frustum, once per window.
#[derive(Debug, Clone)]
pub struct VisibilityCounter {
    window: MetricWindow,
    visible: usize,
}

impl VisibilityCounter {
    /// Creates a counter emitting every `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            window: MetricWindow::new(window),
            visible: 0,
        }
    }

    /// Advances the window; recounts when it closes and returns the new count.
    pub fn tick(
        &mut self,
        delta: Duration,
        host: &dyn SceneHost,
        cache: &SceneObjectCache,
        viewpoint: &mut ViewpointRef,
    ) -> Option<usize> {
        self.window.tick(delta, 0.0)?;
        Some(self.count(host, cache, viewpoint))
    }

    /// Recounts immediately.
    ///
    /// Without a viewpoint the count is zero. The frustum is extracted once per
    /// count; destroyed, inactive and non-renderable entities are skipped.
    pub fn count(
        &mut self,
        host: &dyn SceneHost,
        cache: &SceneObjectCache,
        viewpoint: &mut ViewpointRef,
    ) -> usize {
        self.visible = 0;

        let Some(entity) = viewpoint.acquire(host) else {
            return 0;
        };
        let Some(frustum) = host.frustum(entity) else {
            log::debug!("Viewpoint {entity} has no frustum; dropping it");
            viewpoint.invalidate();
            return 0;
        };

        self.visible = cache
            .live(host)
            .filter(|e| host.is_active_in_hierarchy(*e).unwrap_or(false))
            .filter_map(|e| host.renderable_bounds(e))
            .filter(|bounds| frustum.intersects_aabb(bounds))
            .count();
        log::trace!("{} of {} cached entities visible", self.visible, cache.len());
        self.visible
    }

    /// The count from the last window.
    pub fn visible(&self) -> usize {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::host::memory::{MemoryCamera, MemoryScene};
    use vigil_core::math::{Aabb, Vec3};

    fn unit_box_at(center: Vec3) -> Option<Aabb> {
        Some(Aabb::from_center_half_extents(center, Vec3::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn test_counts_only_active_renderables_in_view() {
        let mut scene = MemoryScene::new();
        scene.set_camera(MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z));
        scene.spawn(true, unit_box_at(Vec3::new(0.0, 0.0, -10.0)));
        scene.spawn(true, unit_box_at(Vec3::new(0.0, 0.0, 10.0)));
        scene.spawn(false, unit_box_at(Vec3::new(0.0, 0.0, -5.0)));
        scene.spawn(true, None);

        let mut cache = SceneObjectCache::new();
        cache.refresh(&scene);
        let mut viewpoint = ViewpointRef::new();
        let mut counter = VisibilityCounter::new(Duration::from_millis(500));

        assert_eq!(counter.count(&scene, &cache, &mut viewpoint), 1);
    }

    #[test]
    fn test_no_viewpoint_counts_zero() {
        let mut scene = MemoryScene::new();
        scene.spawn(true, unit_box_at(Vec3::new(0.0, 0.0, -10.0)));
        let mut cache = SceneObjectCache::new();
        cache.refresh(&scene);

        let mut counter = VisibilityCounter::new(Duration::from_millis(500));
        assert_eq!(counter.count(&scene, &cache, &mut ViewpointRef::new()), 0);
    }

    #[test]
    fn test_count_only_happens_when_window_closes() {
        let mut scene = MemoryScene::new();
        scene.set_camera(MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z));
        scene.spawn(true, unit_box_at(Vec3::new(0.0, 0.0, -10.0)));
        let mut cache = SceneObjectCache::new();
        cache.refresh(&scene);
        let mut viewpoint = ViewpointRef::new();
        let mut counter = VisibilityCounter::new(Duration::from_millis(500));

        let step = Duration::from_millis(250);
        assert_eq!(counter.tick(step, &scene, &cache, &mut viewpoint), None);
        assert_eq!(counter.tick(step, &scene, &cache, &mut viewpoint), Some(1));
    }

    #[test]
    fn test_deactivation_between_windows_is_seen() {
        let mut scene = MemoryScene::new();
        scene.set_camera(MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z));
        let near = scene.spawn(true, unit_box_at(Vec3::new(0.0, 0.0, -10.0)));
        scene.spawn(true, unit_box_at(Vec3::new(1.0, 0.0, -12.0)));
        let mut cache = SceneObjectCache::new();
        cache.refresh(&scene);
        let mut viewpoint = ViewpointRef::new();
        let mut counter = VisibilityCounter::new(Duration::from_millis(500));
        let window = Duration::from_millis(500);

        assert_eq!(counter.tick(window, &scene, &cache, &mut viewpoint), Some(2));

        scene.set_active(near, false);
        assert_eq!(counter.tick(window, &scene, &cache, &mut viewpoint), Some(1));

        scene.set_active(near, true);
        assert_eq!(counter.tick(window, &scene, &cache, &mut viewpoint), Some(2));
    }
}
