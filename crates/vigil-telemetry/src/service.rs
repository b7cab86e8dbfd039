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

//! Service driving every sampler from the host's frame callback.

use std::time::Duration;

use vigil_core::telemetry::{
    BasicGraphicsInfo, EnvironmentInfo, GraphicsSettingsSnapshot, PerformanceSnapshot,
    SystemIdentity,
};
use vigil_core::{ProcessClock, SceneHost};

use crate::config::{ConfigError, DiagnosticsConfig};
use crate::cpu::CpuLoadSampler;
use crate::fps::FpsAggregator;
use crate::probe::{GraphicsFeatureDetector, ProbeContext};
use crate::scene_cache::{SceneObjectCache, ViewpointRef};
use crate::visibility::VisibilityCounter;

const UNKNOWN: &str = "Unknown";

/// The two clocks of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    /// Real time since the previous frame, unaffected by time scaling.
    pub unscaled: Duration,
    /// Simulation time since the previous frame.
    pub scaled: Duration,
}

impl FrameTiming {
    /// A frame where both clocks advanced by `delta`.
    pub fn uniform(delta: Duration) -> Self {
        Self {
            unscaled: delta,
            scaled: delta,
        }
    }
}

/// Owns the samplers and publishes their results as snapshots.
///
/// Call [`on_load`](Self::on_load) once, [`tick`](Self::tick) every frame and
/// [`refresh`](Self::refresh) whenever the user asks for a rescan. All calls
/// come from the host's frame callback; nothing here blocks or spawns.
#[derive(Debug)]
pub struct DiagnosticsService {
    config: DiagnosticsConfig,
    cache: SceneObjectCache,
    viewpoint: ViewpointRef,
    fps: FpsAggregator,
    visibility: VisibilityCounter,
    cpu: CpuLoadSampler,
    detector: GraphicsFeatureDetector,
    performance: PerformanceSnapshot,
    graphics: GraphicsSettingsSnapshot,
    basic_graphics: BasicGraphicsInfo,
    environment: EnvironmentInfo,
}

impl DiagnosticsService {
    /// Creates a service after validating `config`.
    pub fn new(
        config: DiagnosticsConfig,
        clock: Box<dyn ProcessClock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            cache: SceneObjectCache::new(),
            viewpoint: ViewpointRef::new(),
            fps: FpsAggregator::new(config.frame_window()),
            visibility: VisibilityCounter::new(config.visibility_window()),
            cpu: CpuLoadSampler::new(clock, config.cpu_window()),
            detector: GraphicsFeatureDetector::with_overrides(&config.capability_overrides),
            performance: PerformanceSnapshot::default(),
            graphics: GraphicsSettingsSnapshot::new(),
            basic_graphics: BasicGraphicsInfo::default(),
            environment: EnvironmentInfo::default(),
            config,
        })
    }

    /// Sets the CPU and OS identification shown in the environment info.
    pub fn with_system_identity(mut self, system: SystemIdentity) -> Self {
        self.environment.system = system;
        self
    }

    /// Takes the initial scene snapshot and identification strings.
    pub fn on_load(&mut self, host: &dyn SceneHost) {
        log::info!("Diagnostics service loading");

        let info = host.host_info();
        self.environment.engine_version = info.engine_version;
        self.environment.gpu_name = info.gpu_name;
        self.environment.loader_version = info.loader_version;
        self.environment.loaded_plugins = info.loaded_plugins;
        self.environment.scene_name = scene_name(host);

        self.cache.refresh(host);
        self.populate_basic_graphics(host);
        self.cpu.rebaseline();
        if self.config.detect_on_load {
            self.detect_features(host);
        }
        self.publish_performance();

        log::info!(
            "Diagnostics ready: scene '{}', {} entities cached",
            self.environment.scene_name,
            self.cache.len()
        );
    }

    /// Advances every sampler by one frame.
    pub fn tick(&mut self, host: &dyn SceneHost, timing: FrameTiming) {
        if let Some(fps) = self.fps.tick(timing.unscaled) {
            log::trace!("FPS window closed at {fps:.1}");
        }

        self.environment.scene_name = scene_name(host);

        self.cache.ensure(host);

        if let Some(visible) =
            self.visibility
                .tick(timing.scaled, host, &self.cache, &mut self.viewpoint)
        {
            log::trace!("Visibility window closed: {visible} visible");
        }
        self.cpu.tick(timing.scaled);

        if let Some(projection) = self
            .viewpoint
            .acquire(host)
            .and_then(|vp| host.viewpoint_projection(vp))
        {
            self.basic_graphics.fov_degrees = projection.fov_degrees;
            self.basic_graphics.draw_distance = projection.far_clip;
        }

        self.publish_performance();
    }

    /// Re-enumerates the world and re-runs every feature probe.
    pub fn refresh(&mut self, host: &dyn SceneHost) {
        log::info!("Refreshing graphics diagnostics");
        self.cache.refresh(host);
        self.populate_basic_graphics(host);
        self.detect_features(host);
        self.publish_performance();
    }

    /// Forgets the FPS extremes seen so far.
    pub fn reset_fps_bounds(&mut self) {
        self.fps.reset_bounds();
        self.publish_performance();
    }

    /// Frame, visibility and CPU figures.
    pub fn performance(&self) -> &PerformanceSnapshot {
        &self.performance
    }

    /// The feature readings from the last detection.
    pub fn graphics(&self) -> &GraphicsSettingsSnapshot {
        &self.graphics
    }

    /// Quality preset and viewpoint parameters.
    pub fn basic_graphics(&self) -> &BasicGraphicsInfo {
        &self.basic_graphics
    }

    /// Host and machine identification.
    pub fn environment(&self) -> &EnvironmentInfo {
        &self.environment
    }

    /// The configuration in use.
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// The cached world snapshot.
    pub fn scene_cache(&self) -> &SceneObjectCache {
        &self.cache
    }

    fn detect_features(&mut self, host: &dyn SceneHost) {
        let viewpoint = self.viewpoint.acquire(host);
        let ctx = ProbeContext::new(host, &self.cache, viewpoint);
        self.graphics = self.detector.detect(&ctx);
    }

    fn populate_basic_graphics(&mut self, host: &dyn SceneHost) {
        let (index, name) = quality_preset(host);
        self.basic_graphics.quality_index = index;
        self.basic_graphics.quality_name = name;

        let projection = self
            .viewpoint
            .acquire(host)
            .and_then(|vp| host.viewpoint_projection(vp));
        match projection {
            Some(projection) => {
                self.basic_graphics.fov_degrees = projection.fov_degrees;
                self.basic_graphics.draw_distance = projection.far_clip;
            }
            None => {
                self.basic_graphics.fov_degrees = 0.0;
                self.basic_graphics.draw_distance = 0.0;
            }
        }
    }

    fn publish_performance(&mut self) {
        self.performance = PerformanceSnapshot {
            fps: self.fps.fps(),
            min_fps: self.fps.min_fps(),
            max_fps: self.fps.max_fps(),
            frametime_ms: self.fps.frametime_ms(),
            visible_count: self.visibility.visible(),
            loaded_count: self.cache.len(),
            cpu_percent: self.cpu.usage(),
        };
    }
}

fn scene_name(host: &dyn SceneHost) -> String {
    host.active_scene_name().unwrap_or_else(|_| UNKNOWN.to_string())
}

fn quality_preset(host: &dyn SceneHost) -> (i32, String) {
    match host.quality_levels() {
        Ok(levels) => {
            let name = usize::try_from(levels.current)
                .ok()
                .and_then(|i| levels.names.get(i));
            match name {
                Some(name) => (levels.current, name.clone()),
                None => {
                    log::debug!(
                        "Quality index {} outside {} presets",
                        levels.current,
                        levels.names.len()
                    );
                    (-1, UNKNOWN.to_string())
                }
            }
        }
        Err(e) => {
            log::debug!("Quality presets unavailable: {e}");
            (-1, UNKNOWN.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::host::memory::{ManualClock, MemoryCamera, MemoryScene};
    use vigil_core::host::HostInfo;
    use vigil_core::math::Vec3;
    use vigil_core::{FeatureKind, FeatureState};

    fn service() -> DiagnosticsService {
        DiagnosticsService::new(DiagnosticsConfig::default(), Box::new(ManualClock::new(4))).unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = DiagnosticsConfig {
            cpu_window_secs: -1.0,
            ..Default::default()
        };
        assert!(DiagnosticsService::new(config, Box::new(ManualClock::new(1))).is_err());
    }

    #[test]
    fn test_window_beyond_duration_range_is_rejected() {
        let config = DiagnosticsConfig {
            visibility_window_secs: 1e30,
            ..Default::default()
        };
        assert!(matches!(
            DiagnosticsService::new(config, Box::new(ManualClock::new(1))),
            Err(ConfigError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_cpu_baseline_is_taken_on_load() {
        let scene = MemoryScene::new();
        let clock = ManualClock::new(1);
        let mut service =
            DiagnosticsService::new(DiagnosticsConfig::default(), Box::new(clock.clone())).unwrap();

        // Work done between construction and load is not sampled.
        clock.set_cpu_time(Duration::from_secs(4));
        service.on_load(&scene);

        clock.set_cpu_time(Duration::from_millis(4_500));
        service.tick(&scene, FrameTiming::uniform(Duration::from_secs(1)));
        approx::assert_relative_eq!(service.performance().cpu_percent, 50.0, epsilon = 1e-3);
        assert_eq!(service.config().cpu_window(), Duration::from_secs(1));
    }

    #[test]
    fn test_on_load_collects_environment() {
        let mut scene = MemoryScene::new();
        scene.set_scene_name("Harbor");
        scene.set_host_info(HostInfo {
            engine_version: "2022.3.5f1".to_string(),
            gpu_name: "RTX 3070".to_string(),
            loader_version: "6.0.0".to_string(),
            loaded_plugins: 3,
        });

        let mut service = service()
            .with_system_identity(SystemIdentity::from_raw("Ryzen 7", "Windows 10 (10.0.22631)"));
        service.on_load(&scene);

        let env = service.environment();
        assert_eq!(env.scene_name, "Harbor");
        assert_eq!(env.gpu_name, "RTX 3070");
        assert_eq!(env.loaded_plugins, 3);
        assert_eq!(env.system.os_name, "Windows 11 64-bit");
    }

    #[test]
    fn test_scene_name_is_reread_every_tick() {
        let mut scene = MemoryScene::new();
        let mut service = service();
        service.on_load(&scene);
        assert_eq!(service.environment().scene_name, "Unknown");

        scene.set_scene_name("Docks");
        service.tick(&scene, FrameTiming::uniform(Duration::from_millis(16)));
        assert_eq!(service.environment().scene_name, "Docks");
    }

    #[test]
    fn test_quality_preset_out_of_range_is_unknown() {
        let mut scene = MemoryScene::new();
        scene.set_quality_levels(5, &["Low", "High"]);
        let mut service = service();
        service.on_load(&scene);
        assert_eq!(service.basic_graphics().quality_index, -1);
        assert_eq!(service.basic_graphics().quality_name, "Unknown");

        scene.set_quality_levels(1, &["Low", "High"]);
        service.refresh(&scene);
        assert_eq!(service.basic_graphics().quality_index, 1);
        assert_eq!(service.basic_graphics().quality_name, "High");
    }

    #[test]
    fn test_projection_follows_viewpoint() {
        let mut scene = MemoryScene::new();
        let mut camera = MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z);
        camera.fov_degrees = 75.0;
        camera.z_far = 500.0;
        scene.set_camera(camera);

        let mut service = service();
        service.on_load(&scene);
        assert_eq!(service.basic_graphics().fov_degrees, 75.0);
        assert_eq!(service.basic_graphics().draw_distance, 500.0);

        let mut wider = MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z);
        wider.fov_degrees = 90.0;
        scene.set_camera(wider);
        service.tick(&scene, FrameTiming::uniform(Duration::from_millis(16)));
        assert_eq!(service.basic_graphics().fov_degrees, 90.0);
    }

    #[test]
    fn test_detection_can_be_deferred_until_refresh() {
        let mut scene = MemoryScene::new();
        scene.set_antialiasing_level(4);
        let config = DiagnosticsConfig {
            detect_on_load: false,
            ..Default::default()
        };
        let mut service = DiagnosticsService::new(config, Box::new(ManualClock::new(1))).unwrap();

        service.on_load(&scene);
        assert_eq!(
            service.graphics().get(FeatureKind::Antialiasing).state(),
            FeatureState::Unknown
        );

        service.refresh(&scene);
        assert_eq!(
            service.graphics().get(FeatureKind::Antialiasing).state(),
            FeatureState::On
        );
    }
}
