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

// Vigil Sandbox
// Drives the diagnostics service against a synthetic world.
//
// Usage: sandbox [config.json]

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use vigil_core::host::memory::{MemoryCamera, MemoryObject, MemoryScene};
use vigil_core::host::{HostInfo, LightKind, LightSource, ShadowMode};
use vigil_core::math::{Aabb, Vec3};
use vigil_core::EntityId;
use vigil_infra::{detect_system_identity, SysinfoProcessClock};
use vigil_telemetry::{DiagnosticsConfig, DiagnosticsService, FrameTiming};

const FRAMES: u32 = 180;
const TARGET_FRAME: Duration = Duration::from_millis(16);

/// A small harbour scene: a camera, a grid of crates, some post effects.
///
/// Also returns the crates spawned inactive.
fn build_scene() -> (MemoryScene, Vec<EntityId>) {
    let mut scene = MemoryScene::new();
    scene.set_scene_name("Harbor");
    scene.set_host_info(HostInfo {
        engine_version: "2022.3.5f1".to_string(),
        gpu_name: "Synthetic GPU".to_string(),
        loader_version: "6.0.0".to_string(),
        loaded_plugins: 2,
    });
    scene.set_quality_levels(2, &["Low", "Medium", "High", "Ultra"]);
    scene.set_antialiasing_level(4);

    scene.set_camera(
        MemoryCamera::looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, -1.0))
            .with_object(MemoryObject::new("Camera").with_property("allowHDR", true)),
    );

    // Crates in front of and behind the camera; every third one is hidden.
    let mut hidden = Vec::new();
    for i in 0..60 {
        let x = (i % 10) as f32 * 3.0 - 15.0;
        let z = if i < 40 { -5.0 - (i / 10) as f32 * 8.0 } else { 20.0 };
        let bounds = Aabb::from_center_half_extents(Vec3::new(x, 0.5, z), Vec3::ONE * 0.5);
        let entity = scene.spawn(i % 3 != 0, Some(bounds));
        if i % 3 == 0 {
            hidden.push(entity);
        }
    }

    let fx = scene.spawn(true, None);
    scene.attach(
        fx,
        MemoryObject::new("BloomOptimized")
            .with_property("enabled", true)
            .with_field("intensity", 0.65_f32),
    );
    scene.attach(fx, MemoryObject::new("SunShafts").with_property("enabled", false));

    let volume = scene.spawn(true, None);
    scene.attach(
        volume,
        MemoryObject::new("PostProcessVolume").with_object_property(
            "profile",
            MemoryObject::new("PostProcessProfile").with_field("contrastAmount", 1.2_f32),
        ),
    );

    scene.add_light(LightSource {
        kind: LightKind::Directional,
        shadows: ShadowMode::Soft,
    });
    (scene, hidden)
}

fn log_snapshots(service: &DiagnosticsService) -> Result<()> {
    let perf = service.performance();
    log::info!(
        "FPS {:.1} (min {:.1}, max {:.1}) | {:.2} ms | visible {}/{} | CPU {:.1}%",
        perf.fps,
        perf.min_fps,
        perf.max_fps,
        perf.frametime_ms,
        perf.visible_count,
        perf.loaded_count,
        perf.cpu_percent
    );
    for (kind, reading) in service.graphics().iter() {
        log::info!("  {kind}: {reading}");
    }
    log::debug!("{}", serde_json::to_string_pretty(service.basic_graphics())?);
    log::debug!("{}", serde_json::to_string_pretty(service.environment())?);
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => DiagnosticsConfig::from_file(path)?,
        None => DiagnosticsConfig::default(),
    };

    let (mut scene, hidden) = build_scene();
    let mut service = DiagnosticsService::new(config, Box::new(SysinfoProcessClock::new()))?
        .with_system_identity(detect_system_identity());
    service.on_load(&scene);
    log_snapshots(&service)?;

    let mut last = Instant::now();
    for frame in 0..FRAMES {
        // Burn a little CPU so the sampler has something to measure.
        let work_until = Instant::now() + TARGET_FRAME / 4;
        while Instant::now() < work_until {
            std::hint::spin_loop();
        }
        thread::sleep(TARGET_FRAME.saturating_sub(last.elapsed()));

        let now = Instant::now();
        let delta = now - last;
        last = now;
        service.tick(&scene, FrameTiming::uniform(delta));

        if frame == FRAMES / 2 {
            log::info!("Unloading the hidden crates and refreshing");
            for &entity in &hidden {
                scene.destroy(entity);
            }
            scene.set_scene_name("Harbor (night)");
            service.refresh(&scene);
        }
        if frame % 60 == 59 {
            log_snapshots(&service)?;
        }
    }

    Ok(())
}
