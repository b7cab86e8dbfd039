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

//! Graphics feature detection.
//!
//! Each feature is resolved by its own extractor, a fallback chain of probe
//! steps over the host. Extractors never see each other's results, and a
//! chain that runs out of steps yields `Unknown` for its feature alone.

use std::collections::BTreeMap;
use std::fmt;

use vigil_core::host::{LightKind, ShadowMode};
use vigil_core::telemetry::GraphicsSettingsSnapshot;
use vigil_core::{FeatureKind, FeatureReading, FeatureState, Probe};

use super::registry::{
    find_all_by_fragments, find_entity_by_fragments, inspect_post_process, read_bool,
    read_enabled_state, read_numeric, MemberMatch, ProbeContext,
};
use super::CapabilityDescriptor;

/// A feature extractor: one fallback chain producing a reading or a miss.
pub type Extractor = fn(&ProbeContext<'_>, &CapabilityDescriptor) -> Probe<FeatureReading>;

const CAMERA_MSAA_LABEL: &str = "Camera MSAA";

#[derive(Clone)]
struct Registration {
    kind: FeatureKind,
    descriptor: CapabilityDescriptor,
    extractor: Extractor,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("kind", &self.kind)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Resolves every [`FeatureKind`] into a fresh [`GraphicsSettingsSnapshot`].
#[derive(Debug, Clone)]
pub struct GraphicsFeatureDetector {
    registrations: Vec<Registration>,
}

impl GraphicsFeatureDetector {
    /// A detector with the built-in descriptor and extractor for every kind.
    pub fn new() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Like [`new`](Self::new), with the descriptors of some kinds replaced.
    pub fn with_overrides(overrides: &BTreeMap<FeatureKind, CapabilityDescriptor>) -> Self {
        let registrations = FeatureKind::ALL
            .iter()
            .map(|&kind| Registration {
                kind,
                descriptor: overrides
                    .get(&kind)
                    .cloned()
                    .unwrap_or_else(|| CapabilityDescriptor::default_for(kind)),
                extractor: default_extractor(kind),
            })
            .collect();
        Self { registrations }
    }

    /// Installs an extractor for `kind`, replacing any previous one.
    pub fn register(
        &mut self,
        kind: FeatureKind,
        descriptor: CapabilityDescriptor,
        extractor: Extractor,
    ) {
        let registration = Registration {
            kind,
            descriptor,
            extractor,
        };
        match self.registrations.iter_mut().find(|r| r.kind == kind) {
            Some(existing) => *existing = registration,
            None => self.registrations.push(registration),
        }
    }

    /// The descriptor currently used for `kind`.
    pub fn descriptor(&self, kind: FeatureKind) -> Option<&CapabilityDescriptor> {
        self.registrations
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| &r.descriptor)
    }

    /// Resolves a single feature.
    pub fn detect_one(&self, kind: FeatureKind, ctx: &ProbeContext<'_>) -> FeatureReading {
        self.registrations
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| Self::run(r, ctx))
            .unwrap_or_default()
    }

    /// Resolves every registered feature into a new snapshot.
    pub fn detect(&self, ctx: &ProbeContext<'_>) -> GraphicsSettingsSnapshot {
        GraphicsSettingsSnapshot::from_readings(
            self.registrations
                .iter()
                .map(|r| (r.kind, Self::run(r, ctx))),
        )
    }

    fn run(registration: &Registration, ctx: &ProbeContext<'_>) -> FeatureReading {
        let reading = (registration.extractor)(ctx, &registration.descriptor)
            .trace_miss(registration.kind.key())
            .unwrap_or(FeatureReading::unknown());
        log::debug!("{}: {reading}", registration.kind);
        reading
    }
}

impl Default for GraphicsFeatureDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in extractor for `kind`.
pub fn default_extractor(kind: FeatureKind) -> Extractor {
    match kind {
        FeatureKind::Antialiasing => probe_antialiasing,
        FeatureKind::Bloom | FeatureKind::Sunshafts | FeatureKind::ContrastEnhance => {
            probe_member_feature
        }
        FeatureKind::Hdr => probe_hdr,
        FeatureKind::SunShadows => probe_sun_shadows,
    }
}

/// Antialiasing: matching members (first enabled wins), then post-process
/// profiles, then the viewpoint's MSAA flag, then the global sample count.
pub fn probe_antialiasing(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
) -> Probe<FeatureReading> {
    find_all_by_fragments(ctx, descriptor)
        .and_then(|hits| first_enabled(ctx, descriptor, &hits))
        .trace_miss("antialiasing members")
        .or_else(|| profile_step(ctx, descriptor))
        .trace_miss("antialiasing profile")
        .or_else(|| {
            viewpoint_flag(ctx, descriptor).map(|on| {
                FeatureReading::from_state(FeatureState::from_bool(on))
                    .with_source(CAMERA_MSAA_LABEL)
            })
        })
        .trace_miss("viewpoint msaa")
        .or_else(|| {
            Probe::from(ctx.host.antialiasing_level()).map(|samples| {
                if samples > 0 {
                    FeatureReading::on().with_source(format!("{samples}x MSAA"))
                } else {
                    FeatureReading::off()
                }
            })
        })
}

// The first enabled member wins; with none enabled the last one seen is
// reported as off.
fn first_enabled(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
    hits: &[MemberMatch],
) -> Probe<FeatureReading> {
    let mut last_disabled = None;
    for hit in hits {
        if read_enabled_state(ctx.host, hit, &descriptor.enabled_accessor_names).is_on() {
            return Probe::Found(FeatureReading::on().with_source(hit.type_name()));
        }
        last_disabled = Some(hit);
    }
    last_disabled
        .map(|hit| FeatureReading::off().with_source(hit.type_name()))
        .into()
}

/// A feature implemented by a single member: the first matching member
/// decides, reporting its magnitude when enabled. Falls back to post-process
/// profiles when nothing matches.
pub fn probe_member_feature(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
) -> Probe<FeatureReading> {
    find_entity_by_fragments(ctx, descriptor)
        .map(|hit| member_reading(ctx, descriptor, &hit))
        .trace_miss("matching member")
        .or_else(|| profile_step(ctx, descriptor))
}

fn member_reading(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
    hit: &MemberMatch,
) -> FeatureReading {
    let state = read_enabled_state(ctx.host, hit, &descriptor.enabled_accessor_names);
    if !state.is_on() {
        return FeatureReading::off().with_source(hit.type_name());
    }
    let reading = FeatureReading::on().with_source(hit.type_name());
    match read_numeric(hit.member.as_ref(), &descriptor.magnitude_accessor_names) {
        Probe::Found(magnitude) => reading.with_magnitude(magnitude),
        Probe::NotFound | Probe::Failed(_) => reading,
    }
}

/// HDR: the viewpoint's HDR flags in order, then post-process profiles.
pub fn probe_hdr(ctx: &ProbeContext<'_>, descriptor: &CapabilityDescriptor) -> Probe<FeatureReading> {
    viewpoint_flag(ctx, descriptor)
        .map(|on| FeatureReading::from_state(FeatureState::from_bool(on)))
        .trace_miss("viewpoint hdr")
        .or_else(|| profile_step(ctx, descriptor))
}

/// Sun shadows: the first directional light casts shadows or it does not.
pub fn probe_sun_shadows(
    ctx: &ProbeContext<'_>,
    _descriptor: &CapabilityDescriptor,
) -> Probe<FeatureReading> {
    Probe::from(ctx.host.lights()).and_then(|lights| {
        lights
            .into_iter()
            .find(|light| light.kind == LightKind::Directional)
            .map(|sun| {
                FeatureReading::from_state(FeatureState::from_bool(sun.shadows != ShadowMode::None))
            })
            .into()
    })
}

fn profile_step(ctx: &ProbeContext<'_>, descriptor: &CapabilityDescriptor) -> Probe<FeatureReading> {
    match &descriptor.profile_keyword {
        Some(keyword) => inspect_post_process(ctx, keyword),
        None => Probe::NotFound,
    }
}

// Accessors that are missing, unreadable or not boolean fall through to the next name.
fn viewpoint_flag(ctx: &ProbeContext<'_>, descriptor: &CapabilityDescriptor) -> Probe<bool> {
    if descriptor.viewpoint_accessor_names.is_empty() {
        return Probe::NotFound;
    }
    match ctx.viewpoint_object() {
        Some(object) => read_bool(object.as_ref(), &descriptor.viewpoint_accessor_names),
        None => Probe::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_cache::SceneObjectCache;
    use vigil_core::host::memory::{MemoryCamera, MemoryObject, MemoryScene};
    use vigil_core::host::LightSource;
    use vigil_core::math::Vec3;

    fn detect(scene: &MemoryScene) -> GraphicsSettingsSnapshot {
        let mut cache = SceneObjectCache::new();
        cache.refresh(scene);
        let ctx = ProbeContext::new(scene, &cache, scene_viewpoint(scene));
        GraphicsFeatureDetector::new().detect(&ctx)
    }

    fn scene_viewpoint(scene: &MemoryScene) -> Option<vigil_core::EntityId> {
        use vigil_core::SceneHost;
        scene.primary_viewpoint()
    }

    #[test]
    fn test_empty_world_is_all_unknown() {
        let snapshot = detect(&MemoryScene::new());
        for kind in FeatureKind::ALL {
            assert_eq!(snapshot.get(kind).state(), FeatureState::Unknown, "{kind}");
        }
    }

    #[test]
    fn test_antialiasing_prefers_an_enabled_member() {
        let mut scene = MemoryScene::new();
        let a = scene.spawn(true, None);
        scene.attach(a, MemoryObject::new("FXAA").with_property("enabled", false));
        let b = scene.spawn(true, None);
        scene.attach(b, MemoryObject::new("SMAA").with_property("enabled", true));
        let c = scene.spawn(true, None);
        scene.attach(c, MemoryObject::new("TemporalAA").with_property("enabled", false));

        let aa = detect(&scene).get(FeatureKind::Antialiasing).clone();
        assert_eq!(aa.to_string(), "ON (SMAA)");
    }

    #[test]
    fn test_antialiasing_reports_last_disabled_member() {
        let mut scene = MemoryScene::new();
        let a = scene.spawn(true, None);
        scene.attach(a, MemoryObject::new("FXAA").with_property("enabled", false));
        let b = scene.spawn(false, None);
        scene.attach(b, MemoryObject::new("SMAA"));

        assert_eq!(
            detect(&scene).get(FeatureKind::Antialiasing).to_string(),
            "OFF (SMAA)"
        );
    }

    #[test]
    fn test_antialiasing_falls_back_to_camera_then_global_level() {
        let mut scene = MemoryScene::new();
        scene.set_camera(
            MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z)
                .with_object(MemoryObject::new("Camera").with_property("allowMSAA", true)),
        );
        scene.set_antialiasing_level(4);
        assert_eq!(
            detect(&scene).get(FeatureKind::Antialiasing).to_string(),
            "ON (Camera MSAA)"
        );

        let mut scene = MemoryScene::new();
        scene.set_antialiasing_level(8);
        assert_eq!(
            detect(&scene).get(FeatureKind::Antialiasing).to_string(),
            "ON (8x MSAA)"
        );

        scene.set_antialiasing_level(0);
        assert_eq!(detect(&scene).get(FeatureKind::Antialiasing).to_string(), "OFF");
    }

    #[test]
    fn test_bloom_reports_magnitude_only_when_on() {
        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(
            e,
            MemoryObject::new("BloomOptimized")
                .with_property("enabled", true)
                .with_field("intensity", 0.5_f32),
        );
        let bloom = detect(&scene).get(FeatureKind::Bloom).clone();
        assert_eq!(bloom.state(), FeatureState::On);
        assert_eq!(bloom.magnitude(), Some(0.5));
        assert_eq!(bloom.source_label(), Some("BloomOptimized"));

        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(
            e,
            MemoryObject::new("BloomOptimized")
                .with_property("enabled", false)
                .with_field("intensity", 0.5_f32),
        );
        let bloom = detect(&scene).get(FeatureKind::Bloom).clone();
        assert_eq!(bloom.state(), FeatureState::Off);
        assert_eq!(bloom.magnitude(), None);
    }

    #[test]
    fn test_contrast_reads_its_own_magnitude_names() {
        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(
            e,
            MemoryObject::new("ContrastEnhance").with_property("contrast", 1.5_f64),
        );
        let reading = detect(&scene).get(FeatureKind::ContrastEnhance).clone();
        assert_eq!(reading.state(), FeatureState::On);
        assert_eq!(reading.magnitude(), Some(1.5));
    }

    #[test]
    fn test_sunshafts_from_profile_when_no_member_matches() {
        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(
            e,
            MemoryObject::new("PostProcessVolume").with_object_property(
                "profile",
                MemoryObject::new("Profile").with_field("sunShaftsEnabled", true),
            ),
        );
        let reading = detect(&scene).get(FeatureKind::Sunshafts).clone();
        assert_eq!(reading.to_string(), "ON (sunShaftsEnabled)");
    }

    #[test]
    fn test_hdr_flags_in_order() {
        let mut scene = MemoryScene::new();
        scene.set_camera(
            MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z)
                .with_object(MemoryObject::new("Camera").with_property("hdr", false)),
        );
        assert_eq!(detect(&scene).get(FeatureKind::Hdr).state(), FeatureState::Off);

        scene.set_camera(
            MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z).with_object(
                MemoryObject::new("Camera")
                    .with_property("allowHDR", true)
                    .with_property("hdr", false),
            ),
        );
        assert_eq!(detect(&scene).get(FeatureKind::Hdr).state(), FeatureState::On);
    }

    #[test]
    fn test_hdr_skips_unusable_allow_flag() {
        let mut scene = MemoryScene::new();
        scene.set_camera(
            MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z).with_object(
                MemoryObject::new("Camera")
                    .with_property("allowHDR", "Platform default")
                    .with_property("hdr", true),
            ),
        );
        assert_eq!(detect(&scene).get(FeatureKind::Hdr).state(), FeatureState::On);

        scene.set_camera(
            MemoryCamera::looking_at(Vec3::ZERO, Vec3::NEG_Z).with_object(
                MemoryObject::new("Camera").with_throwing_property("allowHDR", "not initialised"),
            ),
        );
        assert_eq!(
            detect(&scene).get(FeatureKind::Hdr).state(),
            FeatureState::Unknown
        );
    }

    #[test]
    fn test_sun_shadows_use_first_directional_light() {
        let mut scene = MemoryScene::new();
        scene.add_light(LightSource {
            kind: LightKind::Point,
            shadows: ShadowMode::Soft,
        });
        assert_eq!(
            detect(&scene).get(FeatureKind::SunShadows).state(),
            FeatureState::Unknown
        );

        scene.add_light(LightSource {
            kind: LightKind::Directional,
            shadows: ShadowMode::None,
        });
        scene.add_light(LightSource {
            kind: LightKind::Directional,
            shadows: ShadowMode::Hard,
        });
        assert_eq!(
            detect(&scene).get(FeatureKind::SunShadows).state(),
            FeatureState::Off
        );
    }

    #[test]
    fn test_failing_member_does_not_affect_other_features() {
        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(
            e,
            MemoryObject::new("BloomOptimized")
                .with_throwing_property("enabled", "disposed")
                .with_throwing_property("intensity", "disposed"),
        );
        scene.add_light(LightSource {
            kind: LightKind::Directional,
            shadows: ShadowMode::Soft,
        });

        let snapshot = detect(&scene);
        // Enabled falls back to the active flag; magnitude is simply absent.
        assert_eq!(snapshot.get(FeatureKind::Bloom).to_string(), "ON (BloomOptimized)");
        assert_eq!(snapshot.get(FeatureKind::SunShadows).state(), FeatureState::On);
    }

    #[test]
    fn test_register_replaces_extractor() {
        fn always_on(_: &ProbeContext<'_>, _: &CapabilityDescriptor) -> Probe<FeatureReading> {
            Probe::Found(FeatureReading::on())
        }

        let scene = MemoryScene::new();
        let cache = SceneObjectCache::new();
        let ctx = ProbeContext::new(&scene, &cache, None);
        let mut detector = GraphicsFeatureDetector::new();
        detector.register(FeatureKind::Hdr, CapabilityDescriptor::default(), always_on);

        assert_eq!(detector.detect_one(FeatureKind::Hdr, &ctx).state(), FeatureState::On);
        assert_eq!(detector.descriptor(FeatureKind::Hdr), Some(&CapabilityDescriptor::default()));
        assert_eq!(
            detector.detect(&ctx).get(FeatureKind::Bloom).state(),
            FeatureState::Unknown
        );
    }

    #[test]
    fn test_overrides_replace_default_descriptor() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            FeatureKind::Sunshafts,
            CapabilityDescriptor {
                name_fragments: vec!["lightbeam".to_string()],
                enabled_accessor_names: vec!["enabled".to_string()],
                ..Default::default()
            },
        );

        let mut scene = MemoryScene::new();
        let e = scene.spawn(true, None);
        scene.attach(e, MemoryObject::new("LightBeamFx"));
        let mut cache = SceneObjectCache::new();
        cache.refresh(&scene);
        let ctx = ProbeContext::new(&scene, &cache, None);

        let detector = GraphicsFeatureDetector::with_overrides(&overrides);
        assert_eq!(
            detector.detect_one(FeatureKind::Sunshafts, &ctx).to_string(),
            "ON (LightBeamFx)"
        );
    }
}
