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

//! Lookup primitives shared by every feature probe.
//!
//! None of these functions return errors: a member that cannot be read is
//! simply skipped, and an exhausted search is reported as [`Probe::NotFound`]
//! so the caller can move on to its next fallback.

use std::sync::Arc;

use vigil_core::{EntityId, FeatureReading, FeatureState, Inspect, MemberValue, Probe, SceneHost};

use super::CapabilityDescriptor;
use crate::scene_cache::SceneObjectCache;

/// Type-name fragment identifying post-process volumes.
const POST_PROCESS_FRAGMENT: &str = "postprocess";

/// Accessor holding a post-process volume's profile object.
const PROFILE_ACCESSOR: &str = "profile";

/// Everything a probe may look at during one detection pass.
#[derive(Clone, Copy)]
pub struct ProbeContext<'a> {
    /// The host world.
    pub host: &'a dyn SceneHost,
    /// Cached entity handles to search.
    pub cache: &'a SceneObjectCache,
    /// The primary viewpoint, if one is known.
    pub viewpoint: Option<EntityId>,
}

impl<'a> ProbeContext<'a> {
    /// Bundles the inputs of a detection pass.
    pub fn new(
        host: &'a dyn SceneHost,
        cache: &'a SceneObjectCache,
        viewpoint: Option<EntityId>,
    ) -> Self {
        Self {
            host,
            cache,
            viewpoint,
        }
    }

    /// The primary viewpoint's inspectable object.
    pub fn viewpoint_object(&self) -> Option<Arc<dyn Inspect>> {
        self.viewpoint.and_then(|vp| self.host.viewpoint_object(vp))
    }

    // Live members in entity order, then member order. Entities whose members
    // cannot be listed are skipped.
    fn members(&self) -> impl Iterator<Item = MemberMatch> + 'a {
        let host = self.host;
        let cache = self.cache;
        cache.live(host).flat_map(move |entity| {
            host.members(entity)
                .unwrap_or_else(|e| {
                    log::trace!("Skipping members of {entity}: {e}");
                    Vec::new()
                })
                .into_iter()
                .map(move |member| MemberMatch { entity, member })
        })
    }
}

/// A member found on a live entity.
#[derive(Debug, Clone)]
pub struct MemberMatch {
    /// The entity carrying the member.
    pub entity: EntityId,
    /// The member itself.
    pub member: Arc<dyn Inspect>,
}

impl MemberMatch {
    /// The member's type name.
    pub fn type_name(&self) -> &str {
        self.member.type_name()
    }
}

/// First member, in enumeration order, whose type name matches the descriptor.
///
/// Enabled state plays no part in the choice.
pub fn find_entity_by_fragments(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
) -> Probe<MemberMatch> {
    if !ctx.cache.is_valid() {
        return Probe::failed("scene cache is not populated");
    }
    ctx.members()
        .find(|m| descriptor.matches_type(m.type_name()))
        .into()
}

/// Every matching member, in enumeration order.
pub fn find_all_by_fragments(
    ctx: &ProbeContext<'_>,
    descriptor: &CapabilityDescriptor,
) -> Probe<Vec<MemberMatch>> {
    if !ctx.cache.is_valid() {
        return Probe::failed("scene cache is not populated");
    }
    let matches: Vec<_> = ctx
        .members()
        .filter(|m| descriptor.matches_type(m.type_name()))
        .collect();
    if matches.is_empty() {
        Probe::NotFound
    } else {
        Probe::Found(matches)
    }
}

/// Reads the first boolean among `names`, property before field for each name.
pub fn read_bool(member: &dyn Inspect, names: &[String]) -> Probe<bool> {
    for name in names {
        let value = member.property(name).or_else(|| member.field(name));
        if let Probe::Found(MemberValue::Bool(b)) = value {
            return Probe::Found(b);
        }
    }
    Probe::NotFound
}

/// Whether a matched member is enabled.
///
/// Tries the descriptor's boolean accessors, then falls back to the owning
/// entity's hierarchical active flag. `Unknown` only when both are unreadable.
pub fn read_enabled_state(
    host: &dyn SceneHost,
    hit: &MemberMatch,
    accessor_names: &[String],
) -> FeatureState {
    if let Probe::Found(enabled) = read_bool(hit.member.as_ref(), accessor_names) {
        return FeatureState::from_bool(enabled);
    }
    match host.is_active_in_hierarchy(hit.entity) {
        Ok(active) => FeatureState::from_bool(active),
        Err(e) => {
            log::trace!("Enabled state of {} unreadable: {e}", hit.type_name());
            FeatureState::Unknown
        }
    }
}

/// The first accessor among `names` that coerces to a number.
///
/// Each name is tried as a property, then as a field. `NotFound` when no
/// candidate coerces; callers pick their own fallback.
pub fn read_numeric(member: &dyn Inspect, names: &[String]) -> Probe<f32> {
    for name in names {
        for value in [member.property(name), member.field(name)] {
            if let Some(number) = value.found().and_then(|v| v.coerce_f32()) {
                return Probe::Found(number);
            }
        }
    }
    Probe::NotFound
}

/// Searches post-process profiles for an entry whose name contains `keyword`.
///
/// Every live member whose type name contains `postprocess` is asked for its
/// `profile` (property, then field). The profile's fields are scanned before
/// its properties; the first entry that converts to a reading wins.
pub fn inspect_post_process(ctx: &ProbeContext<'_>, keyword: &str) -> Probe<FeatureReading> {
    if !ctx.cache.is_valid() {
        return Probe::failed("scene cache is not populated");
    }
    let keyword = keyword.to_lowercase();

    for volume in ctx
        .members()
        .filter(|m| m.type_name().to_lowercase().contains(POST_PROCESS_FRAGMENT))
    {
        let profile = volume
            .member
            .property(PROFILE_ACCESSOR)
            .or_else(|| volume.member.field(PROFILE_ACCESSOR));
        let Probe::Found(MemberValue::Object(profile)) = profile else {
            continue;
        };

        let fields = profile.field_names().into_iter().map(|name| (name, true));
        let properties = profile.property_names().into_iter().map(|name| (name, false));

        for (name, is_field) in fields.chain(properties) {
            if !name.to_lowercase().contains(&keyword) {
                continue;
            }
            let value = if is_field {
                Probe::from(profile.read_field(&name))
            } else {
                Probe::from(profile.read_property(&name))
            };
            if let Some(reading) = value.found().and_then(|v| reading_from_value(&v, &name)) {
                log::trace!("Profile entry '{name}' on {} resolved {keyword}", volume.type_name());
                return Probe::Found(reading);
            }
        }
    }
    Probe::NotFound
}

const OFF_WORDS: [&str; 5] = ["off", "none", "disabled", "false", "0"];
const ON_WORDS: [&str; 3] = ["on", "enabled", "true"];

/// Converts a profile entry into a reading, or `None` if it says nothing useful.
///
/// Booleans give the state directly, numbers mean enabled with that strength,
/// nested objects are asked for their `enabled` flag, and text is matched
/// against on/off words before being used as the source label.
fn reading_from_value(value: &MemberValue, name: &str) -> Option<FeatureReading> {
    match value {
        MemberValue::Null => None,
        MemberValue::Bool(b) => {
            Some(FeatureReading::from_state(FeatureState::from_bool(*b)).with_source(name))
        }
        MemberValue::Float(_) | MemberValue::Double(_) | MemberValue::Int(_) => value
            .coerce_f32()
            .map(|m| FeatureReading::on().with_source(name).with_magnitude(m)),
        MemberValue::Text(text) | MemberValue::Enum(text) => {
            let lowered = text.trim().to_lowercase();
            if OFF_WORDS.contains(&lowered.as_str()) {
                Some(FeatureReading::off().with_source(name))
            } else if ON_WORDS.contains(&lowered.as_str()) {
                Some(FeatureReading::on().with_source(name))
            } else if lowered.is_empty() {
                None
            } else {
                Some(FeatureReading::on().with_source(text.trim()))
            }
        }
        MemberValue::Object(nested) => read_bool(nested.as_ref(), &["enabled".to_string()])
            .found()
            .map(|on| {
                FeatureReading::from_state(FeatureState::from_bool(on))
                    .with_source(nested.type_name())
            }),
    }
}
