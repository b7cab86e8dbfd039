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

//! Declarative descriptions of where a feature's evidence lives.

use serde::{Deserialize, Serialize};
use vigil_core::FeatureKind;

/// The names a probe looks for when resolving one feature.
///
/// Every match is case-insensitive. Name fragments are matched as substrings
/// of member type names; accessor names are matched whole.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityDescriptor {
    /// Substrings identifying a member type that implements the feature.
    pub name_fragments: Vec<String>,
    /// Boolean accessors on a matched member that tell whether it is enabled.
    pub enabled_accessor_names: Vec<String>,
    /// Numeric accessors giving the effect's strength, tried in order.
    pub magnitude_accessor_names: Vec<String>,
    /// Boolean accessors on the primary viewpoint object, tried in order.
    pub viewpoint_accessor_names: Vec<String>,
    /// Keyword looked up in post-process profiles when no member matches.
    pub profile_keyword: Option<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl CapabilityDescriptor {
    /// The built-in descriptor for `kind`.
    pub fn default_for(kind: FeatureKind) -> Self {
        let enabled = names(&["enabled"]);
        match kind {
            FeatureKind::Antialiasing => Self {
                name_fragments: names(&[
                    "fxaa",
                    "taa",
                    "smaa",
                    "antialias",
                    "temporal",
                    "postprocess",
                    "postprocessing",
                    "msaa",
                ]),
                enabled_accessor_names: enabled,
                magnitude_accessor_names: Vec::new(),
                viewpoint_accessor_names: names(&["allowMSAA"]),
                profile_keyword: Some("antialias".to_string()),
            },
            FeatureKind::Bloom => Self {
                name_fragments: names(&[
                    "bloom",
                    "bloomcomponent",
                    "postprocess",
                    "postprocessvolume",
                    "postprocessing",
                ]),
                enabled_accessor_names: enabled,
                magnitude_accessor_names: names(&[
                    "intensity",
                    "threshold",
                    "strength",
                    "weight",
                    "amount",
                ]),
                viewpoint_accessor_names: Vec::new(),
                profile_keyword: Some("bloom".to_string()),
            },
            FeatureKind::Sunshafts => Self {
                name_fragments: names(&["sunshaft", "sunshafts", "godrays", "volumetric", "shafts"]),
                enabled_accessor_names: enabled,
                magnitude_accessor_names: Vec::new(),
                viewpoint_accessor_names: Vec::new(),
                profile_keyword: Some("sunshaft".to_string()),
            },
            FeatureKind::ContrastEnhance => Self {
                name_fragments: names(&["contrastenhance", "contrast", "contrast_enhance"]),
                enabled_accessor_names: enabled,
                magnitude_accessor_names: names(&["amount", "intensity", "strength", "contrast"]),
                viewpoint_accessor_names: Vec::new(),
                profile_keyword: Some("contrast".to_string()),
            },
            FeatureKind::Hdr => Self {
                name_fragments: Vec::new(),
                enabled_accessor_names: Vec::new(),
                magnitude_accessor_names: Vec::new(),
                viewpoint_accessor_names: names(&["allowHDR", "hdr"]),
                profile_keyword: Some("hdr".to_string()),
            },
            FeatureKind::SunShadows => Self::default(),
        }
    }

    /// `true` if `type_name` contains any name fragment, ignoring case.
    pub fn matches_type(&self, type_name: &str) -> bool {
        let type_name = type_name.to_lowercase();
        self.name_fragments
            .iter()
            .any(|fragment| !fragment.is_empty() && type_name.contains(&fragment.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_matching_ignores_case() {
        let bloom = CapabilityDescriptor::default_for(FeatureKind::Bloom);
        assert!(bloom.matches_type("BloomOptimized"));
        assert!(bloom.matches_type("UnityEngine.Rendering.PostProcessVolume"));
        assert!(!bloom.matches_type("MeshRenderer"));
    }

    #[test]
    fn test_empty_fragment_matches_nothing() {
        let descriptor = CapabilityDescriptor {
            name_fragments: vec![String::new()],
            ..Default::default()
        };
        assert!(!descriptor.matches_type("Anything"));
    }

    #[test]
    fn test_partial_override_keeps_other_lists_empty() {
        let descriptor: CapabilityDescriptor =
            serde_json::from_str(r#"{ "name_fragments": ["lensflare"] }"#).unwrap();
        assert_eq!(descriptor.name_fragments, vec!["lensflare".to_string()]);
        assert!(descriptor.enabled_accessor_names.is_empty());
        assert_eq!(descriptor.profile_keyword, None);
    }

    #[test]
    fn test_sun_shadows_needs_no_names() {
        assert_eq!(
            CapabilityDescriptor::default_for(FeatureKind::SunShadows),
            CapabilityDescriptor::default()
        );
    }
}
