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

//! Feature kinds and the reading resolved for each of them.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The graphics features the detector knows how to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Any antialiasing technique (post-process or multisampling).
    Antialiasing,
    /// Bloom post effect.
    Bloom,
    /// Shafts-of-light / god rays.
    Sunshafts,
    /// Contrast enhancement post effect.
    ContrastEnhance,
    /// High dynamic range rendering on the primary viewpoint.
    Hdr,
    /// Shadow casting by the sun (first directional light).
    SunShadows,
}

impl FeatureKind {
    /// Every kind, in display order.
    pub const ALL: [FeatureKind; 6] = [
        FeatureKind::Antialiasing,
        FeatureKind::Bloom,
        FeatureKind::Sunshafts,
        FeatureKind::ContrastEnhance,
        FeatureKind::Hdr,
        FeatureKind::SunShadows,
    ];

    /// Human-readable key.
    pub fn key(self) -> &'static str {
        match self {
            FeatureKind::Antialiasing => "Antialiasing",
            FeatureKind::Bloom => "Bloom",
            FeatureKind::Sunshafts => "Sunshafts",
            FeatureKind::ContrastEnhance => "Contrast Enhance",
            FeatureKind::Hdr => "HDR",
            FeatureKind::SunShadows => "Sun Shadows",
        }
    }
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Tri-state answer to "is this feature enabled?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FeatureState {
    /// Enabled.
    On,
    /// Disabled.
    Off,
    /// No source could answer.
    #[default]
    Unknown,
}

impl FeatureState {
    /// Builds `On`/`Off` from a boolean.
    pub fn from_bool(on: bool) -> Self {
        if on {
            FeatureState::On
        } else {
            FeatureState::Off
        }
    }

    /// `true` only for `On`.
    pub fn is_on(self) -> bool {
        self == FeatureState::On
    }

    /// Display label: `ON`, `OFF` or `Unknown`.
    pub fn label(self) -> &'static str {
        match self {
            FeatureState::On => "ON",
            FeatureState::Off => "OFF",
            FeatureState::Unknown => "Unknown",
        }
    }
}

/// The resolved state of one graphics feature.
///
/// A magnitude or source label can only be attached to a reading that was
/// resolved from a concrete source; an `Unknown` reading never carries either.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureReading {
    state: FeatureState,
    #[serde(skip_serializing_if = "Option::is_none")]
    magnitude: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_label: Option<String>,
}

impl FeatureReading {
    /// A reading with no evidence.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// An enabled reading.
    pub fn on() -> Self {
        Self::from_state(FeatureState::On)
    }

    /// A disabled reading.
    pub fn off() -> Self {
        Self::from_state(FeatureState::Off)
    }

    /// A reading in the given state with nothing attached.
    pub fn from_state(state: FeatureState) -> Self {
        Self {
            state,
            magnitude: None,
            source_label: None,
        }
    }

    /// Attaches the strength of the effect. Ignored on `Unknown` readings and
    /// for non-finite values.
    pub fn with_magnitude(mut self, magnitude: f32) -> Self {
        if self.state != FeatureState::Unknown && magnitude.is_finite() {
            self.magnitude = Some(magnitude);
        }
        self
    }

    /// Attaches the name of whatever produced the reading. Ignored on `Unknown` readings.
    pub fn with_source(mut self, label: impl Into<String>) -> Self {
        if self.state != FeatureState::Unknown {
            self.source_label = Some(label.into());
        }
        self
    }

    /// The resolved state.
    pub fn state(&self) -> FeatureState {
        self.state
    }

    /// The strength of the effect, if one was read.
    pub fn magnitude(&self) -> Option<f32> {
        self.magnitude
    }

    /// What produced the reading (a member type name, `Camera MSAA`, ...).
    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }
}

impl Display for FeatureReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state.label())?;
        match (&self.source_label, self.magnitude) {
            (Some(source), Some(m)) => write!(f, " ({source}, {m:.2})"),
            (Some(source), None) => write!(f, " ({source})"),
            (None, Some(m)) => write!(f, " ({m:.2})"),
            (None, None) => Ok(()),
        }
    }
}
