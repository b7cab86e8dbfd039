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

//! Structural introspection of host objects with no compile-time contract.

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use super::HostResult;
use crate::probe::Probe;

/// A value read from a host object's property or field.
#[derive(Debug, Clone)]
pub enum MemberValue {
    /// The member exists but holds nothing.
    Null,
    /// A boolean.
    Bool(bool),
    /// A single-precision float.
    Float(f32),
    /// A double-precision float.
    Double(f64),
    /// An integer of any width.
    Int(i64),
    /// A string.
    Text(String),
    /// An enumeration value, by variant name.
    Enum(String),
    /// A nested object that can itself be inspected.
    Object(Arc<dyn Inspect>),
}

impl MemberValue {
    /// Returns the boolean if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MemberValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Coerces to `f32` through the fixed chain: float, double, integer, then
    /// parsing the textual form.
    ///
    /// Booleans, objects and null never coerce.
    pub fn coerce_f32(&self) -> Option<f32> {
        match self {
            MemberValue::Float(f) => Some(*f),
            MemberValue::Double(d) => Some(*d as f32),
            MemberValue::Int(i) => Some(*i as f32),
            MemberValue::Text(s) | MemberValue::Enum(s) => s.trim().parse::<f32>().ok(),
            MemberValue::Null | MemberValue::Bool(_) | MemberValue::Object(_) => None,
        }
    }
}

impl Display for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::Null => write!(f, "null"),
            MemberValue::Bool(b) => write!(f, "{b}"),
            MemberValue::Float(v) => write!(f, "{v:.2}"),
            MemberValue::Double(v) => write!(f, "{v:.2}"),
            MemberValue::Int(v) => write!(f, "{v}"),
            MemberValue::Text(s) | MemberValue::Enum(s) => write!(f, "{s}"),
            MemberValue::Object(obj) => write!(f, "{}", obj.type_name()),
        }
    }
}

impl From<bool> for MemberValue {
    fn from(value: bool) -> Self {
        MemberValue::Bool(value)
    }
}

impl From<f32> for MemberValue {
    fn from(value: f32) -> Self {
        MemberValue::Float(value)
    }
}

impl From<f64> for MemberValue {
    fn from(value: f64) -> Self {
        MemberValue::Double(value)
    }
}

impl From<i64> for MemberValue {
    fn from(value: i64) -> Self {
        MemberValue::Int(value)
    }
}

impl From<i32> for MemberValue {
    fn from(value: i32) -> Self {
        MemberValue::Int(value.into())
    }
}

impl From<&str> for MemberValue {
    fn from(value: &str) -> Self {
        MemberValue::Text(value.to_string())
    }
}

impl From<String> for MemberValue {
    fn from(value: String) -> Self {
        MemberValue::Text(value)
    }
}

/// An object whose concrete type is unknown at compile time but whose
/// properties and fields can be enumerated and read by name.
///
/// Implementors only provide the raw name lists and readers; the provided
/// `property`/`field` methods add the case-insensitive lookup used by every
/// capability probe.
pub trait Inspect: Debug {
    /// The object's concrete type name as the host reports it.
    fn type_name(&self) -> &str;

    /// Names of readable properties.
    fn property_names(&self) -> Vec<String>;

    /// Names of public fields.
    fn field_names(&self) -> Vec<String>;

    /// Reads a property by its exact name.
    fn read_property(&self, name: &str) -> HostResult<MemberValue>;

    /// Reads a field by its exact name.
    fn read_field(&self, name: &str) -> HostResult<MemberValue>;

    /// Reads the property whose name matches `name` ignoring ASCII case.
    fn property(&self, name: &str) -> Probe<MemberValue> {
        match self
            .property_names()
            .into_iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
        {
            Some(actual) => self.read_property(&actual).into(),
            None => Probe::NotFound,
        }
    }

    /// Reads the field whose name matches `name` ignoring ASCII case.
    fn field(&self, name: &str) -> Probe<MemberValue> {
        match self
            .field_names()
            .into_iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
        {
            Some(actual) => self.read_field(&actual).into(),
            None => Probe::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryObject;

    #[test]
    fn test_coercion_chain() {
        assert_eq!(MemberValue::Float(0.5).coerce_f32(), Some(0.5));
        assert_eq!(MemberValue::Double(1.25).coerce_f32(), Some(1.25));
        assert_eq!(MemberValue::Int(3).coerce_f32(), Some(3.0));
        assert_eq!(MemberValue::from(" 2.5 ").coerce_f32(), Some(2.5));
        assert_eq!(MemberValue::from("strong").coerce_f32(), None);
        assert_eq!(MemberValue::Bool(true).coerce_f32(), None);
        assert_eq!(MemberValue::Null.coerce_f32(), None);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let obj = MemoryObject::new("Camera")
            .with_property("allowHDR", true)
            .with_field("Intensity", 0.5f32);

        assert_eq!(obj.property("allowhdr").found().and_then(|v| v.as_bool()), Some(true));
        assert!(obj.field("INTENSITY").is_found());
        assert!(matches!(obj.property("intensity"), Probe::NotFound));
    }

    #[test]
    fn test_lookup_surfaces_read_failures() {
        let obj = MemoryObject::new("Broken").with_throwing_property("enabled", "getter threw");
        assert!(matches!(obj.property("enabled"), Probe::Failed(_)));
    }
}
