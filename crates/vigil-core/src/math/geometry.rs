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

//! Provides the geometric primitives used for visibility culling.
//!
//! Renderable bounds are reported by the host as [`Aabb`]s, viewpoints are
//! reduced to a [`Frustum`] of six inward-facing [`Plane`]s, and an entity is
//! counted as visible when its box is not fully behind any of them.

use serde::{Deserialize, Serialize};

use super::{Mat4, Vec3, Vec4, EPSILON};

/// Represents an Axis-Aligned Bounding Box (AABB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// The corner of the box with the smallest coordinates on all axes.
    pub min: Vec3,
    /// The corner of the box with the largest coordinates on all axes.
    pub max: Vec3,
}

impl Aabb {
    /// An invalid `Aabb` where `min` components are positive infinity and `max` are negative infinity.
    pub const INVALID: Self = Self {
        min: Vec3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Vec3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a new `Aabb` from two corner points, in any order.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a new `Aabb` from a center point and its half-extents.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = Vec3::new(
            half_extents.x.abs(),
            half_extents.y.abs(),
            half_extents.z.abs(),
        );
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Calculates the center point of the `Aabb`.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Checks if the `Aabb` is valid (i.e., `min` <= `max` on all axes).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Returns the corner furthest along `direction`.
    #[inline]
    pub fn positive_vertex(&self, direction: Vec3) -> Vec3 {
        Vec3::new(
            if direction.x >= 0.0 { self.max.x } else { self.min.x },
            if direction.y >= 0.0 { self.max.y } else { self.min.y },
            if direction.z >= 0.0 { self.max.z } else { self.min.z },
        )
    }
}

impl Default for Aabb {
    #[inline]
    fn default() -> Self {
        Self::INVALID
    }
}

/// A plane in Hessian normal form: points `p` with `normal.dot(p) + distance == 0`.
///
/// The positive half-space (`signed_distance >= 0`) is "inside".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal pointing into the kept half-space.
    pub normal: Vec3,
    /// Offset along the normal.
    pub distance: f32,
}

impl Plane {
    /// Builds a normalized plane from raw `(a, b, c, d)` coefficients.
    ///
    /// Returns `None` for a degenerate normal.
    pub fn from_coefficients(coefficients: Vec4) -> Option<Self> {
        let normal = coefficients.truncate();
        let len = normal.length();
        if len < EPSILON {
            return None;
        }
        Some(Self {
            normal: normal * (1.0 / len),
            distance: coefficients.w / len,
        })
    }

    /// Signed distance from the plane to `point`.
    #[inline]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// A view frustum made of six inward-facing planes.
///
/// Plane order: left, right, bottom, top, near, far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    /// The bounding planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum planes from a combined view-projection matrix
    /// using a [0, 1] clip-space depth range.
    ///
    /// Returns `None` if any extracted plane is degenerate.
    pub fn from_view_projection(view_projection: &Mat4) -> Option<Self> {
        let r0 = view_projection.get_row(0);
        let r1 = view_projection.get_row(1);
        let r2 = view_projection.get_row(2);
        let r3 = view_projection.get_row(3);

        Some(Self {
            planes: [
                Plane::from_coefficients(r3 + r0)?,
                Plane::from_coefficients(r3 - r0)?,
                Plane::from_coefficients(r3 + r1)?,
                Plane::from_coefficients(r3 - r1)?,
                Plane::from_coefficients(r2)?,
                Plane::from_coefficients(r3 - r2)?,
            ],
        })
    }

    /// Returns `true` if the box touches the inside of every plane.
    ///
    /// Conservative: a box straddling a frustum corner may be reported visible.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if !aabb.is_valid() {
            return false;
        }
        self.planes
            .iter()
            .all(|plane| plane.signed_distance(aabb.positive_vertex(plane.normal)) >= 0.0)
    }
}
