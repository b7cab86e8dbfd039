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

//! Provides the small set of linear algebra and geometry primitives needed for
//! visibility counting.
//!
//! Only what frustum culling requires lives here: 3D/4D vectors, a column-major
//! 4x4 matrix able to build view and projection transforms, axis-aligned
//! bounding boxes, and planes grouped into a view frustum.

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub mod geometry;
pub mod matrix;
pub mod vector;

pub use self::geometry::{Aabb, Frustum, Plane};
pub use self::matrix::Mat4;
pub use self::vector::{Vec3, Vec4};

/// Performs an approximate equality comparison with a custom tolerance.
///
/// # Examples
///
/// ```
/// use vigil_core::math::approx_eq_eps;
/// assert!(approx_eq_eps(0.001, 0.0011, 1e-3));
/// assert!(!approx_eq_eps(0.001, 0.002, 1e-4));
/// ```
#[inline]
pub fn approx_eq_eps(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Performs an approximate equality comparison using the module's default [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    approx_eq_eps(a, b, EPSILON)
}
