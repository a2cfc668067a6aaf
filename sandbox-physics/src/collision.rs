// Copyright 2025 John Brosnihan
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
//! Axis-aligned bounds, the ground surface and ray picking
//!
//! Collision is deliberately narrow: every body is tested against a single
//! designated ground surface using axis-aligned boxes, and bodies never
//! collide with each other. The grounding state machine that consumes these
//! tests lives on [`Body`](crate::body::Body).

use crate::state::Vec3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from its corners
    ///
    /// # Panics
    ///
    /// Panics if any component of `min` exceeds the matching one of `max`.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        assert!(
            min.iter().zip(max.iter()).all(|(lo, hi)| lo <= hi),
            "Bounds minimum must not exceed maximum"
        );
        Aabb { min, max }
    }

    /// Box of the given half extents centred on the origin
    pub fn from_half_extents(half_extents: Vec3) -> Self {
        Aabb::new(-half_extents, half_extents)
    }

    /// Unit cube centred on the origin
    pub fn unit_cube() -> Self {
        Aabb::from_half_extents(Vec3::new(0.5, 0.5, 0.5))
    }

    /// Size along each axis
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Local bounds moved into world space by a uniform scale and a translation
    pub fn placed(&self, scale: f64, position: &Vec3) -> Aabb {
        Aabb {
            min: self.min * scale + position,
            max: self.max * scale + position,
        }
    }

    /// Closed-interval overlap test on all three axes
    pub fn intersects(&self, other: &Aabb) -> bool {
        (0..3).all(|axis| {
            self.min[axis].max(other.min[axis]) <= self.max[axis].min(other.max[axis])
        })
    }

    /// Distance from `ray.near` to where the segment enters this box
    ///
    /// Returns 0 when the segment starts inside the box and `None` when the
    /// segment misses it.
    pub fn ray_depth(&self, ray: &Ray) -> Option<f64> {
        let direction = ray.far - ray.near;
        let mut t_enter = 0.0_f64;
        let mut t_exit = 1.0_f64;

        for axis in 0..3 {
            let origin = ray.near[axis];
            let delta = direction[axis];
            if delta.abs() < f64::EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / delta;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        Some(t_enter * direction.norm())
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::unit_cube()
    }
}

/// Line segment used for picking, usually the unprojected cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Point on the near clipping plane
    pub near: Vec3,
    /// Point on the far clipping plane
    pub far: Vec3,
}

impl Ray {
    /// Create a ray from its two end points
    pub fn new(near: Vec3, far: Vec3) -> Self {
        Ray { near, far }
    }
}

/// Identifier of a collision surface installed in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub(crate) u64);

/// Static object bodies can land on
///
/// Mirrors what the renderer knows about the ground mesh: a placement and
/// the mesh's local bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionSurface {
    /// World position of the surface's origin
    pub position: Vec3,
    /// Uniform scale applied to `local_bounds`
    pub scale: f64,
    /// Bounds of the surface's mesh in its own space
    pub local_bounds: Aabb,
}

impl CollisionSurface {
    /// Create a surface
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive and finite.
    pub fn new(position: Vec3, scale: f64, local_bounds: Aabb) -> Self {
        assert!(scale > 0.0 && scale.is_finite(), "Scale must be positive and finite");
        CollisionSurface {
            position,
            scale,
            local_bounds,
        }
    }

    /// Flat slab whose top face lies at `height`
    pub fn ground_plane(height: f64, half_width: f64, thickness: f64) -> Self {
        let half = Vec3::new(half_width, thickness * 0.5, half_width);
        CollisionSurface::new(
            Vec3::new(0.0, height - thickness * 0.5, 0.0),
            1.0,
            Aabb::from_half_extents(half),
        )
    }

    /// Bounds in world space
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.placed(self.scale, &self.position)
    }
}

/// What the grounding policy decided for one body on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactTransition {
    /// No ground surface is installed
    NoSurface,
    /// Not touching now and not touching before
    Airborne,
    /// First tick of contact; the bounce impulse was applied
    Landed,
    /// Sustained contact; vertical motion was clamped
    Grounded,
    /// Contact from the previous tick was lost
    Departed,
}
