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
//! # Sandbox Physics
//!
//! Real-time rigid-body dynamics for an interactive sandbox: bodies with
//! mass, inertia and orientation, force generators (gravity, anchored
//! springs, body-to-body springs), fourth-order Runge-Kutta integration at a
//! fixed timestep, a grounding policy against a single collision surface,
//! and interpolated render poses.
//!
//! ## Features
//!
//! - **Three-snapshot bodies**: last, current and next state per body, so
//!   rendering can blend between ticks
//! - **Force generators**: pluggable through the [`ForceGenerator`] trait,
//!   owned by the scene and addressed by generational handles
//! - **Ground contact**: bounce on landing, static/kinetic friction while
//!   resting, tunnelling-safe overlap test
//! - **Parallelization**: Optional Rayon integration for ray picking
//!
//! ## Example
//!
//! ```rust
//! use sandbox_physics::{Body, CollisionSurface, FixedTimestep, Scene, Vec3};
//!
//! let mut scene = Scene::new();
//! scene.set_collision_surface(Some(CollisionSurface::ground_plane(-3.0, 50.0, 1.0)));
//!
//! let crate_box = scene.add_body(Body::new(3.0, Vec3::new(0.0, 2.0, -5.0)));
//! scene.add_gravity(crate_box);
//!
//! let mut clock = FixedTimestep::default();
//! for _ in 0..180 {
//!     clock.advance(1.0 / 60.0, |t, dt| {
//!         scene.step(t, dt);
//!     });
//! }
//!
//! let pose = scene.pose(crate_box, clock.alpha()).unwrap();
//! assert!(pose.position.y > -3.0);
//! ```

#![warn(missing_docs)]

mod arena;

/// Rigid bodies and their render poses
pub mod body;

/// Fixed-timestep frame clock
pub mod clock;

/// Bounding boxes, pick rays and the ground surface
pub mod collision;

/// Tunable simulation constants
pub mod config;

/// Force generators
pub mod forces;

/// Generational handles for bodies and forces
pub mod handle;

/// Numerical integration methods
pub mod integration;

/// Scene ownership and stepping
pub mod scene;

/// Physical state snapshots and derivatives
pub mod state;

pub use body::{Body, Pose};
pub use clock::FixedTimestep;
pub use collision::{Aabb, CollisionSurface, Ray};
pub use config::SimulationConfig;
pub use forces::{ForceGenerator, ForceKind};
pub use handle::{BodyHandle, ForceHandle};
pub use scene::{Scene, ScopedForce};
pub use state::{PhysState, Vec3};
