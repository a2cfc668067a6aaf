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
//! Force generators
//!
//! A force generator reads a body's evaluation state and adds its
//! contribution into a [`Derivative`]. Generators are owned by the scene and
//! registered on the body (or bodies) they act on; each body keeps the list
//! of handles targeting it and sums them at every integration sub-step.
//!
//! # Contract
//!
//! `apply_force` must be a pure function of its inputs: it may read the
//! committed state of any body through the [`ForceContext`] and the
//! evaluation `state` it is given, and must only write into `derivative`.
//! During Runge-Kutta sub-stepping `state` differs from the target's
//! committed state, so geometry that depends on the target (attachment
//! points) must be computed from `state`.
//!
//! Built-in generators are [`GravitationalForce`], [`SpringForce`] and
//! [`TwoWaySpringForce`]. Custom generators implement [`ForceGenerator`]
//! and report [`ForceKind::Custom`].

mod gravity;
mod spring;
mod two_way_spring;

pub use gravity::GravitationalForce;
pub use spring::{SpringForce, DEFAULT_ATTACH_OFFSET};
pub use two_way_spring::TwoWaySpringForce;

use crate::arena::Arena;
use crate::body::Body;
use crate::handle::BodyHandle;
use crate::state::{Derivative, PhysState, Vec3};
use std::any::Any;

/// Coarse classification used by remove-by-kind operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForceKind {
    /// Constant downward pull proportional to mass
    Gravitational,
    /// Damped spring to a fixed world anchor
    Spring,
    /// Damped spring coupling two bodies
    TwoWaySpring,
    /// Anything implemented outside this crate
    Custom,
}

impl ForceKind {
    /// Whether this kind is one of the spring variants
    pub fn is_spring(&self) -> bool {
        matches!(self, ForceKind::Spring | ForceKind::TwoWaySpring)
    }
}

/// Read-only view of the scene's bodies during force evaluation
pub struct ForceContext<'a> {
    bodies: &'a Arena<Body>,
}

impl<'a> ForceContext<'a> {
    pub(crate) fn new(bodies: &'a Arena<Body>) -> Self {
        ForceContext { bodies }
    }

    /// Look up a body by handle
    pub fn body(&self, handle: BodyHandle) -> Option<&'a Body> {
        self.bodies.get(handle.0)
    }
}

/// Trait for anything that pushes on bodies
///
/// Implementations must be `Send + Sync` so a scene can be moved between
/// threads.
pub trait ForceGenerator: Send + Sync {
    /// Descriptive name used in log messages
    fn name(&self) -> &str;

    /// Classification used by `toggle_gravity` and `delete_spring_force`
    fn kind(&self) -> ForceKind;

    /// Bodies this generator acts on; it is registered on each of them
    fn targets(&self) -> &[BodyHandle];

    /// Accumulate this generator's force and torque on `target`
    ///
    /// `body` is the target body itself (for scale and other static
    /// properties) and `state` is the state being evaluated.
    ///
    /// # Panics
    ///
    /// Implementations panic if `target` is not one of [`targets`](Self::targets).
    fn apply_force(
        &self,
        target: BodyHandle,
        body: &Body,
        state: &PhysState,
        context: &ForceContext<'_>,
        derivative: &mut Derivative,
    );

    /// End points of a visual connector for this force, if it has one
    ///
    /// Computed from committed body states; the renderer draws markers
    /// along the segment.
    fn segment(&self, _context: &ForceContext<'_>) -> Option<(Vec3, Vec3)> {
        None
    }

    /// Get a reference to the generator as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Get a mutable reference to the generator as Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Panic unless `target` is one of `targets`
///
/// Applying a force to a body it is not registered on would silently
/// corrupt accumulation.
pub(crate) fn check_target(name: &str, targets: &[BodyHandle], target: BodyHandle) {
    assert!(
        targets.contains(&target),
        "{} applied to {} which is not one of its targets",
        name,
        target
    );
}
