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
//! Uniform gravitational field

use super::{check_target, ForceContext, ForceGenerator, ForceKind};
use crate::body::Body;
use crate::config::GRAVITY;
use crate::handle::BodyHandle;
use crate::state::{Derivative, PhysState};
use std::any::Any;

/// Constant downward force `mass * g` along the y axis
///
/// Stateless apart from its target and the field strength.
#[derive(Debug, Clone)]
pub struct GravitationalForce {
    target: [BodyHandle; 1],
    gravity: f64,
}

impl GravitationalForce {
    /// Gravity of the standard strength acting on `target`
    pub fn new(target: BodyHandle) -> Self {
        Self::with_gravity(target, GRAVITY)
    }

    /// Gravity of a custom strength (negative pulls down)
    ///
    /// # Panics
    ///
    /// Panics if `gravity` is not finite.
    pub fn with_gravity(target: BodyHandle, gravity: f64) -> Self {
        assert!(gravity.is_finite(), "Gravity must be finite");
        GravitationalForce {
            target: [target],
            gravity,
        }
    }

    /// Field strength in world units per second squared
    pub fn gravity(&self) -> f64 {
        self.gravity
    }
}

impl ForceGenerator for GravitationalForce {
    fn name(&self) -> &str {
        "GravitationalForce"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::Gravitational
    }

    fn targets(&self) -> &[BodyHandle] {
        &self.target
    }

    fn apply_force(
        &self,
        target: BodyHandle,
        _body: &Body,
        state: &PhysState,
        _context: &ForceContext<'_>,
        derivative: &mut Derivative,
    ) {
        check_target(self.name(), &self.target, target);
        derivative.force.y += state.mass() * self.gravity;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
