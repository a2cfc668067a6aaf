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
//! Damped spring coupling two bodies
//!
//! Each body's attachment point is pulled towards the partner's attachment
//! point with the same law as [`SpringForce`](super::SpringForce). The
//! generator is registered on both bodies and invoked once per body per
//! evaluation, so every invocation applies half of the Hookean force: the
//! pair as a whole feels the full `k`, split evenly between the two ends.
//!
//! The evaluated body's attachment comes from its evaluation state; the
//! partner's comes from its committed state.

use super::spring::{assert_spring_constants, damped_spring};
use super::{check_target, ForceContext, ForceGenerator, ForceKind};
use crate::body::Body;
use crate::handle::BodyHandle;
use crate::state::{Derivative, PhysState, Vec3};
use std::any::Any;

/// Share of the spring force applied per invocation
const HALF: f64 = 0.5;

/// Spring between an attachment point on each of two bodies
#[derive(Debug, Clone)]
pub struct TwoWaySpringForce {
    targets: [BodyHandle; 2],
    offsets: [Vec3; 2],
    stiffness: f64,
    damping: f64,
}

impl TwoWaySpringForce {
    /// Couple `first` and `second` with stiffness `k` and damping `b`
    ///
    /// # Panics
    ///
    /// Panics if both targets are the same body, or if `k` or `b` is
    /// negative or not finite.
    pub fn new(
        first: BodyHandle,
        second: BodyHandle,
        k: f64,
        b: f64,
        first_offset: Vec3,
        second_offset: Vec3,
    ) -> Self {
        assert_ne!(first, second, "Two-way spring needs two distinct bodies");
        assert_spring_constants(k, b);
        TwoWaySpringForce {
            targets: [first, second],
            offsets: [first_offset, second_offset],
            stiffness: k,
            damping: b,
        }
    }

    /// Hookean stiffness `k` of the whole spring
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Linear damping `b`
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// The body at the other end from `target`
    pub fn partner_of(&self, target: BodyHandle) -> Option<BodyHandle> {
        match self.targets.iter().position(|t| *t == target)? {
            0 => Some(self.targets[1]),
            _ => Some(self.targets[0]),
        }
    }
}

impl ForceGenerator for TwoWaySpringForce {
    fn name(&self) -> &str {
        "TwoWaySpringForce"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::TwoWaySpring
    }

    fn targets(&self) -> &[BodyHandle] {
        &self.targets
    }

    fn apply_force(
        &self,
        target: BodyHandle,
        body: &Body,
        state: &PhysState,
        context: &ForceContext<'_>,
        derivative: &mut Derivative,
    ) {
        check_target(self.name(), &self.targets, target);

        let (own, other) = if target == self.targets[0] { (0, 1) } else { (1, 0) };
        let partner = match context.body(self.targets[other]) {
            Some(partner) => partner,
            None => return,
        };

        let attach = state.transform_point(&self.offsets[own], body.scale());
        let other_attach = partner.world_point(&self.offsets[other]);

        let f = HALF * damped_spring(self.stiffness, self.damping, state, &attach, &other_attach);
        derivative.force += f;
        derivative.torque += f.cross(&(state.position - attach));
    }

    fn segment(&self, context: &ForceContext<'_>) -> Option<(Vec3, Vec3)> {
        let first = context.body(self.targets[0])?;
        let second = context.body(self.targets[1])?;
        Some((
            first.world_point(&self.offsets[0]),
            second.world_point(&self.offsets[1]),
        ))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
