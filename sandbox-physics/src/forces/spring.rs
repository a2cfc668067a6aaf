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
//! Damped spring to a fixed anchor
//!
//! Hooke's law with linear damping:
//!
//! ```text
//! x = attach_world - anchor
//! v = velocity + ω × (anchor - position)
//! f = -k·x - b·v
//! τ = f × (position - attach_world)
//! ```
//!
//! The attachment point is the body-local `attach_offset` carried through
//! the evaluation state's translation, rotation and the body's scale.

use super::{check_target, ForceContext, ForceGenerator, ForceKind};
use crate::body::Body;
use crate::handle::BodyHandle;
use crate::state::{Derivative, PhysState, Vec3};
use std::any::Any;

/// Attachment offset used when none is given
pub const DEFAULT_ATTACH_OFFSET: Vec3 = Vec3::new(-0.5, 0.0, 0.0);

/// Spring pulling a point of one body towards a fixed world anchor
#[derive(Debug, Clone)]
pub struct SpringForce {
    target: [BodyHandle; 1],
    anchor: Vec3,
    stiffness: f64,
    damping: f64,
    attach_offset: Vec3,
}

impl SpringForce {
    /// Create a spring with stiffness `k` and damping `b`
    ///
    /// # Panics
    ///
    /// Panics if `k` or `b` is negative or not finite.
    pub fn new(target: BodyHandle, anchor: Vec3, k: f64, b: f64, attach_offset: Vec3) -> Self {
        assert_spring_constants(k, b);
        SpringForce {
            target: [target],
            anchor,
            stiffness: k,
            damping: b,
            attach_offset,
        }
    }

    /// World point the spring is anchored to
    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Move the anchor to `anchor`
    pub fn set_anchor(&mut self, anchor: Vec3) {
        self.anchor = anchor;
    }

    /// Move the anchor by `delta`
    pub fn translate_anchor(&mut self, delta: &Vec3) {
        self.anchor += delta;
    }

    /// Hookean stiffness `k`
    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Linear damping `b`
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Body-local attachment offset
    pub fn attach_offset(&self) -> Vec3 {
        self.attach_offset
    }
}

pub(crate) fn assert_spring_constants(k: f64, b: f64) {
    assert!(
        k >= 0.0 && k.is_finite() && b >= 0.0 && b.is_finite(),
        "Spring constants must be non-negative and finite"
    );
}

/// Damped Hookean force at `attach` pulled towards `other`
///
/// `other` doubles as the lever point for the angular velocity term.
pub(crate) fn damped_spring(
    k: f64,
    b: f64,
    state: &PhysState,
    attach: &Vec3,
    other: &Vec3,
) -> Vec3 {
    let x = attach - other;
    let v = state.velocity() + state.angular_velocity().cross(&(other - state.position));
    -k * x - b * v
}

impl ForceGenerator for SpringForce {
    fn name(&self) -> &str {
        "SpringForce"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::Spring
    }

    fn targets(&self) -> &[BodyHandle] {
        &self.target
    }

    fn apply_force(
        &self,
        target: BodyHandle,
        body: &Body,
        state: &PhysState,
        _context: &ForceContext<'_>,
        derivative: &mut Derivative,
    ) {
        check_target(self.name(), &self.target, target);

        let attach = state.transform_point(&self.attach_offset, body.scale());
        let f = damped_spring(self.stiffness, self.damping, state, &attach, &self.anchor);
        derivative.force += f;
        derivative.torque += f.cross(&(state.position - attach));
    }

    fn segment(&self, context: &ForceContext<'_>) -> Option<(Vec3, Vec3)> {
        let body = context.body(self.target[0])?;
        Some((self.anchor, body.world_point(&self.attach_offset)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::test_support::arena_with;
    use approx::assert_relative_eq;

    #[test]
    fn test_spring_at_rest_length_is_silent() {
        let (arena, handles) = arena_with(vec![Body::new(1.0, Vec3::new(0.5, 0.0, 0.0))]);
        let context = ForceContext::new(&arena);
        let body = context.body(handles[0]).unwrap();
        // Offset (-0.5, 0, 0) from (0.5, 0, 0) lands exactly on the anchor
        let spring = SpringForce::new(handles[0], Vec3::zeros(), 10.0, 1.0, DEFAULT_ATTACH_OFFSET);

        let mut derivative = Derivative::zero();
        spring.apply_force(handles[0], body, body.current_state(), &context, &mut derivative);
        assert_relative_eq!(derivative.force, Vec3::zeros());
        assert_relative_eq!(derivative.torque, Vec3::zeros());
    }

    #[test]
    fn test_spring_hookean_pull() {
        let (arena, handles) = arena_with(vec![Body::new(1.0, Vec3::new(2.0, 0.0, 0.0))]);
        let context = ForceContext::new(&arena);
        let body = context.body(handles[0]).unwrap();
        let spring = SpringForce::new(handles[0], Vec3::zeros(), 4.0, 0.0, Vec3::zeros());

        let mut derivative = Derivative::zero();
        spring.apply_force(handles[0], body, body.current_state(), &context, &mut derivative);
        assert_relative_eq!(derivative.force, Vec3::new(-8.0, 0.0, 0.0));
        // Attached at the centre of mass: no lever arm
        assert_relative_eq!(derivative.torque, Vec3::zeros());
    }

    #[test]
    fn test_spring_damping_opposes_velocity() {
        let body = Body::new(2.0, Vec3::zeros()).with_linear_momentum(Vec3::new(0.0, 4.0, 0.0));
        let (arena, handles) = arena_with(vec![body]);
        let context = ForceContext::new(&arena);
        let body = context.body(handles[0]).unwrap();
        let spring = SpringForce::new(handles[0], Vec3::zeros(), 0.0, 3.0, Vec3::zeros());

        let mut derivative = Derivative::zero();
        spring.apply_force(handles[0], body, body.current_state(), &context, &mut derivative);
        assert_relative_eq!(derivative.force, Vec3::new(0.0, -6.0, 0.0));
    }

    #[test]
    fn test_spring_uses_evaluation_state() {
        let (arena, handles) = arena_with(vec![Body::new(1.0, Vec3::zeros())]);
        let context = ForceContext::new(&arena);
        let body = context.body(handles[0]).unwrap();
        let spring = SpringForce::new(handles[0], Vec3::zeros(), 1.0, 0.0, Vec3::zeros());

        let mut moved = *body.current_state();
        moved.position = Vec3::new(0.0, 3.0, 0.0);

        let mut derivative = Derivative::zero();
        spring.apply_force(handles[0], body, &moved, &context, &mut derivative);
        assert_relative_eq!(derivative.force, Vec3::new(0.0, -3.0, 0.0));
    }

    #[test]
    fn test_offset_attachment_produces_torque() {
        let (arena, handles) = arena_with(vec![Body::new(1.0, Vec3::zeros())]);
        let context = ForceContext::new(&arena);
        let body = context.body(handles[0]).unwrap();
        // Anchor directly above the attachment point at (-0.5, 0, 0)
        let spring = SpringForce::new(
            handles[0],
            Vec3::new(-0.5, 1.0, 0.0),
            2.0,
            0.0,
            DEFAULT_ATTACH_OFFSET,
        );

        let mut derivative = Derivative::zero();
        spring.apply_force(handles[0], body, body.current_state(), &context, &mut derivative);
        assert_relative_eq!(derivative.force, Vec3::new(0.0, 2.0, 0.0));
        // f × (position - attach) = (0, 2, 0) × (0.5, 0, 0)
        assert_relative_eq!(derivative.torque, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_anchor_mutation_and_segment() {
        let (arena, handles) = arena_with(vec![Body::new(1.0, Vec3::new(1.0, 0.0, 0.0))]);
        let context = ForceContext::new(&arena);
        let mut spring =
            SpringForce::new(handles[0], Vec3::zeros(), 1.0, 0.0, DEFAULT_ATTACH_OFFSET);

        spring.translate_anchor(&Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(spring.anchor(), Vec3::new(0.0, 1.0, 0.0));
        spring.set_anchor(Vec3::new(0.0, 5.0, 0.0));

        let (from, to) = spring.segment(&context).unwrap();
        assert_eq!(from, Vec3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(to, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    #[should_panic(expected = "Spring constants must be non-negative and finite")]
    fn test_negative_stiffness_panics() {
        let (_, handles) = arena_with(vec![Body::new(1.0, Vec3::zeros())]);
        SpringForce::new(handles[0], Vec3::zeros(), -1.0, 0.0, DEFAULT_ATTACH_OFFSET);
    }
}
