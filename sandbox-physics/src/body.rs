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
//! Simulated rigid bodies
//!
//! A [`Body`] keeps three snapshots of its state:
//!
//! - `last`: the state at the previous completed tick, the interpolation
//!   source for rendering
//! - `current`: the state at the start of the tick being integrated
//! - `next`: the state written by the tick, promoted to `current` when the
//!   following tick begins
//!
//! Rendering blends `last` and `current`; integration reads `current` and
//! writes `next`. Nothing reads `next` except the collision policy that runs
//! right after integration.

use crate::arena::Arena;
use crate::collision::{Aabb, CollisionSurface, ContactTransition, SurfaceId};
use crate::config::{SimulationConfig, AIR_FRICTION};
use crate::forces::{ForceContext, ForceGenerator};
use crate::handle::{BodyHandle, ForceHandle};
use crate::state::{Derivative, PhysState, Vec3};
use log::{debug, warn};
use nalgebra::UnitQuaternion;

/// Interpolated placement of a body for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position
    pub position: Vec3,
    /// World orientation
    pub orientation: UnitQuaternion<f64>,
}

/// A mass-bearing simulated object
///
/// # Examples
///
/// ```
/// use sandbox_physics::body::Body;
/// use sandbox_physics::state::Vec3;
///
/// let body = Body::new(3.0, Vec3::new(0.0, 0.0, -5.0)).with_scale(0.5);
/// assert_eq!(body.mass(), 3.0);
/// assert_eq!(body.current_state().position, body.last_state().position);
/// ```
#[derive(Debug, Clone)]
pub struct Body {
    last: PhysState,
    current: PhysState,
    next: PhysState,
    forces: Vec<ForceHandle>,
    contacts: Vec<SurfaceId>,
    on_ground: bool,
    transition: ContactTransition,
    visible: bool,
    scale: f64,
    local_bounds: Aabb,
}

impl Default for Body {
    /// One kilogram at the origin
    fn default() -> Self {
        Body::new(1.0, Vec3::zeros())
    }
}

impl Body {
    /// Create a body at rest with unit inertia, unit scale and unit-cube bounds
    ///
    /// # Panics
    ///
    /// Panics if `mass` is not positive and finite.
    pub fn new(mass: f64, position: Vec3) -> Self {
        let state = PhysState::new(mass, 1.0, position, AIR_FRICTION);
        Body {
            last: state,
            current: state,
            next: state,
            forces: Vec::new(),
            contacts: Vec::new(),
            on_ground: false,
            transition: ContactTransition::NoSurface,
            visible: true,
            scale: 1.0,
            local_bounds: Aabb::unit_cube(),
        }
    }

    /// Replace the scalar rotational inertia
    ///
    /// # Panics
    ///
    /// Panics if `inertia` is not positive and finite.
    pub fn with_inertia(self, inertia: f64) -> Self {
        let current = self.current;
        let mut state = PhysState::new(current.mass(), inertia, current.position, current.friction);
        state.linear_momentum = current.linear_momentum;
        state.orientation = current.orientation;
        state.angular_momentum = current.angular_momentum;
        self.with_state(state)
    }

    /// Start with the given linear momentum
    pub fn with_linear_momentum(self, momentum: Vec3) -> Self {
        let mut state = self.current;
        state.linear_momentum = momentum;
        self.with_state(state)
    }

    /// Start with the given angular momentum
    pub fn with_angular_momentum(self, momentum: Vec3) -> Self {
        let mut state = self.current;
        state.angular_momentum = momentum;
        self.with_state(state)
    }

    /// Start with the given orientation
    pub fn with_orientation(self, orientation: UnitQuaternion<f64>) -> Self {
        let mut state = self.current;
        state.orientation = *orientation.quaternion();
        self.with_state(state)
    }

    /// Uniform scale applied to the bounds and attachment offsets
    ///
    /// # Panics
    ///
    /// Panics if `scale` is not positive and finite.
    pub fn with_scale(mut self, scale: f64) -> Self {
        assert!(scale > 0.0 && scale.is_finite(), "Scale must be positive and finite");
        self.scale = scale;
        self
    }

    /// Bounds of the body's mesh in its own space
    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.local_bounds = bounds;
        self
    }

    /// Prepare a body for insertion into a scene
    ///
    /// Registrations and contacts belong to the scene a body came from, so a
    /// cloned or previously removed body starts over with none of them.
    pub(crate) fn adopt(&mut self, air_friction: f64) {
        self.last.friction = air_friction;
        self.current.friction = air_friction;
        self.next.friction = air_friction;
        self.forces.clear();
        self.contacts.clear();
        self.on_ground = false;
        self.transition = ContactTransition::NoSurface;
    }

    fn with_state(mut self, state: PhysState) -> Self {
        self.last = state;
        self.current = state;
        self.next = state;
        self
    }

    /// Mass in kilograms
    pub fn mass(&self) -> f64 {
        self.current.mass()
    }

    /// Uniform scale
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Bounds of the mesh in body space
    pub fn local_bounds(&self) -> &Aabb {
        &self.local_bounds
    }

    /// State at the previous completed tick
    pub fn last_state(&self) -> &PhysState {
        &self.last
    }

    /// State at the start of the most recent tick
    pub fn current_state(&self) -> &PhysState {
        &self.current
    }

    /// State produced by the most recent tick
    pub fn next_state(&self) -> &PhysState {
        &self.next
    }

    /// Linear velocity at the start of the most recent tick
    pub fn velocity(&self) -> Vec3 {
        self.current.velocity()
    }

    /// Handles of every force currently targeting this body, in registration order
    pub fn forces(&self) -> &[ForceHandle] {
        &self.forces
    }

    /// Whether the body rested on the ground at the end of the last tick
    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    /// What the grounding policy decided for this body on the last tick
    pub fn contact_transition(&self) -> ContactTransition {
        self.transition
    }

    /// Whether the renderer should draw this body
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the body; hidden bodies are still simulated and pickable
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Whether the body was touching `surface` at the end of the last tick
    pub fn is_in_contact_with(&self, surface: SurfaceId) -> bool {
        self.contacts.contains(&surface)
    }

    /// Body-local point in world space, using the committed state
    pub fn world_point(&self, local: &Vec3) -> Vec3 {
        self.current.transform_point(local, self.scale)
    }

    /// World bounds at the committed state
    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.placed(self.scale, &self.current.position)
    }

    /// World bounds at the state the last tick produced
    fn next_bounds(&self) -> Aabb {
        self.local_bounds.placed(self.scale, &self.next.position)
    }

    /// Blend of the last two committed states
    ///
    /// `alpha` is the fraction of a tick elapsed since `current` was
    /// committed: 0 gives `last`, 1 gives `current`.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside `[0, 1]`.
    pub fn pose(&self, alpha: f64) -> Pose {
        assert!((0.0..=1.0).contains(&alpha), "Alpha must be within [0, 1]");
        let position = self.current.position * alpha + self.last.position * (1.0 - alpha);
        let orientation = self.current.orientation * alpha + self.last.orientation * (1.0 - alpha);
        Pose {
            position,
            orientation: UnitQuaternion::from_quaternion(orientation),
        }
    }

    /// Move the body rigidly, bypassing integration
    ///
    /// Takes effect on the state the next tick starts from.
    pub fn translate(&mut self, delta: &Vec3) {
        self.next.position += delta;
    }

    /// Set the grounded flag
    ///
    /// Grounding also cancels vertical momentum and pins the height to the
    /// committed value, which stops the integrator sinking the body through
    /// the surface.
    pub fn set_on_ground(&mut self, on_ground: bool) {
        self.on_ground = on_ground;
        if on_ground {
            self.next.linear_momentum.y = 0.0;
            self.next.position.y = self.current.position.y;
        }
    }

    pub(crate) fn attach_force(&mut self, force: ForceHandle) {
        self.forces.push(force);
    }

    pub(crate) fn detach_force(&mut self, force: ForceHandle) -> bool {
        match self.forces.iter().position(|f| *f == force) {
            Some(index) => {
                self.forces.remove(index);
                true
            }
            None => false,
        }
    }

    /// Promote `current` to `last` and `next` to `current`
    pub(crate) fn begin_tick(&mut self) {
        self.last = self.current;
        self.current = self.next;
    }

    /// Derivative at `state`: every registered force plus friction
    pub(crate) fn evaluate(
        &self,
        handle: BodyHandle,
        state: &PhysState,
        forces: &Arena<Box<dyn ForceGenerator>>,
        context: &ForceContext<'_>,
    ) -> Derivative {
        let mut derivative = Derivative::kinematic(state);

        for force in &self.forces {
            if let Some(generator) = forces.get(force.0) {
                generator.apply_force(handle, self, state, context, &mut derivative);
            }
        }

        derivative.force += state.velocity() * -state.friction;
        derivative.torque += state.angular_velocity() * -state.friction;
        derivative
    }

    /// Store the integrated state and pick friction for the following tick
    ///
    /// Friction follows the grounded flag left by the previous tick's
    /// collision pass.
    pub(crate) fn finish_tick(&mut self, mut next: PhysState, config: &SimulationConfig) {
        if !next.is_valid() {
            warn!("Rejected non-finite integration result; holding previous state");
            next = self.current;
        }

        next.friction = if self.on_ground {
            config.ground_friction(next.linear_momentum.norm())
        } else {
            config.air_friction
        };
        self.next = next;
    }

    /// Whether the next-state bounds overlap `other`
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.next_bounds().intersects(other)
    }

    /// Overlap test that also catches bodies that sank into or under `ground`
    ///
    /// A body whose bottom face is below the ground's top face is moved so its
    /// bottom sits `epsilon` under the ground's top face, keeping its height,
    /// before the regular overlap test. The shifted box straddles the top face
    /// whatever the body's height, so a fast or tiny body that crossed the
    /// surface within one tick is still reported as touching.
    pub fn is_in_or_below(&self, ground: &Aabb, epsilon: f64) -> bool {
        let mut bounds = self.next_bounds();
        if bounds.min.y < ground.max.y {
            let height = bounds.max.y - bounds.min.y;
            bounds.min.y = ground.max.y - epsilon;
            bounds.max.y = bounds.min.y + height;
        }
        bounds.intersects(ground)
    }

    /// Landing impulse: invert and damp vertical momentum, sit on the surface
    pub(crate) fn bounce(&mut self, ground: &Aabb, config: &SimulationConfig) {
        let lift = ground.max.y - self.next_bounds().min.y;
        self.next.linear_momentum.y *= -config.elasticity;
        self.next.position.y += lift;
        self.next.friction = config.static_friction;
    }

    /// Run the grounding state machine against `surface` for this tick
    pub(crate) fn resolve_ground_contact(
        &mut self,
        id: SurfaceId,
        surface: &CollisionSurface,
        config: &SimulationConfig,
    ) -> ContactTransition {
        self.transition = self.classify_ground_contact(id, surface, config);
        self.transition
    }

    /// Tick without a ground surface: nothing to rest on
    pub(crate) fn release_ground(&mut self) -> ContactTransition {
        self.set_on_ground(false);
        self.transition = ContactTransition::NoSurface;
        self.transition
    }

    fn classify_ground_contact(
        &mut self,
        id: SurfaceId,
        surface: &CollisionSurface,
        config: &SimulationConfig,
    ) -> ContactTransition {
        let ground = surface.world_bounds();

        let transition = if self.is_in_or_below(&ground, config.ground_epsilon) {
            if self.is_in_contact_with(id) {
                self.set_on_ground(true);
                return ContactTransition::Grounded;
            }
            self.bounce(&ground, config);
            self.contacts.push(id);
            ContactTransition::Landed
        } else if let Some(index) = self.contacts.iter().position(|c| *c == id) {
            self.contacts.remove(index);
            ContactTransition::Departed
        } else {
            ContactTransition::Airborne
        };

        self.set_on_ground(false);
        transition
    }

    pub(crate) fn clear_contacts(&mut self) {
        if !self.contacts.is_empty() {
            debug!("Clearing {} stale contacts", self.contacts.len());
        }
        self.contacts.clear();
    }
}
