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
//! Scene stepping orchestrator
//!
//! The [`Scene`] owns every body and force generator, advances all bodies by
//! one fixed tick per [`step`](Scene::step) call, applies the grounding
//! policy against the collision surface, and answers pick queries.
//!
//! # Tick order
//!
//! 1. Every body rotates its snapshots (`last ← current`, `current ← next`).
//! 2. Each body, in insertion order, is integrated from `current` into
//!    `next` and then resolved against the ground surface.
//!
//! Rotating all bodies before integrating any of them means a two-way spring
//! always reads its partner's state from the start of the same tick, so the
//! result does not depend on insertion order.
//!
//! # Force ownership
//!
//! Creating a force registers its handle on each target body. Removing a
//! force deregisters it from every target, and removing a body removes every
//! force that targets it first, so a body's force list only ever names live
//! forces and no force outlives its targets.

use crate::arena::Arena;
use crate::body::{Body, Pose};
use crate::collision::{CollisionSurface, ContactTransition, Ray, SurfaceId};
use crate::config::SimulationConfig;
use crate::forces::{
    ForceContext, ForceGenerator, ForceKind, GravitationalForce, SpringForce, TwoWaySpringForce,
};
use crate::handle::{BodyHandle, ForceHandle};
use crate::integration::{Integrator, RK4Integrator};
use crate::state::{PhysState, Vec3};
use log::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Container and stepper for a set of bodies
///
/// # Examples
///
/// ```
/// use sandbox_physics::scene::Scene;
/// use sandbox_physics::body::Body;
/// use sandbox_physics::state::Vec3;
///
/// let mut scene = Scene::new();
/// let ball = scene.add_body(Body::new(3.0, Vec3::new(0.0, 0.0, -5.0)));
/// scene.add_gravity(ball);
///
/// let dt = 1.0 / 60.0;
/// for tick in 0..60 {
///     scene.step(tick as f64 * dt, dt);
/// }
/// assert!(scene.body(ball).unwrap().next_state().position.y < -4.0);
/// ```
pub struct Scene {
    bodies: Arena<Body>,
    order: Vec<BodyHandle>,
    forces: Arena<Box<dyn ForceGenerator>>,
    surface: Option<(SurfaceId, CollisionSurface)>,
    next_surface_id: u64,
    integrator: Box<dyn Integrator>,
    config: SimulationConfig,
    time: f64,
    ticks: u64,
}

impl Scene {
    /// Create an empty scene with the default configuration
    pub fn new() -> Self {
        Scene {
            bodies: Arena::new(),
            order: Vec::new(),
            forces: Arena::new(),
            surface: None,
            next_surface_id: 0,
            integrator: Box::new(RK4Integrator::new()),
            config: SimulationConfig::default(),
            time: 0.0,
            ticks: 0,
        }
    }

    /// Create an empty scene with a custom configuration
    ///
    /// Returns an error if the configuration fails validation.
    pub fn with_config(config: SimulationConfig) -> Result<Self, String> {
        config.validate()?;
        let mut scene = Scene::new();
        scene.config = config;
        Ok(scene)
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replace the configuration
    ///
    /// Bodies pick up the new friction values on their next tick; gravity
    /// forces already registered keep the strength they were created with.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), String> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Replace the integration method
    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        debug!("Switching integrator to {}", integrator.name());
        self.integrator = integrator;
    }

    /// Name of the integration method in use
    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// Simulation time at the end of the most recent tick
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of ticks stepped so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    // ----------------------------------------------------------------------
    // Bodies
    // ----------------------------------------------------------------------

    /// Add a body; it is stepped after every body added before it
    ///
    /// Any force registrations or contacts the body carried from another
    /// scene are discarded.
    pub fn add_body(&mut self, mut body: Body) -> BodyHandle {
        body.adopt(self.config.air_friction);
        let handle = BodyHandle(self.bodies.insert(body));
        self.order.push(handle);
        debug!("Added {}", handle);
        handle
    }

    /// Remove a body and every force that targets it
    ///
    /// Two-way springs are deregistered from the surviving partner before
    /// being destroyed. Returns the removed body, or `None` for a stale handle.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let attached = self.bodies.get(handle.0)?.forces().to_vec();
        for force in attached {
            self.remove_force(force);
        }

        let body = self.bodies.remove(handle.0)?;
        self.order.retain(|h| *h != handle);
        debug!("Removed {}", handle);
        Some(body)
    }

    /// Look up a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    /// Look up a body for mutation (visibility, grounding, translation)
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle.0)
    }

    /// Whether `handle` names a live body
    pub fn contains_body(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    /// Bodies in stepping order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.order
            .iter()
            .filter_map(move |h| self.bodies.get(h.0).map(|body| (*h, body)))
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Move a body rigidly without integrating; returns false for a stale handle
    pub fn translate_body(&mut self, handle: BodyHandle, delta: &Vec3) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(body) => {
                body.translate(delta);
                true
            }
            None => false,
        }
    }

    /// Set a body's grounded flag; returns false for a stale handle
    pub fn set_on_ground(&mut self, handle: BodyHandle, on_ground: bool) -> bool {
        match self.bodies.get_mut(handle.0) {
            Some(body) => {
                body.set_on_ground(on_ground);
                true
            }
            None => false,
        }
    }

    /// Whether a body rested on the ground at the end of the last tick
    pub fn is_on_ground(&self, handle: BodyHandle) -> Option<bool> {
        self.bodies.get(handle.0).map(Body::is_on_ground)
    }

    /// Interpolated render pose of a body
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside `[0, 1]`.
    pub fn pose(&self, handle: BodyHandle, alpha: f64) -> Option<Pose> {
        self.bodies.get(handle.0).map(|body| body.pose(alpha))
    }

    /// Sum of the committed linear momentum of every body
    pub fn total_linear_momentum(&self) -> Vec3 {
        self.bodies()
            .map(|(_, body)| body.current_state().linear_momentum)
            .fold(Vec3::zeros(), |acc, p| acc + p)
    }

    fn expect_body(&self, handle: BodyHandle) -> &Body {
        match self.bodies.get(handle.0) {
            Some(body) => body,
            None => panic!("{} is not alive in this scene", handle),
        }
    }

    // ----------------------------------------------------------------------
    // Forces
    // ----------------------------------------------------------------------

    /// Register a force generator on each of its targets
    ///
    /// # Panics
    ///
    /// Panics if any target is not a live body or a target is listed twice.
    pub fn add_force(&mut self, generator: Box<dyn ForceGenerator>) -> ForceHandle {
        let targets = generator.targets().to_vec();
        for (i, target) in targets.iter().enumerate() {
            self.expect_body(*target);
            assert!(
                !targets[..i].contains(target),
                "{} lists {} more than once",
                generator.name(),
                target
            );
        }

        let name = generator.name().to_string();
        let handle = ForceHandle(self.forces.insert(generator));
        for target in &targets {
            if let Some(body) = self.bodies.get_mut(target.0) {
                body.attach_force(handle);
            }
        }
        debug!("Registered {} as {} on {} bodies", name, handle, targets.len());
        handle
    }

    /// Add gravity of the configured strength to a body
    pub fn add_gravity(&mut self, body: BodyHandle) -> ForceHandle {
        let gravity = GravitationalForce::with_gravity(body, self.config.gravity);
        self.add_force(Box::new(gravity))
    }

    /// Tie a body to a fixed world anchor
    pub fn add_spring(
        &mut self,
        body: BodyHandle,
        anchor: Vec3,
        k: f64,
        b: f64,
        attach_offset: Vec3,
    ) -> ForceHandle {
        self.add_force(Box::new(SpringForce::new(body, anchor, k, b, attach_offset)))
    }

    /// Tie two bodies together
    pub fn add_two_way_spring(
        &mut self,
        first: BodyHandle,
        second: BodyHandle,
        k: f64,
        b: f64,
        first_offset: Vec3,
        second_offset: Vec3,
    ) -> ForceHandle {
        self.add_force(Box::new(TwoWaySpringForce::new(
            first,
            second,
            k,
            b,
            first_offset,
            second_offset,
        )))
    }

    /// Deregister a force from all its targets and hand it back
    ///
    /// Returns `None` if the force was already removed; the generator is
    /// dropped when the caller drops the returned box.
    pub fn remove_force(&mut self, handle: ForceHandle) -> Option<Box<dyn ForceGenerator>> {
        let generator = self.forces.remove(handle.0)?;
        for target in generator.targets() {
            if let Some(body) = self.bodies.get_mut(target.0) {
                body.detach_force(handle);
            }
        }
        debug!("Removed {} ({})", handle, generator.name());
        Some(generator)
    }

    /// Guard that removes `handle` when dropped
    pub fn scoped(&mut self, handle: ForceHandle) -> ScopedForce<'_> {
        ScopedForce {
            scene: self,
            handle,
            armed: true,
        }
    }

    /// Look up a force generator
    pub fn force(&self, handle: ForceHandle) -> Option<&dyn ForceGenerator> {
        self.forces.get(handle.0).map(|generator| &**generator)
    }

    /// Look up a force generator as its concrete type
    pub fn force_as<T: 'static>(&self, handle: ForceHandle) -> Option<&T> {
        self.forces.get(handle.0)?.as_any().downcast_ref::<T>()
    }

    /// Look up a force generator as its concrete type for mutation
    pub fn force_as_mut<T: 'static>(&mut self, handle: ForceHandle) -> Option<&mut T> {
        self.forces.get_mut(handle.0)?.as_any_mut().downcast_mut::<T>()
    }

    /// Number of live force generators
    pub fn force_count(&self) -> usize {
        self.forces.len()
    }

    /// Forces targeting a body, in registration order
    pub fn forces_of(&self, body: BodyHandle) -> &[ForceHandle] {
        self.bodies.get(body.0).map(Body::forces).unwrap_or(&[])
    }

    /// First force of `kind` registered on a body
    pub fn find_force(&self, body: BodyHandle, kind: ForceKind) -> Option<ForceHandle> {
        self.find_force_where(body, |k| k == kind)
    }

    fn find_force_where(
        &self,
        body: BodyHandle,
        predicate: impl Fn(ForceKind) -> bool,
    ) -> Option<ForceHandle> {
        self.forces_of(body).iter().copied().find(|force| {
            self.forces
                .get(force.0)
                .map_or(false, |generator| predicate(generator.kind()))
        })
    }

    /// Remove a body's gravity if it has any, otherwise add it
    ///
    /// Returns the new force when gravity was added.
    ///
    /// # Panics
    ///
    /// Panics if `body` is not a live body.
    pub fn toggle_gravity(&mut self, body: BodyHandle) -> Option<ForceHandle> {
        self.expect_body(body);
        match self.find_force(body, ForceKind::Gravitational) {
            Some(existing) => {
                self.remove_force(existing);
                None
            }
            None => Some(self.add_gravity(body)),
        }
    }

    /// Remove the first spring (one-sided or two-way) registered on a body
    ///
    /// Returns false when the body has no spring.
    pub fn delete_spring_force(&mut self, body: BodyHandle) -> bool {
        match self.find_force_where(body, |kind| kind.is_spring()) {
            Some(spring) => self.remove_force(spring).is_some(),
            None => false,
        }
    }

    /// Connector segments of every force that has one, for drawing
    pub fn force_segments(&self) -> Vec<(ForceHandle, Vec3, Vec3)> {
        let context = ForceContext::new(&self.bodies);
        self.forces
            .iter()
            .filter_map(|(index, generator)| {
                let (from, to) = generator.segment(&context)?;
                Some((ForceHandle(index), from, to))
            })
            .collect()
    }

    // ----------------------------------------------------------------------
    // Collision surface
    // ----------------------------------------------------------------------

    /// Install, replace or clear the ground surface
    ///
    /// Every body forgets its previous contacts, so a body resting on the old
    /// surface lands afresh on the new one.
    pub fn set_collision_surface(&mut self, surface: Option<CollisionSurface>) -> Option<SurfaceId> {
        for &handle in &self.order {
            if let Some(body) = self.bodies.get_mut(handle.0) {
                body.clear_contacts();
            }
        }

        self.surface = surface.map(|surface| {
            let id = SurfaceId(self.next_surface_id);
            self.next_surface_id += 1;
            (id, surface)
        });
        self.surface.as_ref().map(|(id, _)| *id)
    }

    /// The installed ground surface
    pub fn collision_surface(&self) -> Option<&CollisionSurface> {
        self.surface.as_ref().map(|(_, surface)| surface)
    }

    /// Identifier of the installed ground surface
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(|(id, _)| *id)
    }

    // ----------------------------------------------------------------------
    // Stepping
    // ----------------------------------------------------------------------

    /// Advance every body by one tick of `dt` seconds starting at time `t`
    ///
    /// Returns the number of bodies stepped.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is non-positive, NaN, or infinite.
    pub fn step(&mut self, t: f64, dt: f64) -> usize {
        assert!(dt > 0.0 && dt.is_finite(), "Timestep must be positive and finite");

        for &handle in &self.order {
            if let Some(body) = self.bodies.get_mut(handle.0) {
                body.begin_tick();
            }
        }

        let mut stepped = 0;
        for &handle in &self.order {
            let Some(body) = self.bodies.get(handle.0) else {
                continue;
            };

            let context = ForceContext::new(&self.bodies);
            let forces = &self.forces;
            let next = self
                .integrator
                .integrate(body.current_state(), dt, &mut |state: &PhysState| {
                    body.evaluate(handle, state, forces, &context)
                });

            let Some(body) = self.bodies.get_mut(handle.0) else {
                continue;
            };
            body.finish_tick(next, &self.config);

            let transition = match &self.surface {
                Some((id, surface)) => body.resolve_ground_contact(*id, surface, &self.config),
                None => body.release_ground(),
            };
            match transition {
                ContactTransition::Landed => debug!("{} landed at t={:.3}", handle, t),
                ContactTransition::Departed => {
                    debug!("{} left the ground at t={:.3}", handle, t)
                }
                _ => {}
            }
            stepped += 1;
        }

        self.time = t + dt;
        self.ticks += 1;
        trace!("Tick {} stepped {} bodies", self.ticks, stepped);
        stepped
    }

    // ----------------------------------------------------------------------
    // Picking
    // ----------------------------------------------------------------------

    /// Nearest body whose committed bounds the segment `ray` passes through
    ///
    /// Bodies are tested in parallel. Ties go to the body added first.
    #[cfg(feature = "parallel")]
    pub fn pick(&self, ray: &Ray) -> Option<BodyHandle> {
        let bodies = &self.bodies;
        self.order
            .par_iter()
            .enumerate()
            .filter_map(|(rank, handle)| {
                let depth = bodies.get(handle.0)?.world_bounds().ray_depth(ray)?;
                Some((depth, rank, *handle))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, _, handle)| handle)
    }

    /// Nearest body whose committed bounds the segment `ray` passes through
    ///
    /// Ties go to the body added first.
    #[cfg(not(feature = "parallel"))]
    pub fn pick(&self, ray: &Ray) -> Option<BodyHandle> {
        let bodies = &self.bodies;
        self.order
            .iter()
            .enumerate()
            .filter_map(|(rank, handle)| {
                let depth = bodies.get(handle.0)?.world_bounds().ray_depth(ray)?;
                Some((depth, rank, *handle))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, _, handle)| handle)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration guard for a force
///
/// Dropping the guard removes the force from the scene on every exit path.
/// Call [`keep`](ScopedForce::keep) to disarm it.
pub struct ScopedForce<'a> {
    scene: &'a mut Scene,
    handle: ForceHandle,
    armed: bool,
}

impl<'a> ScopedForce<'a> {
    /// The guarded force
    pub fn handle(&self) -> ForceHandle {
        self.handle
    }

    /// Read access to the scene while the guard is held
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Write access to the scene while the guard is held
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    /// Disarm the guard and leave the force registered
    pub fn keep(mut self) -> ForceHandle {
        self.armed = false;
        self.handle
    }
}

impl Drop for ScopedForce<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.scene.remove_force(self.handle);
        }
    }
}
