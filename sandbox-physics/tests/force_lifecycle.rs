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
//! Integration tests for force ownership
//!
//! A force generator lives exactly as long as its registration: removing
//! the force, removing any target body, dropping a scoped guard, or dropping
//! the scene each destroy it exactly once.

use sandbox_physics::forces::{ForceContext, ForceGenerator, ForceKind, DEFAULT_ATTACH_OFFSET};
use sandbox_physics::state::{Derivative, PhysState};
use sandbox_physics::{Body, BodyHandle, Scene, Vec3};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Constant push that counts its own destruction
struct CountedPush {
    target: [BodyHandle; 1],
    push: Vec3,
    drops: Arc<AtomicUsize>,
}

impl CountedPush {
    fn new(target: BodyHandle, push: Vec3, drops: &Arc<AtomicUsize>) -> Box<Self> {
        Box::new(CountedPush {
            target: [target],
            push,
            drops: Arc::clone(drops),
        })
    }
}

impl Drop for CountedPush {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl ForceGenerator for CountedPush {
    fn name(&self) -> &str {
        "CountedPush"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::Custom
    }

    fn targets(&self) -> &[BodyHandle] {
        &self.target
    }

    fn apply_force(
        &self,
        _target: BodyHandle,
        _body: &Body,
        _state: &PhysState,
        _context: &ForceContext<'_>,
        derivative: &mut Derivative,
    ) {
        derivative.force += self.push;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

#[test]
fn test_remove_force_returns_generator_once() {
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let push = scene.add_force(CountedPush::new(body, Vec3::new(1.0, 0.0, 0.0), &drops));

    let generator = scene.remove_force(push).unwrap();
    assert_eq!(generator.name(), "CountedPush");
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(generator);
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    assert!(scene.remove_force(push).is_none());
    assert!(scene.forces_of(body).is_empty());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_removing_body_destroys_its_forces() {
    let drops = counter();
    let mut scene = Scene::new();
    let a = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let b = scene.add_body(Body::new(1.0, Vec3::new(3.0, 0.0, 0.0)));

    scene.add_force(CountedPush::new(a, Vec3::x(), &drops));
    scene.add_force(CountedPush::new(a, Vec3::y(), &drops));
    let survivor = scene.add_force(CountedPush::new(b, Vec3::z(), &drops));
    let coupling =
        scene.add_two_way_spring(a, b, 1.0, 0.0, DEFAULT_ATTACH_OFFSET, DEFAULT_ATTACH_OFFSET);

    let removed = scene.remove_body(a).unwrap();
    assert_eq!(removed.forces().len(), 0);
    assert_eq!(drops.load(Ordering::SeqCst), 2);

    // The partner no longer lists the spring
    assert_eq!(scene.forces_of(b), &[survivor]);
    assert!(scene.force(coupling).is_none());
    assert_eq!(scene.force_count(), 1);

    // Stepping after removal still works
    scene.step(0.0, 1.0 / 60.0);
    assert!(scene.body(b).unwrap().next_state().position.z > 0.0);
}

#[test]
fn test_destroy_order_does_not_matter() {
    // Force first, then body
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let push = scene.add_force(CountedPush::new(body, Vec3::x(), &drops));
    drop(scene.remove_force(push));
    assert!(scene.remove_body(body).is_some());
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    // Body first, then force
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let push = scene.add_force(CountedPush::new(body, Vec3::x(), &drops));
    assert!(scene.remove_body(body).is_some());
    assert!(scene.remove_force(push).is_none());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_scene_destroys_forces() {
    let drops = counter();
    {
        let mut scene = Scene::new();
        let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
        for _ in 0..3 {
            scene.add_force(CountedPush::new(body, Vec3::x(), &drops));
        }
    }
    assert_eq!(drops.load(Ordering::SeqCst), 3);
}

fn interrupt() -> Result<(), String> {
    Err("interrupted".to_string())
}

fn push_until_failure(
    scene: &mut Scene,
    body: BodyHandle,
    drops: &Arc<AtomicUsize>,
) -> Result<(), String> {
    let push = scene.add_force(CountedPush::new(body, Vec3::x(), drops));
    let mut guard = scene.scoped(push);
    guard.scene_mut().step(0.0, 1.0 / 60.0);
    interrupt()?;
    guard.scene_mut().step(1.0 / 60.0, 1.0 / 60.0);
    Ok(())
}

#[test]
fn test_scoped_force_released_on_early_return() {
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));

    assert!(push_until_failure(&mut scene, body, &drops).is_err());
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(scene.forces_of(body).is_empty());
    assert_eq!(scene.tick_count(), 1);

    // The push acted during the single tick it was registered for
    let after = scene.body(body).unwrap().next_state().linear_momentum.x;
    scene.step(1.0 / 60.0, 1.0 / 60.0);
    assert!(after > 0.0);
    assert!(scene.body(body).unwrap().next_state().linear_momentum.x < after);
}

#[test]
fn test_scoped_force_keep() {
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let push = scene.add_force(CountedPush::new(body, Vec3::x(), &drops));

    let kept = scene.scoped(push).keep();
    assert_eq!(kept, push);
    assert_eq!(scene.forces_of(body), &[push]);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
}

#[test]
fn test_custom_force_downcast() {
    let drops = counter();
    let mut scene = Scene::new();
    let body = scene.add_body(Body::new(1.0, Vec3::zeros()));
    let push = scene.add_force(CountedPush::new(body, Vec3::x(), &drops));

    scene.force_as_mut::<CountedPush>(push).unwrap().push = Vec3::new(-2.0, 0.0, 0.0);
    assert_eq!(scene.force(push).unwrap().kind(), ForceKind::Custom);
    assert!(!scene.delete_spring_force(body));
    assert!(scene.toggle_gravity(body).is_some());

    scene.step(0.0, 1.0 / 60.0);
    let p = scene.body(body).unwrap().next_state().linear_momentum;
    assert!(p.x < 0.0);
    assert!(p.y < 0.0);
}
