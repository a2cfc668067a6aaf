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
//! Tests verifying RK4 accuracy through the full scene pipeline
//!
//! Each test drives a [`Scene`] with air friction disabled and compares the
//! integrated state against the closed-form solution.

use approx::assert_relative_eq;
use sandbox_physics::forces::DEFAULT_ATTACH_OFFSET;
use sandbox_physics::{Body, Scene, SimulationConfig, Vec3};

const DT: f64 = 1.0 / 60.0;

fn frictionless_scene() -> Scene {
    Scene::with_config(SimulationConfig::default().with_air_friction(0.0)).unwrap()
}

fn run(scene: &mut Scene, dt: f64, ticks: usize) {
    for tick in 0..ticks {
        scene.step(tick as f64 * dt, dt);
    }
}

/// Free fall under gravity
///
/// Constant acceleration is a quadratic in time, which RK4 integrates
/// exactly up to rounding.
///
/// Analytical solution: y(t) = -0.5 * g * t²
///                      p(t) = -m * g * t
#[test]
fn test_free_fall_one_second() {
    let mut scene = frictionless_scene();
    let ball = scene.add_body(Body::new(3.0, Vec3::new(0.0, 0.0, -5.0)));
    scene.add_gravity(ball);

    run(&mut scene, DT, 60);

    let next = scene.body(ball).unwrap().next_state();
    assert_relative_eq!(next.position.y, -4.9, epsilon = 1e-9);
    assert_relative_eq!(next.linear_momentum.y, -29.4, epsilon = 1e-9);
    assert_eq!(next.position.x, 0.0);
    assert_eq!(next.position.z, -5.0);
}

#[test]
fn test_projectile_matches_closed_form() {
    let mass = 2.0;
    let v0 = Vec3::new(3.0, 4.0, 0.0);
    let mut scene = frictionless_scene();
    let ball = scene.add_body(Body::new(mass, Vec3::zeros()).with_linear_momentum(v0 * mass));
    scene.add_gravity(ball);

    run(&mut scene, DT, 90);

    let t = 90.0 * DT;
    let next = scene.body(ball).unwrap().next_state();
    assert_relative_eq!(next.position.x, v0.x * t, epsilon = 1e-9);
    assert_relative_eq!(next.position.y, v0.y * t - 4.9 * t * t, epsilon = 1e-9);
}

/// Harmonic oscillator on an anchored spring
///
/// With the attachment point at the centre of mass the spring exerts no
/// torque and the body follows x(t) = cos(ωt), ω = sqrt(k/m).
#[test]
fn test_anchored_spring_oscillates() {
    let mut scene = frictionless_scene();
    let bob = scene.add_body(Body::new(1.0, Vec3::new(1.0, 0.0, 0.0)));
    scene.add_spring(bob, Vec3::zeros(), 4.0, 0.0, Vec3::zeros());

    run(&mut scene, DT, 60);

    let next = scene.body(bob).unwrap().next_state();
    assert_relative_eq!(next.position.x, (2.0_f64).cos(), epsilon = 1e-6);
    assert_relative_eq!(next.linear_momentum.x, -2.0 * (2.0_f64).sin(), epsilon = 1e-6);
    assert_relative_eq!(next.angular_momentum.norm(), 0.0);
}

/// Halving the timestep should cut the global error by about 2⁴
#[test]
fn test_fourth_order_convergence() {
    fn error_after_one_second(dt: f64) -> f64 {
        let mut scene = frictionless_scene();
        let bob = scene.add_body(Body::new(1.0, Vec3::new(1.0, 0.0, 0.0)));
        scene.add_spring(bob, Vec3::zeros(), 4.0, 0.0, Vec3::zeros());
        run(&mut scene, dt, (1.0 / dt).round() as usize);
        (scene.body(bob).unwrap().next_state().position.x - (2.0_f64).cos()).abs()
    }

    let coarse = error_after_one_second(0.1);
    let fine = error_after_one_second(0.05);
    assert!(coarse > fine, "Error should shrink with dt: {} vs {}", coarse, fine);
    assert!(
        coarse / fine > 10.0,
        "Expected roughly 16x error reduction, got {}",
        coarse / fine
    );
}

#[test]
fn test_constant_spin_turns_one_radian() {
    let mut scene = frictionless_scene();
    let top = scene
        .add_body(Body::new(1.0, Vec3::zeros()).with_angular_momentum(Vec3::new(0.0, 1.0, 0.0)));

    run(&mut scene, DT, 60);

    let rotation = scene.body(top).unwrap().next_state().rotation();
    assert_relative_eq!(rotation.angle(), 1.0, epsilon = 1e-4);
    let axis = rotation.axis().unwrap();
    assert_relative_eq!(axis.y, 1.0, epsilon = 1e-6);
}

#[test]
fn test_air_friction_decays_momentum() {
    let mut scene = Scene::new();
    let puck = scene
        .add_body(Body::new(1.0, Vec3::zeros()).with_linear_momentum(Vec3::new(1.0, 0.0, 0.0)));

    run(&mut scene, DT, 60);

    // dp/dt = -(c/m) p with c = 0.2
    let p = scene.body(puck).unwrap().next_state().linear_momentum.x;
    assert_relative_eq!(p, (-0.2_f64).exp(), epsilon = 1e-6);
}

#[test]
fn test_off_centre_spring_induces_spin() {
    let mut scene = frictionless_scene();
    let bar = scene.add_body(Body::new(1.0, Vec3::new(0.0, 1.0, 0.0)));
    // Anchor straight above the default attachment point
    scene.add_spring(bar, Vec3::new(-0.5, 3.0, 0.0), 10.0, 0.0, DEFAULT_ATTACH_OFFSET);
    scene.add_gravity(bar);

    run(&mut scene, DT, 10);

    let next = scene.body(bar).unwrap().next_state();
    assert!(next.angular_momentum.z.abs() > 1e-3);
    assert!(next.is_valid());
}
