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
//! Drop-and-bounce demo
//!
//! Builds the classic sandbox scene headless: a box dropped onto the
//! ground, a box hanging from an anchored spring, and two boxes tied
//! together. A simulated 60 Hz display drives the fixed-timestep clock and
//! the interpolated poses are printed every half second. Halfway through
//! the box on the spring is cut loose.
//!
//! Landings are reported through the `log` facade at debug level and show
//! up once a logger is installed.

use sandbox_physics::forces::{SpringForce, DEFAULT_ATTACH_OFFSET};
use sandbox_physics::{Body, CollisionSurface, FixedTimestep, Ray, Scene, Vec3};

fn main() {
    println!("Sandbox Physics - Drop and Bounce");
    println!("=================================\n");

    let mut scene = Scene::new();
    scene.set_collision_surface(Some(CollisionSurface::ground_plane(-3.0, 50.0, 1.0)));

    let dropped = scene.add_body(Body::new(3.0, Vec3::new(0.0, 4.0, -5.0)));
    scene.add_gravity(dropped);

    let hanging = scene.add_body(Body::new(1.0, Vec3::new(3.0, 1.0, -5.0)).with_scale(0.5));
    scene.add_gravity(hanging);
    let anchor = Vec3::new(3.0, 3.0, -5.0);
    let spring = scene.add_spring(hanging, anchor, 20.0, 0.5, DEFAULT_ATTACH_OFFSET);

    let left = scene.add_body(Body::new(1.0, Vec3::new(-4.0, 2.0, -6.0)));
    let right = scene.add_body(Body::new(2.0, Vec3::new(-1.0, 2.0, -6.0)));
    scene.add_gravity(left);
    scene.add_gravity(right);
    scene.add_two_way_spring(left, right, 10.0, 0.2, DEFAULT_ATTACH_OFFSET, DEFAULT_ATTACH_OFFSET);

    println!("Created {} bodies and {} forces", scene.body_count(), scene.force_count());
    if let Some(anchor) = scene.force_as::<SpringForce>(spring).map(SpringForce::anchor) {
        println!("Spring anchored at ({:.1}, {:.1}, {:.1})\n", anchor.x, anchor.y, anchor.z);
    }

    let mut clock = FixedTimestep::default();
    let frame_time = 1.0 / 60.0;

    for frame in 1..=360 {
        clock.advance(frame_time, |t, dt| {
            scene.step(t, dt);
        });

        if frame == 180 && scene.delete_spring_force(hanging) {
            println!("  [t={:.2}] Cut the hanging box loose", clock.time());
        }

        if frame % 30 == 0 {
            let alpha = clock.alpha();
            let bodies = [
                ("dropped", dropped),
                ("hanging", hanging),
                ("left", left),
                ("right", right),
            ];
            for (name, handle) in bodies {
                if let Some(pose) = scene.pose(handle, alpha) {
                    let grounded = scene.is_on_ground(handle).unwrap_or(false);
                    println!(
                        "  [t={:.2}] {:<8} y = {:>7.3}{}",
                        clock.time(),
                        name,
                        pose.position.y,
                        if grounded { "  (on ground)" } else { "" }
                    );
                }
            }
            println!();
        }
    }

    // Cast a ray from the camera straight down the -z axis
    let ray = Ray::new(Vec3::new(0.0, -2.5, 0.0), Vec3::new(0.0, -2.5, -100.0));
    match scene.pick(&ray) {
        Some(handle) if handle == dropped => println!("Picked the dropped box"),
        Some(handle) => println!("Picked {}", handle),
        None => println!("Picked nothing"),
    }

    println!("\nSimulated {:.2} s in {} ticks", scene.time(), scene.tick_count());
}
