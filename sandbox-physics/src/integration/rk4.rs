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
//! Runge-Kutta 4th order (RK4) integrator implementation
//!
//! The RK4 method is a classical explicit integrator that provides fourth-order
//! accuracy for smooth ordinary differential equations.
//!
//! # Algorithm
//!
//! ```text
//! a = f(S0)
//! b = f(S0 + a*dt/2)
//! c = f(S0 + b*dt/2)
//! d = f(S0 + c*dt)
//! S(t + dt) = S0 + (a + 2*b + 2*c + d)*dt/6
//! ```
//!
//! The state holds four coupled first-order quantities and each gets the
//! same weighted sum from its own derivative component:
//!
//! | quantity         | derivative |
//! |------------------|------------|
//! | position         | velocity   |
//! | linear momentum  | force      |
//! | orientation      | spin       |
//! | angular momentum | torque     |
//!
//! Orientation is summed as a raw quaternion and not renormalized here; the
//! spin evaluation normalizes its own copy.
//!
//! # Properties
//!
//! - **Fourth-order accurate**: Local error O(dt⁵), global error O(dt⁴)
//! - **Exact for constant forces**: motion under uniform gravity is a
//!   quadratic in time, which RK4 reproduces up to rounding
//! - **Not symplectic**: Energy may drift over long simulations
//!
//! # References
//!
//! - Butcher, J. C. (2016). Numerical Methods for Ordinary Differential Equations
//!   (3rd ed.). Wiley. Chapter 3.
//! - Press, W. H., Teukolsky, S. A., Vetterling, W. T., & Flannery, B. P. (2007).
//!   Numerical Recipes: The Art of Scientific Computing (3rd ed.). Cambridge
//!   University Press. Section 17.1.

use super::Integrator;
use crate::state::{Derivative, PhysState};

/// Runge-Kutta 4th order integrator
///
/// # Example
///
/// ```
/// use sandbox_physics::integration::{Integrator, RK4Integrator};
/// use sandbox_physics::state::{Derivative, PhysState, Vec3};
///
/// let integrator = RK4Integrator::new();
/// let mut state = PhysState::new(1.0, 1.0, Vec3::zeros(), 0.0);
/// state.linear_momentum = Vec3::new(1.0, 0.0, 0.0);
///
/// let next = integrator.integrate(&state, 0.5, &mut |s: &PhysState| Derivative::kinematic(s));
/// assert_eq!(next.position, Vec3::new(0.5, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Integrator;

impl RK4Integrator {
    /// Create a new RK4 integrator
    pub fn new() -> Self {
        RK4Integrator
    }
}

impl Integrator for RK4Integrator {
    fn name(&self) -> &str {
        "Runge-Kutta 4"
    }

    fn integrate(
        &self,
        state: &PhysState,
        dt: f64,
        evaluate: &mut dyn FnMut(&PhysState) -> Derivative,
    ) -> PhysState {
        let dt_2 = dt * 0.5;
        let dt_6 = dt / 6.0;

        let a = evaluate(state);
        let b = evaluate(&state.advanced(dt_2, &a));
        let c = evaluate(&state.advanced(dt_2, &b));
        let d = evaluate(&state.advanced(dt, &c));

        let mut next = *state;
        next.position += (a.velocity + (b.velocity + c.velocity) * 2.0 + d.velocity) * dt_6;
        next.linear_momentum += (a.force + (b.force + c.force) * 2.0 + d.force) * dt_6;
        next.orientation += (a.spin + (b.spin + c.spin) * 2.0 + d.spin) * dt_6;
        next.angular_momentum += (a.torque + (b.torque + c.torque) * 2.0 + d.torque) * dt_6;
        next
    }
}
