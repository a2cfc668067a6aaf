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
//! Rigid-body state and its time derivative
//!
//! A [`PhysState`] is one snapshot of a body: the constant mass properties
//! plus the four primary quantities that are integrated (position, linear
//! momentum, orientation, angular momentum). Velocities and spin are derived
//! on demand rather than stored, so they can never disagree with momentum.
//!
//! A [`Derivative`] is the rate of change of those four primaries at some
//! state. It is transient and rebuilt at every integration sub-step.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// 3D vector in world units
pub type Vec3 = Vector3<f64>;

/// Raw (not necessarily unit) quaternion
///
/// Orientation is integrated additively, so it drifts off the unit sphere
/// between normalizations.
pub type Quat = Quaternion<f64>;

/// Instantaneous physical state of a body
///
/// Mass and inertia are isotropic scalars fixed at construction time;
/// `inverse_mass * mass == 1` always holds because zero mass is rejected.
///
/// # Examples
///
/// ```
/// use sandbox_physics::state::{PhysState, Vec3};
///
/// let mut state = PhysState::new(2.0, 1.0, Vec3::zeros(), 0.0);
/// state.linear_momentum = Vec3::new(4.0, 0.0, 0.0);
/// assert_eq!(state.velocity(), Vec3::new(2.0, 0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysState {
    mass: f64,
    inverse_mass: f64,
    inertia: f64,
    inverse_inertia: f64,

    /// Coefficient scaling the velocity-opposing friction force and torque
    pub friction: f64,
    /// Centre of mass in world space
    pub position: Vec3,
    /// Linear momentum (mass times velocity)
    pub linear_momentum: Vec3,
    /// Orientation, unit length only up to integration drift
    pub orientation: Quat,
    /// Angular momentum (inertia times angular velocity)
    pub angular_momentum: Vec3,
}

impl PhysState {
    /// Create a state at rest with identity orientation
    ///
    /// # Panics
    ///
    /// Panics if `mass` or `inertia` is not positive and finite.
    pub fn new(mass: f64, inertia: f64, position: Vec3, friction: f64) -> Self {
        assert!(mass > 0.0 && mass.is_finite(), "Mass must be positive and finite");
        assert!(
            inertia > 0.0 && inertia.is_finite(),
            "Inertia must be positive and finite"
        );
        PhysState {
            mass,
            inverse_mass: 1.0 / mass,
            inertia,
            inverse_inertia: 1.0 / inertia,
            friction,
            position,
            linear_momentum: Vec3::zeros(),
            orientation: Quat::identity(),
            angular_momentum: Vec3::zeros(),
        }
    }

    /// Mass in kilograms
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Reciprocal of the mass
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Scalar rotational inertia
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Reciprocal of the rotational inertia
    pub fn inverse_inertia(&self) -> f64 {
        self.inverse_inertia
    }

    /// Linear velocity derived from momentum
    pub fn velocity(&self) -> Vec3 {
        self.linear_momentum * self.inverse_mass
    }

    /// Angular velocity derived from angular momentum
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_momentum * self.inverse_inertia
    }

    /// Orientation projected back onto the unit sphere
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_quaternion(self.orientation)
    }

    /// Time derivative of the orientation
    ///
    /// `0.5 * (0, ω) * normalize(q)`. Normalization happens here, on a copy,
    /// and never on the stored orientation.
    pub fn spin(&self) -> Quat {
        let w = self.angular_velocity();
        Quat::new(0.0, w.x, w.y, w.z) * self.orientation.normalize() * 0.5
    }

    /// Map a point from body-local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, local: &Vec3, scale: f64) -> Vec3 {
        self.position + self.rotation() * (local * scale)
    }

    /// Copy of this state moved along `derivative` for `dt` seconds
    ///
    /// Used to build the intermediate evaluation points of the integrator.
    pub fn advanced(&self, dt: f64, derivative: &Derivative) -> PhysState {
        let mut state = *self;
        state.position += derivative.velocity * dt;
        state.linear_momentum += derivative.force * dt;
        state.orientation += derivative.spin * dt;
        state.angular_momentum += derivative.torque * dt;
        state
    }

    /// Check that every primary quantity is finite
    pub fn is_valid(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.linear_momentum.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
            && self.angular_momentum.iter().all(|v| v.is_finite())
    }
}

/// Rate of change of a [`PhysState`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    /// d(position)/dt
    pub velocity: Vec3,
    /// d(linear momentum)/dt
    pub force: Vec3,
    /// d(orientation)/dt
    pub spin: Quat,
    /// d(angular momentum)/dt
    pub torque: Vec3,
}

impl Derivative {
    /// Derivative with no motion and no applied load
    pub fn zero() -> Self {
        Derivative {
            velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            spin: Quat::new(0.0, 0.0, 0.0, 0.0),
            torque: Vec3::zeros(),
        }
    }

    /// Kinematic part of the derivative at `state`, with no force or torque yet
    pub fn kinematic(state: &PhysState) -> Self {
        Derivative {
            velocity: state.velocity(),
            spin: state.spin(),
            ..Derivative::zero()
        }
    }
}

impl Default for Derivative {
    fn default() -> Self {
        Derivative::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverse_quantities() {
        let state = PhysState::new(4.0, 2.0, Vec3::zeros(), 0.2);
        assert_eq!(state.inverse_mass(), 0.25);
        assert_eq!(state.inverse_inertia(), 0.5);
        assert_eq!(state.mass() * state.inverse_mass(), 1.0);
    }

    #[test]
    #[should_panic(expected = "Mass must be positive and finite")]
    fn test_zero_mass_panics() {
        PhysState::new(0.0, 1.0, Vec3::zeros(), 0.0);
    }

    #[test]
    #[should_panic(expected = "Inertia must be positive and finite")]
    fn test_negative_inertia_panics() {
        PhysState::new(1.0, -1.0, Vec3::zeros(), 0.0);
    }

    #[test]
    fn test_spin_is_zero_without_rotation() {
        let state = PhysState::new(1.0, 1.0, Vec3::zeros(), 0.0);
        assert_eq!(state.spin(), Quat::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_spin_uses_normalized_orientation() {
        let mut state = PhysState::new(1.0, 1.0, Vec3::zeros(), 0.0);
        state.angular_momentum = Vec3::new(0.0, 2.0, 0.0);
        state.orientation = Quat::new(3.0, 0.0, 0.0, 0.0);

        let spin = state.spin();
        // 0.5 * (0, 0, 2, 0) * (1, 0, 0, 0)
        assert_relative_eq!(spin.w, 0.0);
        assert_relative_eq!(spin.j, 1.0);
        // The stored orientation is untouched
        assert_eq!(state.orientation.w, 3.0);
    }

    #[test]
    fn test_transform_point_applies_scale_rotation_translation() {
        let mut state = PhysState::new(1.0, 1.0, Vec3::new(1.0, 2.0, 3.0), 0.0);
        let quarter_turn =
            UnitQuaternion::from_axis_angle(&Vec3::y_axis(), std::f64::consts::FRAC_PI_2);
        state.orientation = *quarter_turn.quaternion();

        let world = state.transform_point(&Vec3::new(1.0, 0.0, 0.0), 2.0);
        assert_relative_eq!(world, Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_advanced_moves_every_primary() {
        let state = PhysState::new(1.0, 1.0, Vec3::zeros(), 0.0);
        let derivative = Derivative {
            velocity: Vec3::new(1.0, 0.0, 0.0),
            force: Vec3::new(0.0, 2.0, 0.0),
            spin: Quat::new(0.0, 0.0, 0.0, 1.0),
            torque: Vec3::new(0.0, 0.0, 4.0),
        };

        let moved = state.advanced(0.5, &derivative);
        assert_eq!(moved.position, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(moved.linear_momentum, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(moved.orientation, Quat::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(moved.angular_momentum, Vec3::new(0.0, 0.0, 2.0));
        // Source state is unchanged
        assert_eq!(state.position, Vec3::zeros());
    }

    #[test]
    fn test_validity() {
        let mut state = PhysState::new(1.0, 1.0, Vec3::zeros(), 0.0);
        assert!(state.is_valid());
        state.position.x = f64::NAN;
        assert!(!state.is_valid());
    }
}
