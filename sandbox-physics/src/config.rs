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
//! Simulation tuning constants
//!
//! Friction coefficients, restitution and the ground-contact tolerances are
//! grouped in a [`SimulationConfig`] owned by the scene, so a sandbox can be
//! retuned without touching the stepping code.

/// Constant downward acceleration in world units per second squared
pub const GRAVITY: f64 = -9.8;

/// Friction coefficient applied while a body is airborne
pub const AIR_FRICTION: f64 = 0.2;

/// Friction coefficient for a grounded body that is (nearly) at rest
pub const GROUND_STATIC_FRICTION: f64 = 5.0;

/// Friction coefficient for a grounded body that is sliding
pub const GROUND_KINETIC_FRICTION: f64 = 2.0;

/// Momentum magnitude separating static from kinetic ground friction
pub const STATIC_MOMENTUM_THRESHOLD: f64 = 1.0;

/// Fraction of vertical momentum kept (and inverted) on landing
pub const BOUNCE_ELASTICITY: f64 = 0.3;

/// Distance below the ground's bottom face a sinking body is moved to
/// before the overlap test
pub const GROUND_EPSILON: f64 = 0.1;

/// Configuration for the stepping and grounding policy
///
/// # Examples
///
/// ```
/// use sandbox_physics::config::SimulationConfig;
///
/// let config = SimulationConfig::default()
///     .with_elasticity(0.5)
///     .with_air_friction(0.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Acceleration applied by gravitational forces (negative is down)
    pub gravity: f64,
    /// Friction coefficient while airborne
    pub air_friction: f64,
    /// Friction coefficient while grounded and slow
    pub static_friction: f64,
    /// Friction coefficient while grounded and sliding
    pub kinetic_friction: f64,
    /// Momentum magnitude below which grounded bodies use static friction
    pub static_threshold: f64,
    /// Restitution applied to vertical momentum on landing
    pub elasticity: f64,
    /// Vertical tolerance of the in-or-below ground test
    pub ground_epsilon: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            gravity: GRAVITY,
            air_friction: AIR_FRICTION,
            static_friction: GROUND_STATIC_FRICTION,
            kinetic_friction: GROUND_KINETIC_FRICTION,
            static_threshold: STATIC_MOMENTUM_THRESHOLD,
            elasticity: BOUNCE_ELASTICITY,
            ground_epsilon: GROUND_EPSILON,
        }
    }
}

impl SimulationConfig {
    /// Set the gravitational acceleration
    ///
    /// # Panics
    ///
    /// Panics if `gravity` is not finite.
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        assert!(gravity.is_finite(), "Gravity must be finite");
        self.gravity = gravity;
        self
    }

    /// Set the airborne friction coefficient
    ///
    /// # Panics
    ///
    /// Panics if `friction` is negative or not finite.
    pub fn with_air_friction(mut self, friction: f64) -> Self {
        assert!(
            friction >= 0.0 && friction.is_finite(),
            "Friction must be non-negative and finite"
        );
        self.air_friction = friction;
        self
    }

    /// Set the grounded static and kinetic friction coefficients
    ///
    /// # Panics
    ///
    /// Panics if either coefficient is negative or not finite.
    pub fn with_ground_friction(mut self, static_friction: f64, kinetic_friction: f64) -> Self {
        assert!(
            static_friction >= 0.0
                && static_friction.is_finite()
                && kinetic_friction >= 0.0
                && kinetic_friction.is_finite(),
            "Friction must be non-negative and finite"
        );
        self.static_friction = static_friction;
        self.kinetic_friction = kinetic_friction;
        self
    }

    /// Set the restitution coefficient used on landing
    ///
    /// # Panics
    ///
    /// Panics if `elasticity` is outside `[0, 1]`.
    pub fn with_elasticity(mut self, elasticity: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&elasticity),
            "Elasticity must be within [0, 1]"
        );
        self.elasticity = elasticity;
        self
    }

    /// Set the momentum threshold between static and kinetic ground friction
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is negative or not finite.
    pub fn with_static_threshold(mut self, threshold: f64) -> Self {
        assert!(
            threshold >= 0.0 && threshold.is_finite(),
            "Static threshold must be non-negative and finite"
        );
        self.static_threshold = threshold;
        self
    }

    /// Set how far under the ground's top face a sunken body is placed
    /// before the overlap test
    ///
    /// # Panics
    ///
    /// Panics if `epsilon` is negative or not finite.
    pub fn with_ground_epsilon(mut self, epsilon: f64) -> Self {
        assert!(
            epsilon >= 0.0 && epsilon.is_finite(),
            "Ground epsilon must be non-negative and finite"
        );
        self.ground_epsilon = epsilon;
        self
    }

    /// Friction coefficient for a grounded body carrying `momentum`
    pub fn ground_friction(&self, momentum: f64) -> f64 {
        if momentum < self.static_threshold {
            self.static_friction
        } else {
            self.kinetic_friction
        }
    }

    /// Check the configuration for values that would break the simulation
    ///
    /// Fields are public, so a config assembled by hand can bypass the
    /// builder assertions; the scene calls this before accepting one.
    pub fn validate(&self) -> Result<(), String> {
        if !self.gravity.is_finite() {
            return Err(format!("Invalid gravity: {}. Must be finite.", self.gravity));
        }

        for (name, value) in [
            ("air friction", self.air_friction),
            ("static friction", self.static_friction),
            ("kinetic friction", self.kinetic_friction),
            ("static threshold", self.static_threshold),
            ("ground epsilon", self.ground_epsilon),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(format!(
                    "Invalid {}: {}. Must be non-negative and finite.",
                    name, value
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.elasticity) {
            return Err(format!(
                "Invalid elasticity: {}. Must be within [0, 1].",
                self.elasticity
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gravity, -9.8);
        assert!(config.static_friction > config.air_friction);
        assert!(config.kinetic_friction > config.air_friction);
    }

    #[test]
    fn test_ground_friction_selection() {
        let config = SimulationConfig::default();
        assert_eq!(config.ground_friction(0.5), GROUND_STATIC_FRICTION);
        assert_eq!(config.ground_friction(1.0), GROUND_KINETIC_FRICTION);
        assert_eq!(config.ground_friction(7.0), GROUND_KINETIC_FRICTION);
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut config = SimulationConfig::default();
        config.elasticity = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.air_friction = f64::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.contains("air friction"));
    }

    #[test]
    fn test_builder_sets_ground_epsilon() {
        let config = SimulationConfig::default().with_ground_epsilon(0.0);
        assert_eq!(config.ground_epsilon, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "Ground epsilon must be non-negative and finite")]
    fn test_builder_rejects_ground_epsilon() {
        SimulationConfig::default().with_ground_epsilon(f64::NAN);
    }

    #[test]
    #[should_panic(expected = "Elasticity must be within [0, 1]")]
    fn test_builder_rejects_elasticity() {
        SimulationConfig::default().with_elasticity(-0.1);
    }
}
