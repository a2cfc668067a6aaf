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
//! Numerical integration of rigid-body state
//!
//! An integrator advances one [`PhysState`] by one fixed timestep, calling
//! back into the body to evaluate the [`Derivative`] at whatever
//! intermediate states its scheme needs. The body supplies the evaluation
//! closure, so integrators never see forces directly.
//!
//! # Integrators
//!
//! - **RK4 (Runge-Kutta 4th order)**: four evaluations per step, applied
//!   independently to position, linear momentum, orientation and angular
//!   momentum
//!
//! # Timestep Guidelines
//!
//! - Too small: Numerical precision issues and wasted computation
//! - Too large: Instability and inaccuracy, stiff springs explode first
//! - Recommended: dt = 1/60 driven by a fixed-step accumulator

use crate::state::{Derivative, PhysState};

mod rk4;

pub use rk4::RK4Integrator;

/// Trait for numerical integration methods
///
/// Integrators are stateless between calls; the scene hands each body's
/// current state in and stores the returned state as the body's next state.
pub trait Integrator: Send + Sync {
    /// Get the name of this integrator
    fn name(&self) -> &str;

    /// Advance `state` by `dt` seconds
    ///
    /// `evaluate` returns the derivative at a given state and must be a
    /// pure function of that state.
    fn integrate(
        &self,
        state: &PhysState,
        dt: f64,
        evaluate: &mut dyn FnMut(&PhysState) -> Derivative,
    ) -> PhysState;
}

/// Validate a timestep for stability
///
/// Returns an error for non-positive or non-finite timesteps, and a warning
/// message for timesteps that are legal but likely to misbehave: extremely
/// small ones lose precision, large ones go unstable.
pub fn validate_timestep(dt: f64) -> Result<(), String> {
    if dt <= 0.0 || !dt.is_finite() {
        return Err(format!("Invalid timestep: {}. Must be positive and finite.", dt));
    }

    if dt < 1e-9 {
        return Err(format!(
            "Warning: Timestep {} is extremely small and may cause precision loss with f64. \
            Consider using larger timestep or higher precision types.",
            dt
        ));
    }

    if dt > 1.0 {
        return Err(format!(
            "Warning: Timestep {} is large and may cause instability. \
            Consider using smaller timesteps for better accuracy.",
            dt
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timestep() {
        assert!(validate_timestep(1.0 / 60.0).is_ok());
        assert!(validate_timestep(0.0).unwrap_err().starts_with("Invalid"));
        assert!(validate_timestep(f64::NAN).unwrap_err().starts_with("Invalid"));
        assert!(validate_timestep(1e-12).unwrap_err().starts_with("Warning"));
        assert!(validate_timestep(2.0).unwrap_err().starts_with("Warning"));
    }
}
