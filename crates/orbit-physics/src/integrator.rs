//! Semi-implicit Euler integration with fixed sub-stepping
//!
//! The externally requested tick delta (wall time × time multiplier) is
//! clamped and subdivided so no single step exceeds the configured
//! sub-step, which keeps the integrator stable at high time
//! acceleration. Velocity is updated from acceleration first, position
//! from the *new* velocity — the symplectic ordering that keeps orbital
//! energy bounded where naive explicit Euler spirals out.

use glam::DVec3;

use crate::constants::{BURNUP_ALTITUDE_KM, MAX_TICK_SECONDS, SUB_STEP_SECONDS};
use crate::forces::{acceleration, ForceConfig};
use crate::orbit::altitude_km;

/// Sub-step sizing for one tick.
#[derive(Clone, Copy, Debug)]
pub struct IntegratorConfig {
    /// Upper bound on a single integration step (s)
    pub sub_step: f64,
    /// Upper bound on total simulated time per tick (s)
    pub max_tick: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            sub_step: SUB_STEP_SECONDS,
            max_tick: MAX_TICK_SECONDS,
        }
    }
}

/// Sub-step plan for a requested tick delta: `count` equal steps of
/// length `step` seconds, `count * step == clamped dt`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubStepPlan {
    pub count: u32,
    pub step: f64,
}

impl IntegratorConfig {
    pub fn plan(&self, dt: f64) -> SubStepPlan {
        let dt = dt.clamp(0.0, self.max_tick);
        if dt <= 0.0 {
            return SubStepPlan { count: 0, step: 0.0 };
        }
        let count = (dt / self.sub_step).ceil() as u32;
        SubStepPlan {
            count,
            step: dt / count as f64,
        }
    }
}

/// Result of advancing one object through one sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    /// Altitude fell below the burnup threshold; the object is destroyed
    /// instead of integrated
    Reentered,
    /// Non-finite state after integration; treated as an implicit reentry
    Anomaly,
}

/// Advance one object by one sub-step of `h` seconds.
///
/// The burnup check runs before integration: an object already below the
/// threshold burns rather than being pushed further in.
pub fn integrate_sub_step(
    position: &mut DVec3,
    velocity: &mut DVec3,
    sim_time: f64,
    h: f64,
    forces: &ForceConfig,
) -> StepOutcome {
    if altitude_km(*position) < BURNUP_ALTITUDE_KM {
        return StepOutcome::Reentered;
    }

    let acc = acceleration(*position, *velocity, sim_time, forces);
    *velocity += acc * h;
    *position += *velocity * h;

    if !position.is_finite() || !velocity.is_finite() {
        return StepOutcome::Anomaly;
    }
    if altitude_km(*position) < BURNUP_ALTITUDE_KM {
        return StepOutcome::Reentered;
    }
    StepOutcome::Alive
}
