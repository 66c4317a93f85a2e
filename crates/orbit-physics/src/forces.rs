//! Force model: central gravity, simplified lunar perturbation, drag
//!
//! NOTE: These are the reference implementations, used directly by the
//! sequential backend and by tests. The large-scale backend evaluates the
//! same formulas in the integration compute shader.

use glam::DVec3;

use crate::constants::*;
use crate::orbit::altitude_km;

/// Which force terms are active. Tests disable drag and the Moon to get a
/// clean two-body problem.
#[derive(Clone, Copy, Debug)]
pub struct ForceConfig {
    pub drag_enabled: bool,
    /// Density coefficient `k` of the drag law
    pub drag_coefficient: f64,
    pub moon_enabled: bool,
    /// Scale applied to the lunar term
    pub moon_attenuation: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            drag_enabled: true,
            drag_coefficient: DRAG_DENSITY_COEFFICIENT,
            moon_enabled: true,
            moon_attenuation: MOON_ATTENUATION,
        }
    }
}

impl ForceConfig {
    /// Pure two-body configuration: central gravity only.
    pub fn two_body() -> Self {
        Self {
            drag_enabled: false,
            moon_enabled: false,
            ..Self::default()
        }
    }
}

/// Central-body gravitational acceleration: `a = -μ/r³ · r_vec` (km/s²).
///
/// Guarded against the singularity at the origin; nothing orbits inside
/// 1 km of the Earth's center.
#[inline]
pub fn central_gravity(position: DVec3) -> DVec3 {
    let r_squared = position.length_squared();
    if r_squared < 1.0 {
        return DVec3::ZERO;
    }
    let r = r_squared.sqrt();
    position * (-MU_EARTH / (r_squared * r))
}

/// Moon position on its simplified circular orbit at `sim_time` seconds
/// (km). Fixed orbital plane, fixed angular rate.
#[inline]
pub fn moon_position(sim_time: f64) -> DVec3 {
    let angle = MOON_ANGULAR_RATE * sim_time;
    DVec3::new(
        MOON_DISTANCE_KM * angle.cos(),
        0.0,
        MOON_DISTANCE_KM * angle.sin(),
    )
}

/// Attenuated point-mass acceleration toward the Moon (km/s²).
///
/// A deliberate simplification: one perturbing body on a circular orbit,
/// scaled down by `attenuation`, not an n-body solve.
#[inline]
pub fn moon_gravity(position: DVec3, sim_time: f64, attenuation: f64) -> DVec3 {
    let delta = moon_position(sim_time) - position;
    let r_squared = delta.length_squared();
    if r_squared < 1.0 {
        return DVec3::ZERO;
    }
    let r = r_squared.sqrt();
    delta * (attenuation * MU_MOON / (r_squared * r))
}

/// Atmospheric drag acceleration (km/s²).
///
/// Active only below [`DRAG_ALTITUDE_KM`]. Opposes the velocity with
/// magnitude `exp(-(alt-100)/50) * k * |v|²`.
#[inline]
pub fn drag(position: DVec3, velocity: DVec3, k: f64) -> DVec3 {
    let alt = altitude_km(position);
    if alt >= DRAG_ALTITUDE_KM {
        return DVec3::ZERO;
    }
    let speed_squared = velocity.length_squared();
    if speed_squared <= 0.0 {
        return DVec3::ZERO;
    }
    let density = (-(alt - BURNUP_ALTITUDE_KM) / 50.0).exp();
    let magnitude = density * k * speed_squared;
    -velocity / speed_squared.sqrt() * magnitude
}

/// Total acceleration on an object (km/s²).
#[inline]
pub fn acceleration(position: DVec3, velocity: DVec3, sim_time: f64, config: &ForceConfig) -> DVec3 {
    let mut acc = central_gravity(position);
    if config.moon_enabled {
        acc += moon_gravity(position, sim_time, config.moon_attenuation);
    }
    if config.drag_enabled {
        acc += drag(position, velocity, config.drag_coefficient);
    }
    acc
}
