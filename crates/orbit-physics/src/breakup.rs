//! Statistical collision breakup model
//!
//! Fragment counts, delta-v, and mass follow the shape of the NASA
//! standard breakup model: the number of fragments scales with impact
//! speed, per-fragment delta-v is log-normal around a regime-dependent
//! mean, and the mass split is power-law weighted so a breakup yields
//! many small fragments and few large ones.

use glam::DVec3;
use rand::Rng;

use crate::constants::*;
use crate::orbit::local_circular_velocity;

/// Tunables for debris synthesis.
#[derive(Clone, Copy, Debug)]
pub struct BreakupConfig {
    /// Fragments per km/s of impact speed
    pub fragment_density_factor: f64,
    /// Dispersion of the log-normal delta-v draw
    pub delta_v_sigma: f64,
}

impl Default for BreakupConfig {
    fn default() -> Self {
        Self {
            fragment_density_factor: FRAGMENT_DENSITY_FACTOR,
            delta_v_sigma: DELTA_V_SIGMA,
        }
    }
}

/// One synthesized debris fragment, ready for insertion into the store.
#[derive(Clone, Debug)]
pub struct Fragment {
    /// Spawn position (km)
    pub position: DVec3,
    /// Orbital velocity plus breakup kick (km/s)
    pub velocity: DVec3,
    /// Mass (kg)
    pub mass: f64,
    /// Collision radius (km)
    pub radius: f64,
}

/// Ideal fragment yield for an impact, before capacity limits:
/// `floor(rel_speed * density_factor)`.
#[inline]
pub fn fragment_count(rel_speed_km_s: f64, density_factor: f64) -> usize {
    (rel_speed_km_s * density_factor).max(0.0).floor() as usize
}

/// Catastrophic-breakup test from the standard model: specific impact
/// energy (kinetic energy of the smaller body per kg of combined mass)
/// at or above 40 kJ/kg shatters both parents.
#[inline]
pub fn is_catastrophic(rel_speed_km_s: f64, smaller_mass_kg: f64, combined_mass_kg: f64) -> bool {
    if combined_mass_kg <= 0.0 {
        return false;
    }
    let v_m_s = rel_speed_km_s * 1000.0;
    let specific_energy = 0.5 * smaller_mass_kg * v_m_s * v_m_s / combined_mass_kg;
    specific_energy >= CATASTROPHIC_ENERGY_J_PER_KG
}

/// Standard normal draw via Box–Muller.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Uniform direction on the unit sphere.
fn sphere_direction(rng: &mut impl Rng) -> DVec3 {
    let theta = rng.random::<f64>() * std::f64::consts::TAU;
    let cos_phi = rng.random::<f64>() * 2.0 - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
    DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Sample one fragment delta-v magnitude (km/s).
///
/// `log10(Δv m/s)` is normal with mean `0.9χ + 2.9` (catastrophic) or
/// `0.2χ + 1.85` (non-catastrophic), `χ = log10(impact speed)`. Capped so
/// a lucky draw cannot eject a fragment onto an escape trajectory.
pub fn sample_delta_v(
    rng: &mut impl Rng,
    rel_speed_km_s: f64,
    catastrophic: bool,
    sigma: f64,
) -> f64 {
    let chi = rel_speed_km_s.max(1e-3).log10();
    let mean = if catastrophic {
        0.9 * chi + 2.9
    } else {
        0.2 * chi + 1.85
    };
    let exponent = mean + sigma * standard_normal(rng);
    let dv_m_s = 10f64.powf(exponent);
    (dv_m_s / 1000.0).min(MAX_FRAGMENT_DV_KM_S)
}

/// Fragment radius (km) from mass at the fixed material density.
#[inline]
pub fn radius_from_mass(mass_kg: f64) -> f64 {
    let volume_m3 = mass_kg / FRAGMENT_MATERIAL_DENSITY;
    let r_m = (3.0 * volume_m3 / (4.0 * std::f64::consts::PI)).cbrt();
    r_m / 1000.0
}

/// Synthesize `count` fragments for an impact at `impact_point`.
///
/// Each fragment starts near the impact point on the local circular
/// orbital velocity, kicked by a random delta-v. The combined parent mass
/// is split by `u²`-weighted fractions normalized to conserve mass.
pub fn fragment_cloud(
    rng: &mut impl Rng,
    impact_point: DVec3,
    rel_speed_km_s: f64,
    combined_mass_kg: f64,
    catastrophic: bool,
    count: usize,
    config: &BreakupConfig,
) -> Vec<Fragment> {
    if count == 0 {
        return Vec::new();
    }

    // Power-law mass split: squaring a uniform draw skews the weight
    // distribution toward small fragments.
    let weights: Vec<f64> = (0..count).map(|_| rng.random::<f64>().powi(2)).collect();
    let total_weight: f64 = weights.iter().sum();

    let orbital_velocity = local_circular_velocity(impact_point);

    let mut fragments = Vec::with_capacity(count);
    for weight in weights {
        let mass = if total_weight > 0.0 {
            combined_mass_kg * weight / total_weight
        } else {
            combined_mass_kg / count as f64
        };

        let scatter = sphere_direction(rng) * (rng.random::<f64>() * FRAGMENT_SCATTER_KM);
        let dv = sphere_direction(rng)
            * sample_delta_v(rng, rel_speed_km_s, catastrophic, config.delta_v_sigma);

        fragments.push(Fragment {
            position: impact_point + scatter,
            velocity: orbital_velocity + dv,
            mass,
            radius: radius_from_mass(mass),
        });
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EARTH_RADIUS_KM;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn count_scales_with_impact_speed() {
        assert_eq!(fragment_count(7.5, 10.0), 75);
        assert_eq!(fragment_count(0.09, 10.0), 0);
        assert_eq!(fragment_count(14.2, 10.0), 142);
    }

    #[test]
    fn hypervelocity_impact_is_catastrophic() {
        // 500 kg hitting 1000 kg combined at 7.5 km/s: far past 40 kJ/kg
        assert!(is_catastrophic(7.5, 500.0, 1500.0));
        // A gram-scale fleck against a heavy bus is not
        assert!(!is_catastrophic(0.5, 0.001, 1000.0));
    }

    #[test]
    fn delta_v_is_positive_and_capped() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let dv = sample_delta_v(&mut rng, 7.5, true, DELTA_V_SIGMA);
            assert!(dv > 0.0);
            assert!(dv <= MAX_FRAGMENT_DV_KM_S);
        }
    }

    #[test]
    fn cloud_conserves_parent_mass() {
        let mut rng = StdRng::seed_from_u64(42);
        let impact = DVec3::new(EARTH_RADIUS_KM + 780.0, 0.0, 0.0);
        let fragments = fragment_cloud(
            &mut rng,
            impact,
            7.5,
            1500.0,
            true,
            75,
            &BreakupConfig::default(),
        );
        assert_eq!(fragments.len(), 75);
        let total: f64 = fragments.iter().map(|f| f.mass).sum();
        assert_relative_eq!(total, 1500.0, max_relative = 1e-9);
        for f in &fragments {
            assert!(f.mass > 0.0);
            assert!(f.radius > 0.0);
            assert!(f.position.distance(impact) <= FRAGMENT_SCATTER_KM + 1e-9);
        }
    }

    #[test]
    fn fragments_stay_near_orbital_speed() {
        let mut rng = StdRng::seed_from_u64(3);
        let impact = DVec3::new(EARTH_RADIUS_KM + 780.0, 0.0, 0.0);
        let orbital = local_circular_velocity(impact).length();
        let fragments = fragment_cloud(
            &mut rng,
            impact,
            7.5,
            1000.0,
            true,
            50,
            &BreakupConfig::default(),
        );
        for f in &fragments {
            let deviation = (f.velocity.length() - orbital).abs();
            assert!(
                deviation <= MAX_FRAGMENT_DV_KM_S + 1e-9,
                "fragment speed deviates {deviation} km/s from circular"
            );
        }
    }

    #[test]
    fn radius_scales_with_cbrt_of_mass() {
        let r1 = radius_from_mass(1.0);
        let r8 = radius_from_mass(8.0);
        assert_relative_eq!(r8 / r1, 2.0, max_relative = 1e-9);
    }

    #[test]
    fn empty_cloud_for_zero_count() {
        let mut rng = StdRng::seed_from_u64(0);
        let fragments = fragment_cloud(
            &mut rng,
            DVec3::new(7000.0, 0.0, 0.0),
            0.05,
            10.0,
            false,
            0,
            &BreakupConfig::default(),
        );
        assert!(fragments.is_empty());
    }
}
